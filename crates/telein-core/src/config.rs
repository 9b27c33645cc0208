//! Application configuration management.
//!
//! This module handles loading and saving the login configuration: the
//! authentication endpoint, redirect base, promo document location,
//! identifier mode and the human-verification site key.
//!
//! Configuration is stored at `~/.config/telein-login/config.json` and can be
//! overridden through `TELEIN_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::auth::IdentifierMode;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "telein-login";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Authentication endpoint owned by the Telein interface.
const DEFAULT_AUTH_URL: &str = "https://interface.telein.com.br/s_login.php";

/// Base that relative redirect targets (`pagina`) are resolved against.
const DEFAULT_REDIRECT_BASE: &str = "https://interface.telein.com.br/";

/// Delay between showing the outcome and navigating away.
/// 1 second is long enough to read a short toast.
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auth_url: Url,
    pub redirect_base: Url,
    /// Where to go when the server answers 2xx without a structured body.
    pub status_only_redirect: Option<Url>,
    pub promo_url: Option<Url>,
    pub identifier_mode: IdentifierMode,
    /// Verification is enabled only when a site key is configured.
    pub recaptcha_site_key: Option<String>,
    pub redirect_delay_ms: u64,
    pub last_identifier: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_url: parse_builtin(DEFAULT_AUTH_URL),
            redirect_base: parse_builtin(DEFAULT_REDIRECT_BASE),
            status_only_redirect: Some(parse_builtin(DEFAULT_REDIRECT_BASE)),
            promo_url: None,
            identifier_mode: IdentifierMode::default(),
            recaptcha_site_key: None,
            redirect_delay_ms: DEFAULT_REDIRECT_DELAY_MS,
            last_identifier: None,
        }
    }
}

// The built-in URLs are compile-time constants known to parse.
fn parse_builtin(s: &str) -> Url {
    match Url::parse(s) {
        Ok(url) => url,
        Err(e) => unreachable!("invalid built-in URL {s}: {e}"),
    }
}

impl Config {
    /// Load the config file (or defaults) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::read_file(&Self::config_path()?)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Remember (or forget) the identifier and persist only that field.
    ///
    /// The file is re-read so `TELEIN_*` overrides applied to `self` never
    /// reach disk.
    pub fn save_last_identifier(&mut self, identifier: Option<String>) -> Result<()> {
        self.last_identifier = identifier.clone();
        Self::store_last_identifier(&Self::config_path()?, identifier)
    }

    /// Config as stored on disk, without environment overrides.
    fn read_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents).context("Failed to parse config file")
    }

    fn store_last_identifier(path: &Path, identifier: Option<String>) -> Result<()> {
        let mut stored = Self::read_file(path)?;
        stored.last_identifier = identifier;
        stored.write_file(path)
    }

    fn write_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Apply `TELEIN_*` overrides. Malformed values are logged and ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("TELEIN_AUTH_URL") {
            match Url::parse(&raw) {
                Ok(url) => self.auth_url = url,
                Err(e) => warn!(error = %e, "Ignoring invalid TELEIN_AUTH_URL"),
            }
        }
        if let Some(raw) = lookup("TELEIN_PROMO_URL") {
            match Url::parse(&raw) {
                Ok(url) => self.promo_url = Some(url),
                Err(e) => warn!(error = %e, "Ignoring invalid TELEIN_PROMO_URL"),
            }
        }
        if let Some(key) = lookup("TELEIN_RECAPTCHA_SITE_KEY") {
            let key = key.trim().to_string();
            self.recaptcha_site_key = (!key.is_empty()).then_some(key);
        }
        if let Some(raw) = lookup("TELEIN_IDENTIFIER_MODE") {
            match raw.parse() {
                Ok(mode) => self.identifier_mode = mode,
                Err(e) => warn!(error = %e, "Ignoring invalid TELEIN_IDENTIFIER_MODE"),
            }
        }
        if let Some(raw) = lookup("TELEIN_REDIRECT_DELAY_MS") {
            match raw.parse() {
                Ok(ms) => self.redirect_delay_ms = ms,
                Err(e) => warn!(error = %e, "Ignoring invalid TELEIN_REDIRECT_DELAY_MS"),
            }
        }
    }

    pub fn verification_enabled(&self) -> bool {
        self.recaptcha_site_key.is_some()
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.auth_url.as_str(), DEFAULT_AUTH_URL);
        assert_eq!(config.redirect_base.as_str(), DEFAULT_REDIRECT_BASE);
        assert_eq!(config.redirect_delay_ms, 1000);
        assert_eq!(config.identifier_mode, IdentifierMode::EmailOrLogin);
        assert!(!config.verification_enabled());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(lookup_from(&[
            ("TELEIN_AUTH_URL", "http://localhost:8080/login"),
            ("TELEIN_RECAPTCHA_SITE_KEY", "site-key"),
            ("TELEIN_IDENTIFIER_MODE", "email"),
            ("TELEIN_REDIRECT_DELAY_MS", "250"),
        ]));
        assert_eq!(config.auth_url.as_str(), "http://localhost:8080/login");
        assert_eq!(config.recaptcha_site_key.as_deref(), Some("site-key"));
        assert_eq!(config.identifier_mode, IdentifierMode::EmailOnly);
        assert_eq!(config.redirect_delay_ms, 250);
        assert!(config.verification_enabled());
    }

    #[test]
    fn test_invalid_env_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_env_overrides(lookup_from(&[
            ("TELEIN_AUTH_URL", "not a url"),
            ("TELEIN_IDENTIFIER_MODE", "phone"),
            ("TELEIN_REDIRECT_DELAY_MS", "soon"),
            ("TELEIN_RECAPTCHA_SITE_KEY", "   "),
        ]));
        assert_eq!(config.auth_url.as_str(), DEFAULT_AUTH_URL);
        assert_eq!(config.identifier_mode, IdentifierMode::EmailOrLogin);
        assert_eq!(config.redirect_delay_ms, DEFAULT_REDIRECT_DELAY_MS);
        assert!(config.recaptcha_site_key.is_none());
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"last_identifier": "user@example.com"}"#)
                .expect("partial config should parse");
        assert_eq!(config.last_identifier.as_deref(), Some("user@example.com"));
        assert_eq!(config.auth_url.as_str(), DEFAULT_AUTH_URL);
    }

    fn scratch_config_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("{}-{}-{}", APP_NAME, name, std::process::id()))
            .join(CONFIG_FILE)
    }

    #[test]
    fn test_remembered_identifier_does_not_persist_env_overrides() {
        let path = scratch_config_path("overrides");
        let _ = std::fs::remove_file(&path);

        let mut config = Config::read_file(&path).expect("missing file yields defaults");
        config.apply_env_overrides(lookup_from(&[
            ("TELEIN_AUTH_URL", "http://localhost:9999/dev"),
            ("TELEIN_RECAPTCHA_SITE_KEY", "temp-key"),
            ("TELEIN_REDIRECT_DELAY_MS", "5"),
        ]));
        Config::store_last_identifier(&path, Some("user@example.com".to_string()))
            .expect("config should be written");

        let reloaded = Config::read_file(&path).expect("config should reload");
        assert_eq!(reloaded.auth_url.as_str(), DEFAULT_AUTH_URL);
        assert!(reloaded.recaptcha_site_key.is_none());
        assert_eq!(reloaded.redirect_delay_ms, DEFAULT_REDIRECT_DELAY_MS);
        assert_eq!(reloaded.last_identifier.as_deref(), Some("user@example.com"));

        let _ = std::fs::remove_dir_all(path.parent().expect("scratch dir"));
    }

    #[test]
    fn test_storing_identifier_keeps_other_file_settings() {
        let path = scratch_config_path("keep");
        let mut on_disk = Config::default();
        on_disk.promo_url = Some(Url::parse("https://cdn.example.com/promo.json").expect("valid URL"));
        on_disk.last_identifier = Some("old".to_string());
        on_disk.write_file(&path).expect("config should be written");

        Config::store_last_identifier(&path, None).expect("config should be written");

        let reloaded = Config::read_file(&path).expect("config should reload");
        assert_eq!(reloaded.promo_url, on_disk.promo_url);
        assert!(reloaded.last_identifier.is_none());

        let _ = std::fs::remove_dir_all(path.parent().expect("scratch dir"));
    }
}
