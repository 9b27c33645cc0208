//! Wire types for the authentication endpoint.

use std::fmt;

use serde::Deserialize;

use crate::auth::{Credentials, IdentifierMode};

/// Form field carrying the password.
const SECRET_FIELD: &str = "senha";

/// Form field carrying the "remember me" flag.
const REMEMBER_FIELD: &str = "lembrar";

/// Form field carrying the human-verification token.
const VERIFICATION_FIELD: &str = "recaptcha";

/// A single authentication attempt, consumed by the transport.
pub struct LoginRequest {
    credentials: Credentials,
    mode: IdentifierMode,
    verification_token: Option<String>,
}

impl LoginRequest {
    pub fn new(
        credentials: Credentials,
        mode: IdentifierMode,
        verification_token: Option<String>,
    ) -> Self {
        Self {
            credentials,
            mode,
            verification_token,
        }
    }

    pub fn identifier(&self) -> &str {
        self.credentials.identifier()
    }

    pub fn has_verification_token(&self) -> bool {
        self.verification_token.is_some()
    }

    /// Form-encoded body fields, in the names the interface expects.
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            (self.mode.wire_field(), self.credentials.identifier()),
            (SECRET_FIELD, self.credentials.secret()),
        ];
        if self.credentials.remember() {
            fields.push((REMEMBER_FIELD, "1"));
        }
        if let Some(ref token) = self.verification_token {
            fields.push((VERIFICATION_FIELD, token.as_str()));
        }
        fields
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("identifier", &self.credentials.identifier())
            .field("mode", &self.mode)
            .field("remember", &self.credentials.remember())
            .field("has_verification_token", &self.has_verification_token())
            .finish_non_exhaustive()
    }
}

/// Server-assigned classification of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeCategory {
    Success,
    Info,
    Warning,
    Danger,
}

impl OutcomeCategory {
    /// Absent or unrecognised categories count as success.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("danger") => OutcomeCategory::Danger,
            Some("warning") => OutcomeCategory::Warning,
            Some("info") => OutcomeCategory::Info,
            _ => OutcomeCategory::Success,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, OutcomeCategory::Danger | OutcomeCategory::Warning)
    }
}

/// Structured answer from the authentication endpoint.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerResponse {
    #[serde(rename = "tipo")]
    pub outcome_category: Option<String>,
    #[serde(rename = "mensagem")]
    pub message: Option<String>,
    #[serde(rename = "pagina")]
    pub redirect_target: Option<String>,
}

impl ServerResponse {
    pub fn category(&self) -> OutcomeCategory {
        OutcomeCategory::from_wire(self.outcome_category.as_deref())
    }

    /// Server message, ignoring blank strings.
    pub fn message(&self) -> Option<&str> {
        non_blank(self.message.as_deref())
    }

    /// Redirect target, ignoring blank strings.
    pub fn redirect_target(&self) -> Option<&str> {
        non_blank(self.redirect_target.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// What came back from a request that reached the server with a 2xx status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthReply {
    Structured(ServerResponse),
    /// 2xx with no JSON document; only the status carries meaning.
    StatusOnly,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(remember: bool) -> Credentials {
        Credentials::new("user@example.com", "pw123", remember)
    }

    #[test]
    fn test_form_fields_minimal() {
        let request = LoginRequest::new(credentials(false), IdentifierMode::EmailOrLogin, None);
        assert_eq!(
            request.form_fields(),
            vec![("login", "user@example.com"), ("senha", "pw123")]
        );
    }

    #[test]
    fn test_form_fields_with_remember_and_token() {
        let request = LoginRequest::new(
            credentials(true),
            IdentifierMode::EmailOnly,
            Some("tok1".to_string()),
        );
        assert_eq!(
            request.form_fields(),
            vec![
                ("email", "user@example.com"),
                ("senha", "pw123"),
                ("lembrar", "1"),
                ("recaptcha", "tok1"),
            ]
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let request = LoginRequest::new(credentials(false), IdentifierMode::EmailOrLogin, None);
        let debug = format!("{:?}", request);
        assert!(debug.contains("user@example.com"));
        assert!(!debug.contains("pw123"));
    }

    #[test]
    fn test_outcome_category_from_wire() {
        assert_eq!(OutcomeCategory::from_wire(None), OutcomeCategory::Success);
        assert_eq!(OutcomeCategory::from_wire(Some("danger")), OutcomeCategory::Danger);
        assert_eq!(OutcomeCategory::from_wire(Some("WARNING")), OutcomeCategory::Warning);
        assert_eq!(OutcomeCategory::from_wire(Some(" info ")), OutcomeCategory::Info);
        assert_eq!(OutcomeCategory::from_wire(Some("success")), OutcomeCategory::Success);
        assert_eq!(OutcomeCategory::from_wire(Some("primary")), OutcomeCategory::Success);
    }

    #[test]
    fn test_parse_server_response() {
        let json = r#"{"tipo": "info", "mensagem": "Aguardando aprovação", "pagina": "aguarde.php"}"#;
        let resp: ServerResponse =
            serde_json::from_str(json).expect("Failed to parse server response JSON");
        assert_eq!(resp.category(), OutcomeCategory::Info);
        assert_eq!(resp.message(), Some("Aguardando aprovação"));
        assert_eq!(resp.redirect_target(), Some("aguarde.php"));
    }

    #[test]
    fn test_parse_server_response_missing_and_null_fields() {
        let resp: ServerResponse = serde_json::from_str(r#"{"tipo": null, "mensagem": "Login realizado com sucesso!"}"#)
            .expect("Failed to parse server response JSON");
        assert_eq!(resp.category(), OutcomeCategory::Success);
        assert_eq!(resp.redirect_target(), None);

        let resp: ServerResponse = serde_json::from_str(r#"{"mensagem": "  ", "pagina": ""}"#)
            .expect("Failed to parse server response JSON");
        assert_eq!(resp.message(), None);
        assert_eq!(resp.redirect_target(), None);
    }
}
