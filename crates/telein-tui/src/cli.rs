//! One-shot command-line login (`telein-login --cli`).
//!
//! Prompts for the credentials, runs a single submission through the same
//! controller the TUI uses and prints the outcome. A scheduled redirect is
//! waited out and then printed.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use url::Url;

use telein_core::{
    ApiClient, Config, ControllerSettings, Credentials, LoginController, Navigator, Notification,
    NotificationKind, Notifier, SubmitOutcome, TokenField, VerificationWidget,
};

/// Prints notifications to stdout.
struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.kind {
            NotificationKind::Success => "✓",
            NotificationKind::Info => "i",
            NotificationKind::Destructive => "✗",
        };
        println!("{} {}: {}", marker, notification.title, notification.description);
    }
}

/// Holds the scheduled redirect until the attempt finishes.
#[derive(Default)]
struct DeferredNavigator {
    scheduled: Mutex<Option<(Url, Duration)>>,
}

impl DeferredNavigator {
    fn take(&self) -> Option<(Url, Duration)> {
        self.scheduled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

impl Navigator for DeferredNavigator {
    fn navigate_after(&self, target: Url, delay: Duration) {
        *self
            .scheduled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some((target, delay));
    }
}

pub async fn run(mut config: Config) -> Result<()> {
    println!("\n=== Telein Login ===\n");

    let identifier = prompt_identifier(&config)?;
    let password = rpassword::prompt_password("Senha: ").context("Failed to read password")?;
    let remember = prompt_yes_no("Lembrar? [s/N]: ")?;

    let api = ApiClient::new(config.auth_url.clone())?;
    let navigator = Arc::new(DeferredNavigator::default());
    let mut controller = LoginController::new(
        Arc::new(api),
        Arc::new(PrintNotifier),
        navigator.clone(),
        ControllerSettings::from_config(&config),
    );

    if config.verification_enabled() {
        let field = TokenField::new();
        let token = match std::env::var("TELEIN_RECAPTCHA_TOKEN") {
            Ok(token) => token,
            Err(_) => prompt("Token de verificação: ")?,
        };
        field.set(token);
        let widget: Arc<dyn VerificationWidget> = Arc::new(field);
        controller = controller.with_verification(widget);
    }

    println!("\nEntrando...");
    let outcome = controller.submit(Credentials::new(identifier.clone(), password, remember)).await;

    match outcome {
        SubmitOutcome::Invalid(errors) => {
            for error in &errors {
                eprintln!("  {}", error.message);
            }
            return Err(anyhow::anyhow!("Invalid login form"));
        }
        SubmitOutcome::VerificationRequired
        | SubmitOutcome::ConnectionError
        | SubmitOutcome::Busy => {
            return Err(anyhow::anyhow!("Login not completed"));
        }
        SubmitOutcome::Completed { category, .. } => {
            if !category.is_failure() {
                config.save_last_identifier(remember.then_some(identifier))?;
            }
        }
    }

    if let Some((target, delay)) = navigator.take() {
        tokio::time::sleep(delay).await;
        info!(%target, "Redirecting");
        println!("Redirecionando para {}", target);
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_identifier(config: &Config) -> Result<String> {
    let label = config.identifier_mode.label();
    match config.last_identifier {
        Some(ref last) => {
            let input = prompt(&format!("{} [{}]: ", label, last))?;
            Ok(if input.is_empty() { last.clone() } else { input })
        }
        None => prompt(&format!("{}: ", label)),
    }
}

fn prompt_yes_no(label: &str) -> Result<bool> {
    let input = prompt(label)?;
    Ok(matches!(input.to_lowercase().as_str(), "s" | "sim" | "y" | "yes"))
}
