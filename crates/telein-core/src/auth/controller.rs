//! Login submission controller.
//!
//! `LoginController::submit` runs the guard sequence (field validation, human
//! verification, single in-flight attempt), issues exactly one authentication
//! request and turns the reply into one notification plus an optional delayed
//! redirect.
//!
//! A redirect target supplied by the server is always followed, even when the
//! outcome is `danger` or `warning`: the server decides where a failed attempt
//! should land (for example a "too many attempts" page).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use url::Url;

use crate::api::{ApiError, AuthReply, AuthTransport, LoginRequest, OutcomeCategory, ServerResponse};
use crate::config::Config;

use super::{
    Credentials, FieldError, IdentifierMode, Navigator, Notification, NotificationKind, Notifier,
    VerificationWidget,
};

// ============================================================================
// User-facing messages
// ============================================================================

const CONNECTION_ERROR_TITLE: &str = "Erro de conexão";
const CONNECTION_ERROR_TEXT: &str = "Não foi possível se conectar ao servidor.";
const VERIFICATION_REQUIRED_TITLE: &str = "Verificação necessária";
const VERIFICATION_REQUIRED_TEXT: &str = "Por favor, confirme que você não é um robô.";
const FAILURE_TITLE: &str = "Erro no login";
const FAILURE_TEXT: &str = "Não foi possível realizar o login.";
const INFO_TITLE: &str = "Aviso";
const INFO_TEXT: &str = "Solicitação processada.";
const SUCCESS_TITLE: &str = "Login realizado!";
const SUCCESS_TEXT: &str = "Você será redirecionado...";

/// Shared in-flight flag for one form instance.
#[derive(Debug, Clone, Default)]
pub struct SubmissionState {
    submitting: Arc<AtomicBool>,
}

impl SubmissionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Mark an attempt as in flight. `None` if one already is.
    fn begin(&self) -> Option<SubmittingGuard> {
        self.submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| SubmittingGuard {
                submitting: Arc::clone(&self.submitting),
                released: false,
            })
    }
}

/// Clears the in-flight flag when released or dropped.
struct SubmittingGuard {
    submitting: Arc<AtomicBool>,
    released: bool,
}

impl SubmittingGuard {
    fn release(&mut self) {
        if !self.released {
            self.submitting.store(false, Ordering::SeqCst);
            self.released = true;
        }
    }
}

impl Drop for SubmittingGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// What a call to `submit` ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Field validation failed; nothing was sent.
    Invalid(Vec<FieldError>),
    /// Verification is enabled but no token was available; nothing was sent.
    VerificationRequired,
    /// Another attempt is still in flight; nothing was sent.
    Busy,
    /// The request failed or the server did not answer usefully.
    ConnectionError,
    /// The server answered; `redirect` is set when navigation was scheduled.
    Completed {
        category: OutcomeCategory,
        redirect: Option<Url>,
    },
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub identifier_mode: IdentifierMode,
    pub redirect_base: Url,
    pub status_only_redirect: Option<Url>,
    pub redirect_delay: Duration,
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            identifier_mode: config.identifier_mode,
            redirect_base: config.redirect_base.clone(),
            status_only_redirect: config.status_only_redirect.clone(),
            redirect_delay: Duration::from_millis(config.redirect_delay_ms),
        }
    }
}

/// Drives one login form. Cheap to share behind an `Arc`.
pub struct LoginController {
    transport: Arc<dyn AuthTransport>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    verification: Option<Arc<dyn VerificationWidget>>,
    settings: ControllerSettings,
    state: SubmissionState,
}

impl LoginController {
    pub fn new(
        transport: Arc<dyn AuthTransport>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            transport,
            notifier,
            navigator,
            verification: None,
            settings,
            state: SubmissionState::new(),
        }
    }

    /// Enable human verification with the given widget.
    pub fn with_verification(mut self, widget: Arc<dyn VerificationWidget>) -> Self {
        self.verification = Some(widget);
        self
    }

    pub fn verification_enabled(&self) -> bool {
        self.verification.is_some()
    }

    pub fn identifier_mode(&self) -> IdentifierMode {
        self.settings.identifier_mode
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting()
    }

    /// Handle to the in-flight flag, for rendering the submit affordance.
    pub fn submission_state(&self) -> SubmissionState {
        self.state.clone()
    }

    /// Submit the login form.
    pub async fn submit(&self, credentials: Credentials) -> SubmitOutcome {
        if self.state.is_submitting() {
            debug!("Submission already in flight, ignoring");
            return SubmitOutcome::Busy;
        }

        if let Err(errors) = credentials.validate(self.settings.identifier_mode) {
            debug!(count = errors.len(), "Login form failed validation");
            return SubmitOutcome::Invalid(errors);
        }

        let token = match self.verification {
            Some(ref widget) => match widget.response_token().filter(|t| !t.trim().is_empty()) {
                Some(token) => Some(token),
                None => {
                    info!("Login blocked: verification not completed");
                    self.notifier.notify(Notification::new(
                        NotificationKind::Destructive,
                        VERIFICATION_REQUIRED_TITLE,
                        VERIFICATION_REQUIRED_TEXT,
                    ));
                    return SubmitOutcome::VerificationRequired;
                }
            },
            None => None,
        };

        let Some(mut guard) = self.state.begin() else {
            debug!("Submission already in flight, ignoring");
            return SubmitOutcome::Busy;
        };

        let request = LoginRequest::new(credentials, self.settings.identifier_mode, token);
        let identifier = request.identifier().to_string();
        let reply = self.transport.authenticate(&request).await;
        drop(request);

        let outcome = match reply {
            Ok(reply) => self.handle_reply(reply, &identifier),
            Err(e) => self.handle_transport_error(&e, &identifier),
        };

        guard.release();
        outcome
    }

    fn handle_transport_error(&self, err: &ApiError, identifier: &str) -> SubmitOutcome {
        error!(error = %err, identifier = %identifier, "Login request failed");
        self.notifier.notify(Notification::new(
            NotificationKind::Destructive,
            CONNECTION_ERROR_TITLE,
            CONNECTION_ERROR_TEXT,
        ));
        self.reset_verification();
        SubmitOutcome::ConnectionError
    }

    fn handle_reply(&self, reply: AuthReply, identifier: &str) -> SubmitOutcome {
        match reply {
            AuthReply::Structured(response) => self.handle_response(&response, identifier),
            AuthReply::StatusOnly => {
                info!(identifier = %identifier, "Login accepted (status only)");
                self.notifier.notify(Notification::new(
                    NotificationKind::Success,
                    SUCCESS_TITLE,
                    SUCCESS_TEXT,
                ));
                let redirect = self.settings.status_only_redirect.clone();
                if let Some(ref target) = redirect {
                    self.schedule_navigation(target.clone());
                }
                SubmitOutcome::Completed {
                    category: OutcomeCategory::Success,
                    redirect,
                }
            }
        }
    }

    fn handle_response(&self, response: &ServerResponse, identifier: &str) -> SubmitOutcome {
        let category = response.category();
        info!(identifier = %identifier, ?category, "Login response received");

        let notification = match category {
            OutcomeCategory::Danger | OutcomeCategory::Warning => Notification::new(
                NotificationKind::Destructive,
                FAILURE_TITLE,
                response.message().unwrap_or(FAILURE_TEXT),
            ),
            OutcomeCategory::Info => Notification::new(
                NotificationKind::Info,
                INFO_TITLE,
                response.message().unwrap_or(INFO_TEXT),
            ),
            OutcomeCategory::Success => Notification::new(
                NotificationKind::Success,
                SUCCESS_TITLE,
                response.message().unwrap_or(SUCCESS_TEXT),
            ),
        };
        self.notifier.notify(notification);

        if category.is_failure() {
            self.reset_verification();
        }

        let redirect = response
            .redirect_target()
            .and_then(|target| self.resolve_redirect(target));
        if let Some(ref target) = redirect {
            self.schedule_navigation(target.clone());
        }

        SubmitOutcome::Completed { category, redirect }
    }

    fn resolve_redirect(&self, target: &str) -> Option<Url> {
        match self.settings.redirect_base.join(target) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, target = %target, "Ignoring unresolvable redirect target");
                None
            }
        }
    }

    fn schedule_navigation(&self, target: Url) {
        info!(%target, delay = ?self.settings.redirect_delay, "Scheduling redirect");
        self.navigator
            .navigate_after(target, self.settings.redirect_delay);
    }

    fn reset_verification(&self) {
        if let Some(ref widget) = self.verification {
            widget.reset();
        }
    }
}
