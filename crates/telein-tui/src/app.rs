//! Application state management for the login screen.
//!
//! This module contains the `App` struct that owns the form fields, the
//! login controller and the channel background tasks use to report back
//! (notifications, delayed navigation, promo content, submission results).

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use telein_core::auth::{FieldError, MAX_IDENTIFIER_LENGTH};
use telein_core::{
    load_promo, ApiClient, Config, ControllerSettings, Credentials, LoginController, Navigator,
    Notification, Notifier, PromoContent, SubmitOutcome, TokenField, WidgetReady,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A login attempt produces at most three messages; 32 leaves plenty of headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for a pasted verification token.
const MAX_TOKEN_LENGTH: usize = 4096;

/// How long a notification stays on screen.
const TOAST_DURATION: Duration = Duration::from_secs(6);

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    LoggingIn,
    ShowingHelp,
    Redirecting,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Identifier,
    Password,
    Remember,
    Verification,
    Button,
}

impl LoginFocus {
    /// Next field, skipping the verification field when it is hidden.
    pub fn next(self, verification: bool) -> Self {
        match self {
            LoginFocus::Identifier => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Remember,
            LoginFocus::Remember if verification => LoginFocus::Verification,
            LoginFocus::Remember => LoginFocus::Button,
            LoginFocus::Verification => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Identifier,
        }
    }

    /// Previous field, skipping the verification field when it is hidden.
    pub fn prev(self, verification: bool) -> Self {
        match self {
            LoginFocus::Identifier => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Identifier,
            LoginFocus::Remember => LoginFocus::Password,
            LoginFocus::Verification => LoginFocus::Remember,
            LoginFocus::Button if verification => LoginFocus::Verification,
            LoginFocus::Button => LoginFocus::Remember,
        }
    }
}

/// A notification with the time it was shown.
#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    pub shown_at: Instant,
}

impl Toast {
    fn is_expired(&self) -> bool {
        self.shown_at.elapsed() > TOAST_DURATION
    }
}

// ============================================================================
// Background Task Messages
// ============================================================================

/// Messages sent from background tasks and surfaces back to the app.
#[derive(Debug)]
pub enum UiEvent {
    /// Show a notification
    Notify(Notification),
    /// Leave the screen for this URL (delay already elapsed)
    Navigate(Url),
    /// Promo content finished loading (or fell back to defaults)
    Promo(PromoContent),
    /// A submission attempt ended
    Submitted {
        identifier: String,
        remember: bool,
        outcome: SubmitOutcome,
    },
}

/// Notification surface backed by the app channel.
struct ChannelNotifier {
    tx: mpsc::Sender<UiEvent>,
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if let Err(e) = self.tx.try_send(UiEvent::Notify(notification)) {
            warn!(error = %e, "Failed to deliver notification");
        }
    }
}

/// Navigation surface: waits out the delay, then tells the app to leave.
struct ChannelNavigator {
    tx: mpsc::Sender<UiEvent>,
}

impl Navigator for ChannelNavigator {
    fn navigate_after(&self, target: Url, delay: Duration) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(UiEvent::Navigate(target)).await.is_err() {
                debug!("App closed before redirect fired");
            }
        });
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    pub config: Config,
    pub controller: Arc<LoginController>,
    api: ApiClient,

    // UI State
    pub state: AppState,

    // Login form state
    pub login_identifier: String,
    pub login_password: String,
    pub show_password: bool,
    pub remember: bool,
    pub verification: Option<TokenField>,
    pub login_focus: LoginFocus,
    pub field_errors: Vec<FieldError>,

    // Feedback
    pub toast: Option<Toast>,
    pub redirect_target: Option<Url>,

    // Marketing panel
    pub promo: PromoContent,
    pub promo_loading: bool,

    widget_ready: WidgetReady,

    // Background task channel
    events_rx: mpsc::Receiver<UiEvent>,
    events_tx: mpsc::Sender<UiEvent>,
}

impl App {
    /// Create a new application instance
    pub async fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(config.auth_url.clone())?;
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let verification = config.verification_enabled().then(TokenField::new);

        let mut controller = LoginController::new(
            Arc::new(api.clone()),
            Arc::new(ChannelNotifier { tx: tx.clone() }),
            Arc::new(ChannelNavigator { tx: tx.clone() }),
            ControllerSettings::from_config(&config),
        );
        if let Some(ref field) = verification {
            controller = controller.with_verification(Arc::new(field.clone()));
        }

        // Prefill from env var or the remembered identifier
        let login_identifier = std::env::var("TELEIN_LOGIN")
            .ok()
            .or_else(|| config.last_identifier.clone())
            .unwrap_or_default();
        let remember = config.last_identifier.is_some();

        let mut app = Self {
            config,
            controller: Arc::new(controller),
            api,
            state: AppState::LoggingIn,
            login_identifier,
            login_password: String::new(),
            show_password: false,
            remember,
            verification,
            login_focus: LoginFocus::Identifier,
            field_errors: Vec::new(),
            toast: None,
            redirect_target: None,
            promo: PromoContent::default(),
            promo_loading: false,
            widget_ready: WidgetReady::new(),
            events_rx: rx,
            events_tx: tx,
        };
        app.start_login();
        app.verification_ready().await;
        Ok(app)
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Reset the form focus and errors (show login form)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_identifier.is_empty() {
            LoginFocus::Identifier
        } else {
            LoginFocus::Password
        };
        self.field_errors.clear();
    }

    /// One-shot widget initialization. Later calls are no-ops.
    pub async fn verification_ready(&self) {
        if self.verification.is_none() {
            return;
        }
        let site_key = self.config.recaptcha_site_key.clone().unwrap_or_default();
        self.widget_ready
            .on_ready(|| async move {
                info!(site_key = %site_key, "Verification field enabled");
            })
            .await;
    }

    pub fn toggle_password_visibility(&mut self) {
        self.show_password = !self.show_password;
    }

    /// Whether the verification field should be drawn and focusable.
    pub fn show_verification(&self) -> bool {
        self.verification.is_some() && self.widget_ready.is_rendered()
    }

    pub fn is_submitting(&self) -> bool {
        self.controller.is_submitting()
    }

    /// Start a submission in the background. Ignored while one is in flight,
    /// the same way a disabled button ignores clicks.
    pub fn submit_login(&mut self) {
        if self.is_submitting() {
            debug!("Submit ignored: attempt in flight");
            return;
        }

        self.field_errors.clear();
        let identifier = self.login_identifier.trim().to_string();
        let remember = self.remember;
        let credentials = Credentials::new(identifier.clone(), self.login_password.clone(), remember);

        let controller = Arc::clone(&self.controller);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = controller.submit(credentials).await;
            let _ = tx
                .send(UiEvent::Submitted {
                    identifier,
                    remember,
                    outcome,
                })
                .await;
        });
    }

    /// Field error for display, if any.
    pub fn field_error(&self, field: telein_core::auth::Field) -> Option<&'static str> {
        self.field_errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }

    fn handle_submitted(&mut self, identifier: String, remember: bool, outcome: SubmitOutcome) {
        match outcome {
            SubmitOutcome::Invalid(errors) => {
                self.field_errors = errors;
            }
            SubmitOutcome::VerificationRequired | SubmitOutcome::Busy => {}
            SubmitOutcome::ConnectionError => {
                self.login_password.clear();
            }
            SubmitOutcome::Completed { category, .. } => {
                self.login_password.clear();
                if !category.is_failure() {
                    self.remember_identifier(identifier, remember);
                }
            }
        }
    }

    /// Store or forget the identifier. The password is never stored.
    fn remember_identifier(&mut self, identifier: String, remember: bool) {
        let wanted = remember.then_some(identifier);
        if self.config.last_identifier == wanted {
            return;
        }
        if let Err(e) = self.config.save_last_identifier(wanted) {
            warn!(error = %e, "Failed to save config");
        }
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Fetch promo content in the background. Failures fall back to defaults.
    pub fn load_promo_background(&mut self) {
        let api = self.api.clone();
        let url = self.config.promo_url.clone();
        let tx = self.events_tx.clone();
        self.promo_loading = url.is_some();
        tokio::spawn(async move {
            let content = load_promo(&api, url.as_ref()).await;
            let _ = tx.send(UiEvent::Promo(content)).await;
        });
    }

    /// Drain pending background messages and expire old notifications.
    pub fn check_background_tasks(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.process_event(event);
        }
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    fn process_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Notify(notification) => {
                self.toast = Some(Toast {
                    notification,
                    shown_at: Instant::now(),
                });
            }
            UiEvent::Navigate(url) => {
                info!(%url, "Redirecting");
                self.redirect_target = Some(url);
                self.state = AppState::Redirecting;
            }
            UiEvent::Promo(content) => {
                self.promo = content;
                self.promo_loading = false;
            }
            UiEvent::Submitted {
                identifier,
                remember,
                outcome,
            } => self.handle_submitted(identifier, remember, outcome),
        }
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an identifier character should be accepted
pub fn can_add_identifier_char(current_len: usize, c: char) -> bool {
    current_len < MAX_IDENTIFIER_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Check if a verification token character should be accepted
pub fn can_add_token_char(current_len: usize, c: char) -> bool {
    current_len < MAX_TOKEN_LENGTH && !c.is_whitespace() && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
