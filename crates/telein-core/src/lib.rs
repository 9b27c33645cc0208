//! Core library for the Telein login screen.
//!
//! Provides the login submission controller, the HTTP client for the Telein
//! interface, configuration loading and the promotional content shown next
//! to the login form. Front ends supply the notification, navigation and
//! verification surfaces.

pub mod api;
pub mod auth;
pub mod config;
pub mod promo;

pub use api::{ApiClient, ApiError, AuthTransport, OutcomeCategory};
pub use auth::{
    ControllerSettings, Credentials, IdentifierMode, LoginController, Navigator, Notification,
    NotificationKind, Notifier, SubmitOutcome, TokenField, VerificationWidget, WidgetReady,
};
pub use config::Config;
pub use promo::{load_promo, PromoContent, PRODUCTS};
