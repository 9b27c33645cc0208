//! Login submission and its collaborators.
//!
//! This module provides:
//! - `Credentials`: per-attempt identifier/secret with structural validation
//! - `LoginController`: guards, the authentication call and outcome handling
//! - `Notifier` / `Navigator`: the surfaces the controller drives
//! - `VerificationWidget`: the optional human-verification capability
//!
//! Credentials are request-scoped and never written anywhere.

pub mod controller;
pub mod credentials;
pub mod surface;
pub mod verification;

pub use controller::{ControllerSettings, LoginController, SubmissionState, SubmitOutcome};
pub use credentials::{Credentials, Field, FieldError, IdentifierMode, MAX_IDENTIFIER_LENGTH};
pub use surface::{Navigator, Notification, NotificationKind, Notifier};
pub use verification::{TokenField, VerificationWidget, WidgetReady};
