//! HTTP transport for the Telein interface.
//!
//! This module provides the `ApiClient` that posts login credentials to the
//! externally owned authentication endpoint and fetches the promo document.
//! The `AuthTransport` trait is the seam the login controller talks through.

pub mod client;
pub mod error;
pub mod login;

use async_trait::async_trait;

pub use client::ApiClient;
pub use error::ApiError;
pub use login::{AuthReply, LoginRequest, OutcomeCategory, ServerResponse};

/// Issues the authentication request. One call per submission attempt.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    async fn authenticate(&self, request: &LoginRequest) -> Result<AuthReply, ApiError>;
}
