//! API client for the Telein interface.
//!
//! This module provides the `ApiClient` struct that posts login credentials
//! and fetches the promotional configuration document.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client};
use tracing::{debug, warn};
use url::Url;

use crate::promo::PromoDocument;

use super::{ApiError, AuthReply, AuthTransport, LoginRequest, ServerResponse};

// ============================================================================
// Constants
// ============================================================================

/// Connect timeout in seconds.
/// Only connection setup is bounded; an accepted login request runs to completion.
const CONNECT_TIMEOUT_SECS: u64 = 15;

/// Query parameter used to defeat intermediate caches on the promo document.
const CACHE_BUST_PARAM: &str = "v";

/// API client for the Telein interface.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    auth_url: Url,
}

impl ApiClient {
    /// Create a new API client posting to `auth_url`
    pub fn new(auth_url: Url) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, auth_url })
    }

    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    /// Interpret a 2xx body. Anything that is not a JSON object is a
    /// status-only reply; a broken JSON object is an invalid response.
    fn parse_reply(body: &str) -> Result<AuthReply, ApiError> {
        let trimmed = body.trim_start_matches('\u{feff}').trim();
        if !trimmed.starts_with('{') {
            return Ok(AuthReply::StatusOnly);
        }
        serde_json::from_str::<ServerResponse>(trimmed)
            .map(AuthReply::Structured)
            .map_err(|e| ApiError::InvalidResponse(format!("login response: {}", e)))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Fetch the promo document, adding a cache-busting query parameter.
    pub async fn fetch_promo(&self, url: &Url) -> Result<PromoDocument, ApiError> {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair(CACHE_BUST_PARAM, &Utc::now().timestamp_millis().to_string());

        debug!(%url, "Fetching promo document");
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("promo document: {}", e)))
    }
}

#[async_trait]
impl AuthTransport for ApiClient {
    async fn authenticate(&self, request: &LoginRequest) -> Result<AuthReply, ApiError> {
        debug!(
            identifier = %request.identifier(),
            verified = request.has_verification_token(),
            "Sending authentication request"
        );

        let response = self
            .client
            .post(self.auth_url.clone())
            .header(header::ACCEPT, "application/json")
            .form(&request.form_fields())
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body = response.text().await?;
        let reply = Self::parse_reply(&body)?;
        if reply == AuthReply::StatusOnly {
            warn!("Authentication endpoint answered without a structured body");
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credentials, IdentifierMode};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        let url = Url::parse(&format!("{}/s_login.php", server.uri()))
            .expect("mock server URI should parse");
        ApiClient::new(url).expect("client should build")
    }

    fn request(token: Option<&str>) -> LoginRequest {
        LoginRequest::new(
            Credentials::new("user@example.com", "pw123", true),
            IdentifierMode::EmailOrLogin,
            token.map(str::to_string),
        )
    }

    #[test]
    fn test_parse_reply() {
        assert_eq!(ApiClient::parse_reply("").ok(), Some(AuthReply::StatusOnly));
        assert_eq!(
            ApiClient::parse_reply("<html>ok</html>").ok(),
            Some(AuthReply::StatusOnly)
        );
        assert!(matches!(
            ApiClient::parse_reply("{\"tipo\": "),
            Err(ApiError::InvalidResponse(_))
        ));
        let reply = ApiClient::parse_reply("\u{feff} {\"tipo\": \"danger\"}")
            .expect("BOM-prefixed JSON should parse");
        assert!(matches!(reply, AuthReply::Structured(ref r) if r.category().is_failure()));
    }

    #[tokio::test]
    async fn authenticate_posts_form_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/s_login.php"))
            .and(body_string_contains("login=user%40example.com"))
            .and(body_string_contains("senha=pw123"))
            .and(body_string_contains("lembrar=1"))
            .and(body_string_contains("recaptcha=tok1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tipo": "info",
                "mensagem": "Aguardando aprovação",
                "pagina": "aguarde.php"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .authenticate(&request(Some("tok1")))
            .await
            .expect("authentication should succeed");

        let AuthReply::Structured(response) = reply else {
            panic!("expected structured reply");
        };
        assert_eq!(response.message(), Some("Aguardando aprovação"));
        assert_eq!(response.redirect_target(), Some("aguarde.php"));
    }

    #[tokio::test]
    async fn authenticate_status_only_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/s_login.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .authenticate(&request(None))
            .await
            .expect("authentication should succeed");
        assert_eq!(reply, AuthReply::StatusOnly);
    }

    #[tokio::test]
    async fn authenticate_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .authenticate(&request(None))
            .await
            .expect_err("503 should fail");
        assert!(matches!(err, ApiError::Status { status, .. } if status.as_u16() == 503));
    }

    #[tokio::test]
    async fn authenticate_unreachable_server_is_network_error() {
        // Bind then release a port so nothing is listening on it.
        let listener =
            std::net::TcpListener::bind("127.0.0.1:0").expect("should bind an ephemeral port");
        let addr = listener.local_addr().expect("listener should have an address");
        drop(listener);
        let url = Url::parse(&format!("http://{}/s_login.php", addr))
            .expect("loopback URL should parse");
        let client = ApiClient::new(url).expect("client should build");

        let err = client
            .authenticate(&request(None))
            .await
            .expect_err("request to a stopped server should fail");
        assert!(matches!(err, ApiError::NetworkError(_)));
    }

    #[tokio::test]
    async fn fetch_promo_adds_cache_buster() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/config.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "imagensDestaque": [
                    {"url": "https://cdn.example.com/a.png", "link": "https://example.com", "alt": "A"}
                ],
                "videoDestaque": {"youtubeId": "abc123"}
            })))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/config.json", server.uri()))
            .expect("mock server URI should parse");
        let doc = client_for(&server)
            .fetch_promo(&url)
            .await
            .expect("promo fetch should succeed");
        assert_eq!(doc.highlights.as_ref().map(Vec::len), Some(1));

        let requests = server
            .received_requests()
            .await
            .expect("request recording should be enabled");
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.query_pairs().any(|(k, _)| k == CACHE_BUST_PARAM));
    }
}
