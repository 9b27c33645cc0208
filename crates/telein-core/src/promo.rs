//! Promotional content for the marketing panel.
//!
//! The panel shows a fixed product ecosystem plus highlights and a featured
//! video that a small remote document may override. Fetch failures are
//! absorbed: the built-in defaults are used and nothing reaches the user.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::api::ApiClient;

/// YouTube channel whose uploads are shown when no video is configured.
pub const YOUTUBE_CHANNEL_ID: &str = "UCYnFC1JBxDTtFn2qUoUTs2A";

/// A product in the "Nosso Ecossistema" list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub name: &'static str,
    pub description: &'static str,
}

pub const PRODUCTS: [Product; 6] = [
    Product { name: "PABX IP", description: "Central telefônica inteligente" },
    Product { name: "Call Center", description: "Gestão completa de atendimento" },
    Product { name: "Nuvem", description: "Infraestrutura escalável" },
    Product { name: "WhatsApp", description: "Integração e automação" },
    Product { name: "Videoconferência", description: "Reuniões profissionais" },
    Product { name: "Analytics", description: "Métricas e relatórios" },
];

/// A promotional image with an optional click-through link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub url: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedVideo {
    #[serde(rename = "youtubeId", default)]
    pub youtube_id: Option<String>,
}

impl FeaturedVideo {
    fn id(&self) -> Option<&str> {
        self.youtube_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Link to the featured video, or to the channel when none is set.
    pub fn watch_url(&self) -> String {
        match self.id() {
            Some(id) => format!("https://www.youtube.com/watch?v={}", id),
            None => format!("https://www.youtube.com/channel/{}", YOUTUBE_CHANNEL_ID),
        }
    }

    pub fn embed_url(&self) -> String {
        match self.id() {
            Some(id) => format!("https://www.youtube.com/embed/{}", id),
            None => format!(
                "https://www.youtube.com/embed?listType=user_uploads&list={}",
                YOUTUBE_CHANNEL_ID
            ),
        }
    }
}

/// The remote document as served. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromoDocument {
    #[serde(rename = "imagensDestaque", default)]
    pub highlights: Option<Vec<Highlight>>,
    #[serde(rename = "videoDestaque", default)]
    pub video: Option<FeaturedVideo>,
}

/// Content actually rendered by the marketing panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromoContent {
    pub highlights: Vec<Highlight>,
    pub video: FeaturedVideo,
}

impl PromoContent {
    /// Overlay a fetched document on the built-in defaults, field by field.
    pub fn from_document(doc: PromoDocument) -> Self {
        let defaults = Self::default();

        let highlights = doc
            .highlights
            .map(|items| {
                items
                    .into_iter()
                    .filter(|h| !h.url.trim().is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|items| !items.is_empty())
            .unwrap_or(defaults.highlights);

        let video = doc
            .video
            .filter(|v| v.id().is_some())
            .unwrap_or(defaults.video);

        Self { highlights, video }
    }
}

/// Fetch and merge the promo document. Never fails.
pub async fn load_promo(client: &ApiClient, url: Option<&Url>) -> PromoContent {
    let Some(url) = url else {
        debug!("No promo document configured, using defaults");
        return PromoContent::default();
    };

    match client.fetch_promo(url).await {
        Ok(doc) => PromoContent::from_document(doc),
        Err(e) => {
            warn!(error = %e, "Failed to load promo document, using defaults");
            PromoContent::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_video_urls_fall_back_to_channel() {
        let video = FeaturedVideo::default();
        assert!(video.watch_url().ends_with(YOUTUBE_CHANNEL_ID));
        assert!(video.embed_url().contains("listType=user_uploads"));

        let video = FeaturedVideo { youtube_id: Some("abc123".to_string()) };
        assert_eq!(video.watch_url(), "https://www.youtube.com/watch?v=abc123");
        assert_eq!(video.embed_url(), "https://www.youtube.com/embed/abc123");
    }

    #[test]
    fn test_from_document_overrides_per_field() {
        let doc: PromoDocument = serde_json::from_str(
            r#"{"imagensDestaque": [{"url": "https://cdn.example.com/promo.png", "alt": "Promo"}]}"#,
        )
        .expect("Failed to parse promo test JSON");
        let content = PromoContent::from_document(doc);
        assert_eq!(content.highlights.len(), 1);
        assert_eq!(content.highlights[0].alt, "Promo");
        assert_eq!(content.highlights[0].link, None);
        assert_eq!(content.video, FeaturedVideo::default());
    }

    #[test]
    fn test_from_document_ignores_blank_entries() {
        let doc: PromoDocument = serde_json::from_str(
            r#"{"imagensDestaque": [{"url": " "}], "videoDestaque": {"youtubeId": ""}}"#,
        )
        .expect("Failed to parse promo test JSON");
        assert_eq!(PromoContent::from_document(doc), PromoContent::default());
    }

    #[tokio::test]
    async fn load_promo_without_url_uses_defaults() {
        let client = ApiClient::new(Url::parse("http://127.0.0.1/").expect("valid URL"))
            .expect("client should build");
        assert_eq!(load_promo(&client, None).await, PromoContent::default());
    }

    #[tokio::test]
    async fn load_promo_absorbs_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/config.json", server.uri())).expect("valid URL");
        let client = ApiClient::new(url.clone()).expect("client should build");
        assert_eq!(load_promo(&client, Some(&url)).await, PromoContent::default());
    }

    #[tokio::test]
    async fn load_promo_absorbs_malformed_documents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/config.json", server.uri())).expect("valid URL");
        let client = ApiClient::new(url.clone()).expect("client should build");
        assert_eq!(load_promo(&client, Some(&url)).await, PromoContent::default());
    }
}
