use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Raw search hit as returned by a suggestion source, e.g.
/// `{"id": "1", "title": "Physics", ...}`.
pub type SuggestionHit = Value;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("suggestion API {url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("malformed suggestion response: {0}")]
    Decode(String),
}

/// Origin of autocomplete candidates for a remote select field.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Returns the raw hits matching `query`.
    async fn search(&self, query: &str) -> Result<Vec<SuggestionHit>, FetchError>;
}

/// Pulls the `hits.hits` array out of a search response body. Missing levels
/// read as no hits.
pub fn extract_hits(body: &Value) -> Vec<SuggestionHit> {
    body.get("hits")
        .and_then(|hits| hits.get("hits"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}
