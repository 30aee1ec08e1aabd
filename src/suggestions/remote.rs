use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::query::wildcard_query;
use super::source::{FetchError, SuggestionHit, SuggestionSource, extract_hits};

pub const DEFAULT_SUGGESTION_SIZE: usize = 5;

/// Suggestions served by a search endpoint answering
/// `GET <url>?q=<term>*&size=<n>` with `{"hits": {"hits": [...]}}`.
#[derive(Clone, Debug)]
pub struct RemoteSuggestions {
    client: reqwest::Client,
    url: String,
    extra_params: BTreeMap<String, String>,
    size: usize,
}

impl RemoteSuggestions {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            extra_params: BTreeMap::new(),
            size: DEFAULT_SUGGESTION_SIZE,
        }
    }

    /// Extra query parameters. They are applied last and win over `q` and
    /// `size` on collision.
    pub fn query_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.extra_params = params;
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn request_params(&self, query: &str) -> Vec<(String, String)> {
        let mut params = vec![
            ("q".to_string(), wildcard_query(query)),
            ("size".to_string(), self.size.to_string()),
        ];
        for (name, value) in &self.extra_params {
            match params.iter_mut().find(|(existing, _)| existing == name) {
                Some(slot) => slot.1 = value.clone(),
                None => params.push((name.clone(), value.clone())),
            }
        }
        params
    }
}

#[async_trait]
impl SuggestionSource for RemoteSuggestions {
    async fn search(&self, query: &str) -> Result<Vec<SuggestionHit>, FetchError> {
        let params = self.request_params(query);
        debug!(url = %self.url, query, "requesting suggestions");

        let response = self.client.get(&self.url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|error| FetchError::Decode(error.to_string()))?;
        Ok(extract_hits(&body))
    }
}
