use std::time::Duration;

use async_trait::async_trait;
use futures_timer::Delay;
use serde_json::Value;

use super::source::{FetchError, SuggestionHit, SuggestionSource};

pub const DEFAULT_LOCAL_LATENCY: Duration = Duration::from_millis(100);

/// In-memory candidates filtered by title. Stands in for vocabularies that
/// have no search endpoint yet.
#[derive(Clone, Debug)]
pub struct LocalSuggestions {
    candidates: Vec<SuggestionHit>,
    latency: Duration,
}

impl LocalSuggestions {
    pub fn new(candidates: Vec<SuggestionHit>) -> Self {
        Self {
            candidates,
            latency: DEFAULT_LOCAL_LATENCY,
        }
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Case-insensitive substring match on each candidate's `title`.
    pub fn filter(&self, query: &str) -> Vec<SuggestionHit> {
        let needle = query.to_lowercase();
        self.candidates
            .iter()
            .filter(|candidate| {
                candidate
                    .get("title")
                    .and_then(Value::as_str)
                    .is_some_and(|title| title.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SuggestionSource for LocalSuggestions {
    async fn search(&self, query: &str) -> Result<Vec<SuggestionHit>, FetchError> {
        let hits = self.filter(query);
        if !self.latency.is_zero() {
            Delay::new(self.latency).await;
        }
        Ok(hits)
    }
}
