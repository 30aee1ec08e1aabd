use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use super::source::SuggestionHit;
use crate::components::SelectOption;

/// Maps raw hits into display options.
pub type SerializeSuggestions = Arc<dyn Fn(&[SuggestionHit]) -> Vec<SelectOption> + Send + Sync>;

/// `title` becomes the text, `id` the value and key. Hits without an id are
/// dropped; a missing title falls back to the id.
pub fn serialize_suggestions(hits: &[SuggestionHit]) -> Vec<SelectOption> {
    hits.iter()
        .filter_map(|hit| {
            let Some(id) = hit.get("id").and_then(identifier) else {
                trace!(%hit, "skipping suggestion without an id");
                return None;
            };
            let text = hit
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| id.clone());
            Some(SelectOption::new(id, text))
        })
        .collect()
}

pub fn default_serializer() -> SerializeSuggestions {
    Arc::new(serialize_suggestions)
}

fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
