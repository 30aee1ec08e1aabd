use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value held by a select field: one identifier, or a list for multi-select.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multiple(Vec<String>),
}

impl FieldValue {
    pub fn empty() -> Self {
        Self::Single(String::new())
    }

    /// Reads a value out of the JSON values tree. `null` is treated as absent.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(Self::Single(text.clone())),
            Value::Array(items) => Some(Self::Multiple(items.iter().map(scalar_text).collect())),
            other => Some(Self::Single(scalar_text(other))),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Single(text) => Value::String(text.clone()),
            Self::Multiple(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(text) => text.is_empty(),
            Self::Multiple(values) => values.is_empty(),
        }
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(text) => Some(text),
            Self::Multiple(_) => None,
        }
    }

    /// Every identifier the value selects.
    pub fn values(&self) -> Vec<String> {
        match self {
            Self::Single(text) if text.is_empty() => Vec::new(),
            Self::Single(text) => vec![text.clone()],
            Self::Multiple(values) => values.clone(),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        value.to_json()
    }
}

impl From<&FieldValue> for Value {
    fn from(value: &FieldValue) -> Self {
        value.to_json()
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(text) => f.write_str(text),
            Self::Multiple(values) => f.write_str(&values.join(", ")),
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
