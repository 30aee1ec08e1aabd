use serde::{Deserialize, Serialize};

/// A selectable entry. `key` is the render identity and always mirrors `value`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SelectOption {
    pub text: String,
    pub value: String,
    pub key: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            text: text.into(),
            key: value.clone(),
            value,
        }
    }

    /// Option synthesized from free text typed by the user.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(text.clone(), text)
    }
}
