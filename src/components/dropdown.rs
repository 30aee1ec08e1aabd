use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::form::FieldValue;

use super::SelectOption;

/// Which side of the control an error label points at.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pointing {
    #[default]
    Above,
    Below,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FieldLabel {
    pub text: String,
    pub html_for: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ErrorLabel {
    pub content: String,
    pub pointing: Pointing,
}

/// Content shown in the menu when no option matches.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum NoResultsMessage {
    /// Plain text, e.g. "No results found." or "Search...".
    Text(String),
    /// Negative, compact message box used when fetching suggestions failed.
    Error(String),
}

impl NoResultsMessage {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Toolkit-neutral description of a form dropdown. A UI adapter draws it and
/// feeds user events back to the field that produced it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dropdown {
    pub id: String,
    pub name: String,
    pub label: Option<FieldLabel>,
    pub value: FieldValue,
    pub options: Vec<SelectOption>,
    pub error: Option<ErrorLabel>,
    pub required: bool,
    pub fluid: bool,
    pub selection: bool,
    pub multiple: bool,
    pub allow_additions: bool,
    pub search: bool,
    pub lazy_load: bool,
    pub opened: Option<bool>,
    pub loading: bool,
    pub placeholder: Option<String>,
    pub no_results_message: Option<NoResultsMessage>,
    pub ui_props: BTreeMap<String, Value>,
}

impl Dropdown {
    pub fn new(field_path: impl Into<String>) -> Self {
        let field_path = field_path.into();
        Self {
            id: field_path.clone(),
            name: field_path,
            label: None,
            value: FieldValue::empty(),
            options: Vec::new(),
            error: None,
            required: false,
            fluid: true,
            selection: true,
            multiple: false,
            allow_additions: false,
            search: false,
            lazy_load: false,
            opened: None,
            loading: false,
            placeholder: None,
            no_results_message: None,
            ui_props: BTreeMap::new(),
        }
    }

    pub fn label(mut self, value: impl Into<String>) -> Self {
        self.label = Some(FieldLabel {
            text: value.into(),
            html_for: self.id.clone(),
        });
        self
    }

    pub fn error(mut self, value: impl Into<String>) -> Self {
        self.error = Some(ErrorLabel {
            content: value.into(),
            pointing: Pointing::Above,
        });
        self
    }

    pub fn required(mut self, value: bool) -> Self {
        self.required = value;
        self
    }

    pub fn value(mut self, value: FieldValue) -> Self {
        self.value = value;
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn multiple(mut self, value: bool) -> Self {
        self.multiple = value;
        self
    }

    pub fn allow_additions(mut self, value: bool) -> Self {
        self.allow_additions = value;
        self
    }

    pub fn search(mut self, value: bool) -> Self {
        self.search = value;
        self
    }

    pub fn lazy_load(mut self, value: bool) -> Self {
        self.lazy_load = value;
        self
    }

    pub fn opened(mut self, value: bool) -> Self {
        self.opened = Some(value);
        self
    }

    pub fn loading(mut self, value: bool) -> Self {
        self.loading = value;
        self
    }

    pub fn placeholder(mut self, value: impl Into<String>) -> Self {
        self.placeholder = Some(value.into());
        self
    }

    pub fn no_results_message(mut self, message: NoResultsMessage) -> Self {
        self.no_results_message = Some(message);
        self
    }

    pub fn ui_props(mut self, props: BTreeMap<String, Value>) -> Self {
        self.ui_props.extend(props);
        self
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

crate::impl_field_like!(Dropdown);
crate::impl_openable!(Dropdown);
crate::impl_loadable!(Dropdown);
crate::impl_searchable!(Dropdown);
