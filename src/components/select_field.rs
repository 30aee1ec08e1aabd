use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::contracts::FieldLike;
use crate::form::{FieldBinding, FieldPath, FieldValue, FieldWatcher, FormController, FormResult};

use super::SelectOption;
use super::dropdown::{Dropdown, NoResultsMessage};

type ChangeHandler = Arc<dyn Fn(FieldEvent<'_, ChangeData>) -> FormResult<()> + Send + Sync>;
type AddItemHandler = Arc<dyn Fn(FieldEvent<'_, AddItemData>) -> FormResult<()> + Send + Sync>;

/// How the user produced a dropdown event.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DropdownEvent {
    Pointer,
    Keyboard,
    #[default]
    Programmatic,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChangeData {
    pub value: FieldValue,
    pub options: Vec<SelectOption>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddItemData {
    pub value: String,
    pub options: Vec<SelectOption>,
}

/// Payload handed to custom handlers: the raw event, its data, and the form.
pub struct FieldEvent<'a, D> {
    pub event: DropdownEvent,
    pub data: &'a D,
    pub form: &'a FormController,
}

/// Dropdown bound to one path of a [`FormController`].
#[derive(Clone)]
pub struct SelectField {
    field_path: FieldPath,
    default_value: FieldValue,
    label: Option<String>,
    error: Option<String>,
    required: bool,
    options: Vec<SelectOption>,
    optimized: bool,
    multiple: bool,
    allow_additions: bool,
    search: bool,
    lazy_load: bool,
    opened: Option<bool>,
    loading: bool,
    placeholder: Option<String>,
    no_results_message: Option<NoResultsMessage>,
    ui_props: BTreeMap<String, Value>,
    on_change: Option<ChangeHandler>,
    on_add_item: Option<AddItemHandler>,
}

impl SelectField {
    pub fn new(field_path: FieldPath) -> Self {
        Self {
            field_path,
            default_value: FieldValue::empty(),
            label: None,
            error: None,
            required: false,
            options: Vec::new(),
            optimized: false,
            multiple: false,
            allow_additions: false,
            search: false,
            lazy_load: false,
            opened: None,
            loading: false,
            placeholder: None,
            no_results_message: None,
            ui_props: BTreeMap::new(),
            on_change: None,
            on_add_item: None,
        }
    }

    pub fn parse(field_path: &str) -> FormResult<Self> {
        Ok(Self::new(FieldPath::parse(field_path)?))
    }

    pub fn field_path(&self) -> &FieldPath {
        &self.field_path
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn label(mut self, value: impl Into<String>) -> Self {
        self.label = Some(value.into());
        self
    }

    /// Explicit error; takes precedence over anything the form reports.
    pub fn error(mut self, value: impl Into<String>) -> Self {
        self.error = Some(value.into());
        self
    }

    pub fn required(mut self, value: bool) -> Self {
        self.required = value;
        self
    }

    pub fn option(mut self, option: SelectOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn optimized(mut self, value: bool) -> Self {
        self.optimized = value;
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

    /// Arbitrary widget property forwarded to the dropdown untouched.
    pub fn ui_prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ui_props.insert(name.into(), value.into());
        self
    }

    pub fn ui_props(mut self, props: BTreeMap<String, Value>) -> Self {
        self.ui_props.extend(props);
        self
    }

    /// Replaces the default write-back of changed values.
    pub fn on_change(
        mut self,
        handler: impl Fn(FieldEvent<'_, ChangeData>) -> FormResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_change = Some(Arc::new(handler));
        self
    }

    pub fn on_add_item(
        mut self,
        handler: impl Fn(FieldEvent<'_, AddItemData>) -> FormResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_add_item = Some(Arc::new(handler));
        self
    }

    pub fn binding(&self) -> FieldBinding {
        FieldBinding::from_optimized(self.optimized)
    }

    pub fn watcher(&self) -> FieldWatcher {
        FieldWatcher::new(self.field_path.clone(), self.binding())
    }

    pub fn current_value(&self, form: &FormController) -> FormResult<FieldValue> {
        form.field_value(&self.field_path, &self.default_value)
    }

    /// Error to display, first match wins: explicit error, a selected value
    /// missing from the options, the form error, and finally the initial
    /// error while the value is still the initial one.
    pub fn resolve_error(&self, form: &FormController) -> FormResult<Option<String>> {
        if let Some(error) = self.error.as_ref().filter(|error| !error.is_empty()) {
            return Ok(Some(error.clone()));
        }

        let value = self.current_value(form)?;
        if let FieldValue::Single(current) = &value {
            let known = self.options.iter().any(|option| option.value == *current);
            if !current.is_empty() && !known {
                return Ok(Some(invalid_value_message(current)));
            }
        }

        if let Some(error) = form.error_at(&self.field_path)? {
            return Ok(Some(error));
        }

        if form.initial_field_value(&self.field_path)? == value {
            return form.initial_error_at(&self.field_path);
        }
        Ok(None)
    }

    pub fn render(&self, form: &FormController) -> FormResult<Dropdown> {
        let mut dropdown = Dropdown::new(self.field_path.to_string())
            .value(self.current_value(form)?)
            .options(self.options.iter().cloned())
            .multiple(self.multiple)
            .allow_additions(self.allow_additions)
            .search(self.search)
            .lazy_load(self.lazy_load)
            .loading(self.loading)
            .ui_props(self.ui_props.clone());
        if let Some(opened) = self.opened {
            dropdown = dropdown.opened(opened);
        }
        if let Some(placeholder) = &self.placeholder {
            dropdown = dropdown.placeholder(placeholder.clone());
        }
        if let Some(message) = &self.no_results_message {
            dropdown = dropdown.no_results_message(message.clone());
        }

        let error = self.resolve_error(form)?;
        Ok(apply_field_presentation(
            dropdown,
            self.label.as_deref(),
            error,
            self.required,
        ))
    }

    pub fn handle_change(
        &self,
        form: &FormController,
        event: DropdownEvent,
        value: FieldValue,
    ) -> FormResult<()> {
        match &self.on_change {
            Some(handler) => handler(FieldEvent {
                event,
                data: &ChangeData {
                    value,
                    options: self.options.clone(),
                },
                form,
            }),
            None => form.set_field_value(&self.field_path, value),
        }
    }

    /// Free-text entry. Without a handler nothing happens.
    pub fn handle_add_item(
        &self,
        form: &FormController,
        event: DropdownEvent,
        value: impl Into<String>,
    ) -> FormResult<()> {
        let Some(handler) = &self.on_add_item else {
            return Ok(());
        };
        handler(FieldEvent {
            event,
            data: &AddItemData {
                value: value.into(),
                options: self.options.clone(),
            },
            form,
        })
    }

    pub fn handle_blur(&self, form: &FormController) -> FormResult<()> {
        form.handle_blur(&self.field_path)
    }
}

crate::impl_field_like!(SelectField);
crate::impl_openable!(SelectField);
crate::impl_loadable!(SelectField);
crate::impl_searchable!(SelectField);

pub fn invalid_value_message(value: &str) -> String {
    format!("The current value \"{value}\" is invalid, please select another value.")
}

fn apply_field_presentation<C>(
    mut component: C,
    label: Option<&str>,
    error: Option<String>,
    required: bool,
) -> C
where
    C: FieldLike,
{
    if let Some(label) = label {
        component = component.label(label);
    }
    if required {
        component = component.required(true);
    }
    if let Some(error) = error {
        component = component.error(error);
    }
    component
}
