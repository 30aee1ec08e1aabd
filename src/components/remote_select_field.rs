use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use futures_timer::Delay;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::form::{FieldPath, FieldValue, FormController, FormResult, read_lock, write_lock};
use crate::suggestions::{
    LocalSuggestions, RemoteSuggestions, SerializeSuggestions, SuggestionHit, SuggestionList,
    SuggestionSource, default_serializer,
};

use super::SelectOption;
use super::dropdown::Dropdown;
use super::remote_select_state::{FetchTicket, RemoteSelectState, SuggestionMessages};
use super::select_field::{DropdownEvent, SelectField};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum SourceConfigError {
    #[error("remote select field {field_path} needs a suggestion API URL or local options")]
    MissingSuggestionApiUrl { field_path: String },
}

#[derive(Clone)]
pub struct RemoteSelectConfig {
    field_path: FieldPath,
    suggestion_api_url: Option<String>,
    suggestion_api_query_params: BTreeMap<String, String>,
    serialize_suggestions: SerializeSuggestions,
    debounce_time: Duration,
    messages: SuggestionMessages,
    fetched_options: Option<Vec<SuggestionHit>>,
    label: Option<String>,
    placeholder: Option<String>,
    required: bool,
    multiple: bool,
    allow_additions: bool,
    optimized: bool,
    ui_props: BTreeMap<String, Value>,
}

impl RemoteSelectConfig {
    pub fn new(field_path: FieldPath) -> Self {
        Self {
            field_path,
            suggestion_api_url: None,
            suggestion_api_query_params: BTreeMap::new(),
            serialize_suggestions: default_serializer(),
            debounce_time: DEFAULT_DEBOUNCE,
            messages: SuggestionMessages::default(),
            fetched_options: None,
            label: None,
            placeholder: None,
            required: false,
            multiple: false,
            allow_additions: false,
            optimized: false,
            ui_props: BTreeMap::new(),
        }
    }

    pub fn field_path(&self) -> &FieldPath {
        &self.field_path
    }

    pub fn suggestion_api_url(mut self, url: impl Into<String>) -> Self {
        self.suggestion_api_url = Some(url.into());
        self
    }

    pub fn suggestion_api_query_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.suggestion_api_query_params = params;
        self
    }

    pub fn serialize_suggestions(
        mut self,
        serializer: impl Fn(&[SuggestionHit]) -> Vec<SelectOption> + Send + Sync + 'static,
    ) -> Self {
        self.serialize_suggestions = Arc::new(serializer);
        self
    }

    pub fn debounce_time(mut self, debounce_time: Duration) -> Self {
        self.debounce_time = debounce_time;
        self
    }

    pub fn no_results_message(mut self, message: impl Into<String>) -> Self {
        self.messages.no_results = message.into();
        self
    }

    pub fn suggestions_error_message(mut self, message: impl Into<String>) -> Self {
        self.messages.suggestions_error = message.into();
        self
    }

    pub fn no_query_message(mut self, message: impl Into<String>) -> Self {
        self.messages.no_query = message.into();
        self
    }

    /// Serves suggestions from these candidates instead of the search API.
    pub fn fetched_options(mut self, candidates: Vec<SuggestionHit>) -> Self {
        self.fetched_options = Some(candidates);
        self
    }

    pub fn label(mut self, value: impl Into<String>) -> Self {
        self.label = Some(value.into());
        self
    }

    pub fn placeholder(mut self, value: impl Into<String>) -> Self {
        self.placeholder = Some(value.into());
        self
    }

    pub fn required(mut self, value: bool) -> Self {
        self.required = value;
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

    pub fn optimized(mut self, value: bool) -> Self {
        self.optimized = value;
        self
    }

    pub fn ui_prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ui_props.insert(name.into(), value.into());
        self
    }

    pub fn messages(&self) -> &SuggestionMessages {
        &self.messages
    }

    /// Local candidates win over the search API when both are configured.
    pub fn build_source(&self) -> Result<Arc<dyn SuggestionSource>, SourceConfigError> {
        if let Some(candidates) = &self.fetched_options {
            return Ok(Arc::new(LocalSuggestions::new(candidates.clone())));
        }
        let Some(url) = &self.suggestion_api_url else {
            return Err(SourceConfigError::MissingSuggestionApiUrl {
                field_path: self.field_path.to_string(),
            });
        };
        Ok(Arc::new(
            RemoteSuggestions::new(url.clone())
                .query_params(self.suggestion_api_query_params.clone()),
        ))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FetchOutcome {
    /// Fresh suggestions were merged into the option list.
    Applied { fetched: usize },
    /// The fetch failed; the option list is unchanged.
    Failed,
    /// The query was empty after the debounce window.
    Skipped,
    /// A newer search, blur, or selection took over.
    Superseded,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoteSelectSnapshot {
    pub state: RemoteSelectState,
    pub suggestions: SuggestionList,
    pub selected_suggestions: SuggestionList,
}

impl RemoteSelectSnapshot {
    pub fn is_fetching(&self) -> bool {
        self.state.is_fetching()
    }

    pub fn open(&self) -> bool {
        self.state.is_open()
    }

    pub fn error(&self) -> bool {
        self.state.has_error()
    }

    pub fn search_query(&self) -> Option<&str> {
        self.state.search_query()
    }
}

#[derive(Default)]
struct RemoteSelectInner {
    state: RemoteSelectState,
    suggestions: SuggestionList,
    selected: SuggestionList,
    latest_ticket: FetchTicket,
}

impl RemoteSelectInner {
    fn supersede(&mut self) -> FetchTicket {
        self.latest_ticket = self.latest_ticket.next();
        self.latest_ticket
    }
}

/// Select field whose options come from a debounced suggestion search.
///
/// Clones share state, so event handlers may hold their own handle. Every
/// search change, blur, and selection takes a new [`FetchTicket`]; results
/// of older tickets are dropped, so the latest request always wins.
#[derive(Clone)]
pub struct RemoteSelectField {
    config: Arc<RemoteSelectConfig>,
    source: Arc<dyn SuggestionSource>,
    inner: Arc<RwLock<RemoteSelectInner>>,
}

impl RemoteSelectField {
    pub fn new(config: RemoteSelectConfig) -> Result<Self, SourceConfigError> {
        let source = config.build_source()?;
        Ok(Self::with_source(config, source))
    }

    pub fn with_source(config: RemoteSelectConfig, source: Arc<dyn SuggestionSource>) -> Self {
        Self {
            config: Arc::new(config),
            source,
            inner: Arc::new(RwLock::new(RemoteSelectInner::default())),
        }
    }

    pub fn field_path(&self) -> &FieldPath {
        &self.config.field_path
    }

    pub fn snapshot(&self) -> FormResult<RemoteSelectSnapshot> {
        let inner = read_lock(&self.inner, "reading remote select state")?;
        Ok(RemoteSelectSnapshot {
            state: inner.state.clone(),
            suggestions: inner.suggestions.clone(),
            selected_suggestions: inner.selected.clone(),
        })
    }

    /// Debounced search. Resolves once the search was applied, failed, or was
    /// superseded by a later event.
    pub async fn on_search_change(&self, query: impl Into<String>) -> FormResult<FetchOutcome> {
        let query = query.into();
        let ticket = write_lock(&self.inner, "scheduling suggestion search")?.supersede();

        if !self.config.debounce_time.is_zero() {
            Delay::new(self.config.debounce_time).await;
        }

        {
            let mut inner = write_lock(&self.inner, "starting suggestion fetch")?;
            if inner.latest_ticket != ticket {
                trace!(field = %self.config.field_path, ticket = ticket.0, "search debounced away");
                return Ok(FetchOutcome::Superseded);
            }
            if query.is_empty() {
                trace!(field = %self.config.field_path, "skipping empty query");
                inner.state.clear_query();
                return Ok(FetchOutcome::Skipped);
            }
            inner.state.begin_fetch(query.clone(), ticket);
        }

        debug!(
            field = %self.config.field_path,
            query = %query,
            ticket = ticket.0,
            "fetching suggestions"
        );
        let result = self.source.search(&query).await;

        let mut inner = write_lock(&self.inner, "applying fetched suggestions")?;
        if inner.latest_ticket != ticket {
            trace!(
                field = %self.config.field_path,
                ticket = ticket.0,
                "dropping stale suggestions"
            );
            return Ok(FetchOutcome::Superseded);
        }
        match result {
            Ok(hits) => {
                let fetched = (self.config.serialize_suggestions)(&hits);
                let merged = SuggestionList::merged(&inner.selected, &fetched);
                inner.suggestions = merged;
                inner.state.resolve(ticket);
                debug!(
                    field = %self.config.field_path,
                    fetched = fetched.len(),
                    shown = inner.suggestions.len(),
                    "suggestions ready"
                );
                Ok(FetchOutcome::Applied {
                    fetched: fetched.len(),
                })
            }
            Err(error) => {
                warn!(field = %self.config.field_path, %error, "fetching suggestions failed");
                inner.state.fail(ticket);
                Ok(FetchOutcome::Failed)
            }
        }
    }

    /// Closes the menu and shrinks the options back to the selected ones.
    pub fn on_blur(&self) -> FormResult<()> {
        let mut inner = write_lock(&self.inner, "blurring remote select")?;
        inner.supersede();
        inner.state.blur();
        inner.suggestions = inner.selected.clone();
        Ok(())
    }

    pub fn on_focus(&self) -> FormResult<()> {
        write_lock(&self.inner, "focusing remote select")?
            .state
            .focus();
        Ok(())
    }

    /// Keeps the listed options whose value is in `values` as the selection.
    pub fn on_select(&self, values: &[String]) -> FormResult<()> {
        let mut inner = write_lock(&self.inner, "selecting suggestions")?;
        inner.supersede();
        let mut selected = inner.suggestions.clone();
        selected.retain_values(values);
        inner.selected = selected;
        inner.state.select();
        Ok(())
    }

    /// Turns free text into an option and selects it.
    pub fn on_add_item(&self, text: impl Into<String>) -> FormResult<SelectOption> {
        let option = SelectOption::from_text(text);
        let mut inner = write_lock(&self.inner, "adding suggestion")?;
        inner.selected.prepend(option.clone());
        let merged = SuggestionList::merged(&inner.suggestions, &inner.selected);
        inner.suggestions = merged;
        Ok(option)
    }

    /// Selection followed by a write of the value into the form.
    pub fn on_change(&self, form: &FormController, value: FieldValue) -> FormResult<()> {
        self.on_select(&value.values())?;
        form.set_field_value(&self.config.field_path, value)
    }

    /// The select field reflecting the current suggestions and UI state.
    pub fn select_field(&self) -> FormResult<SelectField> {
        let snapshot = self.snapshot()?;
        let config = &self.config;

        let change_target = self.clone();
        let addition_target = self.clone();
        let mut field = SelectField::new(config.field_path.clone())
            .options(snapshot.suggestions.iter().cloned())
            .no_results_message(snapshot.state.no_results_message(&config.messages))
            .search(true)
            .lazy_load(true)
            .opened(snapshot.open())
            .loading(snapshot.is_fetching())
            .required(config.required)
            .multiple(config.multiple)
            .allow_additions(config.allow_additions)
            .optimized(config.optimized)
            .ui_props(config.ui_props.clone())
            .on_change(move |event| change_target.on_change(event.form, event.data.value.clone()))
            .on_add_item(move |event| {
                addition_target
                    .on_add_item(event.data.value.clone())
                    .map(|_| ())
            });
        if let Some(label) = &config.label {
            field = field.label(label.clone());
        }
        if let Some(placeholder) = &config.placeholder {
            field = field.placeholder(placeholder.clone());
        }
        if config.multiple {
            field = field.default_value(FieldValue::Multiple(Vec::new()));
        }
        Ok(field)
    }

    pub fn render(&self, form: &FormController) -> FormResult<Dropdown> {
        self.select_field()?.render(form)
    }

    /// Routes a dropdown change through the rendered field's handler.
    pub fn handle_change(
        &self,
        form: &FormController,
        event: DropdownEvent,
        value: FieldValue,
    ) -> FormResult<()> {
        self.select_field()?.handle_change(form, event, value)
    }

    pub fn handle_add_item(
        &self,
        form: &FormController,
        event: DropdownEvent,
        text: impl Into<String>,
    ) -> FormResult<()> {
        self.select_field()?.handle_add_item(form, event, text)
    }
}
