use super::*;
use async_trait::async_trait;
use futures::executor::block_on;
use futures::join;
use futures_timer::Delay;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::form::{FieldPath, FieldValue, FormController, FormOptions};
use crate::suggestions::{FetchError, LocalSuggestions, SuggestionHit, SuggestionSource};

fn path(raw: &str) -> FieldPath {
    FieldPath::parse(raw).expect("test path must parse")
}

fn subjects() -> Vec<Value> {
    vec![
        json!({ "title": "Physics", "id": "1" }),
        json!({ "title": "Chemistry", "id": "2" }),
    ]
}

fn subject_field(debounce_ms: u64) -> RemoteSelectField {
    let config = RemoteSelectConfig::new(path("metadata.subjects"))
        .debounce_time(Duration::from_millis(debounce_ms))
        .multiple(true)
        .allow_additions(true);
    RemoteSelectField::with_source(
        config,
        Arc::new(LocalSuggestions::new(subjects()).latency(Duration::from_millis(5))),
    )
}

fn empty_form() -> FormController {
    FormController::new(json!({ "metadata": {} }), FormOptions::default())
}

/// Source whose latency depends on the query, counting every call.
struct ScriptedSource {
    delays: BTreeMap<&'static str, u64>,
    failing: Vec<&'static str>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(delays: &[(&'static str, u64)]) -> Self {
        Self {
            delays: delays.iter().copied().collect(),
            failing: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing_on(mut self, query: &'static str) -> Self {
        self.failing.push(query);
        self
    }
}

#[async_trait]
impl SuggestionSource for ScriptedSource {
    async fn search(&self, query: &str) -> Result<Vec<SuggestionHit>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.get(query).copied().unwrap_or(1);
        Delay::new(Duration::from_millis(delay)).await;
        if self.failing.iter().any(|failing| *failing == query) {
            return Err(FetchError::Decode("unexpected body".to_string()));
        }
        Ok(vec![json!({ "title": query.to_uppercase(), "id": query })])
    }
}

fn scripted_field(source: Arc<ScriptedSource>, debounce_ms: u64) -> RemoteSelectField {
    let config = RemoteSelectConfig::new(path("metadata.subjects"))
        .debounce_time(Duration::from_millis(debounce_ms));
    RemoteSelectField::with_source(config, source)
}

#[test]
fn local_search_resolves_matching_candidates() {
    let field = subject_field(10);

    let outcome = block_on(field.on_search_change("phy")).expect("search");
    assert_eq!(outcome, FetchOutcome::Applied { fetched: 1 });

    let snapshot = field.snapshot().expect("snapshot");
    assert_eq!(
        snapshot.suggestions.as_slice(),
        &[SelectOption::new("1", "Physics")]
    );
    assert_eq!(snapshot.search_query(), Some("phy"));
    assert!(snapshot.open());
    assert!(!snapshot.is_fetching());
    assert!(!snapshot.error());
}

#[test]
fn search_results_follow_existing_selections() {
    let field = subject_field(0);
    block_on(field.on_search_change("chem")).expect("search chem");
    field.on_select(&["2".to_string()]).expect("select");

    block_on(field.on_search_change("phy")).expect("search phy");
    let snapshot = field.snapshot().expect("snapshot");
    assert_eq!(snapshot.suggestions.values(), vec!["2", "1"]);
    assert_eq!(snapshot.selected_suggestions.values(), vec!["2"]);
}

#[test]
fn select_then_blur_resets_to_selection() {
    let field = subject_field(0);
    let form = empty_form();
    block_on(field.on_search_change("y")).expect("search");
    assert_eq!(field.snapshot().expect("snapshot").suggestions.len(), 2);

    field
        .on_change(&form, FieldValue::from(vec!["1"]))
        .expect("change");
    field.on_blur().expect("blur");

    let snapshot = field.snapshot().expect("snapshot");
    assert_eq!(
        snapshot.suggestions.as_slice(),
        &[SelectOption::new("1", "Physics")]
    );
    assert_eq!(snapshot.suggestions, snapshot.selected_suggestions);
    assert_eq!(snapshot.search_query(), None);
    assert!(!snapshot.open());
    assert_eq!(
        form.value_at(&path("metadata.subjects")).expect("value"),
        Some(json!(["1"]))
    );
}

#[test]
fn failed_fetch_flags_error_and_keeps_suggestions() {
    let field = scripted_field(Arc::new(ScriptedSource::new(&[]).failing_on("phy")), 0);
    field.on_add_item("Existing").expect("add");
    let before = field.snapshot().expect("snapshot").suggestions;

    let outcome = block_on(field.on_search_change("phy")).expect("search");
    assert_eq!(outcome, FetchOutcome::Failed);

    let snapshot = field.snapshot().expect("snapshot");
    assert!(snapshot.error());
    assert!(!snapshot.is_fetching());
    assert!(snapshot.open());
    assert_eq!(snapshot.suggestions, before);

    let dropdown = field.render(&empty_form()).expect("render");
    assert_eq!(
        dropdown.no_results_message,
        Some(NoResultsMessage::Error(
            DEFAULT_SUGGESTIONS_ERROR_MESSAGE.to_string()
        ))
    );
}

#[test]
fn retyping_after_failure_clears_the_error() {
    let field = scripted_field(Arc::new(ScriptedSource::new(&[]).failing_on("phx")), 0);
    let failed = block_on(field.on_search_change("phx")).expect("search phx");
    assert_eq!(failed, FetchOutcome::Failed);
    assert!(field.snapshot().expect("snapshot").error());

    let outcome = block_on(field.on_search_change("phy")).expect("search phy");
    assert_eq!(outcome, FetchOutcome::Applied { fetched: 1 });
    let snapshot = field.snapshot().expect("snapshot");
    assert!(!snapshot.error());
    assert_eq!(snapshot.suggestions.values(), vec!["phy"]);
}

#[test]
fn added_item_is_selected_first_and_listed_once() {
    let field = subject_field(0);
    block_on(field.on_search_change("phy")).expect("search");
    field.on_select(&["1".to_string()]).expect("select");

    let added = field.on_add_item("NewTag").expect("add");
    assert_eq!(added, SelectOption::new("NewTag", "NewTag"));
    field.on_add_item("NewTag").expect("add twice");

    let snapshot = field.snapshot().expect("snapshot");
    assert_eq!(snapshot.selected_suggestions.values(), vec!["NewTag", "1"]);
    assert_eq!(
        snapshot
            .suggestions
            .iter()
            .filter(|option| option.value == "NewTag")
            .count(),
        1
    );
    assert_eq!(snapshot.suggestions.values(), vec!["1", "NewTag"]);
}

#[test]
fn slow_older_fetch_never_overwrites_newer_results() {
    let source = Arc::new(ScriptedSource::new(&[("a", 60), ("b", 5)]));
    let field = scripted_field(source.clone(), 0);

    let (first, second) =
        block_on(async { join!(field.on_search_change("a"), field.on_search_change("b")) });
    assert_eq!(first.expect("search a"), FetchOutcome::Superseded);
    assert_eq!(second.expect("search b"), FetchOutcome::Applied { fetched: 1 });

    let snapshot = field.snapshot().expect("snapshot");
    assert_eq!(snapshot.suggestions.values(), vec!["b"]);
    assert_eq!(snapshot.search_query(), Some("b"));
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn fast_older_fetch_is_dropped_once_a_newer_search_is_issued() {
    let source = Arc::new(ScriptedSource::new(&[("a", 5), ("b", 40)]));
    let field = scripted_field(source, 0);

    let (first, second) =
        block_on(async { join!(field.on_search_change("a"), field.on_search_change("b")) });
    assert_eq!(first.expect("search a"), FetchOutcome::Superseded);
    assert_eq!(second.expect("search b"), FetchOutcome::Applied { fetched: 1 });
    assert_eq!(
        field.snapshot().expect("snapshot").suggestions.values(),
        vec!["b"]
    );
}

#[test]
fn debounce_coalesces_rapid_keystrokes() {
    let source = Arc::new(ScriptedSource::new(&[]));
    let field = scripted_field(source.clone(), 30);

    let (p, ph, phy) = block_on(async {
        join!(
            field.on_search_change("p"),
            field.on_search_change("ph"),
            field.on_search_change("phy")
        )
    });
    assert_eq!(p.expect("p"), FetchOutcome::Superseded);
    assert_eq!(ph.expect("ph"), FetchOutcome::Superseded);
    assert_eq!(phy.expect("phy"), FetchOutcome::Applied { fetched: 1 });
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn blur_discards_in_flight_results() {
    let source = Arc::new(ScriptedSource::new(&[("phy", 40)]));
    let field = scripted_field(source, 0);

    let (outcome, blurred) = block_on(async {
        join!(field.on_search_change("phy"), async {
            Delay::new(Duration::from_millis(10)).await;
            field.on_blur()
        })
    });
    blurred.expect("blur");
    assert_eq!(outcome.expect("search"), FetchOutcome::Superseded);

    let snapshot = field.snapshot().expect("snapshot");
    assert_eq!(snapshot.state, RemoteSelectState::Blurred);
    assert!(snapshot.suggestions.is_empty());
}

#[test]
fn whitespace_query_is_still_searched() {
    let source = Arc::new(ScriptedSource::new(&[]));
    let field = scripted_field(source.clone(), 0);

    let outcome = block_on(field.on_search_change(" ")).expect("search");
    assert_eq!(outcome, FetchOutcome::Applied { fetched: 1 });
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(field.snapshot().expect("snapshot").search_query(), Some(" "));
}

#[test]
fn empty_query_skips_fetch() {
    let source = Arc::new(ScriptedSource::new(&[]));
    let field = scripted_field(source.clone(), 0);
    field.on_focus().expect("focus");

    let outcome = block_on(field.on_search_change("")).expect("search");
    assert_eq!(outcome, FetchOutcome::Skipped);
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);

    let dropdown = field.render(&empty_form()).expect("render");
    assert_eq!(
        dropdown.no_results_message,
        Some(NoResultsMessage::Text(DEFAULT_NO_QUERY_MESSAGE.to_string()))
    );
    assert_eq!(dropdown.opened, Some(true));
}

#[test]
fn render_reflects_suggestion_state() {
    let field = RemoteSelectField::with_source(
        RemoteSelectConfig::new(path("metadata.subjects"))
            .debounce_time(Duration::ZERO)
            .label("Subjects")
            .placeholder("Pick subjects")
            .required(true)
            .multiple(true)
            .no_results_message("Nothing here")
            .ui_prop("upward", true),
        Arc::new(LocalSuggestions::new(subjects()).latency(Duration::ZERO)),
    );
    block_on(field.on_search_change("zzz")).expect("search");

    let dropdown = field.render(&empty_form()).expect("render");
    assert_eq!(dropdown.id, "metadata.subjects");
    assert_eq!(dropdown.name, "metadata.subjects");
    assert_eq!(
        dropdown.label,
        Some(FieldLabel {
            text: "Subjects".into(),
            html_for: "metadata.subjects".into(),
        })
    );
    assert!(dropdown.search && dropdown.lazy_load && dropdown.multiple);
    assert!(dropdown.required && dropdown.fluid && dropdown.selection);
    assert_eq!(dropdown.opened, Some(true));
    assert!(!dropdown.loading);
    assert_eq!(dropdown.value, FieldValue::Multiple(Vec::new()));
    assert_eq!(dropdown.placeholder.as_deref(), Some("Pick subjects"));
    assert_eq!(dropdown.ui_props.get("upward"), Some(&json!(true)));
    assert_eq!(
        dropdown.no_results_message,
        Some(NoResultsMessage::Text("Nothing here".into()))
    );
    assert!(!dropdown.has_error());
}

#[test]
fn dropdown_events_route_through_the_remote_field() {
    let field = subject_field(0);
    let form = empty_form();
    block_on(field.on_search_change("phy")).expect("search");

    field
        .handle_change(&form, DropdownEvent::Pointer, FieldValue::from(vec!["1"]))
        .expect("change");
    field
        .handle_add_item(&form, DropdownEvent::Keyboard, "Optics")
        .expect("add item");

    let snapshot = field.snapshot().expect("snapshot");
    assert_eq!(snapshot.selected_suggestions.values(), vec!["Optics", "1"]);
    assert_eq!(
        form.value_at(&path("metadata.subjects")).expect("value"),
        Some(json!(["1"]))
    );
}

#[test]
fn missing_source_is_a_config_error() {
    let error = RemoteSelectField::new(RemoteSelectConfig::new(path("metadata.funder")))
        .err()
        .expect("config without url or options must fail");
    assert_eq!(
        error,
        SourceConfigError::MissingSuggestionApiUrl {
            field_path: "metadata.funder".into(),
        }
    );

    let local = RemoteSelectField::new(
        RemoteSelectConfig::new(path("metadata.funder")).fetched_options(subjects()),
    );
    assert!(local.is_ok());
    let remote = RemoteSelectField::new(
        RemoteSelectConfig::new(path("metadata.funder")).suggestion_api_url("http://localhost/api"),
    );
    assert!(remote.is_ok());
}

#[test]
fn select_field_flags_values_missing_from_options() {
    let form = FormController::new(json!({ "language": "xyz" }), FormOptions::default());
    let field = SelectField::parse("language")
        .expect("path")
        .option(SelectOption::new("eng", "English"));

    let dropdown = field.render(&form).expect("render");
    assert_eq!(
        dropdown.error,
        Some(ErrorLabel {
            content: invalid_value_message("xyz"),
            pointing: Pointing::Above,
        })
    );

    let unbound = SelectField::parse("language").expect("path");
    assert_eq!(
        unbound.resolve_error(&form).expect("resolve"),
        Some(invalid_value_message("xyz"))
    );
}

#[test]
fn select_field_skips_validation_for_multiple_values() {
    let form = FormController::new(json!({ "tags": ["ghost"] }), FormOptions::default());
    let field = SelectField::parse("tags").expect("path").multiple(true);
    assert_eq!(field.resolve_error(&form).expect("resolve"), None);
}

#[test]
fn select_field_error_priority() {
    let form = FormController::new(json!({ "language": "eng" }), FormOptions::default())
        .with_initial_errors(json!({ "language": "initial problem" }))
        .expect("initial errors");
    let field = SelectField::parse("language")
        .expect("path")
        .option(SelectOption::new("eng", "English"))
        .option(SelectOption::new("fre", "French"));

    assert_eq!(
        field.clone().error("explicit").resolve_error(&form).expect("explicit"),
        Some("explicit".into())
    );
    assert_eq!(
        field.clone().error("").resolve_error(&form).expect("empty explicit"),
        Some("initial problem".into())
    );

    form.set_field_error(&path("language"), Some("server says no".into()))
        .expect("set error");
    assert_eq!(
        field.resolve_error(&form).expect("form error"),
        Some("server says no".into())
    );

    form.set_field_value(&path("language"), "fre").expect("change");
    form.set_field_error(&path("language"), None).expect("clear");
    assert_eq!(field.resolve_error(&form).expect("changed"), None);

    form.set_field_value(&path("language"), "eng").expect("revert");
    assert_eq!(
        field.resolve_error(&form).expect("reverted"),
        Some("initial problem".into())
    );
}

#[test]
fn select_field_change_defaults_to_form_write() {
    let form = empty_form();
    let field = SelectField::parse("metadata.language").expect("path");
    field
        .handle_change(&form, DropdownEvent::Pointer, FieldValue::from("eng"))
        .expect("change");
    assert_eq!(
        form.value_at(&path("metadata.language")).expect("value"),
        Some(json!("eng"))
    );

    // Without a handler free text is ignored.
    field
        .handle_add_item(&form, DropdownEvent::Keyboard, "klingon")
        .expect("add item");
    assert_eq!(
        form.value_at(&path("metadata.language")).expect("value"),
        Some(json!("eng"))
    );
}

#[test]
fn select_field_custom_handlers_receive_event_data() {
    let form = empty_form();
    let seen = Arc::new(AtomicUsize::new(0));
    let change_seen = seen.clone();
    let field = SelectField::parse("metadata.language")
        .expect("path")
        .option(SelectOption::new("eng", "English"))
        .on_change(move |event| {
            assert_eq!(event.event, DropdownEvent::Keyboard);
            assert_eq!(event.data.options.len(), 1);
            change_seen.fetch_add(1, Ordering::SeqCst);
            event.form.set_field_value(
                &FieldPath::parse("metadata.language_changed")?,
                event.data.value.clone(),
            )
        })
        .on_add_item(|event| {
            event
                .form
                .set_field_value(&FieldPath::parse("metadata.added")?, event.data.value.clone())
        });

    field
        .handle_change(&form, DropdownEvent::Keyboard, FieldValue::from("eng"))
        .expect("change");
    field
        .handle_add_item(&form, DropdownEvent::Keyboard, "klingon")
        .expect("add item");

    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(form.value_at(&path("metadata.language")).expect("value"), None);
    assert_eq!(
        form.value_at(&path("metadata.language_changed")).expect("value"),
        Some(json!("eng"))
    );
    assert_eq!(
        form.value_at(&path("metadata.added")).expect("value"),
        Some(json!("klingon"))
    );
}

#[test]
fn optimized_select_field_skips_unrelated_changes() {
    let form = FormController::new(
        json!({ "language": "eng", "title": "A" }),
        FormOptions::default(),
    );
    let mut always = SelectField::parse("language").expect("path").watcher();
    let mut optimized = SelectField::parse("language")
        .expect("path")
        .optimized(true)
        .watcher();
    assert!(always.needs_render(&form).expect("first"));
    assert!(optimized.needs_render(&form).expect("first"));

    form.set_field_value(&path("title"), "B").expect("unrelated");
    assert!(always.needs_render(&form).expect("unrelated always"));
    assert!(!optimized.needs_render(&form).expect("unrelated optimized"));

    form.set_field_value(&path("language"), "fre").expect("related");
    assert!(optimized.needs_render(&form).expect("related optimized"));
}

fn searchable_menu<C>(component: C) -> C
where
    C: crate::contracts::Openable + crate::contracts::Loadable + crate::contracts::Searchable,
{
    component.search(true).lazy_load(true).opened(true).loading(true)
}

#[test]
fn builder_contracts_apply_to_fields_and_dropdowns() {
    let form = empty_form();
    let rendered = searchable_menu(SelectField::parse("metadata.language").expect("path"))
        .render(&form)
        .expect("render");
    let direct = searchable_menu(Dropdown::new("metadata.language"));

    for dropdown in [rendered, direct] {
        assert!(dropdown.search && dropdown.lazy_load && dropdown.loading);
        assert_eq!(dropdown.opened, Some(true));
    }
}

#[test]
fn select_field_renders_single_default_for_absent_path() {
    let form = empty_form();
    let field = SelectField::parse("metadata.language")
        .expect("path")
        .default_value("eng")
        .option(SelectOption::new("eng", "English"));

    let dropdown = field.render(&form).expect("render");
    assert_eq!(dropdown.value, FieldValue::from("eng"));
    assert!(!dropdown.has_error());
    assert_eq!(form.value_at(&path("metadata.language")).expect("value"), None);

    let unlisted = SelectField::parse("metadata.language")
        .expect("path")
        .default_value("klingon")
        .option(SelectOption::new("eng", "English"))
        .render(&form)
        .expect("render");
    assert_eq!(
        unlisted.error.map(|error| error.content),
        Some(invalid_value_message("klingon"))
    );
}
