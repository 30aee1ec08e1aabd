use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{Map, Value};
use thiserror::Error;

use super::path::FieldPath;
use super::validation::FieldValidatorFn;
use super::value::FieldValue;

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationMode {
    OnChange,
    OnBlur,
    OnSubmit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormOptions {
    pub validate_mode: ValidationMode,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_mode: ValidationMode::OnChange,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FormError {
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
    #[error("invalid field path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },
}

pub type FormResult<T> = Result<T, FormError>;

/// Everything a field binding needs to decide whether it must re-render.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldSnapshot {
    pub value: Option<Value>,
    pub error: Option<String>,
    pub initial_error: Option<String>,
    pub touched: bool,
}

#[derive(Clone, Debug)]
pub struct FormSnapshot {
    pub id: FormId,
    pub values: Value,
    pub initial_values: Value,
    pub errors: Value,
    pub touched: BTreeSet<FieldPath>,
    pub revision: u64,
    pub is_valid: bool,
}

pub(super) struct FormState {
    pub(super) id: FormId,
    pub(super) initial_values: Value,
    pub(super) values: Value,
    pub(super) initial_errors: Value,
    pub(super) errors: Value,
    pub(super) touched: BTreeSet<FieldPath>,
    pub(super) revision: u64,
}

impl FormState {
    pub(super) fn bump(&mut self) {
        self.revision = self.revision.saturating_add(1);
    }

    pub(super) fn write_error(&mut self, path: &FieldPath, error: Option<String>) {
        let leaf = error.map(Value::String).unwrap_or(Value::Null);
        path.set_in(&mut self.errors, leaf);
        self.bump();
    }
}

/// In-process form-state container addressed by [`FieldPath`]s.
///
/// Cloning yields another handle onto the same state, so change handlers can
/// capture a controller and write back into the form later.
#[derive(Clone)]
pub struct FormController {
    pub(super) options: FormOptions,
    pub(super) state: Arc<RwLock<FormState>>,
    pub(super) field_validators: Arc<RwLock<BTreeMap<FieldPath, Vec<FieldValidatorFn>>>>,
}

impl FormController {
    pub fn new(initial_values: Value, options: FormOptions) -> Self {
        Self {
            options,
            state: Arc::new(RwLock::new(FormState {
                id: FormId::next(),
                initial_values: initial_values.clone(),
                values: initial_values,
                initial_errors: empty_tree(),
                errors: empty_tree(),
                touched: BTreeSet::new(),
                revision: 0,
            })),
            field_validators: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Seeds errors that exist before the user edits anything, e.g. errors
    /// returned by the server for a previously saved draft.
    pub fn with_initial_errors(self, initial_errors: Value) -> FormResult<Self> {
        {
            let mut state = write_lock(&self.state, "seeding initial errors")?;
            state.initial_errors = initial_errors.clone();
            state.errors = initial_errors;
            state.bump();
        }
        Ok(self)
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    pub fn form_id(&self) -> FormResult<FormId> {
        Ok(read_lock(&self.state, "reading form id")?.id)
    }

    pub fn revision(&self) -> FormResult<u64> {
        Ok(read_lock(&self.state, "reading form revision")?.revision)
    }

    pub fn values(&self) -> FormResult<Value> {
        Ok(read_lock(&self.state, "reading values")?.values.clone())
    }

    pub fn initial_values(&self) -> FormResult<Value> {
        Ok(read_lock(&self.state, "reading initial values")?
            .initial_values
            .clone())
    }

    pub fn value_at(&self, path: &FieldPath) -> FormResult<Option<Value>> {
        let state = read_lock(&self.state, "reading field value")?;
        Ok(path.get_in(&state.values).cloned())
    }

    pub fn initial_value_at(&self, path: &FieldPath) -> FormResult<Option<Value>> {
        let state = read_lock(&self.state, "reading initial field value")?;
        Ok(path.get_in(&state.initial_values).cloned())
    }

    /// Current value at `path`, or `default` when the path is absent or null.
    pub fn field_value(&self, path: &FieldPath, default: &FieldValue) -> FormResult<FieldValue> {
        Ok(self
            .value_at(path)?
            .as_ref()
            .and_then(FieldValue::from_json)
            .unwrap_or_else(|| default.clone()))
    }

    /// Initial value at `path`; absent values read as the empty string.
    pub fn initial_field_value(&self, path: &FieldPath) -> FormResult<FieldValue> {
        Ok(self
            .initial_value_at(path)?
            .as_ref()
            .and_then(FieldValue::from_json)
            .unwrap_or_default())
    }

    pub fn error_at(&self, path: &FieldPath) -> FormResult<Option<String>> {
        let state = read_lock(&self.state, "reading field error")?;
        Ok(path.get_in(&state.errors).and_then(error_message))
    }

    pub fn initial_error_at(&self, path: &FieldPath) -> FormResult<Option<String>> {
        let state = read_lock(&self.state, "reading initial field error")?;
        Ok(path.get_in(&state.initial_errors).and_then(error_message))
    }

    pub fn set_field_value(&self, path: &FieldPath, value: impl Into<Value>) -> FormResult<()> {
        {
            let mut state = write_lock(&self.state, "writing field value")?;
            path.set_in(&mut state.values, value.into());
            state.bump();
        }
        if self.options.validate_mode == ValidationMode::OnChange {
            let _ = self.validate_field(path)?;
        }
        Ok(())
    }

    pub fn set_field_error(&self, path: &FieldPath, error: Option<String>) -> FormResult<()> {
        write_lock(&self.state, "writing field error")?.write_error(path, error);
        Ok(())
    }

    /// Blur handler: marks the field touched and validates in `OnBlur` mode.
    pub fn handle_blur(&self, path: &FieldPath) -> FormResult<()> {
        {
            let mut state = write_lock(&self.state, "touching field")?;
            if state.touched.insert(path.clone()) {
                state.bump();
            }
        }
        if self.options.validate_mode == ValidationMode::OnBlur {
            let _ = self.validate_field(path)?;
        }
        Ok(())
    }

    pub fn is_touched(&self, path: &FieldPath) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading touched fields")?
            .touched
            .contains(path))
    }

    pub fn field_snapshot(&self, path: &FieldPath) -> FormResult<FieldSnapshot> {
        let state = read_lock(&self.state, "creating field snapshot")?;
        Ok(FieldSnapshot {
            value: path.get_in(&state.values).cloned(),
            error: path.get_in(&state.errors).and_then(error_message),
            initial_error: path.get_in(&state.initial_errors).and_then(error_message),
            touched: state.touched.contains(path),
        })
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot> {
        let state = read_lock(&self.state, "creating form snapshot")?;
        Ok(FormSnapshot {
            id: state.id,
            values: state.values.clone(),
            initial_values: state.initial_values.clone(),
            errors: state.errors.clone(),
            touched: state.touched.clone(),
            revision: state.revision,
            is_valid: !has_errors(&state.errors),
        })
    }

    pub fn reset_to_initial(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "resetting form")?;
        state.values = state.initial_values.clone();
        state.errors = state.initial_errors.clone();
        state.touched.clear();
        state.bump();
        Ok(())
    }
}

fn empty_tree() -> Value {
    Value::Object(Map::new())
}

pub(super) fn error_message(leaf: &Value) -> Option<String> {
    match leaf {
        Value::String(message) if !message.is_empty() => Some(message.clone()),
        Value::Array(items) => items.iter().find_map(error_message),
        _ => None,
    }
}

pub(super) fn has_errors(tree: &Value) -> bool {
    match tree {
        Value::String(message) => !message.is_empty(),
        Value::Array(items) => items.iter().any(has_errors),
        Value::Object(map) => map.values().any(has_errors),
        _ => false,
    }
}

pub(crate) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(crate) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
