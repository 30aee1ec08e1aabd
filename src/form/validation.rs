use std::sync::Arc;

use serde_json::{Map, Value};

use super::controller::{FormController, FormResult, read_lock, write_lock};
use super::path::FieldPath;

pub(super) type FieldValidatorFn = Arc<dyn Fn(&Value, &Value) -> Result<(), String> + Send + Sync>;

/// Validates one field. Receives the field value (`null` when absent) and the
/// whole values tree, and returns the message to display on failure.
pub trait FieldValidator: Send + Sync {
    fn validate(&self, value: &Value, values: &Value) -> Result<(), String>;
}

impl<F> FieldValidator for F
where
    F: Fn(&Value, &Value) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, value: &Value, values: &Value) -> Result<(), String> {
        (self)(value, values)
    }
}

impl FormController {
    pub fn register_field_validator<V>(&self, path: &FieldPath, validator: V) -> FormResult<()>
    where
        V: FieldValidator + 'static,
    {
        let validator = Arc::new(validator);
        let wrapped: FieldValidatorFn =
            Arc::new(move |value: &Value, values: &Value| validator.validate(value, values));
        let mut validators = write_lock(&self.field_validators, "registering field validator")?;
        validators.entry(path.clone()).or_default().push(wrapped);
        Ok(())
    }

    /// Runs the validators registered for `path` and replaces the field error
    /// with the first failure. Returns whether the field is valid.
    pub fn validate_field(&self, path: &FieldPath) -> FormResult<bool> {
        let values = read_lock(&self.state, "reading values for field validation")?
            .values
            .clone();
        let validators = read_lock(&self.field_validators, "reading field validators")?
            .get(path)
            .cloned()
            .unwrap_or_default();

        let error = first_failure(&validators, path, &values);
        let is_valid = error.is_none();
        write_lock(&self.state, "writing field validation result")?.write_error(path, error);
        Ok(is_valid)
    }

    /// Runs every registered validator. The errors tree is rebuilt from the
    /// results, so errors without a validator behind them are dropped.
    pub fn validate_form(&self) -> FormResult<bool> {
        let values = read_lock(&self.state, "reading values for form validation")?
            .values
            .clone();
        let validators = read_lock(&self.field_validators, "reading validators for form")?.clone();

        let mut errors = Value::Object(Map::new());
        let mut is_valid = true;
        for (path, field_validators) in &validators {
            if let Some(message) = first_failure(field_validators, path, &values) {
                path.set_in(&mut errors, Value::String(message));
                is_valid = false;
            }
        }

        let mut state = write_lock(&self.state, "applying form validation result")?;
        state.errors = errors;
        state.bump();
        Ok(is_valid)
    }
}

fn first_failure(
    validators: &[FieldValidatorFn],
    path: &FieldPath,
    values: &Value,
) -> Option<String> {
    let value = path.get_in(values).unwrap_or(&Value::Null);
    validators
        .iter()
        .find_map(|validator| validator(value, values).err())
}
