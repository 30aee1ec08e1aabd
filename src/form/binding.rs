use super::controller::{FieldSnapshot, FormController, FormResult};
use super::path::FieldPath;

/// How a field decides that a form-state change concerns it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FieldBinding {
    /// Re-render on every form-state change.
    #[default]
    Always,
    /// Skip re-renders unless the field's own value, error, or touched flag
    /// changed. Suited to large forms.
    Optimized,
}

impl FieldBinding {
    pub fn from_optimized(optimized: bool) -> Self {
        if optimized { Self::Optimized } else { Self::Always }
    }
}

#[derive(Clone, Debug)]
pub struct FieldWatcher {
    path: FieldPath,
    binding: FieldBinding,
    last_revision: Option<u64>,
    last_snapshot: Option<FieldSnapshot>,
}

impl FieldWatcher {
    pub fn new(path: FieldPath, binding: FieldBinding) -> Self {
        Self {
            path,
            binding,
            last_revision: None,
            last_snapshot: None,
        }
    }

    pub fn binding(&self) -> FieldBinding {
        self.binding
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Reports whether the field must render against the current form state
    /// and records that state as seen. The first call always renders.
    pub fn needs_render(&mut self, form: &FormController) -> FormResult<bool> {
        let revision = form.revision()?;
        let changed = match self.binding {
            FieldBinding::Always => self.last_revision != Some(revision),
            FieldBinding::Optimized => {
                let snapshot = form.field_snapshot(&self.path)?;
                let changed = self.last_snapshot.as_ref() != Some(&snapshot);
                self.last_snapshot = Some(snapshot);
                changed
            }
        };
        self.last_revision = Some(revision);
        Ok(changed)
    }
}
