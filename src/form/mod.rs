mod binding;
mod controller;
mod path;
mod validation;
mod value;


pub use binding::{FieldBinding, FieldWatcher};
pub use controller::{
    FieldSnapshot, FormController, FormError, FormId, FormOptions, FormResult, FormSnapshot,
    ValidationMode,
};
pub(crate) use controller::{read_lock, write_lock};
pub use path::{FieldPath, MAX_PATH_INDEX, PathSegment};
pub use validation::FieldValidator;
pub use value::FieldValue;
