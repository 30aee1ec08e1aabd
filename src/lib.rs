pub mod components;
pub mod contracts;
pub mod form;
pub mod prelude;
pub mod suggestions;

pub use components::{Dropdown, RemoteSelectConfig, RemoteSelectField, SelectField, SelectOption};
pub use form::{FieldPath, FieldValue, FormController, FormError, FormOptions, FormResult};
