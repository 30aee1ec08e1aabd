pub use crate::components::{
    Dropdown, DropdownEvent, FetchOutcome, NoResultsMessage, RemoteSelectConfig,
    RemoteSelectField, RemoteSelectState, SelectField, SelectOption, SourceConfigError,
};
pub use crate::contracts::{FieldLike, Loadable, Openable, Searchable};
pub use crate::form::{
    FieldBinding, FieldPath, FieldValidator, FieldValue, FieldWatcher, FormController, FormError,
    FormOptions, FormResult, ValidationMode,
};
pub use crate::suggestions::{
    FetchError, LocalSuggestions, RemoteSuggestions, SuggestionList, SuggestionSource,
};
