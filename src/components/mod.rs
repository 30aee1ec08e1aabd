mod dropdown;
mod remote_select_field;
mod remote_select_state;
mod select_field;
mod select_option;

#[cfg(test)]
mod tests;

pub use dropdown::{Dropdown, ErrorLabel, FieldLabel, NoResultsMessage, Pointing};
pub use remote_select_field::{
    DEFAULT_DEBOUNCE, FetchOutcome, RemoteSelectConfig, RemoteSelectField, RemoteSelectSnapshot,
    SourceConfigError,
};
pub use remote_select_state::{
    DEFAULT_NO_QUERY_MESSAGE, DEFAULT_NO_RESULTS_MESSAGE, DEFAULT_SUGGESTIONS_ERROR_MESSAGE,
    FetchTicket, RemoteSelectState, SuggestionMessages,
};
pub use select_field::{
    AddItemData, ChangeData, DropdownEvent, FieldEvent, SelectField, invalid_value_message,
};
pub use select_option::SelectOption;
