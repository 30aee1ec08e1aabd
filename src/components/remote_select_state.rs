use super::dropdown::NoResultsMessage;

pub const DEFAULT_NO_RESULTS_MESSAGE: &str = "No results found.";
pub const DEFAULT_SUGGESTIONS_ERROR_MESSAGE: &str = "Something went wrong...";
pub const DEFAULT_NO_QUERY_MESSAGE: &str = "Search...";

/// Sequence number of a search request. Only the latest ticket may update
/// the field.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FetchTicket(pub u64);

impl FetchTicket {
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SuggestionMessages {
    pub no_results: String,
    pub suggestions_error: String,
    pub no_query: String,
}

impl Default for SuggestionMessages {
    fn default() -> Self {
        Self {
            no_results: DEFAULT_NO_RESULTS_MESSAGE.to_string(),
            suggestions_error: DEFAULT_SUGGESTIONS_ERROR_MESSAGE.to_string(),
            no_query: DEFAULT_NO_QUERY_MESSAGE.to_string(),
        }
    }
}

/// UI phase of a remote select field. Fetching, ready, and failed fields are
/// always open; a blurred field is closed with no query and no error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RemoteSelectState {
    Idle { open: bool },
    Fetching { query: String, ticket: FetchTicket },
    Ready { query: String },
    Failed { query: String },
    Blurred,
}

impl Default for RemoteSelectState {
    fn default() -> Self {
        Self::Idle { open: false }
    }
}

impl RemoteSelectState {
    pub fn is_fetching(&self) -> bool {
        matches!(self, Self::Fetching { .. })
    }

    pub fn is_open(&self) -> bool {
        match self {
            Self::Idle { open } => *open,
            Self::Fetching { .. } | Self::Ready { .. } | Self::Failed { .. } => true,
            Self::Blurred => false,
        }
    }

    pub fn has_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn search_query(&self) -> Option<&str> {
        match self {
            Self::Fetching { query, .. } | Self::Ready { query } | Self::Failed { query } => {
                Some(query)
            }
            Self::Idle { .. } | Self::Blurred => None,
        }
    }

    pub fn focus(&mut self) {
        if !self.is_open() {
            *self = Self::Idle { open: true };
        }
    }

    pub fn blur(&mut self) {
        *self = Self::Blurred;
    }

    pub fn begin_fetch(&mut self, query: String, ticket: FetchTicket) {
        *self = Self::Fetching { query, ticket };
    }

    /// Moves an in-flight fetch to `Ready`. Returns false, leaving the state
    /// untouched, when `ticket` is not the fetch in flight.
    pub fn resolve(&mut self, ticket: FetchTicket) -> bool {
        let Some(query) = self.take_in_flight_query(ticket) else {
            return false;
        };
        *self = Self::Ready { query };
        true
    }

    pub fn fail(&mut self, ticket: FetchTicket) -> bool {
        let Some(query) = self.take_in_flight_query(ticket) else {
            return false;
        };
        *self = Self::Failed { query };
        true
    }

    fn take_in_flight_query(&mut self, ticket: FetchTicket) -> Option<String> {
        match self {
            Self::Fetching { query, ticket: current } if *current == ticket => {
                Some(std::mem::take(query))
            }
            _ => None,
        }
    }

    /// Drops query and error; the open state is kept.
    pub fn clear_query(&mut self) {
        *self = Self::Idle {
            open: self.is_open(),
        };
    }

    pub fn select(&mut self) {
        self.clear_query();
    }

    pub fn no_results_message(&self, messages: &SuggestionMessages) -> NoResultsMessage {
        if self.has_error() {
            return NoResultsMessage::Error(messages.suggestions_error.clone());
        }
        match self.search_query() {
            Some(query) if !query.is_empty() => NoResultsMessage::Text(messages.no_results.clone()),
            _ => NoResultsMessage::Text(messages.no_query.clone()),
        }
    }
}
