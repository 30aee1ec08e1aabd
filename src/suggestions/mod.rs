mod list;
mod local;
mod query;
mod remote;
mod serialize;
mod source;

pub use list::SuggestionList;
pub use local::{DEFAULT_LOCAL_LATENCY, LocalSuggestions};
pub use query::{encode_query_strict, wildcard_query};
pub use remote::{DEFAULT_SUGGESTION_SIZE, RemoteSuggestions};
pub use serialize::{SerializeSuggestions, default_serializer, serialize_suggestions};
pub use source::{FetchError, SuggestionHit, SuggestionSource, extract_hits};
