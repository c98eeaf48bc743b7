pub mod connection;
pub mod endpoints;

pub use connection::{HttpSuggestionClient, ServiceError, SuggestionService};
pub use endpoints::{InconsistentCounts, Suggestion, SuggestionRequest, SuggestionResponse, SuggestionStrategy, SUGGEST_PATH};
