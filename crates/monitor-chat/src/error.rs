//! Error types for the query pipeline.

use monitor_core::error::MonitorError;

/// Hint returned to callers when no person could be identified.
pub const PERSON_SUGGESTION: &str = "Try asking 'What is [Name] working on?'";

/// Errors from validating or answering a query.
///
/// Provider failures never appear here; the aggregator turns them into
/// per-source entries on the activity record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("query cannot be empty")]
    EmptyQuery,
    #[error("query exceeds maximum length of {max} characters (got {len})")]
    QueryTooLong { len: usize, max: usize },
    #[error("could not identify a team member in the query")]
    NoPersonFound,
    #[error("aggregation requires a resolved target person")]
    MissingPerson,
    #[error("days must be between 1 and {max_days}, got {days}")]
    InvalidWindow { days: u32, max_days: u32 },
    #[error("unknown team member: {0}")]
    UnknownPerson(String),
}

impl QueryError {
    /// Follow-up hint for the user, if one applies.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            QueryError::NoPersonFound => Some(PERSON_SUGGESTION),
            _ => None,
        }
    }
}

impl From<QueryError> for MonitorError {
    fn from(err: QueryError) -> Self {
        MonitorError::Api(err.to_string())
    }
}
