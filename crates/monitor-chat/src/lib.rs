//! Query pipeline for the team activity monitor.
//!
//! Parses a free-text question into an intent, fetches the person's recent
//! issues, commits and pull requests concurrently, and renders a
//! deterministic answer even when providers fail.

pub mod aggregator;
pub mod error;
pub mod parser;
pub mod response;
pub mod service;

pub use aggregator::{ConnectionReport, ConnectionState, DataAggregator};
pub use error::{QueryError, PERSON_SUGGESTION};
pub use parser::QueryParser;
pub use response::{Availability, ResponseGenerator};
pub use service::{ActivityService, QueryAnswer, MAX_QUERY_LENGTH};
