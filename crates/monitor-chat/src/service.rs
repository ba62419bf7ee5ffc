//! Query service: parse, validate, aggregate, render.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use monitor_core::config::QueryConfig;
use monitor_core::types::{ActivityRecord, Intent, RenderedResponse};
use monitor_providers::{IssueTracker, SourceControl};

use crate::aggregator::{ConnectionReport, DataAggregator};
use crate::error::QueryError;
use crate::parser::QueryParser;
use crate::response::ResponseGenerator;

/// Maximum query length in characters.
pub const MAX_QUERY_LENGTH: usize = 2000;

/// Everything produced while answering one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryAnswer {
    pub intent: Intent,
    pub record: ActivityRecord,
    pub response: RenderedResponse,
}

/// Single entry point composing parser, aggregator and generator.
pub struct ActivityService {
    parser: QueryParser,
    aggregator: DataAggregator,
    generator: ResponseGenerator,
    roster: Vec<String>,
    default_days: u32,
}

impl ActivityService {
    pub fn new(aggregator: DataAggregator, generator: ResponseGenerator) -> Self {
        Self {
            parser: QueryParser::new(),
            aggregator,
            generator,
            roster: Vec::new(),
            default_days: 7,
        }
    }

    /// Build a service from the `[query]` config section.
    pub fn from_config(
        config: &QueryConfig,
        issue_tracker: Arc<dyn IssueTracker>,
        source_control: Arc<dyn SourceControl>,
    ) -> Self {
        let aggregator = DataAggregator::new(issue_tracker, source_control)
            .with_fetch_timeout(Duration::from_secs(config.fetch_timeout_secs))
            .with_max_days(config.max_days);
        let generator = ResponseGenerator::new(config.display_cap, config.message_width);

        let mut service = Self::new(aggregator, generator).with_roster(config.roster.clone());
        service.default_days = config.default_days;
        service
    }

    /// Restrict answers to known team members. An empty roster accepts anyone.
    pub fn with_roster(mut self, roster: Vec<String>) -> Self {
        self.roster = roster;
        self
    }

    /// Window used when a caller does not specify one.
    pub fn default_days(&self) -> u32 {
        self.default_days
    }

    pub fn max_days(&self) -> u32 {
        self.aggregator.max_days()
    }

    pub fn parse(&self, raw_query: &str) -> Intent {
        self.parser.parse(raw_query)
    }

    /// Answer a question about a team member's recent activity.
    ///
    /// Errors are limited to invalid input: empty or oversized query, a
    /// window outside `1..=max_days`, no recognisable person, or a person
    /// missing from a configured roster. Provider failures are reported on
    /// the returned record instead.
    pub async fn answer(&self, raw_query: &str, days: u32) -> Result<QueryAnswer, QueryError> {
        self.validate(raw_query, days)?;

        let intent = self.parser.parse(raw_query);
        let person = intent
            .target_person
            .as_deref()
            .ok_or(QueryError::NoPersonFound)?;

        if !self.is_known(person) {
            tracing::info!(person = %person, "Person not on roster");
            return Err(QueryError::UnknownPerson(person.to_string()));
        }

        let record = self.aggregator.aggregate(&intent, days).await?;
        let response = self.generator.generate(&intent, &record);

        Ok(QueryAnswer {
            intent,
            record,
            response,
        })
    }

    pub async fn check_connections(&self) -> ConnectionReport {
        self.aggregator.check_connections().await
    }

    fn validate(&self, raw_query: &str, days: u32) -> Result<(), QueryError> {
        if raw_query.trim().is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        let len = raw_query.chars().count();
        if len > MAX_QUERY_LENGTH {
            return Err(QueryError::QueryTooLong {
                len,
                max: MAX_QUERY_LENGTH,
            });
        }
        self.aggregator.check_window(days)
    }

    fn is_known(&self, person: &str) -> bool {
        if self.roster.is_empty() {
            return true;
        }
        let wanted = person.to_lowercase();
        self.roster.iter().any(|m| m.to_lowercase() == wanted)
    }
}
