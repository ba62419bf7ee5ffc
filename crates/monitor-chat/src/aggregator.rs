//! Concurrent, failure-tolerant activity aggregation.
//!
//! Fetches a person's issues, commits and pull requests from the two
//! provider collaborators at the same time, bounds each call with a timeout,
//! and folds the outcomes into a single [`ActivityRecord`]. A failing source
//! becomes an error entry on the record; it never aborts the other source.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use monitor_core::types::{ActivityRecord, DataSource, Intent};
use monitor_providers::{ConnectionInfo, IssueTracker, ProviderError, SourceControl};

use crate::error::QueryError;

/// Default per-call timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default upper bound on the trailing window, in days.
pub const DEFAULT_MAX_DAYS: u32 = 365;

/// Builds activity records from the issue tracker and source control.
pub struct DataAggregator {
    issue_tracker: Arc<dyn IssueTracker>,
    source_control: Arc<dyn SourceControl>,
    fetch_timeout: Duration,
    max_days: u32,
}

impl DataAggregator {
    pub fn new(issue_tracker: Arc<dyn IssueTracker>, source_control: Arc<dyn SourceControl>) -> Self {
        Self {
            issue_tracker,
            source_control,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_days: DEFAULT_MAX_DAYS,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_max_days(mut self, max_days: u32) -> Self {
        self.max_days = max_days;
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    pub fn max_days(&self) -> u32 {
        self.max_days
    }

    /// Reject windows outside `1..=max_days`.
    pub fn check_window(&self, days: u32) -> Result<(), QueryError> {
        if days == 0 || days > self.max_days {
            return Err(QueryError::InvalidWindow {
                days,
                max_days: self.max_days,
            });
        }
        Ok(())
    }

    /// Fetch and merge activity for the intent's person over the last `days`.
    ///
    /// Only the sequences the intent's category asks for are fetched. Fails
    /// only on caller errors (no resolved person, invalid window); provider
    /// failures are recorded on the returned record.
    pub async fn aggregate(&self, intent: &Intent, days: u32) -> Result<ActivityRecord, QueryError> {
        let person = intent
            .target_person
            .as_deref()
            .ok_or(QueryError::MissingPerson)?;
        self.check_window(days)?;

        let category = intent.category;
        tracing::info!(person = %person, category = %category, days, "Aggregating activity");

        let issues = async {
            if !category.wants_issues() {
                return None;
            }
            Some(
                self.bounded(
                    DataSource::IssueTracker,
                    self.issue_tracker.fetch_issues(person, days),
                )
                .await,
            )
        };
        let commits = async {
            if !category.wants_commits() {
                return None;
            }
            Some(
                self.bounded(
                    DataSource::SourceControl,
                    self.source_control.fetch_commits(person, days),
                )
                .await,
            )
        };
        let pull_requests = async {
            if !category.wants_pull_requests() {
                return None;
            }
            Some(
                self.bounded(
                    DataSource::SourceControl,
                    self.source_control.fetch_pull_requests(person, days),
                )
                .await,
            )
        };

        let (issues, (commits, pull_requests)) =
            tokio::join!(issues, async { tokio::join!(commits, pull_requests) });

        let mut record = ActivityRecord::new(person);

        match issues {
            Some(Ok(items)) => record.issues = items,
            Some(Err(e)) => record_failure(&mut record, DataSource::IssueTracker, &e),
            None => {}
        }

        // Source control gets a single error slot; whichever of commits or
        // pull requests succeeded is still kept.
        let mut scm_error: Option<ProviderError> = None;
        match commits {
            Some(Ok(items)) => record.commits = items,
            Some(Err(e)) => scm_error = Some(e),
            None => {}
        }
        match pull_requests {
            Some(Ok(items)) => record.pull_requests = items,
            Some(Err(e)) => {
                if scm_error.is_none() {
                    scm_error = Some(e);
                }
            }
            None => {}
        }
        if let Some(e) = scm_error {
            record_failure(&mut record, DataSource::SourceControl, &e);
        }

        record.refresh_activity();
        tracing::info!(
            person = %person,
            issues = record.issues.len(),
            commits = record.commits.len(),
            pull_requests = record.pull_requests.len(),
            errors = record.errors.len(),
            "Aggregation complete"
        );
        Ok(record)
    }

    /// Check both providers concurrently, each bounded by the fetch timeout.
    pub async fn check_connections(&self) -> ConnectionReport {
        let (issue_tracker, source_control) = tokio::join!(
            self.bounded(DataSource::IssueTracker, self.issue_tracker.check_connection()),
            self.bounded(DataSource::SourceControl, self.source_control.check_connection()),
        );
        ConnectionReport {
            issue_tracker: ConnectionState::from_result(DataSource::IssueTracker, issue_tracker),
            source_control: ConnectionState::from_result(DataSource::SourceControl, source_control),
        }
    }

    async fn bounded<T, F>(&self, source: DataSource, fut: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        match tokio::time::timeout(self.fetch_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(format!(
                "{} call exceeded {:?}",
                source.display_name(),
                self.fetch_timeout
            ))),
        }
    }
}

fn record_failure(record: &mut ActivityRecord, source: DataSource, err: &ProviderError) {
    tracing::warn!(
        person = %record.username,
        source = source.display_name(),
        error = %err,
        "Provider fetch failed"
    );
    record.record_error(source, err.cause());
}

// =============================================================================
// Connection status
// =============================================================================

/// Outcome of a provider connection check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionState {
    Connected { user: Option<String> },
    Error { cause: String },
}

impl ConnectionState {
    fn from_result(source: DataSource, result: Result<ConnectionInfo, ProviderError>) -> Self {
        match result {
            Ok(info) => ConnectionState::Connected { user: info.user },
            Err(e) => {
                tracing::warn!(source = source.display_name(), error = %e, "Connection check failed");
                ConnectionState::Error {
                    cause: e.cause().to_string(),
                }
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    /// Short form: `connected` or `error: <cause>`.
    pub fn describe(&self) -> String {
        match self {
            ConnectionState::Connected { .. } => "connected".to_string(),
            ConnectionState::Error { cause } => format!("error: {}", cause),
        }
    }
}

/// Connection state of both providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionReport {
    pub issue_tracker: ConnectionState,
    pub source_control: ConnectionState,
}

impl ConnectionReport {
    pub fn is_healthy(&self) -> bool {
        self.issue_tracker.is_connected() && self.source_control.is_connected()
    }
}
