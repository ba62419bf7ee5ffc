//! Shared value types for the activity pipeline.
//!
//! These are produced by the provider clients and the query parser, combined
//! by the aggregator, and rendered by the response generator. None of them are
//! persisted.

use serde::{Deserialize, Serialize};

// =============================================================================
// Query intent
// =============================================================================

/// Activity category requested by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryCategory {
    Issues,
    Commits,
    PullRequests,
    All,
}

impl QueryCategory {
    pub fn wants_issues(self) -> bool {
        matches!(self, QueryCategory::Issues | QueryCategory::All)
    }

    pub fn wants_commits(self) -> bool {
        matches!(self, QueryCategory::Commits | QueryCategory::All)
    }

    pub fn wants_pull_requests(self) -> bool {
        matches!(self, QueryCategory::PullRequests | QueryCategory::All)
    }

    /// Data sources consulted for this category.
    pub fn sources(self) -> &'static [DataSource] {
        match self {
            QueryCategory::Issues => &[DataSource::IssueTracker],
            QueryCategory::Commits | QueryCategory::PullRequests => &[DataSource::SourceControl],
            QueryCategory::All => &[DataSource::IssueTracker, DataSource::SourceControl],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryCategory::Issues => "ISSUES",
            QueryCategory::Commits => "COMMITS",
            QueryCategory::PullRequests => "PULL_REQUESTS",
            QueryCategory::All => "ALL",
        }
    }
}

impl std::fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured interpretation of a natural-language query.
///
/// `target_person` is `None` only when no person-like token could be found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub raw_query: String,
    pub target_person: Option<String>,
    pub category: QueryCategory,
}

// =============================================================================
// Provider records
// =============================================================================

/// An issue from the issue tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Tracker key, e.g. `PROJ-123`.
    pub id: String,
    pub title: String,
    pub status: String,
    pub updated_at: String,
    pub url: String,
}

/// A commit from source control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub timestamp: String,
    pub url: String,
}

/// A pull request from source control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Pull request number within its repository.
    pub id: u64,
    pub title: String,
    pub state: String,
    pub updated_at: String,
    pub url: String,
}

// =============================================================================
// Activity record
// =============================================================================

/// External system an activity sequence comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSource {
    IssueTracker,
    SourceControl,
}

impl DataSource {
    /// Human-readable name used in rendered text.
    pub fn display_name(self) -> &'static str {
        match self {
            DataSource::IssueTracker => "issue tracker",
            DataSource::SourceControl => "source control",
        }
    }
}

/// A failed fetch from one data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceError {
    pub source: DataSource,
    /// Curated cause, never raw provider output.
    pub message: String,
}

/// Unified per-person snapshot of fetched activity plus per-source errors.
///
/// `has_activity` is true iff at least one of the three sequences is
/// non-empty. Errors accumulate independently of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub username: String,
    pub issues: Vec<Issue>,
    pub commits: Vec<Commit>,
    pub pull_requests: Vec<PullRequest>,
    pub has_activity: bool,
    pub errors: Vec<SourceError>,
}

impl ActivityRecord {
    /// Create an empty record for `username`.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            issues: Vec::new(),
            commits: Vec::new(),
            pull_requests: Vec::new(),
            has_activity: false,
            errors: Vec::new(),
        }
    }

    /// Re-derive `has_activity` from the three sequences.
    pub fn refresh_activity(&mut self) {
        self.has_activity =
            !self.issues.is_empty() || !self.commits.is_empty() || !self.pull_requests.is_empty();
    }

    pub fn record_error(&mut self, source: DataSource, message: impl Into<String>) {
        self.errors.push(SourceError {
            source,
            message: message.into(),
        });
    }

    /// Sources with at least one error entry, in first-seen order.
    pub fn failed_sources(&self) -> Vec<DataSource> {
        let mut sources = Vec::new();
        for err in &self.errors {
            if !sources.contains(&err.source) {
                sources.push(err.source);
            }
        }
        sources
    }

    pub fn has_error_from(&self, source: DataSource) -> bool {
        self.errors.iter().any(|e| e.source == source)
    }
}

// =============================================================================
// Rendered output
// =============================================================================

/// Final text returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedResponse {
    /// Short, data-oriented summary.
    pub summary: String,
    /// Conversational narrative.
    pub narrative: String,
}
