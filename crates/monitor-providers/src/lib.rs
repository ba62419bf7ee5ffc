//! Provider collaborators for the activity pipeline.
//!
//! Defines the capability traits the aggregator depends on, the provider
//! error taxonomy, and the Jira and GitHub HTTP clients that implement them.

pub mod error;
pub mod github;
pub mod jira;
pub mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use monitor_core::types::{Commit, Issue, PullRequest};

pub use error::ProviderError;
pub use github::GitHubClient;
pub use jira::JiraClient;

/// Identity reported by a successful connection check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub user: Option<String>,
}

/// Issue-tracker capability: recent issues for a person.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Issues assigned to `person` and updated within the last `days` days,
    /// most recent first.
    async fn fetch_issues(&self, person: &str, days: u32) -> Result<Vec<Issue>, ProviderError>;

    /// Verify credentials and connectivity.
    async fn check_connection(&self) -> Result<ConnectionInfo, ProviderError>;
}

/// Source-control capability: recent commits and pull requests for a person.
#[async_trait]
pub trait SourceControl: Send + Sync {
    async fn fetch_commits(&self, person: &str, days: u32) -> Result<Vec<Commit>, ProviderError>;

    async fn fetch_pull_requests(
        &self,
        person: &str,
        days: u32,
    ) -> Result<Vec<PullRequest>, ProviderError>;

    /// Verify credentials and connectivity.
    async fn check_connection(&self) -> Result<ConnectionInfo, ProviderError>;
}
