//! Static provider implementations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use monitor_core::types::{Commit, Issue, PullRequest};

use crate::error::ProviderError;
use crate::{ConnectionInfo, IssueTracker, SourceControl};

/// Record of a provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    /// Method name, e.g. `fetch_issues`.
    pub method: String,
    pub person: String,
    pub days: u32,
}

impl MockCall {
    fn new(method: &str, person: &str, days: u32) -> Self {
        Self {
            method: method.to_string(),
            person: person.to_string(),
            days,
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Counts a call as in flight until the guard is dropped, which also happens
/// when the caller drops the fetch future mid-delay.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn pause(delay: Option<Duration>) {
    if let Some(d) = delay {
        tokio::time::sleep(d).await;
    }
}

// =============================================================================
// Issue tracker
// =============================================================================

/// Issue tracker returning a fixed result.
pub struct StaticIssueTracker {
    issues: Result<Vec<Issue>, ProviderError>,
    delay: Option<Duration>,
    calls: Mutex<Vec<MockCall>>,
    in_flight: AtomicUsize,
}

impl StaticIssueTracker {
    pub fn with_issues(issues: Vec<Issue>) -> Self {
        Self {
            issues: Ok(issues),
            delay: None,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::with_issues(Vec::new())
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            issues: Err(error),
            delay: None,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Sleep for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Calls started but not yet finished or dropped.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IssueTracker for StaticIssueTracker {
    async fn fetch_issues(&self, person: &str, days: u32) -> Result<Vec<Issue>, ProviderError> {
        lock(&self.calls).push(MockCall::new("fetch_issues", person, days));
        let _guard = InFlight::enter(&self.in_flight);
        pause(self.delay).await;
        self.issues.clone()
    }

    async fn check_connection(&self) -> Result<ConnectionInfo, ProviderError> {
        match &self.issues {
            Ok(_) => Ok(ConnectionInfo {
                user: Some("static-issue-tracker".to_string()),
            }),
            Err(e) => Err(e.clone()),
        }
    }
}

// =============================================================================
// Source control
// =============================================================================

/// Source control returning fixed commit and pull request results.
pub struct StaticSourceControl {
    commits: Result<Vec<Commit>, ProviderError>,
    pull_requests: Result<Vec<PullRequest>, ProviderError>,
    delay: Option<Duration>,
    calls: Mutex<Vec<MockCall>>,
    in_flight: AtomicUsize,
}

impl StaticSourceControl {
    pub fn new(commits: Vec<Commit>, pull_requests: Vec<PullRequest>) -> Self {
        Self {
            commits: Ok(commits),
            pull_requests: Ok(pull_requests),
            delay: None,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Both commit and pull request fetches fail with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            commits: Err(error.clone()),
            pull_requests: Err(error),
            delay: None,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_commit_error(mut self, error: ProviderError) -> Self {
        self.commits = Err(error);
        self
    }

    pub fn with_pull_request_error(mut self, error: ProviderError) -> Self {
        self.pull_requests = Err(error);
        self
    }

    /// Sleep for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Calls started but not yet finished or dropped.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceControl for StaticSourceControl {
    async fn fetch_commits(&self, person: &str, days: u32) -> Result<Vec<Commit>, ProviderError> {
        lock(&self.calls).push(MockCall::new("fetch_commits", person, days));
        let _guard = InFlight::enter(&self.in_flight);
        pause(self.delay).await;
        self.commits.clone()
    }

    async fn fetch_pull_requests(
        &self,
        person: &str,
        days: u32,
    ) -> Result<Vec<PullRequest>, ProviderError> {
        lock(&self.calls).push(MockCall::new("fetch_pull_requests", person, days));
        let _guard = InFlight::enter(&self.in_flight);
        pause(self.delay).await;
        self.pull_requests.clone()
    }

    async fn check_connection(&self) -> Result<ConnectionInfo, ProviderError> {
        match (&self.commits, &self.pull_requests) {
            (Err(e), _) | (_, Err(e)) => Err(e.clone()),
            _ => Ok(ConnectionInfo {
                user: Some("static-source-control".to_string()),
            }),
        }
    }
}
