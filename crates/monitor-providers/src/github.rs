//! GitHub REST client.
//!
//! Uses the search API so a person's commits and pull requests are found
//! across every repository the token can see.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use monitor_core::config::GitHubConfig;
use monitor_core::error::MonitorError;
use monitor_core::types::{Commit, PullRequest};

use crate::error::ProviderError;
use crate::{ConnectionInfo, SourceControl};

const API_VERSION: &str = "2022-11-28";
const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CommitItem {
    sha: String,
    #[serde(default)]
    html_url: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    message: String,
    author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    name: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IssueItem {
    number: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    updated_at: String,
    #[serde(default)]
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

/// Client for the GitHub REST API.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    per_page: u32,
}

impl GitHubClient {
    /// Build a client from configuration. Fails if no token is configured.
    pub fn new(config: &GitHubConfig, timeout: Duration) -> Result<Self, MonitorError> {
        if config.token.trim().is_empty() {
            return Err(MonitorError::Config(
                "Missing required GitHub token: GITHUB_TOKEN".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.token.trim()))
            .map_err(|_| MonitorError::Config("GitHub token contains invalid characters".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let client = Client::builder()
            .user_agent(concat!("team-monitor/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::Config(format!("Failed to build GitHub HTTP client: {}", e)))?;

        tracing::info!(base_url = %config.base_url, "GitHub client initialized");

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            per_page: config.max_results.clamp(1, MAX_PER_PAGE),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "GitHub request");

        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, body));
        }

        Ok(response.json::<T>().await?)
    }

    async fn search<T: DeserializeOwned>(
        &self,
        path: &str,
        q: String,
        sort: &str,
    ) -> Result<Vec<T>, ProviderError> {
        let response: SearchResponse<T> = self
            .get_json(
                path,
                &[
                    ("q", q),
                    ("sort", sort.to_string()),
                    ("order", "desc".to_string()),
                    ("per_page", self.per_page.to_string()),
                ],
            )
            .await?;
        Ok(response.items)
    }
}

/// First day of the trailing window, formatted for GitHub search qualifiers.
fn since_date(today: NaiveDate, days: u32) -> String {
    (today - chrono::Duration::days(i64::from(days)))
        .format("%Y-%m-%d")
        .to_string()
}

/// GitHub logins never contain whitespace; a multi-word name would split the
/// `author:` qualifier into free-text search terms.
fn login(person: &str) -> Result<&str, ProviderError> {
    let login = person.trim();
    if login.is_empty() || login.contains(char::is_whitespace) {
        return Err(ProviderError::NotFound(format!(
            "'{}' is not a GitHub login",
            person
        )));
    }
    Ok(login)
}

fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or("").trim_end().to_string()
}

impl From<CommitItem> for Commit {
    fn from(item: CommitItem) -> Self {
        let (author, timestamp) = match item.commit.author {
            Some(a) => (a.name.unwrap_or_default(), a.date.unwrap_or_default()),
            None => (String::new(), String::new()),
        };
        Commit {
            sha: item.sha,
            message: first_line(&item.commit.message),
            author,
            timestamp,
            url: item.html_url,
        }
    }
}

impl From<IssueItem> for PullRequest {
    fn from(item: IssueItem) -> Self {
        PullRequest {
            id: item.number,
            title: item.title,
            state: item.state,
            updated_at: item.updated_at,
            url: item.html_url,
        }
    }
}

#[async_trait]
impl SourceControl for GitHubClient {
    async fn fetch_commits(&self, person: &str, days: u32) -> Result<Vec<Commit>, ProviderError> {
        let person = login(person)?;
        let since = since_date(Utc::now().date_naive(), days);
        tracing::info!(person = %person, since = %since, "Fetching GitHub commits");

        let items: Vec<CommitItem> = self
            .search(
                "/search/commits",
                format!("author:{} committer-date:>={}", person, since),
                "committer-date",
            )
            .await?;

        let commits: Vec<Commit> = items.into_iter().map(Commit::from).collect();
        tracing::info!(person = %person, count = commits.len(), "GitHub commits fetched");
        Ok(commits)
    }

    async fn fetch_pull_requests(
        &self,
        person: &str,
        days: u32,
    ) -> Result<Vec<PullRequest>, ProviderError> {
        let person = login(person)?;
        let since = since_date(Utc::now().date_naive(), days);
        tracing::info!(person = %person, since = %since, "Fetching GitHub pull requests");

        let items: Vec<IssueItem> = self
            .search(
                "/search/issues",
                format!("is:pr author:{} updated:>={}", person, since),
                "updated",
            )
            .await?;

        let prs: Vec<PullRequest> = items.into_iter().map(PullRequest::from).collect();
        tracing::info!(person = %person, count = prs.len(), "GitHub pull requests fetched");
        Ok(prs)
    }

    async fn check_connection(&self) -> Result<ConnectionInfo, ProviderError> {
        let user: GitHubUser = self.get_json("/user", &[]).await?;
        Ok(ConnectionInfo {
            user: Some(user.login),
        })
    }
}
