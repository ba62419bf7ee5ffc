//! Jira REST client.
//!
//! Authenticates with basic auth (account email + API token) and resolves
//! people by display name before searching their assigned issues.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use monitor_core::config::JiraConfig;
use monitor_core::error::MonitorError;
use monitor_core::types::Issue;

use crate::error::ProviderError;
use crate::{ConnectionInfo, IssueTracker};

/// A Jira account as returned by the user search and `myself` endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    pub account_id: String,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<JiraIssue>,
}

#[derive(Debug, Deserialize)]
struct JiraIssue {
    key: String,
    #[serde(default)]
    fields: JiraFields,
}

#[derive(Debug, Default, Deserialize)]
struct JiraFields {
    summary: Option<String>,
    status: Option<NamedField>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedField {
    name: String,
}

/// Client for the Jira REST API (v2).
pub struct JiraClient {
    client: Client,
    base_url: String,
    email: String,
    api_token: String,
    max_results: u32,
}

impl JiraClient {
    /// Build a client from configuration.
    ///
    /// Fails if the base URL, email or API token is missing.
    pub fn new(config: &JiraConfig, timeout: Duration) -> Result<Self, MonitorError> {
        let mut missing = Vec::new();
        if config.base_url.trim().is_empty() {
            missing.push("JIRA_BASE_URL");
        }
        if config.email.trim().is_empty() {
            missing.push("JIRA_EMAIL");
        }
        if config.api_token.trim().is_empty() {
            missing.push("JIRA_API_TOKEN");
        }
        if !missing.is_empty() {
            return Err(MonitorError::Config(format!(
                "Missing required Jira credentials: {}",
                missing.join(", ")
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::Config(format!("Failed to build Jira HTTP client: {}", e)))?;

        tracing::info!(base_url = %config.base_url, "Jira client initialized");

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            email: config.email.clone(),
            api_token: config.api_token.clone(),
            max_results: config.max_results,
        })
    }

    /// Resolve a person (display name, email or username) to a Jira account.
    pub async fn find_user(&self, person: &str) -> Result<JiraUser, ProviderError> {
        let users: Vec<JiraUser> = self
            .get_json("/rest/api/2/user/search", &[("query", person.to_string())])
            .await?;

        users
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NotFound(format!("no Jira user matching '{}'", person)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Jira request");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.email, Some(&self.api_token))
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, body));
        }

        Ok(response.json::<T>().await?)
    }

    fn to_issue(&self, raw: JiraIssue) -> Issue {
        Issue {
            url: format!("{}/browse/{}", self.base_url, raw.key),
            id: raw.key,
            title: raw.fields.summary.unwrap_or_default(),
            status: raw
                .fields
                .status
                .map(|s| s.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            updated_at: raw.fields.updated.unwrap_or_default(),
        }
    }
}

/// JQL for issues assigned to `account_id` updated in the trailing window.
fn assigned_issues_jql(account_id: &str, days: u32) -> String {
    format!(
        "assignee = \"{}\" AND updated >= -{}d ORDER BY updated DESC",
        account_id.replace('"', "\\\""),
        days
    )
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn fetch_issues(&self, person: &str, days: u32) -> Result<Vec<Issue>, ProviderError> {
        let user = self.find_user(person).await?;
        tracing::info!(
            person = %person,
            account_id = %user.account_id,
            "Fetching Jira issues"
        );

        let response: SearchResponse = self
            .get_json(
                "/rest/api/2/search",
                &[
                    ("jql", assigned_issues_jql(&user.account_id, days)),
                    ("maxResults", self.max_results.to_string()),
                    ("fields", "summary,status,updated".to_string()),
                ],
            )
            .await?;

        let issues: Vec<Issue> = response
            .issues
            .into_iter()
            .map(|raw| self.to_issue(raw))
            .collect();

        tracing::info!(person = %person, count = issues.len(), "Jira issues fetched");
        Ok(issues)
    }

    async fn check_connection(&self) -> Result<ConnectionInfo, ProviderError> {
        let me: JiraUser = self.get_json("/rest/api/2/myself", &[]).await?;
        Ok(ConnectionInfo {
            user: me.display_name.or(me.email_address),
        })
    }
}
