//! Template-based response generation.
//!
//! Turns an [`ActivityRecord`] into a conversational narrative and a short
//! summary. Rendering is a pure function of the intent and the record, so
//! the same inputs always produce the same text.

use monitor_core::types::{
    ActivityRecord, Commit, DataSource, Intent, Issue, PullRequest, QueryCategory, RenderedResponse,
};

/// Default number of items listed per section before "+N more".
pub const DEFAULT_DISPLAY_CAP: usize = 5;

/// Default commit message width in characters.
pub const DEFAULT_MESSAGE_WIDTH: usize = 60;

// =============================================================================
// Availability
// =============================================================================

/// Which template family a record falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Every source the category consults failed and nothing was fetched.
    TotalFailure,
    /// At least one source failed, but not all of them (or some data exists).
    Partial,
    /// No errors and nothing found.
    NoActivity,
    /// No errors and at least one item found.
    Active,
}

impl Availability {
    pub fn classify(category: QueryCategory, record: &ActivityRecord) -> Self {
        if record.errors.is_empty() {
            return if record.has_activity {
                Availability::Active
            } else {
                Availability::NoActivity
            };
        }

        let all_consulted_failed = category
            .sources()
            .iter()
            .all(|source| record.has_error_from(*source));

        if all_consulted_failed && !record.has_activity {
            Availability::TotalFailure
        } else {
            Availability::Partial
        }
    }
}

// =============================================================================
// ResponseGenerator
// =============================================================================

/// Renders activity records with fixed templates.
#[derive(Debug, Clone)]
pub struct ResponseGenerator {
    /// Items listed per section before the remainder is summarised.
    pub display_cap: usize,
    /// Commit messages longer than this are truncated with an ellipsis.
    pub message_width: usize,
}

impl Default for ResponseGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_CAP, DEFAULT_MESSAGE_WIDTH)
    }
}

impl ResponseGenerator {
    pub fn new(display_cap: usize, message_width: usize) -> Self {
        Self {
            display_cap,
            message_width,
        }
    }

    /// Render the narrative and summary for a record.
    pub fn generate(&self, intent: &Intent, record: &ActivityRecord) -> RenderedResponse {
        let name = display_name(intent, record);
        let category = intent.category;

        match Availability::classify(category, record) {
            Availability::TotalFailure => self.total_failure(name, record),
            Availability::Partial => self.partial(name, category, record),
            Availability::NoActivity => RenderedResponse {
                summary: format!("{}: no recent activity", name),
                narrative: no_activity_text(name),
            },
            Availability::Active => RenderedResponse {
                summary: counts_summary(name, category, record),
                narrative: self.active_narrative(name, category, record),
            },
        }
    }

    // -----------------------------------------------------------------
    // Template families
    // -----------------------------------------------------------------

    fn total_failure(&self, name: &str, record: &ActivityRecord) -> RenderedResponse {
        let failures = failures(record);
        let listed: Vec<String> = failures
            .iter()
            .map(|(source, cause)| format!("{} ({})", source.display_name(), cause))
            .collect();
        let keyed: Vec<String> = failures
            .iter()
            .map(|(source, cause)| format!("{}: {}", source.display_name(), cause))
            .collect();

        RenderedResponse {
            summary: format!("{}: data unavailable ({})", name, keyed.join("; ")),
            narrative: format!(
                "I'm sorry, I couldn't retrieve activity for {} right now. Failed sources: {}. Please try again later.",
                name,
                listed.join("; ")
            ),
        }
    }

    fn partial(&self, name: &str, category: QueryCategory, record: &ActivityRecord) -> RenderedResponse {
        let sections = self.sections(name, category, record);
        let failed = record.failed_sources();

        let mut narrative = if sections.is_empty() {
            let reachable: Vec<&str> = category
                .sources()
                .iter()
                .filter(|s| !failed.contains(s))
                .map(|s| s.display_name())
                .collect();
            if reachable.is_empty() {
                format!("I couldn't retrieve recent activity for {}.", name)
            } else {
                format!(
                    "I didn't find any recent activity for {} in the {}.",
                    name,
                    reachable.join(" or ")
                )
            }
        } else {
            sections.join("\n\n")
        };

        for (source, cause) in failures(record) {
            narrative.push_str(&format!(
                "\n\nNote: I couldn't reach the {} ({}), so this summary may be incomplete.",
                source.display_name(),
                cause
            ));
        }

        let unavailable: Vec<&str> = failed.iter().map(|s| s.display_name()).collect();
        RenderedResponse {
            summary: format!(
                "{} (partial: {} unavailable)",
                counts_summary(name, category, record),
                unavailable.join(", ")
            ),
            narrative,
        }
    }

    fn active_narrative(&self, name: &str, category: QueryCategory, record: &ActivityRecord) -> String {
        let sections = self.sections(name, category, record);
        if sections.is_empty() {
            return format!(
                "{} has no recent {}.",
                name,
                category_noun(category)
            );
        }
        match category {
            QueryCategory::All => format!(
                "Here's what {} has been up to recently:\n\n{}",
                name,
                sections.join("\n\n")
            ),
            _ => sections.join("\n\n"),
        }
    }

    // -----------------------------------------------------------------
    // Sections
    // -----------------------------------------------------------------

    /// Non-empty sections for the category, in order issues, pull requests,
    /// commits.
    fn sections(&self, name: &str, category: QueryCategory, record: &ActivityRecord) -> Vec<String> {
        let mut sections = Vec::new();
        if category.wants_issues() && !record.issues.is_empty() {
            sections.push(self.issues_section(name, &record.issues));
        }
        if category.wants_pull_requests() && !record.pull_requests.is_empty() {
            sections.push(self.pull_requests_section(name, &record.pull_requests));
        }
        if category.wants_commits() && !record.commits.is_empty() {
            sections.push(self.commits_section(name, &record.commits));
        }
        sections
    }

    fn issues_section(&self, name: &str, issues: &[Issue]) -> String {
        let header = format!(
            "{} is working on {}:",
            name,
            count_noun(issues.len(), "issue", "issues")
        );
        self.listing(
            header,
            issues
                .iter()
                .map(|i| format!("{}: {} ({})", i.id, i.title, i.status)),
            issues.len(),
        )
    }

    fn pull_requests_section(&self, name: &str, prs: &[PullRequest]) -> String {
        let header = format!(
            "{} has {}:",
            name,
            count_noun(prs.len(), "recent pull request", "recent pull requests")
        );
        self.listing(
            header,
            prs.iter().map(|p| format!("#{} {} ({})", p.id, p.title, p.state)),
            prs.len(),
        )
    }

    fn commits_section(&self, name: &str, commits: &[Commit]) -> String {
        let header = format!(
            "{} made {}:",
            name,
            count_noun(commits.len(), "recent commit", "recent commits")
        );
        self.listing(
            header,
            commits
                .iter()
                .map(|c| format!("{} ({})", truncate(&c.message, self.message_width), c.timestamp)),
            commits.len(),
        )
    }

    /// Header plus up to `display_cap` bullet lines and a "+N more" line.
    fn listing(&self, header: String, lines: impl Iterator<Item = String>, total: usize) -> String {
        let mut out = header;
        for line in lines.take(self.display_cap) {
            out.push_str("\n- ");
            out.push_str(&line);
        }
        if total > self.display_cap {
            out.push_str(&format!("\n- +{} more", total - self.display_cap));
        }
        out
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Fixed narrative for a person with no recent activity.
pub fn no_activity_text(name: &str) -> String {
    format!(
        "I couldn't find any recent activity for {}. They might be working on something not tracked in the issue tracker or source control.",
        name
    )
}

fn display_name<'a>(intent: &'a Intent, record: &'a ActivityRecord) -> &'a str {
    if !record.username.is_empty() {
        &record.username
    } else {
        intent.target_person.as_deref().unwrap_or("this person")
    }
}

/// First recorded cause per failed source, in first-seen order.
fn failures(record: &ActivityRecord) -> Vec<(DataSource, &str)> {
    record
        .failed_sources()
        .into_iter()
        .filter_map(|source| {
            record
                .errors
                .iter()
                .find(|e| e.source == source)
                .map(|e| (source, e.message.as_str()))
        })
        .collect()
}

fn counts_summary(name: &str, category: QueryCategory, record: &ActivityRecord) -> String {
    let mut parts = Vec::new();
    if category.wants_issues() {
        parts.push(count_noun(record.issues.len(), "issue", "issues"));
    }
    if category.wants_pull_requests() {
        parts.push(count_noun(
            record.pull_requests.len(),
            "pull request",
            "pull requests",
        ));
    }
    if category.wants_commits() {
        parts.push(count_noun(record.commits.len(), "commit", "commits"));
    }
    format!("{}: {}", name, parts.join(", "))
}

fn category_noun(category: QueryCategory) -> &'static str {
    match category {
        QueryCategory::Issues => "issues",
        QueryCategory::Commits => "commits",
        QueryCategory::PullRequests => "pull requests",
        QueryCategory::All => "activity",
    }
}

fn count_noun(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("1 {}", singular)
    } else {
        format!("{} {}", n, plural)
    }
}

/// Cut `text` to `width` characters, appending "..." when shortened.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> ResponseGenerator {
        ResponseGenerator::default()
    }

    fn intent(person: &str, category: QueryCategory) -> Intent {
        Intent {
            raw_query: format!("What is {} working on?", person),
            target_person: Some(person.to_string()),
            category,
        }
    }

    fn issue(id: &str, title: &str, status: &str) -> Issue {
        Issue {
            id: id.to_string(),
            title: title.to_string(),
            status: status.to_string(),
            updated_at: "2024-05-01T10:00:00.000+0000".to_string(),
            url: String::new(),
        }
    }

    fn commit(message: &str) -> Commit {
        Commit {
            sha: "abc123".to_string(),
            message: message.to_string(),
            author: "Sarah".to_string(),
            timestamp: "2024-05-01T12:00:00Z".to_string(),
            url: String::new(),
        }
    }

    fn pr(id: u64, title: &str) -> PullRequest {
        PullRequest {
            id,
            title: title.to_string(),
            state: "open".to_string(),
            updated_at: "2024-05-02T08:00:00Z".to_string(),
            url: String::new(),
        }
    }

    fn record(name: &str) -> ActivityRecord {
        ActivityRecord::new(name)
    }

    // ---- Availability ----

    #[test]
    fn test_classify_active_and_no_activity() {
        let mut r = record("Sarah");
        assert_eq!(
            Availability::classify(QueryCategory::All, &r),
            Availability::NoActivity
        );
        r.commits.push(commit("Add retries"));
        r.refresh_activity();
        assert_eq!(
            Availability::classify(QueryCategory::All, &r),
            Availability::Active
        );
    }

    #[test]
    fn test_classify_total_failure_needs_every_consulted_source() {
        let mut r = record("Sarah");
        r.record_error(DataSource::IssueTracker, "authentication failed");
        assert_eq!(
            Availability::classify(QueryCategory::All, &r),
            Availability::Partial
        );
        assert_eq!(
            Availability::classify(QueryCategory::Issues, &r),
            Availability::TotalFailure
        );

        r.record_error(DataSource::SourceControl, "request timed out");
        assert_eq!(
            Availability::classify(QueryCategory::All, &r),
            Availability::TotalFailure
        );
    }

    #[test]
    fn test_classify_errors_with_data_is_partial() {
        let mut r = record("Sarah");
        r.issues.push(issue("PROJ-1", "Fix", "Open"));
        r.refresh_activity();
        r.record_error(DataSource::IssueTracker, "x");
        r.record_error(DataSource::SourceControl, "y");
        assert_eq!(
            Availability::classify(QueryCategory::All, &r),
            Availability::Partial
        );
    }

    // ---- Total failure ----

    #[test]
    fn test_total_failure_uses_curated_causes_only() {
        let mut r = record("Sarah");
        r.record_error(DataSource::IssueTracker, "authentication failed");
        r.record_error(DataSource::SourceControl, "request timed out");

        let out = generator().generate(&intent("Sarah", QueryCategory::All), &r);
        assert_eq!(
            out.narrative,
            "I'm sorry, I couldn't retrieve activity for Sarah right now. Failed sources: issue tracker (authentication failed); source control (request timed out). Please try again later."
        );
        assert_eq!(
            out.summary,
            "Sarah: data unavailable (issue tracker: authentication failed; source control: request timed out)"
        );
        assert!(!out.narrative.contains("HTTP"));
    }

    // ---- Partial ----

    #[test]
    fn test_partial_presents_data_and_footnote() {
        let mut r = record("Sarah");
        r.commits.push(commit("Add retries"));
        r.refresh_activity();
        r.record_error(DataSource::IssueTracker, "authentication failed");

        let out = generator().generate(&intent("Sarah", QueryCategory::All), &r);
        assert!(out.narrative.starts_with("Sarah made 1 recent commit:\n- Add retries (2024-05-01T12:00:00Z)"));
        assert!(out.narrative.ends_with(
            "Note: I couldn't reach the issue tracker (authentication failed), so this summary may be incomplete."
        ));
        assert_eq!(
            out.summary,
            "Sarah: 0 issues, 0 pull requests, 1 commit (partial: issue tracker unavailable)"
        );
    }

    #[test]
    fn test_partial_empty_success_names_reachable_source() {
        let mut r = record("Sarah");
        r.record_error(DataSource::SourceControl, "request timed out");

        let out = generator().generate(&intent("Sarah", QueryCategory::All), &r);
        assert!(out
            .narrative
            .starts_with("I didn't find any recent activity for Sarah in the issue tracker."));
        assert!(out.narrative.contains("source control (request timed out)"));
    }

    // ---- No activity ----

    #[test]
    fn test_no_activity_fixed_text() {
        let out = generator().generate(
            &intent("NonexistentUser", QueryCategory::All),
            &record("NonexistentUser"),
        );
        assert_eq!(
            out.narrative,
            "I couldn't find any recent activity for NonexistentUser. They might be working on something not tracked in the issue tracker or source control."
        );
        assert_eq!(out.summary, "NonexistentUser: no recent activity");
    }

    // ---- Active ----

    #[test]
    fn test_issues_template() {
        let mut r = record("John");
        r.issues.push(issue("PROJ-1", "Fix login bug", "In Progress"));
        r.refresh_activity();

        let out = generator().generate(&intent("John", QueryCategory::Issues), &r);
        assert_eq!(
            out.narrative,
            "John is working on 1 issue:\n- PROJ-1: Fix login bug (In Progress)"
        );
        assert_eq!(out.summary, "John: 1 issue");
    }

    #[test]
    fn test_pull_requests_template() {
        let mut r = record("Lisa");
        r.pull_requests.push(pr(42, "Add caching"));
        r.pull_requests.push(pr(43, "Drop legacy flag"));
        r.refresh_activity();

        let out = generator().generate(&intent("Lisa", QueryCategory::PullRequests), &r);
        assert_eq!(
            out.narrative,
            "Lisa has 2 recent pull requests:\n- #42 Add caching (open)\n- #43 Drop legacy flag (open)"
        );
    }

    #[test]
    fn test_all_template_order() {
        let mut r = record("Sarah");
        r.commits.push(commit("Add retries"));
        r.pull_requests.push(pr(7, "Add caching"));
        r.issues.push(issue("PROJ-9", "Billing export", "To Do"));
        r.refresh_activity();

        let out = generator().generate(&intent("Sarah", QueryCategory::All), &r);
        assert!(out.narrative.starts_with("Here's what Sarah has been up to recently:"));
        let issues_at = out.narrative.find("Sarah is working on").unwrap();
        let prs_at = out.narrative.find("Sarah has 1 recent pull request").unwrap();
        let commits_at = out.narrative.find("Sarah made 1 recent commit").unwrap();
        assert!(issues_at < prs_at && prs_at < commits_at);
        assert_eq!(out.summary, "Sarah: 1 issue, 1 pull request, 1 commit");
    }

    #[test]
    fn test_category_without_matching_items() {
        let mut r = record("Sarah");
        r.issues.push(issue("PROJ-1", "Fix", "Open"));
        r.refresh_activity();

        let out = generator().generate(&intent("Sarah", QueryCategory::Commits), &r);
        assert_eq!(out.narrative, "Sarah has no recent commits.");
    }

    #[test]
    fn test_display_cap_summarises_remainder() {
        let mut r = record("Mike");
        for i in 0..8 {
            r.issues.push(issue(&format!("PROJ-{}", i), "Task", "Open"));
        }
        r.refresh_activity();

        let out = generator().generate(&intent("Mike", QueryCategory::Issues), &r);
        assert!(out.narrative.starts_with("Mike is working on 8 issues:"));
        assert_eq!(out.narrative.matches("\n- PROJ-").count(), 5);
        assert!(out.narrative.ends_with("\n- +3 more"));
    }

    #[test]
    fn test_commit_message_truncated() {
        let long = "a".repeat(80);
        let mut r = record("Mike");
        r.commits.push(commit(&long));
        r.refresh_activity();

        let out = ResponseGenerator::new(5, 10).generate(&intent("Mike", QueryCategory::Commits), &r);
        assert!(out.narrative.contains("- aaaaaaaaaa... (2024-05-01T12:00:00Z)"));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let mut r = record("Sarah");
        r.issues.push(issue("PROJ-1", "Fix login bug", "In Progress"));
        r.commits.push(commit("Add retries"));
        r.refresh_activity();
        r.record_error(DataSource::SourceControl, "request timed out");
        let i = intent("Sarah", QueryCategory::All);

        let first = generator().generate(&i, &r);
        let second = generator().generate(&i, &r);
        assert_eq!(first, second);
    }

    // ---- Helpers ----

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("hello world again", 6), "hello...");
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn test_count_noun() {
        assert_eq!(count_noun(0, "issue", "issues"), "0 issues");
        assert_eq!(count_noun(1, "issue", "issues"), "1 issue");
        assert_eq!(count_noun(3, "issue", "issues"), "3 issues");
    }
}
