//! Natural-language query parser.
//!
//! Extracts the team member a question is about and the activity category
//! it asks for, producing an [`Intent`]. Parsing never fails: a question
//! with no recognisable name yields an intent without a target person.

use regex::Regex;
use std::sync::LazyLock;

use monitor_core::types::{Intent, QueryCategory};

// =============================================================================
// Compiled regex sets (compiled once, reused across calls)
// =============================================================================

/// One name token: usernames such as `john.doe` or `j_smith-2` are allowed.
const NAME_TOKEN: &str = r"[\p{L}\p{N}][\p{L}\p{N}._\-]*";

/// A person rule. Structural rules ("Sarah's", "is John working on") only
/// reject words that can never be a name; the bare-token fallback also
/// rejects filler words, some of which double as first names ("Will").
struct PersonRule {
    pattern: Regex,
    bare: bool,
}

/// Person rules, tried in order. Keywords match case-insensitively, the
/// captured name keeps its casing. Two capitalised tokens are taken together
/// so full names like "Sarah Johnson" survive.
static PERSON_RULES: LazyLock<Vec<PersonRule>> = LazyLock::new(|| {
    let cap = r"\p{Lu}[\p{L}\p{N}._\-]*";
    let name = format!(r"({cap}\s+{cap}|{tok})", cap = cap, tok = NAME_TOKEN);
    let structural = [
        // Possessive: "Sarah's commits", "Sarah Johnson’s PRs"
        format!(r"\b{name}['’]s\b", name = name),
        // "is John working on", "was Mike doing", "has Lisa been working"
        format!(
            r"(?i:\b(?:is|was|has)\s+){name}(?i:\s+(?:been\s+)?(?:working\s+on|working|doing|committed)\b)",
            name = name
        ),
        // "for Sarah", "about Mike"
        format!(r"(?i:\b(?:for|about)\s+){name}", name = name),
    ];
    let mut rules: Vec<PersonRule> = structural
        .iter()
        .map(|p| PersonRule {
            pattern: Regex::new(p).expect("Invalid person regex"),
            bare: false,
        })
        .collect();
    // Bare capitalised token
    rules.push(PersonRule {
        pattern: Regex::new(r"\b(\p{Lu}[\p{L}\p{N}._\-]*)").expect("Invalid person regex"),
        bare: true,
    });
    rules
});

struct CategoryPatterns {
    issues: Regex,
    pull_requests: Regex,
    commits: Regex,
}

static CATEGORY_PATTERNS: LazyLock<CategoryPatterns> = LazyLock::new(|| CategoryPatterns {
    issues: Regex::new(r"(?i)\b(?:tickets?|issues?|jira)\b").unwrap(),
    pull_requests: Regex::new(r"(?i)\b(?:pull\s+requests?|prs?)\b").unwrap(),
    commits: Regex::new(r"(?i)\b(?:commits?|committed)\b").unwrap(),
});

/// Words never taken as a person, compared case-insensitively.
static NAME_REJECTS: &[&str] = &[
    // question words and imperatives
    "what", "whats", "who", "whom", "whose", "which", "where", "when", "why", "how",
    "show", "tell", "give", "list", "find", "get", "see", "check",
    // determiners and contraction stems ("it's", "let's", "here's")
    "the", "a", "an", "any", "all", "some", "this", "that", "these", "those",
    "there", "here", "it", "its", "let", "lets",
    // pronouns
    "i", "me", "my", "we", "us", "our", "you", "your", "he", "him", "his", "she",
    "her", "they", "them", "their", "team", "everyone", "anyone", "someone",
    "somebody", "everybody",
    // time words
    "today", "yesterday", "tomorrow", "day", "days", "week", "weeks", "month",
    "months", "year", "now", "monday", "tuesday", "wednesday", "thursday",
    "friday", "saturday", "sunday",
    // category vocabulary
    "jira", "github", "git", "ticket", "tickets", "issue", "issues", "commit",
    "commits", "committed", "pr", "prs", "pull", "request", "requests", "repo",
    "repos", "repository", "code",
];

/// Extra words skipped only when looking for a bare capitalised token.
static FILLER_WORDS: &[&str] = &[
    "please", "can", "could", "would", "should", "will", "do", "does", "did",
    "doing", "is", "was", "are", "were", "be", "been", "has", "have", "had",
    "working", "work", "on", "for", "about", "of", "in", "and", "or", "recent",
    "recently", "latest", "current", "currently", "new", "open", "closed",
    "activity", "happening", "up", "lately", "hey", "hi", "hello", "thanks",
    "anything", "something", "nothing", "everything", "update", "updates",
    "from", "with", "by", "to",
];

fn contains_word(list: &[&str], word: &str) -> bool {
    list.iter().any(|s| s.eq_ignore_ascii_case(word))
}

fn is_name_reject(word: &str) -> bool {
    contains_word(NAME_REJECTS, word)
}

fn is_stop_word(word: &str) -> bool {
    is_name_reject(word) || contains_word(FILLER_WORDS, word)
}

// =============================================================================
// QueryParser
// =============================================================================

/// Rule-based parser turning a question into an [`Intent`].
#[derive(Debug, Default, Clone)]
pub struct QueryParser;

impl QueryParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a raw question.
    pub fn parse(&self, raw_query: &str) -> Intent {
        let intent = Intent {
            raw_query: raw_query.to_string(),
            target_person: self.extract_person(raw_query),
            category: self.extract_category(raw_query),
        };
        tracing::debug!(
            person = ?intent.target_person,
            category = %intent.category,
            "Parsed query"
        );
        intent
    }

    // -----------------------------------------------------------------
    // Person extraction
    // -----------------------------------------------------------------

    /// Find the person a question is about.
    ///
    /// Rules run in priority order. Within a rule every match is scanned so
    /// a stop word ("What's") does not hide a later name ("Sarah's").
    pub fn extract_person(&self, raw_query: &str) -> Option<String> {
        PERSON_RULES.iter().find_map(|rule| {
            let reject: fn(&str) -> bool = if rule.bare { is_stop_word } else { is_name_reject };
            rule.pattern
                .captures_iter(raw_query)
                .filter_map(|caps| caps.get(1))
                .find_map(|m| clean_name(m.as_str(), reject))
        })
    }

    // -----------------------------------------------------------------
    // Category extraction
    // -----------------------------------------------------------------

    /// Requested category, by fixed priority issues > pull requests > commits.
    pub fn extract_category(&self, raw_query: &str) -> QueryCategory {
        let pats = &*CATEGORY_PATTERNS;
        if pats.issues.is_match(raw_query) {
            QueryCategory::Issues
        } else if pats.pull_requests.is_match(raw_query) {
            QueryCategory::PullRequests
        } else if pats.commits.is_match(raw_query) {
            QueryCategory::Commits
        } else {
            QueryCategory::All
        }
    }
}

/// Normalise a captured name: strip trailing `.`/`-`, skip rejected leading
/// words ("Show Sarah") and cut at the first rejected word after the name.
fn clean_name(raw: &str, reject: fn(&str) -> bool) -> Option<String> {
    let words: Vec<&str> = raw
        .split_whitespace()
        .map(|w| w.trim_end_matches(['.', '-']))
        .skip_while(|w| !w.is_empty() && reject(w))
        .take_while(|w| !w.is_empty() && !reject(w))
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}
