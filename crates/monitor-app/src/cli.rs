//! CLI argument definitions for the team monitor.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Team activity monitor: ask what a teammate has been working on.
#[derive(Parser, Debug)]
#[command(name = "team-monitor", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Answer a question such as "What is Sarah working on?".
    Query {
        /// The question; unquoted words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Trailing window in days.
        #[arg(short = 'd', long = "days")]
        days: Option<u32>,
    },
    /// Start the HTTP API.
    Serve {
        /// API server port.
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
    },
    /// Check connectivity to the issue tracker and source control.
    Status,
    /// Write a default configuration file to the resolved config path.
    Init {
        /// Overwrite an existing file.
        #[arg(short = 'f', long = "force")]
        force: bool,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > TEAM_MONITOR_CONFIG env var > ~/.team-monitor/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("TEAM_MONITOR_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > TEAM_MONITOR_PORT env var > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Command::Serve { port: Some(p) } = self.command {
            return p;
        }
        if let Ok(val) = std::env::var("TEAM_MONITOR_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        config_port
    }

    /// Log level override from the command line, if any.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

impl Command {
    /// The question text for `query`, words joined with single spaces.
    pub fn question(&self) -> Option<String> {
        match self {
            Command::Query { question, .. } => Some(question.join(" ")),
            _ => None,
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".team-monitor").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".team-monitor").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_query_joins_words() {
        let args = parse(&["team-monitor", "query", "What", "is", "Sarah", "working", "on?"]);
        assert_eq!(args.command.question().as_deref(), Some("What is Sarah working on?"));
    }

    #[test]
    fn test_query_days_and_global_flags() {
        let args = parse(&[
            "team-monitor",
            "query",
            "Show me John's commits",
            "--days",
            "14",
            "--log-level",
            "debug",
        ]);
        assert_eq!(
            args.command,
            Command::Query {
                question: vec!["Show me John's commits".to_string()],
                days: Some(14),
            }
        );
        assert_eq!(args.resolve_log_level().as_deref(), Some("debug"));
    }

    #[test]
    fn test_query_requires_question() {
        assert!(CliArgs::try_parse_from(["team-monitor", "query"]).is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(CliArgs::try_parse_from(["team-monitor"]).is_err());
    }

    #[test]
    fn test_config_flag_wins() {
        let args = parse(&["team-monitor", "--config", "/tmp/custom.toml", "status"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/custom.toml"));
        assert_eq!(args.command, Command::Status);
    }

    #[test]
    fn test_port_flag_wins() {
        let args = parse(&["team-monitor", "serve", "--port", "8088"]);
        assert_eq!(args.resolve_port(5000), 8088);
    }

    #[test]
    fn test_init_force_flag() {
        assert_eq!(
            parse(&["team-monitor", "init"]).command,
            Command::Init { force: false }
        );
        let args = parse(&["team-monitor", "-c", "/tmp/tm.toml", "init", "--force"]);
        assert_eq!(args.command, Command::Init { force: true });
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/tm.toml"));
    }

    #[test]
    fn test_question_only_for_query() {
        assert_eq!(parse(&["team-monitor", "status"]).command.question(), None);
    }
}
