//! Team monitor binary - composition root.
//!
//! 1. Parse the command line and load configuration from TOML
//! 2. Overlay provider credentials from the environment
//! 3. Build the Jira and GitHub clients and the query service
//! 4. Run the requested command: one-shot query, HTTP API, status check, or
//!    writing a starter config

mod cli;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use monitor_api::routes;
use monitor_api::state::AppState;
use monitor_chat::{ActivityService, ConnectionState, QueryError};
use monitor_core::config::MonitorConfig;
use monitor_core::error::MonitorError;
use monitor_providers::{GitHubClient, JiraClient};

use cli::{CliArgs, Command};

fn init_tracing(cli_level: Option<&str>, config_level: &str) {
    // --log-level beats RUST_LOG, which beats the configured level.
    let filter = match cli_level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config_level)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the provider clients and wire them into the query service.
fn build_service(config: &MonitorConfig) -> Result<ActivityService, MonitorError> {
    let timeout = Duration::from_secs(config.query.fetch_timeout_secs);
    let jira = JiraClient::new(&config.jira, timeout)?;
    let github = GitHubClient::new(&config.github, timeout)?;
    Ok(ActivityService::from_config(
        &config.query,
        Arc::new(jira),
        Arc::new(github),
    ))
}

/// Build the service, reporting construction failures to the user.
fn open_service(config: &MonitorConfig) -> Option<ActivityService> {
    match build_service(config) {
        Ok(service) => Some(service),
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialise providers");
            eprintln!("Error: {}", e);
            None
        }
    }
}

async fn run_query(service: &ActivityService, question: &str, days: Option<u32>) -> ExitCode {
    let days = days.unwrap_or_else(|| service.default_days());

    match service.answer(question, days).await {
        Ok(answer) => {
            println!("{}", answer.response.narrative);
            println!();
            println!("Summary: {}", answer.response.summary);
            ExitCode::SUCCESS
        }
        Err(QueryError::NoPersonFound) => {
            eprintln!("I couldn't tell which team member you're asking about.");
            if let Some(hint) = QueryError::NoPersonFound.suggestion() {
                eprintln!("{}", hint);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_status(service: &ActivityService) -> ExitCode {
    let report = service.check_connections().await;
    for (label, state) in [
        ("Issue tracker", &report.issue_tracker),
        ("Source control", &report.source_control),
    ] {
        match state {
            ConnectionState::Connected { user: Some(user) } => {
                println!("{}: connected as {}", label, user)
            }
            other => println!("{}: {}", label, other.describe()),
        }
    }

    if report.is_healthy() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_init(path: &Path, force: bool) -> ExitCode {
    match MonitorConfig::write_default(path, force) {
        Ok(true) => {
            println!("Wrote default configuration to {}", path.display());
            ExitCode::SUCCESS
        }
        Ok(false) => {
            eprintln!(
                "{} already exists; pass --force to overwrite it.",
                path.display()
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let (mut config, load_error) = match MonitorConfig::load(&config_file) {
        Ok(c) => (c, None),
        Err(e) => (MonitorConfig::default(), Some(e)),
    };

    // Tracing.
    init_tracing(args.resolve_log_level().as_deref(), &config.general.log_level);
    match load_error {
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
    }
    config.apply_env_overrides();

    match &args.command {
        Command::Init { force } => run_init(&config_file, *force),
        Command::Query { days, .. } => {
            let Some(service) = open_service(&config) else {
                return ExitCode::FAILURE;
            };
            let question = args.command.question().unwrap_or_default();
            run_query(&service, &question, *days).await
        }
        Command::Status => {
            let Some(service) = open_service(&config) else {
                return ExitCode::FAILURE;
            };
            run_status(&service).await
        }
        Command::Serve { .. } => {
            let Some(service) = open_service(&config) else {
                return ExitCode::FAILURE;
            };
            let port = args.resolve_port(config.general.port);
            config.general.port = port;
            tracing::info!("Starting team monitor v{}", env!("CARGO_PKG_VERSION"));

            let state = AppState::new(config, service);
            match routes::start_server(state, port).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!(error = %e, "API server stopped");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
