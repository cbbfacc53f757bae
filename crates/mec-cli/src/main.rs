//! # mec CLI entry point
//!
//! Parses command-line arguments, builds the API client and dispatches to
//! the command runner.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mec_api_client::config::DEFAULT_BASE_URL;
use mec_api_client::{AdminApiClient, AdminApiConfig};
use mec_cli::commands::{run_command, Command, Session, EXIT_FAILURE};
use mec_cli::notice::{ConsoleNotifier, PromptConfirm};

/// MEC admin console.
///
/// Lists, edits and deletes banners, clients, projects, works, reviews,
/// subscribers and enquiries through the admin API, and manages the media
/// they reference.
#[derive(Parser, Debug)]
#[command(name = "mec", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Admin API base URL. Overrides MEC_API_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token. Overrides MEC_API_TOKEN.
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let config = resolve_config(cli.base_url.as_deref(), cli.token.as_deref())?;
    tracing::debug!(?config, "resolved API configuration");
    let client = AdminApiClient::new(config).context("cannot build API client")?;

    let session = Session {
        backend: Arc::new(client),
        notifier: Arc::new(ConsoleNotifier),
        confirm: Arc::new(PromptConfirm),
    };

    let runtime = tokio::runtime::Runtime::new().context("cannot start async runtime")?;
    let mut stdout = std::io::stdout().lock();
    runtime.block_on(run_command(cli.command, &session, &mut stdout))
}

/// Environment configuration with command-line overrides applied.
fn resolve_config(base_url: Option<&str>, token: Option<&str>) -> Result<AdminApiConfig> {
    let config = match token {
        Some(token) => match AdminApiConfig::from_env() {
            Ok(config) => config.with_token(token),
            Err(_) => {
                let base = std::env::var("MEC_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
                AdminApiConfig::new(&base, token)?
            }
        },
        None => AdminApiConfig::from_env().context("no API token: set MEC_API_TOKEN or pass --token")?,
    };
    match base_url {
        Some(url) => Ok(config.with_base_url(url)?),
        None => Ok(config),
    }
}
