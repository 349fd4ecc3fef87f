//! # Project Cleaner
//!
//! Deletes aged projects and empty folders below a Google Cloud folder, then
//! optionally sweeps organization resources that point at deleted projects.
//!
//! ## Usage
//!
//! ```bash
//! # Long-running Pub/Sub push endpoint (Cloud Run), one sweep per message
//! project-cleaner serve --port 8080
//!
//! # One sweep, exit code reflects the result (Cloud Scheduler job, cron)
//! project-cleaner run
//! ```
//!
//! All cleanup settings come from the environment; see `config::cleanup`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use project_cleaner::constants::DEFAULT_SERVER_PORT;
use project_cleaner::runtime;
use project_cleaner::server::{start_server, ServerState};
use std::sync::Arc;
use tracing::info;

/// Project Cleaner
#[derive(Parser)]
#[command(name = "project-cleaner", version)]
#[command(
    about = "Deletes aged projects and empty folders from a Google Cloud folder hierarchy",
    long_about = None,
    after_help = "\
Examples:
  project-cleaner serve --port 8080
  TARGET_FOLDER_ID=1234 MAX_PROJECT_AGE_HOURS=24 project-cleaner run
"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the Pub/Sub push endpoint, metrics and probes (default)
    Serve(ServeArgs),
    /// Run one cleanup sweep and exit
    Run,
}

#[derive(Args, Debug, PartialEq, Eq)]
struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_SERVER_PORT)]
    port: u16,
}

/// Wrapper so a bare invocation parses `serve` with the same rules
#[derive(Parser)]
#[command(name = "project-cleaner")]
struct DefaultServe {
    #[command(flatten)]
    serve: ServeArgs,
}

impl Cli {
    /// The requested command, `serve` when none is given
    ///
    /// # Errors
    /// Returns the clap error for an invalid `PORT` on the implicit `serve`.
    fn into_command(self) -> Result<Commands, clap::Error> {
        match self.command {
            Some(command) => Ok(command),
            None => DefaultServe::try_parse_from(["project-cleaner"])
                .map(|default| Commands::Serve(default.serve)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let command = Cli::parse().into_command().unwrap_or_else(|e| e.exit());
    let cleaner = runtime::initialize().await?;

    match command {
        Commands::Serve(ServeArgs { port }) => {
            let state = Arc::new(ServerState::new(cleaner));
            state.mark_ready();
            start_server(port, state).await
        }
        Commands::Run => {
            let report = cleaner.run().await.context("Cleanup run failed")?;
            info!(
                deleted = report.total_deleted(),
                failed = report.total_failed(),
                "Cleanup run complete"
            );
            Ok(())
        }
    }
}
