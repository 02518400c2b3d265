//! worklog - work session recorder
//!
//! Records activity into bounded sessions, writes a daily Markdown log and
//! keeps it synced to a git remote.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod config;
mod error;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("worklog=info".parse()?))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = config::Config::load()?;

    // Execute command
    match cli.command {
        Commands::Record { workspace } => commands::record::execute(workspace, &config).await,
        Commands::Sessions { date, json } => {
            commands::sessions::list(date.as_deref(), json, &config).await
        }
        Commands::Show { session_id, json } => {
            commands::sessions::show(&session_id, json, &config).await
        }
        Commands::Delete { session_id } => commands::sessions::delete(&session_id, &config).await,
        Commands::Export { date } => commands::export::execute(date.as_deref(), &config).await,
        Commands::Summarize { session_id, offline } => {
            commands::summarize::execute(&session_id, offline, &config).await
        }
        Commands::Sync => commands::sync::execute(&config).await,
        Commands::Config => commands::config::execute(&config).await,
        Commands::Version => {
            println!("worklog {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
