//! CLI argument definitions using clap derive macros.

use clap::{Parser, Subcommand};

/// Record work sessions, export daily logs and sync them to git.
#[derive(Parser, Debug)]
#[command(name = "worklog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record activity read as JSON lines from stdin
    Record {
        /// Workspace recorded on every session
        #[arg(short, long, env = "WORKLOG_WORKSPACE")]
        workspace: Option<String>,
    },

    /// List recorded sessions
    Sessions {
        /// Only sessions started on this day (YYYY-MM-DD, local time)
        #[arg(short, long)]
        date: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show one session
    Show {
        /// Session ID
        session_id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Delete a session from the store
    Delete {
        /// Session ID
        session_id: String,
    },

    /// Rewrite the Markdown log for a day
    Export {
        /// Day to export (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Generate and store a summary for a session
    Summarize {
        /// Session ID
        session_id: String,

        /// Compute the summary locally instead of calling the endpoint
        #[arg(long)]
        offline: bool,
    },

    /// Commit and push the export directory now
    Sync,

    /// Show the effective configuration
    Config,

    /// Show version
    Version,
}
