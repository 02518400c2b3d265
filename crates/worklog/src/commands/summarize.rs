//! Manual summary generation.
//!
//! Unlike the recorder, failures here are reported to the user instead of
//! silently falling back.

use anyhow::{Context, Result};
use colored::Colorize;

use worklog_core::Summarizer;

use super::sessions::find_session;
use super::{build_summarizer, open_store};
use crate::config::Config;

pub async fn execute(session_id: &str, offline: bool, config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let mut session = find_session(&store.all_sessions(), session_id)?;

    let summary = if offline {
        Summarizer::offline(&config.summary).summarize(&session).await
    } else {
        build_summarizer(config)?
            .try_summarize(&session)
            .await
            .context("Failed to generate summary")?
    };

    session.summary = Some(summary.clone());
    store
        .save_session(&session)
        .context("Failed to save session")?;

    println!("{} Summary for {}", "✓".green(), session.id.cyan());
    println!();
    println!("{}", summary.summary);
    if !summary.tasks_completed.is_empty() {
        println!();
        println!("{}", "Completed".bold());
        for task in &summary.tasks_completed {
            println!("  - {}", task);
        }
    }
    if !summary.files_modified.is_empty() {
        println!();
        println!("{}", "Files".bold());
        for file in &summary.files_modified {
            println!("  - {}", file);
        }
    }
    Ok(())
}
