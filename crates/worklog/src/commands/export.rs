//! Daily log export command.

use anyhow::{Context, Result};
use colored::Colorize;

use worklog_core::DailyExporter;

use super::{open_store, parse_date};
use crate::config::Config;

pub async fn execute(date: Option<&str>, config: &Config) -> Result<()> {
    let date = parse_date(date)?;
    let store = open_store(config)?;
    let sessions = store.sessions_by_date(date);

    let exporter = DailyExporter::new(config.export_dir());
    let path = exporter
        .export_day(date, &sessions)
        .with_context(|| format!("Failed to export {}", date))?;

    println!(
        "{} Exported {} sessions to {}",
        "✓".green(),
        sessions.len(),
        path.display()
    );
    Ok(())
}
