//! Command implementations for worklog CLI.
//!
//! Each submodule implements the logic for one command.

pub mod config;
pub mod export;
pub mod record;
pub mod sessions;
pub mod summarize;
pub mod sync;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use worklog_core::summary::HttpTextGenerator;
use worklog_core::{SessionStore, Summarizer, TextGenerator};

use crate::config::Config;
use crate::error::{CliError, CliResult};

/// Open the session store named by the config.
pub(crate) fn open_store(config: &Config) -> Result<SessionStore> {
    config.ensure_dirs()?;
    Ok(SessionStore::open(config.store_path()))
}

/// Summarizer backed by the configured endpoint, or a local one if unset.
pub(crate) fn build_summarizer(config: &Config) -> Result<Summarizer> {
    let generator = HttpTextGenerator::from_config(&config.summary)
        .context("Invalid summary configuration")?
        .map(|g| Arc::new(g) as Arc<dyn TextGenerator>);
    Ok(Summarizer::new(generator, &config.summary))
}

/// Parse a `YYYY-MM-DD` argument, defaulting to today.
pub(crate) fn parse_date(date: Option<&str>) -> CliResult<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| CliError::InvalidDate(s.to_string())),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// First eight characters of an id, for tables.
pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
