//! Manual sync with a spinner.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use worklog_core::{GitCli, SyncEngine, SyncProgress};

use crate::config::Config;
use crate::error::CliError;

/// Terminal spinner shown while a sync runs.
pub struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self { bar }
    }
}

impl Default for SpinnerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncProgress for SpinnerProgress {
    fn begin(&self, message: &str) {
        self.bar.set_message(message.to_string());
        self.bar.enable_steady_tick(Duration::from_millis(100));
    }

    fn finish(&self, success: bool) {
        if success {
            self.bar
                .finish_with_message(format!("{} Work log synced", "✓".green()));
        } else {
            self.bar
                .abandon_with_message(format!("{} Sync failed (see log for details)", "✗".red()));
        }
    }
}

pub async fn execute(config: &Config) -> Result<()> {
    let engine = SyncEngine::new(config.sync_config(), Arc::new(GitCli::new()));
    if !engine.initialize().await {
        return Err(CliError::SyncNotConfigured(Config::config_path().display().to_string()).into());
    }

    let synced = engine.force_sync(&SpinnerProgress::new()).await;
    if !synced {
        anyhow::bail!("Sync of {} failed", engine.config().export_dir.display());
    }
    Ok(())
}
