//! Core configuration
//!
//! Options consumed by the session manager, sync engine and summarizer.
//! The CLI layers these into its TOML config file.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session lifecycle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Events held before the buffer flushes on its own (default: 50)
    pub buffer_max_size: usize,

    /// Minutes without activity before the session ends (default: 30, 0 disables)
    pub timeout_minutes: u64,

    /// Seconds after the last event before buffered events are flushed (default: 5, 0 disables)
    pub flush_debounce_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffer_max_size: 50,
            timeout_minutes: 30,
            flush_debounce_secs: 5,
        }
    }
}

impl SessionConfig {
    pub fn inactivity_timeout(&self) -> Option<Duration> {
        (self.timeout_minutes > 0)
            .then(|| Duration::from_secs(self.timeout_minutes.saturating_mul(60)))
    }

    pub fn flush_debounce(&self) -> Option<Duration> {
        (self.flush_debounce_secs > 0).then(|| Duration::from_secs(self.flush_debounce_secs))
    }
}

/// Export sync configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Directory holding the exported daily logs
    pub export_dir: PathBuf,

    /// Remote repository: URL, local path or `owner/repo` shorthand
    pub remote: Option<String>,

    /// Name the remote is registered under (default: origin)
    pub remote_name: String,

    /// Minutes between periodic syncs (default: 15, 0 disables the timer)
    pub interval_minutes: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("worklog"),
            remote: None,
            remote_name: "origin".to_string(),
            interval_minutes: 15,
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_minutes > 0)
            .then(|| Duration::from_secs(self.interval_minutes.saturating_mul(60)))
    }

    /// Resolve the configured remote into something `git` accepts.
    ///
    /// `owner/repo` expands to a GitHub HTTPS URL; anything that already
    /// looks like a URL or a path is returned unchanged.
    pub fn remote_url(&self) -> Option<String> {
        let remote = self.remote.as_deref()?.trim();
        if remote.is_empty() {
            return None;
        }
        let is_shorthand = !remote.contains("://")
            && !remote.starts_with("git@")
            && !remote.starts_with('/')
            && !remote.starts_with('.')
            && remote.matches('/').count() == 1;
        if is_shorthand {
            Some(format!("https://github.com/{}.git", remote.trim_end_matches(".git")))
        } else {
            Some(remote.to_string())
        }
    }
}

/// Text-generation configuration for session summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Chat-completions endpoint; summaries fall back to computed ones when unset
    pub endpoint: Option<String>,

    /// Model name sent with each request
    pub model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Maximum characters of session content included in the prompt
    pub max_prompt_chars: usize,

    /// Seconds before a summary request is abandoned (default: 30)
    pub timeout_secs: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: "gpt-4o-mini".to_string(),
            api_key_env: "WORKLOG_API_KEY".to_string(),
            max_prompt_chars: 12_000,
            timeout_secs: 30,
        }
    }
}

impl SummaryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
