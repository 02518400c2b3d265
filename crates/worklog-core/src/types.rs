//! Shared types for worklog-core.
//!
//! These types are used by the session manager, the durable store and the
//! exporter. Field names serialize as camelCase and every timestamp goes
//! through [`crate::time::iso8601`].

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::{self, iso8601};

// ─────────────────────────────────────────────────────────────────────────────
// Entity Types
// ─────────────────────────────────────────────────────────────────────────────

/// A bounded period of recorded activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(with = "iso8601")]
    pub start_time: DateTime<Utc>,
    #[serde(default, with = "iso8601::option")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub workspace: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub summary: Option<Summary>,
    #[serde(default)]
    pub is_active: bool,
}

impl Session {
    /// Create a new active session starting at `start_time`.
    pub fn new(start_time: DateTime<Utc>, workspace: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            start_time,
            end_time: None,
            workspace,
            events: Vec::new(),
            tasks: Vec::new(),
            issues: Vec::new(),
            summary: None,
            is_active: true,
        }
    }

    /// Wall-clock length of the session, if it has ended.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.end_time.map(|end| end - self.start_time)
    }

    /// Tasks with status `Completed`, in insertion order.
    pub fn completed_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
    }

    /// Issues marked resolved, in insertion order.
    pub fn resolved_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.resolved)
    }

    /// Distinct file paths touched by `file` events, in first-seen order.
    ///
    /// The path is taken from the `path` metadata entry when present,
    /// otherwise from the event content.
    pub fn modified_files(&self) -> Vec<String> {
        let mut files: Vec<String> = Vec::new();
        for event in self.events.iter().filter(|e| e.kind == EventKind::File) {
            let path = event
                .metadata
                .as_ref()
                .and_then(|m| m.get("path"))
                .map(String::as_str)
                .unwrap_or(event.content.as_str())
                .trim();
            if !path.is_empty() && !files.iter().any(|f| f == path) {
                files.push(path.to_string());
            }
        }
        files
    }
}

/// Kind of captured activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Terminal,
    File,
    Clipboard,
}

impl EventKind {
    /// Human label used when rendering.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Terminal => "Terminal",
            EventKind::File => "File",
            EventKind::Clipboard => "Clipboard",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventKind::Terminal => "terminal",
            EventKind::File => "file",
            EventKind::Clipboard => "clipboard",
        })
    }
}

/// One captured unit of activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    #[serde(with = "iso8601")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
}

impl Event {
    /// Create an event stamped with the current time.
    pub fn new(kind: EventKind, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: time::now_millis(),
            kind,
            content: content.into(),
            metadata: None,
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub description: String,
    pub status: TaskStatus,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "iso8601::option")]
    pub completed_at: Option<DateTime<Utc>>,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub resolved: bool,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "iso8601::option")]
    pub resolved_at: Option<DateTime<Utc>>,
    pub session_id: String,
}

/// Generated (or computed) digest of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub summary: String,
    #[serde(default)]
    pub tasks_completed: Vec<String>,
    #[serde(default)]
    pub issues_resolved: Vec<ResolvedIssue>,
    #[serde(default)]
    pub key_conversations: Vec<String>,
    #[serde(default)]
    pub files_modified: Vec<String>,
    #[serde(with = "iso8601")]
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIssue {
    pub description: String,
    #[serde(default)]
    pub resolution: String,
}
