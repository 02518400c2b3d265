//! Session summaries.
//!
//! A [`Summarizer`] asks its [`TextGenerator`] for a JSON summary embedded in
//! free text. When no generator is configured, the call fails, or the text has
//! no usable object, [`Summarizer::summarize`] falls back to a summary computed
//! from the session itself.

mod generator;

pub use generator::*;

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::SummaryConfig;
use crate::error::{Error, Result};
use crate::time::{Clock, SystemClock};
use crate::types::{EventKind, ResolvedIssue, Session, Summary, TaskStatus};

/// Per-event content cap inside the prompt.
const MAX_EVENT_CHARS: usize = 500;

pub const SYSTEM_PROMPT: &str = "You summarize a developer's work session. \
Reply with a single JSON object with keys \"summary\" (string), \
\"tasksCompleted\" (array of strings), \"issuesResolved\" (array of objects \
with \"description\" and \"resolution\"), \"keyConversations\" (array of \
strings) and \"filesModified\" (array of strings).";

pub struct Summarizer {
    generator: Option<Arc<dyn TextGenerator>>,
    clock: Arc<dyn Clock>,
    max_prompt_chars: usize,
}

impl Summarizer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, config: &SummaryConfig) -> Self {
        Self {
            generator,
            clock: Arc::new(SystemClock),
            max_prompt_chars: config.max_prompt_chars,
        }
    }

    /// Summarizer that always computes the summary locally.
    pub fn offline(config: &SummaryConfig) -> Self {
        Self::new(None, config)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Summarize, degrading to [`fallback_summary`] on any failure.
    pub async fn summarize(&self, session: &Session) -> Summary {
        if self.generator.is_none() {
            return fallback_summary(session, self.clock.now());
        }
        match self.try_summarize(session).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(
                    session_id = %session.id,
                    error = %e,
                    "Summary generation failed, using fallback"
                );
                fallback_summary(session, self.clock.now())
            }
        }
    }

    /// Summarize through the generator, surfacing every failure.
    pub async fn try_summarize(&self, session: &Session) -> Result<Summary> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| Error::Generation("No text generator configured".to_string()))?;
        let prompt = build_prompt(session, self.max_prompt_chars);
        debug!(session_id = %session.id, prompt_chars = prompt.len(), "Generating summary");
        let text = generator.generate(SYSTEM_PROMPT, &prompt).await?;
        parse_summary(&text, self.clock.now())
    }
}

/// Render session content as the user prompt, capped at `max_chars` characters.
pub fn build_prompt(session: &Session, max_chars: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Session {}", session.id);
    if let Some(ws) = &session.workspace {
        let _ = writeln!(out, "Workspace: {}", ws);
    }
    if let Some(d) = session.duration() {
        let _ = writeln!(out, "Duration: {} minutes", d.num_minutes());
    }

    if !session.tasks.is_empty() {
        out.push_str("\nTasks:\n");
        for task in &session.tasks {
            let mark = if task.status == TaskStatus::Completed { "x" } else { " " };
            let _ = writeln!(out, "- [{}] {}", mark, task.description);
        }
    }

    if !session.issues.is_empty() {
        out.push_str("\nIssues:\n");
        for issue in &session.issues {
            match &issue.resolution {
                Some(r) if issue.resolved => {
                    let _ = writeln!(out, "- {} (resolved: {})", issue.description, r);
                }
                _ => {
                    let _ = writeln!(out, "- {} (open)", issue.description);
                }
            }
        }
    }

    if !session.events.is_empty() {
        out.push_str("\nActivity:\n");
        for event in &session.events {
            let at = event.timestamp.with_timezone(&Local).format("%H:%M:%S");
            let _ = writeln!(
                out,
                "[{}] {}: {}",
                at,
                event.kind.label(),
                truncate(event.content.trim(), MAX_EVENT_CHARS)
            );
        }
    }

    if out.chars().count() > max_chars {
        let mut cut: String = out.chars().take(max_chars).collect();
        cut.push_str("\n[truncated]");
        return cut;
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(max).collect();
        cut.push_str("...");
        cut
    }
}

/// Slice from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GeneratedSummary {
    summary: String,
    tasks_completed: Vec<String>,
    issues_resolved: Vec<GeneratedIssue>,
    key_conversations: Vec<String>,
    files_modified: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeneratedIssue {
    description: String,
    resolution: String,
}

/// Parse generator output into a [`Summary`].
pub fn parse_summary(text: &str, generated_at: DateTime<Utc>) -> Result<Summary> {
    let json = extract_json(text).ok_or(Error::MissingSummaryJson)?;
    let parsed: GeneratedSummary = serde_json::from_str(json)?;
    Ok(Summary {
        summary: parsed.summary.trim().to_string(),
        tasks_completed: parsed.tasks_completed,
        issues_resolved: parsed
            .issues_resolved
            .into_iter()
            .map(|i| ResolvedIssue {
                description: i.description,
                resolution: i.resolution,
            })
            .collect(),
        key_conversations: parsed.key_conversations,
        files_modified: parsed.files_modified,
        generated_at: crate::time::truncate_millis(generated_at),
    })
}

/// Summary computed from session content alone.
pub fn fallback_summary(session: &Session, generated_at: DateTime<Utc>) -> Summary {
    let count = |kind: EventKind| session.events.iter().filter(|e| e.kind == kind).count();
    let completed: Vec<String> = session
        .completed_tasks()
        .map(|t| t.description.clone())
        .collect();
    let resolved: Vec<ResolvedIssue> = session
        .resolved_issues()
        .map(|i| ResolvedIssue {
            description: i.description.clone(),
            resolution: i.resolution.clone().unwrap_or_default(),
        })
        .collect();

    let summary = format!(
        "Recorded {} events ({} terminal, {} file, {} clipboard). \
         Completed {} of {} tasks and resolved {} of {} issues.",
        session.events.len(),
        count(EventKind::Terminal),
        count(EventKind::File),
        count(EventKind::Clipboard),
        completed.len(),
        session.tasks.len(),
        resolved.len(),
        session.issues.len(),
    );

    Summary {
        summary,
        tasks_completed: completed,
        issues_resolved: resolved,
        key_conversations: Vec::new(),
        files_modified: session.modified_files(),
        generated_at: crate::time::truncate_millis(generated_at),
    }
}
