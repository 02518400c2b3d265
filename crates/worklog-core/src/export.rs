//! Daily Markdown export.
//!
//! One file per local calendar day (`<dir>/YYYY-MM-DD.md`) with a section
//! appended per finished session. Rendering depends only on session content,
//! so identical sessions always produce identical text.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::error::Result;
use crate::time;
use crate::types::Session;

/// Writes sessions into per-day Markdown logs.
#[derive(Debug, Clone)]
pub struct DailyExporter {
    dir: PathBuf,
}

impl DailyExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the log for `date`.
    pub fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.md", date.format("%Y-%m-%d")))
    }

    /// Append `session` to the log of the day it started on.
    pub fn export_session(&self, session: &Session) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let date = time::local_date(&session.start_time);
        let path = self.day_path(date);

        let mut content = String::new();
        if !path.exists() {
            content.push_str(&render_header(date));
        }
        content.push_str(&render_session(session));

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(content.as_bytes())?;
        debug!(session_id = %session.id, path = ?path, "Session exported");
        Ok(path)
    }

    /// Rewrite the whole log for `date` from `sessions`, in start order.
    pub fn export_day(&self, date: NaiveDate, sessions: &[Session]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.day_path(date);
        fs::write(&path, render_day(date, sessions))?;
        info!(date = %date, sessions = sessions.len(), path = ?path, "Day exported");
        Ok(path)
    }
}

pub fn render_header(date: NaiveDate) -> String {
    format!("# Work Log {}\n\n", date.format("%Y-%m-%d"))
}

/// Full day document: header plus every session sorted by start time.
pub fn render_day(date: NaiveDate, sessions: &[Session]) -> String {
    let mut ordered: Vec<&Session> = sessions.iter().collect();
    ordered.sort_by_key(|s| s.start_time);
    let mut out = render_header(date);
    for session in ordered {
        out.push_str(&render_session(session));
    }
    out
}

/// Markdown section for one session.
pub fn render_session(session: &Session) -> String {
    let start = session.start_time.with_timezone(&Local).format("%H:%M");
    let end = session
        .end_time
        .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "ongoing".to_string());

    let mut lines = Vec::new();
    match &session.workspace {
        Some(ws) => lines.push(format!("## {start} - {end} ({ws})")),
        None => lines.push(format!("## {start} - {end}")),
    }
    lines.push(String::new());

    lines.push("### Summary".to_string());
    lines.push(String::new());
    match &session.summary {
        Some(summary) if !summary.summary.trim().is_empty() => {
            lines.push(summary.summary.trim().to_string())
        }
        _ => lines.push("_No summary available._".to_string()),
    }
    lines.push(String::new());

    let tasks = completed_tasks(session);
    if !tasks.is_empty() {
        lines.push("### Completed Tasks".to_string());
        lines.push(String::new());
        lines.extend(tasks.iter().map(|t| format!("- [x] {t}")));
        lines.push(String::new());
    }

    let issues = issue_pairs(session);
    if !issues.is_empty() {
        lines.push("### Issues".to_string());
        lines.push(String::new());
        for (description, resolution) in &issues {
            lines.push(format!("- **{description}**"));
            match resolution {
                Some(r) => lines.push(format!("  - Resolution: {r}")),
                None => lines.push("  - Open".to_string()),
            }
        }
        lines.push(String::new());
    }

    if let Some(summary) = &session.summary {
        if !summary.key_conversations.is_empty() {
            lines.push("### Key Conversations".to_string());
            lines.push(String::new());
            lines.extend(summary.key_conversations.iter().map(|c| format!("- {c}")));
            lines.push(String::new());
        }
    }

    let files = modified_files(session);
    if !files.is_empty() {
        lines.push("### Files Modified".to_string());
        lines.push(String::new());
        lines.extend(files.iter().map(|f| format!("- `{f}`")));
        lines.push(String::new());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    let item = item.trim();
    if !item.is_empty() && !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

fn completed_tasks(session: &Session) -> Vec<String> {
    let mut tasks = Vec::new();
    for task in session.completed_tasks() {
        push_unique(&mut tasks, &task.description);
    }
    if let Some(summary) = &session.summary {
        for task in &summary.tasks_completed {
            push_unique(&mut tasks, task);
        }
    }
    tasks
}

fn issue_pairs(session: &Session) -> Vec<(String, Option<String>)> {
    let mut pairs: Vec<(String, Option<String>)> = session
        .issues
        .iter()
        .map(|i| {
            let resolution = if i.resolved {
                Some(i.resolution.clone().unwrap_or_else(|| "resolved".to_string()))
            } else {
                None
            };
            (i.description.trim().to_string(), resolution)
        })
        .collect();
    if let Some(summary) = &session.summary {
        for resolved in &summary.issues_resolved {
            let description = resolved.description.trim();
            if !description.is_empty() && !pairs.iter().any(|(d, _)| d == description) {
                pairs.push((description.to_string(), Some(resolved.resolution.clone())));
            }
        }
    }
    pairs
}

fn modified_files(session: &Session) -> Vec<String> {
    let mut files = Vec::new();
    if let Some(summary) = &session.summary {
        for file in &summary.files_modified {
            push_unique(&mut files, file);
        }
    }
    for file in session.modified_files() {
        push_unique(&mut files, &file);
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Event, EventKind, Issue, ResolvedIssue, Summary, Task, TaskStatus};
    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::tempdir;

    fn local(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
        Local
            .from_local_datetime(&date.and_hms_opt(hour, minute, 0).unwrap())
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn sample_session() -> Session {
        let start = local(day(), 9, 15);
        let mut session = Session::new(start, Some("billing-service".to_string()));
        session.end_time = Some(local(day(), 10, 40));
        session.is_active = false;
        session.events.push(Event::new(EventKind::File, "src/invoice.rs"));
        session.events.push(Event::new(EventKind::Terminal, "cargo test"));
        session.tasks.push(Task {
            id: "t1".to_string(),
            description: "Fix rounding".to_string(),
            status: TaskStatus::Completed,
            created_at: start,
            completed_at: Some(start),
            session_id: session.id.clone(),
        });
        session.tasks.push(Task {
            id: "t2".to_string(),
            description: "Write changelog".to_string(),
            status: TaskStatus::Pending,
            created_at: start,
            completed_at: None,
            session_id: session.id.clone(),
        });
        session.issues.push(Issue {
            id: "i1".to_string(),
            description: "Totals off by a cent".to_string(),
            resolution: Some("Switched to decimal".to_string()),
            resolved: true,
            created_at: start,
            resolved_at: Some(start),
            session_id: session.id.clone(),
        });
        session.issues.push(Issue {
            id: "i2".to_string(),
            description: "CI is slow".to_string(),
            resolution: None,
            resolved: false,
            created_at: start,
            resolved_at: None,
            session_id: session.id.clone(),
        });
        session.summary = Some(Summary {
            summary: "Fixed invoice rounding.".to_string(),
            tasks_completed: vec!["Fix rounding".to_string(), "Add tests".to_string()],
            issues_resolved: vec![ResolvedIssue {
                description: "Flaky fixture".to_string(),
                resolution: "Seeded RNG".to_string(),
            }],
            key_conversations: vec!["Agreed to drop f64 for money".to_string()],
            files_modified: vec!["src/money.rs".to_string()],
            generated_at: start,
        });
        session
    }

    const EXPECTED: &str = "\
## 09:15 - 10:40 (billing-service)

### Summary

Fixed invoice rounding.

### Completed Tasks

- [x] Fix rounding
- [x] Add tests

### Issues

- **Totals off by a cent**
  - Resolution: Switched to decimal
- **CI is slow**
  - Open
- **Flaky fixture**
  - Resolution: Seeded RNG

### Key Conversations

- Agreed to drop f64 for money

### Files Modified

- `src/money.rs`
- `src/invoice.rs`

";

    #[test]
    fn test_render_session_exact_text() {
        assert_eq!(render_session(&sample_session()), EXPECTED);
    }

    #[test]
    fn test_render_minimal_session() {
        let session = Session::new(local(day(), 8, 0), None);
        assert_eq!(
            render_session(&session),
            "## 08:00 - ongoing\n\n### Summary\n\n_No summary available._\n\n"
        );
    }

    #[test]
    fn test_export_appends_under_single_header() {
        let temp = tempdir().expect("Failed to create temp dir");
        let exporter = DailyExporter::new(temp.path().join("logs"));
        let session = sample_session();

        let path = exporter.export_session(&session).unwrap();
        exporter.export_session(&session).unwrap();

        assert_eq!(path, temp.path().join("logs").join("2024-01-15.md"));
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            format!("# Work Log 2024-01-15\n\n{EXPECTED}{EXPECTED}")
        );
    }

    #[test]
    fn test_export_day_rewrites_in_start_order() {
        let temp = tempdir().expect("Failed to create temp dir");
        let exporter = DailyExporter::new(temp.path());
        let late = Session {
            end_time: Some(local(day(), 15, 0)),
            is_active: false,
            ..Session::new(local(day(), 14, 0), None)
        };
        let early = sample_session();

        let path = exporter
            .export_day(day(), &[late.clone(), early.clone()])
            .unwrap();

        let expected = format!(
            "# Work Log 2024-01-15\n\n{}{}",
            render_session(&early),
            render_session(&late)
        );
        assert_eq!(fs::read_to_string(path).unwrap(), expected);
    }
}
