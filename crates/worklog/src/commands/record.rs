//! Recording loop.
//!
//! Reads JSON lines from stdin and drives the session manager with them:
//!
//! ```text
//! {"type":"event","kind":"terminal","content":"cargo test"}
//! {"type":"task","description":"Fix rounding"}
//! {"type":"complete_task","id":"<task id>"}
//! {"type":"issue","description":"Totals off by a cent"}
//! {"type":"resolve_issue","id":"<issue id>","resolution":"Use decimal"}
//! {"type":"start","workspace":"billing"}
//! {"type":"end"}
//! ```
//!
//! Finished sessions are summarized, saved and exported by a worker task.
//! EOF or Ctrl-C ends the active session, drains the worker, closes the store
//! and disposes the sync engine (one last sync).

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use worklog_core::{
    ChannelObserver, DailyExporter, Event, EventKind, GitCli, Session, SessionManager,
    SessionStore, Summarizer, SyncEngine,
};

use crate::config::Config;
use crate::error::{CliError, CliResult};

/// One line of recorder input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecorderInput {
    Event {
        kind: EventKind,
        content: String,
        #[serde(default)]
        metadata: Option<BTreeMap<String, String>>,
    },
    Task {
        description: String,
    },
    CompleteTask {
        id: String,
    },
    Issue {
        description: String,
    },
    ResolveIssue {
        id: String,
        resolution: String,
    },
    Start {
        #[serde(default)]
        workspace: Option<String>,
    },
    End,
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line_no: usize, line: &str) -> CliResult<Option<RecorderInput>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| CliError::InvalidInput {
            line: line_no,
            message: e.to_string(),
        })
}

/// Apply one input to the manager. Returns a line for the user, if any.
pub fn apply(
    manager: &SessionManager,
    input: RecorderInput,
    workspace: Option<&str>,
) -> Option<String> {
    match input {
        RecorderInput::Event {
            kind,
            content,
            metadata,
        } => {
            let mut event = Event::new(kind, content);
            event.metadata = metadata;
            manager.add_event(event);
            None
        }
        RecorderInput::Task { description } => match manager.add_task(description) {
            Some(task) => Some(format!("task {} added", task.id)),
            None => {
                warn!("No active session; task ignored");
                None
            }
        },
        RecorderInput::CompleteTask { id } => match manager.complete_task(&id) {
            Some(task) => Some(format!("task {} completed", task.id)),
            None => {
                warn!(task_id = %id, "Task not found in active session");
                None
            }
        },
        RecorderInput::Issue { description } => match manager.add_issue(description) {
            Some(issue) => Some(format!("issue {} added", issue.id)),
            None => {
                warn!("No active session; issue ignored");
                None
            }
        },
        RecorderInput::ResolveIssue { id, resolution } => {
            match manager.resolve_issue(&id, resolution) {
                Some(issue) => Some(format!("issue {} resolved", issue.id)),
                None => {
                    warn!(issue_id = %id, "Issue not found in active session");
                    None
                }
            }
        }
        RecorderInput::Start { workspace: ws } => {
            let session = manager.start(ws.or_else(|| workspace.map(str::to_string)));
            Some(format!("session {} started", session.id))
        }
        RecorderInput::End => manager
            .end()
            .map(|session| format!("session {} ended", session.id)),
    }
}

/// Summarize, save and export one finished session.
async fn finish_session(
    session: Session,
    summarizer: &Summarizer,
    manager: &SessionManager,
    store: &SessionStore,
    exporter: &DailyExporter,
) {
    let mut session = session;
    let summary = summarizer.summarize(&session).await;
    manager.update_summary(&session.id, summary.clone());
    session.summary = Some(summary);

    if let Err(e) = store.save_session(&session) {
        warn!(session_id = %session.id, error = %e, "Failed to save summarized session");
    }
    match exporter.export_session(&session) {
        Ok(path) => info!(session_id = %session.id, path = ?path, "Session exported"),
        Err(e) => warn!(session_id = %session.id, error = %e, "Failed to export session"),
    }
}

async fn run_worker(
    mut finished: mpsc::UnboundedReceiver<Session>,
    mut shutdown: oneshot::Receiver<()>,
    summarizer: Summarizer,
    manager: SessionManager,
    store: Arc<SessionStore>,
    exporter: DailyExporter,
) {
    loop {
        tokio::select! {
            biased;
            Some(session) = finished.recv() => {
                finish_session(session, &summarizer, &manager, &store, &exporter).await;
            }
            _ = &mut shutdown => {
                while let Ok(session) = finished.try_recv() {
                    finish_session(session, &summarizer, &manager, &store, &exporter).await;
                }
                break;
            }
        }
    }
}

pub async fn execute(workspace: Option<String>, config: &Config) -> Result<()> {
    let store = Arc::new(super::open_store(config)?);
    let summarizer = super::build_summarizer(config)?;
    let exporter = DailyExporter::new(config.export_dir());

    let (channel, finished) = ChannelObserver::new();
    let manager = SessionManager::builder(config.session.clone())
        .observer(store.clone())
        .observer(Arc::new(channel))
        .default_workspace(workspace.clone())
        .build();
    manager.restore_history(store.all_sessions());

    let sync = SyncEngine::new(config.sync_config(), Arc::new(GitCli::new()));
    if !sync.initialize().await {
        info!("Sync disabled for this run");
    }

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let worker = tokio::spawn(run_worker(
        finished,
        shutdown_rx,
        summarizer,
        manager.clone(),
        store.clone(),
        exporter,
    ));

    if workspace.is_some() {
        manager.start(workspace.clone());
    }
    eprintln!("{} Recording. Send JSON lines on stdin; Ctrl-D or Ctrl-C to stop.", "●".red());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut line_no = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                line_no += 1;
                match parse_line(line_no, &line) {
                    Ok(Some(input)) => {
                        if let Some(msg) = apply(&manager, input, workspace.as_deref()) {
                            println!("{}", msg);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!("{}", e),
                }
            }
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        }
    }

    if let Some(session) = manager.end() {
        println!("session {} ended", session.id);
    }
    let _ = shutdown_tx.send(());
    worker.await.context("Session worker panicked")?;

    store.close().context("Failed to close session store")?;
    sync.dispose().await;

    eprintln!("{} Stopped. {} sessions today.", "■".dimmed(), manager.todays_sessions().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use worklog_core::{SessionConfig, SessionState, SummaryConfig};

    fn manager() -> SessionManager {
        SessionManager::new(SessionConfig {
            timeout_minutes: 0,
            flush_debounce_secs: 0,
            ..Default::default()
        })
    }

    #[test]
    fn test_parse_event_line() {
        let input = parse_line(
            1,
            r#"{"type":"event","kind":"file","content":"lib.rs","metadata":{"path":"src/lib.rs"}}"#,
        )
        .unwrap()
        .unwrap();
        match input {
            RecorderInput::Event {
                kind,
                content,
                metadata,
            } => {
                assert_eq!(kind, EventKind::File);
                assert_eq!(content, "lib.rs");
                assert_eq!(metadata.unwrap()["path"], "src/lib.rs");
            }
            other => panic!("unexpected input: {other:?}"),
        }
    }

    #[test]
    fn test_parse_control_lines() {
        assert_eq!(
            parse_line(1, r#"{"type":"resolve_issue","id":"i1","resolution":"done"}"#).unwrap(),
            Some(RecorderInput::ResolveIssue {
                id: "i1".to_string(),
                resolution: "done".to_string()
            })
        );
        assert_eq!(
            parse_line(2, r#"{"type":"start"}"#).unwrap(),
            Some(RecorderInput::Start { workspace: None })
        );
        assert_eq!(parse_line(3, r#"{"type":"end"}"#).unwrap(), Some(RecorderInput::End));
        assert_eq!(parse_line(4, "   ").unwrap(), None);
        assert_eq!(parse_line(5, "# note").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        match parse_line(7, r#"{"type":"event","kind":"screen","content":"x"}"#) {
            Err(CliError::InvalidInput { line, .. }) => assert_eq!(line, 7),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(parse_line(8, "not json").is_err());
    }

    #[tokio::test]
    async fn test_apply_drives_session_lifecycle() {
        let manager = manager();
        let workspace = Some("billing");

        let orphan = RecorderInput::Task {
            description: "x".into(),
        };
        assert!(apply(&manager, orphan, workspace).is_none());

        apply(&manager, RecorderInput::Start { workspace: None }, workspace);
        assert_eq!(manager.current().unwrap().workspace.as_deref(), Some("billing"));

        apply(
            &manager,
            RecorderInput::Event {
                kind: EventKind::Terminal,
                content: "cargo test".into(),
                metadata: None,
            },
            workspace,
        );
        let task = RecorderInput::Task {
            description: "Fix rounding".into(),
        };
        apply(&manager, task, workspace);
        let task_id = manager.current().unwrap().tasks[0].id.clone();
        let msg = apply(&manager, RecorderInput::CompleteTask { id: task_id }, workspace);
        assert!(msg.unwrap().ends_with("completed"));

        let msg = apply(&manager, RecorderInput::End, workspace).unwrap();
        assert!(msg.ends_with("ended"));
        assert_eq!(manager.state(), SessionState::NoSession);

        let ended = &manager.history()[0];
        assert_eq!(ended.events.len(), 1);
        assert_eq!(ended.completed_tasks().count(), 1);
    }

    #[tokio::test]
    async fn test_worker_summarizes_saves_and_exports() {
        let temp = tempdir().expect("Failed to create temp dir");
        let store = Arc::new(SessionStore::open(temp.path().join("sessions.json")));
        let exporter = DailyExporter::new(temp.path().join("logs"));
        let summarizer = Summarizer::offline(&SummaryConfig::default());

        let (channel, finished) = ChannelObserver::new();
        let manager = SessionManager::builder(SessionConfig {
            timeout_minutes: 0,
            flush_debounce_secs: 0,
            ..Default::default()
        })
        .observer(store.clone())
        .observer(Arc::new(channel))
        .build();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let worker = tokio::spawn(run_worker(
            finished,
            shutdown_rx,
            summarizer,
            manager.clone(),
            store.clone(),
            exporter.clone(),
        ));

        manager.add_event(Event::new(EventKind::File, "src/lib.rs"));
        let ended = manager.end().unwrap();
        shutdown_tx.send(()).unwrap();
        worker.await.unwrap();

        let saved = store.get_session(&ended.id).unwrap();
        let summary = saved.summary.unwrap();
        assert!(summary.summary.starts_with("Recorded 1 events"));
        assert_eq!(summary.files_modified, vec!["src/lib.rs".to_string()]);
        assert!(manager.history()[0].summary.is_some());

        let day = worklog_core::time::local_date(&ended.start_time);
        let content = std::fs::read_to_string(exporter.day_path(day)).unwrap();
        assert!(content.contains("- `src/lib.rs`"));
    }
}
