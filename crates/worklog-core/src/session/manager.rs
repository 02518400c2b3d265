//! Session lifecycle state machine.
//!
//! ```text
//!              start / add_event (auto-start)
//!   NoSession ─────────────────────────────────► Active
//!       ▲                                          │
//!       │   end / inactivity timeout               │ start (ends current first)
//!       └──────────────────────────────────────────┘
//! ```
//!
//! All state sits behind one mutex. It is never held across an await or while
//! observers run: notifications are collected under the lock and dispatched
//! after it is released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::observer::SessionObserver;
use crate::buffer::EventBuffer;
use crate::config::SessionConfig;
use crate::time::{self, Clock, SystemClock};
use crate::timer::{self, ScheduledTask};
use crate::types::{Event, Issue, Session, Summary, Task, TaskStatus};

/// Externally visible lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoSession,
    Active,
}

enum Notice {
    Started(Session),
    Flushed(String, Vec<Event>),
    Ended(Session),
}

struct State {
    current: Option<Session>,
    history: Vec<Session>,
    buffer: EventBuffer,
    last_activity: Option<DateTime<Utc>>,
    inactivity_timer: Option<ScheduledTask>,
    flush_timer: Option<ScheduledTask>,
}

struct Shared {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    observers: Vec<Arc<dyn SessionObserver>>,
    default_workspace: Option<String>,
    state: Mutex<State>,
}

/// Builder for [`SessionManager`]; observers can only be registered here.
pub struct SessionManagerBuilder {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    observers: Vec<Arc<dyn SessionObserver>>,
    default_workspace: Option<String>,
}

impl SessionManagerBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Workspace recorded on sessions auto-started by [`SessionManager::add_event`].
    pub fn default_workspace(mut self, workspace: Option<String>) -> Self {
        self.default_workspace = workspace;
        self
    }

    pub fn build(self) -> SessionManager {
        let buffer = EventBuffer::new(self.config.buffer_max_size);
        SessionManager {
            shared: Arc::new(Shared {
                config: self.config,
                clock: self.clock,
                observers: self.observers,
                default_workspace: self.default_workspace,
                state: Mutex::new(State {
                    current: None,
                    history: Vec::new(),
                    buffer,
                    last_activity: None,
                    inactivity_timer: None,
                    flush_timer: None,
                }),
            }),
        }
    }
}

/// Owns the active session, its event buffer and its timers.
///
/// Cloning yields another handle to the same state machine. Timers need a
/// tokio runtime; without one the manager still works but never times out.
#[derive(Clone)]
pub struct SessionManager {
    shared: Arc<Shared>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: SessionConfig) -> SessionManagerBuilder {
        SessionManagerBuilder {
            config,
            clock: Arc::new(SystemClock),
            observers: Vec::new(),
            default_workspace: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a new session, ending the current one first if there is one.
    pub fn start(&self, workspace: Option<String>) -> Session {
        let mut notices = Vec::new();
        let session = {
            let mut state = self.lock();
            self.finalize_locked(&mut state, &mut notices);
            self.begin_locked(&mut state, workspace, &mut notices)
        };
        self.dispatch(notices);
        session
    }

    /// Record an event, starting a session if none is active.
    ///
    /// Returns the id of the session the event belongs to.
    pub fn add_event(&self, event: Event) -> String {
        let mut notices = Vec::new();
        let session_id = {
            let mut state = self.lock();
            if state.current.is_none() {
                debug!("Event received with no active session; starting one");
                let workspace = self.shared.default_workspace.clone();
                self.begin_locked(&mut state, workspace, &mut notices);
            }
            self.touch_locked(&mut state);
            self.reset_flush_timer_locked(&mut state);
            if let Some(batch) = state.buffer.push(event) {
                Self::attribute_locked(&mut state, batch, &mut notices);
            }
            state
                .current
                .as_ref()
                .map(|s| s.id.clone())
                .unwrap_or_default()
        };
        self.dispatch(notices);
        session_id
    }

    /// Drain buffered events into the active session. Returns how many moved.
    pub fn flush(&self) -> usize {
        let mut notices = Vec::new();
        let count = {
            let mut state = self.lock();
            state.flush_timer = None;
            let batch = state.buffer.flush();
            let count = batch.len();
            Self::attribute_locked(&mut state, batch, &mut notices);
            count
        };
        self.dispatch(notices);
        count
    }

    /// End the active session. Returns the finalized session, or `None` if idle.
    pub fn end(&self) -> Option<Session> {
        let mut notices = Vec::new();
        let ended = {
            let mut state = self.lock();
            self.finalize_locked(&mut state, &mut notices)
        };
        self.dispatch(notices);
        ended
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fail-soft mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a pending task to the active session. `None` when no session is active.
    pub fn add_task(&self, description: impl Into<String>) -> Option<Task> {
        let mut state = self.lock();
        let now = self.shared.clock.now();
        let session = state.current.as_mut()?;
        let task = Task {
            id: uuid::Uuid::new_v4().to_string(),
            description: description.into(),
            status: TaskStatus::Pending,
            created_at: now,
            completed_at: None,
            session_id: session.id.clone(),
        };
        session.tasks.push(task.clone());
        self.touch_locked(&mut state);
        Some(task)
    }

    /// Mark a task of the active session completed.
    pub fn complete_task(&self, task_id: &str) -> Option<Task> {
        let mut state = self.lock();
        let now = self.shared.clock.now();
        let task = state
            .current
            .as_mut()?
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)?;
        task.status = TaskStatus::Completed;
        task.completed_at = Some(now);
        let task = task.clone();
        self.touch_locked(&mut state);
        Some(task)
    }

    /// Record an open issue on the active session. `None` when no session is active.
    pub fn add_issue(&self, description: impl Into<String>) -> Option<Issue> {
        let mut state = self.lock();
        let now = self.shared.clock.now();
        let session = state.current.as_mut()?;
        let issue = Issue {
            id: uuid::Uuid::new_v4().to_string(),
            description: description.into(),
            resolution: None,
            resolved: false,
            created_at: now,
            resolved_at: None,
            session_id: session.id.clone(),
        };
        session.issues.push(issue.clone());
        self.touch_locked(&mut state);
        Some(issue)
    }

    /// Resolve an issue of the active session.
    pub fn resolve_issue(&self, issue_id: &str, resolution: impl Into<String>) -> Option<Issue> {
        let mut state = self.lock();
        let now = self.shared.clock.now();
        let issue = state
            .current
            .as_mut()?
            .issues
            .iter_mut()
            .find(|i| i.id == issue_id)?;
        issue.resolution = Some(resolution.into());
        issue.resolved = true;
        issue.resolved_at = Some(now);
        let issue = issue.clone();
        self.touch_locked(&mut state);
        Some(issue)
    }

    /// Attach a summary to the current or a historical session.
    ///
    /// Returns `false` if no session with that id is known.
    pub fn update_summary(&self, session_id: &str, summary: Summary) -> bool {
        let mut state = self.lock();
        let State {
            current, history, ..
        } = &mut *state;
        let target = current
            .iter_mut()
            .chain(history.iter_mut())
            .find(|s| s.id == session_id);
        match target {
            Some(session) => {
                session.summary = Some(summary);
                true
            }
            None => {
                debug!(session_id, "Summary update for unknown session ignored");
                false
            }
        }
    }

    /// Seed history with sessions loaded from the store, keeping it ordered by start time.
    pub fn restore_history(&self, sessions: Vec<Session>) {
        let mut state = self.lock();
        state.history.extend(sessions.into_iter().filter(|s| !s.is_active));
        state.history.sort_by_key(|s| s.start_time);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        if self.lock().current.is_some() {
            SessionState::Active
        } else {
            SessionState::NoSession
        }
    }

    /// Snapshot of the active session. Buffered events are not included until flushed.
    pub fn current(&self) -> Option<Session> {
        self.lock().current.clone()
    }

    /// Finalized sessions, oldest first.
    pub fn history(&self) -> Vec<Session> {
        self.lock().history.clone()
    }

    /// Sessions (finalized and active) that started during the current local day.
    pub fn todays_sessions(&self) -> Vec<Session> {
        let today = time::local_date(&self.shared.clock.now());
        let (start, end) = time::local_day_bounds(today);
        let state = self.lock();
        let mut sessions: Vec<Session> = state
            .history
            .iter()
            .chain(state.current.iter())
            .filter(|s| s.start_time >= start && s.start_time < end)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.start_time);
        sessions
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.lock().last_activity
    }

    pub fn pending_events(&self) -> usize {
        self.lock().buffer.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_locked(
        &self,
        state: &mut State,
        workspace: Option<String>,
        notices: &mut Vec<Notice>,
    ) -> Session {
        let session = Session::new(self.shared.clock.now(), workspace);
        info!(session_id = %session.id, workspace = ?session.workspace, "Session started");
        state.current = Some(session.clone());
        self.touch_locked(state);
        notices.push(Notice::Started(session.clone()));
        session
    }

    fn finalize_locked(&self, state: &mut State, notices: &mut Vec<Notice>) -> Option<Session> {
        let mut session = state.current.take()?;

        let batch = state.buffer.flush();
        if !batch.is_empty() {
            session.events.extend(batch.iter().cloned());
            notices.push(Notice::Flushed(session.id.clone(), batch));
        }

        session.end_time = Some(self.shared.clock.now());
        session.is_active = false;
        state.inactivity_timer = None;
        state.flush_timer = None;
        state.history.push(session.clone());

        info!(
            session_id = %session.id,
            events = session.events.len(),
            tasks = session.tasks.len(),
            issues = session.issues.len(),
            "Session ended"
        );
        notices.push(Notice::Ended(session.clone()));
        Some(session)
    }

    fn attribute_locked(state: &mut State, batch: Vec<Event>, notices: &mut Vec<Notice>) {
        if batch.is_empty() {
            return;
        }
        match state.current.as_mut() {
            Some(session) => {
                session.events.extend(batch.iter().cloned());
                notices.push(Notice::Flushed(session.id.clone(), batch));
            }
            None => warn!(count = batch.len(), "Flushed events with no active session dropped"),
        }
    }

    /// Record activity and restart the inactivity countdown.
    fn touch_locked(&self, state: &mut State) {
        state.last_activity = Some(self.shared.clock.now());
        state.inactivity_timer = None;
        let Some(timeout) = self.shared.config.inactivity_timeout() else {
            return;
        };
        let weak = Arc::downgrade(&self.shared);
        state.inactivity_timer = timer::schedule_once(timeout, move |token| async move {
            if let Some(shared) = weak.upgrade() {
                SessionManager { shared }.on_inactivity(token);
            }
        });
    }

    fn reset_flush_timer_locked(&self, state: &mut State) {
        state.flush_timer = None;
        let Some(delay) = self.shared.config.flush_debounce() else {
            return;
        };
        let weak = Arc::downgrade(&self.shared);
        state.flush_timer = timer::schedule_once(delay, move |token| async move {
            if let Some(shared) = weak.upgrade() {
                SessionManager { shared }.on_flush_timer(token);
            }
        });
    }

    fn on_inactivity(&self, token: u64) {
        let mut notices = Vec::new();
        {
            let mut state = self.lock();
            if state.inactivity_timer.as_ref().map(ScheduledTask::token) != Some(token) {
                debug!(token, "Stale inactivity timer ignored");
                return;
            }
            info!(
                timeout_minutes = self.shared.config.timeout_minutes,
                "Session inactive; ending"
            );
            self.finalize_locked(&mut state, &mut notices);
        }
        self.dispatch(notices);
    }

    fn on_flush_timer(&self, token: u64) {
        let mut notices = Vec::new();
        {
            let mut state = self.lock();
            if state.flush_timer.as_ref().map(ScheduledTask::token) != Some(token) {
                return;
            }
            state.flush_timer = None;
            let batch = state.buffer.flush();
            Self::attribute_locked(&mut state, batch, &mut notices);
        }
        self.dispatch(notices);
    }

    fn dispatch(&self, notices: Vec<Notice>) {
        for notice in &notices {
            for observer in &self.shared.observers {
                match notice {
                    Notice::Started(session) => observer.on_session_start(session),
                    Notice::Flushed(id, events) => observer.on_events_flushed(id, events),
                    Notice::Ended(session) => observer.on_session_end(session),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventKind, ResolvedIssue};
    use std::time::Duration;

    /// Wall clock driven by tokio's (pausable) clock.
    struct TokioClock {
        base: DateTime<Utc>,
        origin: tokio::time::Instant,
    }

    impl TokioClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                base: time::now_millis(),
                origin: tokio::time::Instant::now(),
            })
        }
    }

    impl Clock for TokioClock {
        fn now(&self) -> DateTime<Utc> {
            let elapsed = chrono::Duration::from_std(self.origin.elapsed()).unwrap();
            time::truncate_millis(self.base + elapsed)
        }
    }

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl SessionObserver for Recorder {
        fn on_session_start(&self, session: &Session) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:start:{}", self.name, session.id));
        }

        fn on_events_flushed(&self, _session_id: &str, events: &[Event]) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:flush:{}", self.name, events.len()));
        }

        fn on_session_end(&self, session: &Session) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:end:{}", self.name, session.id));
        }
    }

    fn config(buffer: usize, timeout_minutes: u64) -> SessionConfig {
        SessionConfig {
            buffer_max_size: buffer,
            timeout_minutes,
            flush_debounce_secs: 0,
        }
    }

    fn summary(text: &str) -> Summary {
        Summary {
            summary: text.to_string(),
            tasks_completed: vec![],
            issues_resolved: vec![ResolvedIssue {
                description: "flaky test".to_string(),
                resolution: "pinned seed".to_string(),
            }],
            key_conversations: vec![],
            files_modified: vec![],
            generated_at: time::now_millis(),
        }
    }

    #[tokio::test]
    async fn test_add_event_auto_starts_one_session() {
        let manager = SessionManager::new(config(50, 0));
        assert_eq!(manager.state(), SessionState::NoSession);

        let first = manager.add_event(Event::new(EventKind::Terminal, "ls"));
        let second = manager.add_event(Event::new(EventKind::File, "src/lib.rs"));

        assert_eq!(first, second);
        assert_eq!(manager.state(), SessionState::Active);
        assert!(manager.history().is_empty());
    }

    #[tokio::test]
    async fn test_auto_started_session_uses_default_workspace() {
        let manager = SessionManager::builder(config(50, 0))
            .default_workspace(Some("api".to_string()))
            .build();
        manager.add_event(Event::new(EventKind::Terminal, "ls"));
        assert_eq!(manager.current().unwrap().workspace.as_deref(), Some("api"));
    }

    #[tokio::test]
    async fn test_events_attributed_only_after_flush() {
        let manager = SessionManager::new(config(50, 0));
        for i in 0..5 {
            manager.add_event(Event::new(EventKind::Terminal, format!("cmd {i}")));
        }
        assert!(manager.current().unwrap().events.is_empty());
        assert_eq!(manager.pending_events(), 5);

        assert_eq!(manager.flush(), 5);
        let events = manager.current().unwrap().events;
        let contents: Vec<&str> = events.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["cmd 0", "cmd 1", "cmd 2", "cmd 3", "cmd 4"]);
    }

    #[tokio::test]
    async fn test_buffer_cap_attributes_immediately() {
        let manager = SessionManager::new(config(3, 0));
        for i in 0..4 {
            manager.add_event(Event::new(EventKind::Clipboard, format!("clip {i}")));
        }
        assert_eq!(manager.current().unwrap().events.len(), 3);
        assert_eq!(manager.pending_events(), 1);
    }

    #[tokio::test]
    async fn test_start_while_active_ends_previous_first() {
        let manager = SessionManager::new(config(50, 0));
        let first = manager.start(Some("api".to_string()));
        manager.add_event(Event::new(EventKind::Terminal, "make"));

        let second = manager.start(None);

        let history = manager.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, first.id);
        assert!(!history[0].is_active);
        assert_eq!(history[0].events.len(), 1);
        let ended_at = history[0].end_time.unwrap();
        assert!(ended_at <= second.start_time);
        assert_eq!(manager.current().unwrap().id, second.id);
    }

    #[tokio::test]
    async fn test_end_flushes_and_notifies_observers_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = SessionManager::builder(config(50, 0))
            .observer(Arc::new(Recorder {
                name: "a",
                log: Arc::clone(&log),
            }))
            .observer(Arc::new(Recorder {
                name: "b",
                log: Arc::clone(&log),
            }))
            .build();

        let session = manager.start(None);
        manager.add_event(Event::new(EventKind::Terminal, "one"));
        manager.add_event(Event::new(EventKind::Terminal, "two"));
        log.lock().unwrap().clear();

        let ended = manager.end().unwrap();

        assert_eq!(ended.events.len(), 2);
        assert!(ended.end_time.is_some());
        assert_eq!(manager.state(), SessionState::NoSession);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "a:flush:2".to_string(),
                "b:flush:2".to_string(),
                format!("a:end:{}", session.id),
                format!("b:end:{}", session.id),
            ]
        );
    }

    #[tokio::test]
    async fn test_end_without_session_returns_none() {
        let manager = SessionManager::new(config(50, 0));
        assert!(manager.end().is_none());
        assert!(manager.history().is_empty());
    }

    #[tokio::test]
    async fn test_tasks_and_issues_without_session_are_noops() {
        let manager = SessionManager::new(config(50, 0));
        manager.start(None);
        manager.end();
        let before = manager.history();

        assert!(manager.add_task("write docs").is_none());
        assert!(manager.add_issue("build broken").is_none());
        assert!(manager.complete_task("missing").is_none());
        assert!(manager.resolve_issue("missing", "n/a").is_none());

        assert_eq!(manager.history(), before);
    }

    #[tokio::test]
    async fn test_task_and_issue_lifecycle() {
        let manager = SessionManager::new(config(50, 0));
        let session = manager.start(None);

        let task = manager.add_task("wire up sync").unwrap();
        assert_eq!(task.session_id, session.id);
        assert_eq!(task.status, TaskStatus::Pending);
        let done = manager.complete_task(&task.id).unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert!(done.completed_at.is_some());

        let issue = manager.add_issue("push rejected").unwrap();
        let fixed = manager.resolve_issue(&issue.id, "rebased first").unwrap();
        assert!(fixed.resolved);
        assert_eq!(fixed.resolution.as_deref(), Some("rebased first"));

        let current = manager.current().unwrap();
        assert_eq!(current.tasks[0].status, TaskStatus::Completed);
        assert!(current.issues[0].resolved);
    }

    #[tokio::test]
    async fn test_update_summary_in_history_and_unknown_id() {
        let manager = SessionManager::new(config(50, 0));
        let session = manager.start(None);
        manager.end();

        assert!(manager.update_summary(&session.id, summary("did things")));
        assert_eq!(
            manager.history()[0].summary.as_ref().map(|s| s.summary.as_str()),
            Some("did things")
        );
        assert!(!manager.update_summary("nope", summary("ignored")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_inactivity_timeout_ends_session() {
        let clock = TokioClock::new();
        let manager = SessionManager::builder(config(50, 10))
            .clock(clock.clone())
            .build();

        manager.add_event(Event::new(EventKind::Terminal, "cargo test"));
        let last_activity = manager.last_activity().unwrap();

        tokio::time::sleep(Duration::from_secs(9 * 60)).await;
        assert_eq!(manager.state(), SessionState::Active);

        tokio::time::sleep(Duration::from_secs(2 * 60)).await;
        assert_eq!(manager.state(), SessionState::NoSession);

        let history = manager.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].events.len(), 1);
        let end_time = history[0].end_time.unwrap();
        let drift = end_time - (last_activity + chrono::Duration::minutes(10));
        assert!(drift.num_milliseconds().abs() < 1000, "drift was {drift}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_resets_inactivity_timer() {
        let manager = SessionManager::builder(config(50, 10))
            .clock(TokioClock::new())
            .build();

        manager.add_event(Event::new(EventKind::Terminal, "first"));
        tokio::time::sleep(Duration::from_secs(8 * 60)).await;
        manager.add_event(Event::new(EventKind::Terminal, "second"));

        tokio::time::sleep(Duration::from_secs(8 * 60)).await;
        assert_eq!(manager.state(), SessionState::Active);

        tokio::time::sleep(Duration::from_secs(3 * 60)).await;
        assert_eq!(manager.state(), SessionState::NoSession);
        assert_eq!(manager.history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_end_cancels_inactivity_timer() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = SessionManager::builder(config(50, 10))
            .clock(TokioClock::new())
            .observer(Arc::new(Recorder {
                name: "o",
                log: Arc::clone(&log),
            }))
            .build();

        manager.start(None);
        manager.end();
        tokio::time::sleep(Duration::from_secs(30 * 60)).await;

        let ends = log
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.starts_with("o:end"))
            .count();
        assert_eq!(ends, 1);
        assert_eq!(manager.history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_debounce_attributes_idle_events() {
        let manager = SessionManager::builder(SessionConfig {
            buffer_max_size: 50,
            timeout_minutes: 0,
            flush_debounce_secs: 5,
        })
        .clock(TokioClock::new())
        .build();

        manager.add_event(Event::new(EventKind::File, "a.rs"));
        tokio::time::sleep(Duration::from_secs(3)).await;
        manager.add_event(Event::new(EventKind::File, "b.rs"));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(manager.pending_events(), 2);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(manager.pending_events(), 0);
        assert_eq!(manager.current().unwrap().events.len(), 2);
    }

    #[tokio::test]
    async fn test_todays_sessions_includes_current_and_history() {
        let manager = SessionManager::new(config(50, 0));
        let old = Session {
            is_active: false,
            end_time: Some(time::now_millis() - chrono::Duration::days(3)),
            ..Session::new(time::now_millis() - chrono::Duration::days(3), None)
        };
        manager.restore_history(vec![old]);
        let first = manager.start(None);
        let second = manager.start(None);

        let today: Vec<String> = manager.todays_sessions().into_iter().map(|s| s.id).collect();
        assert_eq!(today, vec![first.id, second.id]);
        assert_eq!(manager.history().len(), 2);
    }

    #[test]
    fn test_works_without_runtime() {
        let manager = SessionManager::new(config(2, 10));
        manager.add_event(Event::new(EventKind::Terminal, "a"));
        assert_eq!(manager.state(), SessionState::Active);
        assert!(manager.end().is_some());
    }
}
