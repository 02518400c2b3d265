//! Durable session store.
//!
//! The whole history lives in one JSON document, `{ "sessions": [...] }`.
//! Every mutation rewrites the full document through a temp file, fsync and
//! atomic rename, so readers only ever see a complete snapshot. The mutex
//! around the in-memory copy serializes all read-modify-write cycles.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::session::SessionObserver;
use crate::time;
use crate::types::Session;

/// On-disk document layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    sessions: Vec<Session>,
}

/// JSON-file backed store of every recorded session.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    sessions: Mutex<Vec<Session>>,
}

impl SessionStore {
    /// Open the store at `path`, loading whatever is already there.
    ///
    /// A missing, unreadable or corrupt document yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = Self {
            path: path.into(),
            sessions: Mutex::new(Vec::new()),
        };
        store.load();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the document from disk. Returns the number of sessions loaded.
    pub fn load(&self) -> usize {
        let sessions = match read_document(&self.path) {
            Ok(doc) => doc.sessions,
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Session store unreadable; starting empty");
                Vec::new()
            }
        };
        let count = sessions.len();
        *self.lock() = sessions;
        debug!(path = ?self.path, count, "Session store loaded");
        count
    }

    /// Insert or replace a session by id, then rewrite the document.
    ///
    /// Memory is only updated once the document is on disk.
    pub fn save_session(&self, session: &Session) -> Result<()> {
        let mut sessions = self.lock();
        let mut updated = sessions.clone();
        match updated.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => *existing = session.clone(),
            None => updated.push(session.clone()),
        }
        write_document(&self.path, &updated)?;
        *sessions = updated;
        debug!(session_id = %session.id, "Session saved");
        Ok(())
    }

    pub fn get_session(&self, id: &str) -> Option<Session> {
        self.lock().iter().find(|s| s.id == id).cloned()
    }

    /// Sessions that started on `date` (local time), oldest first.
    pub fn sessions_by_date(&self, date: NaiveDate) -> Vec<Session> {
        let (start, end) = time::local_day_bounds(date);
        let mut sessions: Vec<Session> = self
            .lock()
            .iter()
            .filter(|s| s.start_time >= start && s.start_time < end)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.start_time);
        sessions
    }

    /// Every session, newest first.
    pub fn all_sessions(&self) -> Vec<Session> {
        let mut sessions = self.lock().clone();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        sessions
    }

    /// Remove a session by id. Returns `false` if it was not stored.
    pub fn delete_session(&self, id: &str) -> Result<bool> {
        let mut sessions = self.lock();
        let updated: Vec<Session> = sessions.iter().filter(|s| s.id != id).cloned().collect();
        if updated.len() == sessions.len() {
            return Ok(false);
        }
        write_document(&self.path, &updated)?;
        *sessions = updated;
        info!(session_id = id, "Session deleted");
        Ok(true)
    }

    /// Final write of the in-memory state.
    pub fn close(&self) -> Result<()> {
        let sessions = self.lock();
        write_document(&self.path, &sessions)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionObserver for SessionStore {
    fn on_session_end(&self, session: &Session) {
        if let Err(e) = self.save_session(session) {
            warn!(session_id = %session.id, error = %e, "Failed to persist finalized session");
        }
    }
}

fn read_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Ok(Document::default());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Document::default());
    }
    Ok(serde_json::from_str(&content)?)
}

fn write_document(path: &Path, sessions: &[Session]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    #[derive(Serialize)]
    struct DocumentRef<'a> {
        sessions: &'a [Session],
    }

    let content = serde_json::to_string_pretty(&DocumentRef { sessions })?;
    let temp_path = path.with_extension("json.tmp");
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}
