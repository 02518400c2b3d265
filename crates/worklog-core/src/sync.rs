//! Export directory synchronization.
//!
//! Keeps the export directory as a git working copy and publishes it:
//!
//! ```text
//! status ── clean ──► done (true)
//!    │
//!    └─ dirty ─► add -A ─► commit ─► pull --rebase (failure tolerated)
//!                                          │
//!                                          ▼
//!                                        push ── ok ──► true
//!                                          │
//!                                          └─ fail ─► push --set-upstream ── ok ──► true
//!                                                              │
//!                                                              └─ fail ──► false
//! ```
//!
//! Nothing here returns an error to the caller: failures are logged and
//! reported as `false`.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, info, warn};

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::git::VersionControl;
use crate::time::{self, Clock, SystemClock};
use crate::timer::{self, ScheduledTask};

/// Progress indication for user-initiated syncs.
pub trait SyncProgress: Send + Sync {
    fn begin(&self, message: &str);
    fn finish(&self, success: bool);
}

struct Inner {
    config: SyncConfig,
    vcs: Arc<dyn VersionControl>,
    clock: Arc<dyn Clock>,
    ready: AtomicBool,
    sync_lock: tokio::sync::Mutex<()>,
    timer: Mutex<Option<ScheduledTask>>,
}

/// Publishes the export directory to its remote repository.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<Inner>,
}

impl SyncEngine {
    pub fn new(config: SyncConfig, vcs: Arc<dyn VersionControl>) -> Self {
        Self::with_clock(config, vcs, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: SyncConfig,
        vcs: Arc<dyn VersionControl>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                vcs,
                clock,
                ready: AtomicBool::new(false),
                sync_lock: tokio::sync::Mutex::new(()),
                timer: Mutex::new(None),
            }),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Prepare the working copy and start the periodic timer.
    ///
    /// Returns `false` (not ready) when no remote is configured or the
    /// repository could not be prepared.
    pub async fn initialize(&self) -> bool {
        let Some(url) = self.inner.config.remote_url() else {
            info!("No sync remote configured; sync disabled");
            return false;
        };

        if let Err(e) = self.prepare_repository(&url).await {
            error!(error = %e, "Failed to prepare export repository");
            return false;
        }

        self.inner.ready.store(true, Ordering::SeqCst);
        self.start_timer();
        info!(dir = ?self.inner.config.export_dir, remote = %url, "Sync engine ready");
        true
    }

    async fn prepare_repository(&self, url: &str) -> Result<()> {
        let dir = &self.inner.config.export_dir;
        let vcs = &self.inner.vcs;

        if is_missing_or_empty(dir).await {
            if let Some(parent) = dir.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            match vcs.clone_repo(url, dir).await {
                Ok(()) => {
                    info!(dir = ?dir, "Cloned export repository");
                    return Ok(());
                }
                Err(e) => {
                    debug!(error = %e, "Clone failed; initializing a fresh repository");
                    tokio::fs::create_dir_all(dir).await?;
                }
            }
        }

        if !vcs.is_repository(dir).await? {
            vcs.init(dir).await?;
            if !vcs.is_repository(dir).await? {
                return Err(Error::NotGitRepo(dir.display().to_string()));
            }
            vcs.add_remote(dir, &self.inner.config.remote_name, url).await?;
            info!(dir = ?dir, "Initialized export repository");
        }
        Ok(())
    }

    fn start_timer(&self) {
        let Some(period) = self.inner.config.interval() else {
            return;
        };
        let weak = Arc::downgrade(&self.inner);
        let task = timer::schedule_every(period, move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    SyncEngine { inner }.sync().await;
                }
            }
        });
        *self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = task;
    }

    /// Commit and push pending changes. Returns whether the remote is up to date.
    pub async fn sync(&self) -> bool {
        if !self.is_ready() {
            warn!("Sync requested before the engine was initialized");
            return false;
        }

        let _guard = self.inner.sync_lock.lock().await;
        match self.sync_inner().await {
            Ok(synced) => synced,
            Err(e) => {
                error!(error = %e, "Sync failed");
                false
            }
        }
    }

    async fn sync_inner(&self) -> Result<bool> {
        let dir = &self.inner.config.export_dir;
        let vcs = &self.inner.vcs;

        let changes = vcs.status(dir).await?;
        if changes.is_empty() {
            debug!("No changes to sync");
            return Ok(true);
        }

        vcs.add_all(dir).await?;
        let message = format!(
            "Update work log {}",
            self.inner.clock.now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        vcs.commit(dir, &message).await?;

        if let Err(e) = vcs.pull_rebase(dir).await {
            warn!(error = %e, "Pull before push failed; pushing anyway");
        }

        if let Err(e) = vcs.push(dir).await {
            debug!(error = %e, "Push failed; retrying with upstream tracking");
            if let Err(e) = vcs
                .push_set_upstream(dir, &self.inner.config.remote_name)
                .await
            {
                error!(error = %e, "Push with upstream tracking failed");
                return Ok(false);
            }
        }

        info!(files = changes.len(), "Work log synced");
        Ok(true)
    }

    /// [`sync`](Self::sync) wrapped in a progress indication.
    pub async fn force_sync(&self, progress: &dyn SyncProgress) -> bool {
        progress.begin("Syncing work log");
        let synced = self.sync().await;
        progress.finish(synced);
        synced
    }

    /// Stop the periodic timer and make one last attempt to sync.
    ///
    /// A periodic sync already in flight runs to completion first.
    pub async fn dispose(&self) {
        let _guard = self.inner.sync_lock.lock().await;
        let task = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(task);

        if self.is_ready() {
            if let Err(e) = self.sync_inner().await {
                error!(error = %e, "Final sync failed");
            }
        }
        debug!(at = %time::format_datetime(&self.inner.clock.now()), "Sync engine disposed");
    }
}

async fn is_missing_or_empty(dir: &Path) -> bool {
    match tokio::fs::read_dir(dir).await {
        Ok(mut entries) => matches!(entries.next_entry().await, Ok(None)),
        Err(_) => !dir.exists(),
    }
}
