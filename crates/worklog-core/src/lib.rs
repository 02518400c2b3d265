//! worklog-core - Core library for worklog
//!
//! Records bounded work sessions from activity events, persists them and
//! publishes a daily Markdown log to a git remote:
//!
//! - **buffer**: Bounded event batching
//! - **session**: Session lifecycle state machine and observers
//! - **store**: Durable JSON session store
//! - **export**: Daily Markdown export
//! - **summary**: Session summaries via a text-generation collaborator
//! - **sync**: Periodic and on-demand git sync of the export directory
//! - **git**: Version-control seam and `git` CLI implementation

pub mod buffer;
pub mod config;
pub mod error;
pub mod export;
pub mod git;
pub mod session;
pub mod store;
pub mod summary;
pub mod sync;
pub mod time;
pub mod timer;
pub mod types;

// Re-export commonly used types
pub use buffer::EventBuffer;
pub use config::{SessionConfig, SummaryConfig, SyncConfig};
pub use error::{Error, Result};
pub use export::DailyExporter;
pub use git::{GitCli, VersionControl};
pub use session::{ChannelObserver, SessionManager, SessionObserver, SessionState};
pub use store::SessionStore;
pub use summary::{Summarizer, TextGenerator};
pub use sync::{SyncEngine, SyncProgress};
pub use types::{Event, EventKind, Issue, ResolvedIssue, Session, Summary, Task, TaskStatus};
