//! Session lifecycle management.
//!
//! ## Lifecycle
//!
//! ```text
//! Session Start (explicit, or implicit on first event)
//!   │
//!   ├─► New session id, start time, inactivity timer armed
//!   │
//!   └─► on_session_start observers
//!
//! During Session
//!   │
//!   ├─► Events buffered, flushed on capacity / debounce / end
//!   │
//!   └─► Tasks and issues recorded against the active session
//!
//! Session End (explicit, restart, or inactivity timeout)
//!   │
//!   ├─► Pending events flushed
//!   │
//!   ├─► Session finalized and appended to history
//!   │
//!   └─► on_session_end observers (store, exporter, summarizer)
//! ```

mod manager;
mod observer;

pub use manager::*;
pub use observer::*;
