//! Lifecycle observers.

use tokio::sync::mpsc;
use tracing::warn;

use crate::types::{Event, Session};

/// Receives session lifecycle notifications.
///
/// Observers are registered when the manager is built and are called
/// synchronously, in registration order, after the state lock is released.
/// Implementations should hand long-running work off to a task.
pub trait SessionObserver: Send + Sync {
    fn on_session_start(&self, _session: &Session) {}

    /// A batch of buffered events was attributed to `session_id`.
    fn on_events_flushed(&self, _session_id: &str, _events: &[Event]) {}

    fn on_session_end(&self, _session: &Session) {}
}

/// Forwards each finalized session onto an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<Session>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Session>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SessionObserver for ChannelObserver {
    fn on_session_end(&self, session: &Session) {
        if self.tx.send(session.clone()).is_err() {
            warn!(session_id = %session.id, "Session channel closed; finalized session dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now_millis;

    #[tokio::test]
    async fn test_channel_observer_forwards_finalized_session() {
        let (observer, mut rx) = ChannelObserver::new();
        let session = Session::new(now_millis(), None);

        observer.on_session_end(&session);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, session.id);
    }

    #[test]
    fn test_channel_observer_survives_closed_receiver() {
        let (observer, rx) = ChannelObserver::new();
        drop(rx);
        observer.on_session_end(&Session::new(now_millis(), None));
    }
}
