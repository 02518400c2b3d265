//! Bounded batching queue for activity events.

use std::collections::VecDeque;
use std::fmt;

use crate::types::Event;

/// Callback invoked with every non-empty flushed batch.
pub type FlushCallback = Box<dyn Fn(&[Event]) + Send + Sync>;

/// FIFO of pending events, flushed when it reaches `max_size`.
///
/// Events are considered committed only once they leave the buffer through a
/// flush; the returned batch preserves insertion order.
pub struct EventBuffer {
    events: VecDeque<Event>,
    max_size: usize,
    on_flush: Option<FlushCallback>,
}

impl EventBuffer {
    pub fn new(max_size: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_size.max(1)),
            max_size: max_size.max(1),
            on_flush: None,
        }
    }

    /// Register a hook invoked with every non-empty flushed batch.
    ///
    /// Optional. The batch handed to the hook is the same one `push` or
    /// `flush` returns, so callers that consume the return value, such as
    /// the session manager, need no hook.
    pub fn with_callback(mut self, callback: FlushCallback) -> Self {
        self.on_flush = Some(callback);
        self
    }

    /// Append an event. Returns the flushed batch when this push filled the buffer.
    pub fn push(&mut self, event: Event) -> Option<Vec<Event>> {
        self.events.push_back(event);
        if self.events.len() >= self.max_size {
            Some(self.flush())
        } else {
            None
        }
    }

    /// Drain every pending event. The callback only runs for a non-empty batch.
    pub fn flush(&mut self) -> Vec<Event> {
        if self.events.is_empty() {
            return Vec::new();
        }
        let batch: Vec<Event> = self.events.drain(..).collect();
        if let Some(callback) = &self.on_flush {
            callback(&batch);
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl fmt::Debug for EventBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBuffer")
            .field("len", &self.events.len())
            .field("max_size", &self.max_size)
            .field("has_callback", &self.on_flush.is_some())
            .finish()
    }
}
