use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::warn;

use crate::PackedMessage;

/// Maximum number of undelivered messages held for the polling side.
///
/// If the host stops polling, the driver thread keeps producing; once the
/// queue is full the oldest entries are discarded so a host that resumes
/// sees recent events rather than a backlog from seconds ago.
pub const MAX_QUEUE_DEPTH: usize = 1024;

/// FIFO handoff between the driver callback thread and the polling thread.
///
/// One lock guards both ends. The callback side only ever pushes, holding
/// the lock for a bounded push-and-return, so the driver thread is never
/// blocked behind anything slow.
#[derive(Debug, Default)]
pub struct MessageQueue {
    inner: Mutex<VecDeque<PackedMessage>>,
}

impl MessageQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message, discarding the oldest entry when full.
    pub fn push(&self, msg: PackedMessage) {
        let mut pending = self.inner.lock();
        if pending.len() == MAX_QUEUE_DEPTH {
            pending.pop_front();
            warn!(source = msg.source, "message queue full, dropping oldest");
        }
        pending.push_back(msg);
    }

    /// Removes and returns the oldest pending message.
    pub fn pop(&self) -> Option<PackedMessage> {
        self.inner.lock().pop_front()
    }

    /// Discards all pending messages.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Number of pending messages.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether no messages are pending.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
