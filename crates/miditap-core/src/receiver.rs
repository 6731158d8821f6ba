use std::sync::Arc;

use tracing::{debug, warn};

use crate::{EndpointId, MessageQueue, MidiBackend, PackedMessage};

/// Device table and rescan policy over a [`MidiBackend`].
///
/// The receiver keeps an ordered table of open endpoints mirroring the OS
/// enumeration order, and rebuilds it whenever the OS-reported device count
/// drifts from the table size. All methods taking `&mut self` must be driven
/// from a single thread (the host's polling thread); only the driver
/// callback runs elsewhere, and it touches nothing but the shared queue.
pub struct MidiReceiver<B: MidiBackend> {
    backend: B,
    endpoints: Vec<EndpointId>,
    queue: Arc<MessageQueue>,
    next_id: EndpointId,
}

impl<B: MidiBackend> MidiReceiver<B> {
    /// Creates a receiver with an empty device table.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            endpoints: Vec::new(),
            queue: Arc::new(MessageQueue::new()),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> EndpointId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Rebuilds the device table if the OS-reported device count differs
    /// from the table size. Cheap no-op otherwise, safe to call every frame.
    ///
    /// A rebuild closes every open endpoint, discards all pending messages
    /// (their source identifiers are about to become stale), then reopens
    /// every visible device in OS enumeration order under fresh identifiers.
    /// A device that fails to open is logged and skipped; the resulting
    /// count mismatch makes the next call retry.
    pub fn rescan_if_changed(&mut self) {
        let count = self.backend.device_count();
        if count == self.endpoints.len() {
            return;
        }
        debug!(
            count,
            previous = self.endpoints.len(),
            "device count changed, rebuilding endpoint table"
        );

        self.close_all();
        self.queue.clear();

        for index in 0..count {
            let id = self.allocate_id();
            match self
                .backend
                .open_input(index, id, Arc::clone(&self.queue))
            {
                Ok(()) => self.endpoints.push(id),
                Err(err) => warn!(index, %err, "failed to open MIDI input, skipping"),
            }
        }
    }

    /// Current endpoint count, after reconciling with the OS.
    pub fn endpoint_count(&mut self) -> usize {
        self.rescan_if_changed();
        self.endpoints.len()
    }

    /// Identifier of the endpoint at the given table index, as of the last
    /// rescan. Does not itself rescan.
    pub fn endpoint_at(&self, index: i32) -> Option<EndpointId> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.endpoints.get(i))
            .copied()
    }

    /// Display name of an open endpoint. `None` when the identifier is not
    /// in the table or the OS query fails.
    pub fn endpoint_name(&self, id: EndpointId) -> Option<String> {
        if !self.endpoints.contains(&id) {
            return None;
        }
        self.backend.endpoint_name(id)
    }

    /// Removes and returns the oldest pending message, after reconciling
    /// with the OS.
    pub fn dequeue(&mut self) -> Option<PackedMessage> {
        self.rescan_if_changed();
        self.queue.pop()
    }

    /// Queue shared with the driver callbacks.
    pub fn queue(&self) -> &Arc<MessageQueue> {
        &self.queue
    }

    /// Closes every endpoint and discards pending messages. The host's
    /// shutdown path calls this through the bridge; it also runs on drop.
    pub fn shutdown(&mut self) {
        self.close_all();
        self.queue.clear();
    }

    fn close_all(&mut self) {
        for id in std::mem::take(&mut self.endpoints) {
            self.backend.close_input(id);
        }
    }
}

impl<B: MidiBackend> Drop for MidiReceiver<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
