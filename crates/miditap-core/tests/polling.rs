//! End-to-end polling behavior against a scriptable backend: the host-visible
//! sequence of count/dequeue calls across device arrivals and removals.

use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use miditap_core::{
    EndpointId, MessageQueue, MidiBackend, MidiError, MidiReceiver, PackedMessage,
};

#[derive(Default)]
struct ScriptedState {
    device_count: usize,
    // Open connections in open order: (port index, id, driver-side sink).
    open: Vec<(usize, EndpointId, Arc<MessageQueue>)>,
}

/// Backend whose device list is controlled by the test. Event injection goes
/// through the sink registered at open time, the same path the driver
/// callback uses.
#[derive(Clone, Default)]
struct ScriptedBackend {
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedBackend {
    fn set_device_count(&self, count: usize) {
        self.state.lock().device_count = count;
    }

    /// Delivers a data event for the device at the given table index.
    fn deliver(&self, table_index: usize, status: u8, data1: u8, data2: u8) {
        let state = self.state.lock();
        let (_, id, sink) = &state.open[table_index];
        sink.push(PackedMessage::new(*id, status, data1, data2));
    }
}

impl MidiBackend for ScriptedBackend {
    fn device_count(&self) -> usize {
        self.state.lock().device_count
    }

    fn open_input(
        &mut self,
        port_index: usize,
        id: EndpointId,
        queue: Arc<MessageQueue>,
    ) -> Result<(), MidiError> {
        let mut state = self.state.lock();
        if port_index >= state.device_count {
            return Err(MidiError::PortOutOfRange(port_index));
        }
        state.open.push((port_index, id, queue));
        Ok(())
    }

    fn close_input(&mut self, id: EndpointId) {
        self.state.lock().open.retain(|&(_, open_id, _)| open_id != id);
    }

    fn endpoint_name(&self, id: EndpointId) -> Option<String> {
        self.state
            .lock()
            .open
            .iter()
            .find(|&&(_, open_id, _)| open_id == id)
            .map(|(port, _, _)| format!("Scripted Port {port}"))
    }
}

#[test]
fn two_devices_then_one() {
    let backend = ScriptedBackend::default();
    backend.set_device_count(2);
    let mut rx = MidiReceiver::new(backend.clone());

    // First poll opens both devices.
    assert_eq!(rx.endpoint_count(), 2);
    let first = rx.endpoint_at(0).unwrap();
    let second = rx.endpoint_at(1).unwrap();
    assert_eq!(rx.endpoint_name(first).as_deref(), Some("Scripted Port 0"));

    // A note-on arrives on the first device.
    backend.deliver(0, 0x90, 60, 100);
    let msg = rx.dequeue().unwrap();
    let raw = msg.encode();
    assert_eq!(raw & 0xFFFF_FFFF, u64::from(first));
    assert_eq!((raw >> 32) & 0xFF, 0x90);
    assert_eq!((raw >> 40) & 0xFF, 60);
    assert_eq!((raw >> 48) & 0xFF, 100);

    // One device unplugs; the next poll rebuilds the table.
    backend.deliver(1, 0x80, 60, 0);
    backend.set_device_count(1);
    assert_eq!(rx.endpoint_count(), 1);
    assert_eq!(rx.dequeue(), None, "stale messages are discarded");
    assert_eq!(rx.endpoint_name(second), None);
    assert_ne!(rx.endpoint_at(0), Some(first), "identifiers are reassigned");
}

#[test]
fn drained_messages_match_delivered_messages_in_order() {
    let backend = ScriptedBackend::default();
    backend.set_device_count(1);
    let mut rx = MidiReceiver::new(backend.clone());
    assert_eq!(rx.endpoint_count(), 1);

    let notes = [60u8, 64, 67, 72];
    for &note in &notes {
        backend.deliver(0, 0x90, note, 100);
    }

    let drained: Vec<u8> = std::iter::from_fn(|| rx.dequeue()).map(|m| m.data1).collect();
    assert_eq!(drained, notes);
    assert_eq!(rx.dequeue(), None);
}

#[test]
fn dropping_the_receiver_closes_every_device() {
    let backend = ScriptedBackend::default();
    backend.set_device_count(3);
    let mut rx = MidiReceiver::new(backend.clone());
    assert_eq!(rx.endpoint_count(), 3);

    drop(rx);
    assert!(backend.state.lock().open.is_empty());
}
