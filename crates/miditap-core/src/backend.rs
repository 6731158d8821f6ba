use std::sync::Arc;

use crate::{EndpointId, MessageQueue, MidiError};

/// Backend abstraction over the OS MIDI input subsystem.
///
/// The receiver allocates endpoint identifiers and decides when to open and
/// close; the backend owns the OS handles and keeps the identifier-to-handle
/// mapping private. Implementations deliver incoming data events into the
/// queue handed to [`MidiBackend::open_input`], tagged with the endpoint
/// identifier, from whatever thread the driver uses.
pub trait MidiBackend: Send {
    /// Number of input devices the OS currently reports.
    fn device_count(&self) -> usize;

    /// Opens the device at the given OS enumeration index, registers a
    /// callback that feeds `queue`, and starts message delivery. On failure
    /// no handle is left half-open.
    fn open_input(
        &mut self,
        port_index: usize,
        id: EndpointId,
        queue: Arc<MessageQueue>,
    ) -> Result<(), MidiError>;

    /// Stops and closes a previously opened input. Unknown identifiers are
    /// ignored.
    fn close_input(&mut self, id: EndpointId);

    /// Display name of an open endpoint, as reported by the OS. `None` when
    /// the identifier is unknown or the OS query fails.
    fn endpoint_name(&self, id: EndpointId) -> Option<String>;
}

/// Backend that reports no devices.
///
/// Stands in for the winmm backend on platforms without one so the bridge
/// library still builds and its exported surface can be exercised in tests.
#[derive(Debug, Default)]
pub struct NullBackend;

impl MidiBackend for NullBackend {
    fn device_count(&self) -> usize {
        0
    }

    fn open_input(
        &mut self,
        port_index: usize,
        _id: EndpointId,
        _queue: Arc<MessageQueue>,
    ) -> Result<(), MidiError> {
        Err(MidiError::PortOutOfRange(port_index))
    }

    fn close_input(&mut self, _id: EndpointId) {}

    fn endpoint_name(&self, _id: EndpointId) -> Option<String> {
        None
    }
}
