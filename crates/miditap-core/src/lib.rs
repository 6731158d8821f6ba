//! Polling MIDI input bridge for managed host engines.
//!
//! The host calls into this crate from its main update loop, once per frame:
//! it asks for the current endpoint count, resolves endpoint identifiers and
//! names, and drains incoming messages one at a time. The OS driver delivers
//! events asynchronously on its own thread; a mutex-guarded bounded queue
//! hands them over to the polling side.

use thiserror::Error;

pub mod backend;
#[cfg(windows)]
pub mod backend_winmm;
pub mod message;
pub mod queue;
pub mod receiver;

pub use backend::{MidiBackend, NullBackend};
pub use message::PackedMessage;
pub use queue::MessageQueue;
pub use receiver::MidiReceiver;

/// Identifier for an open input endpoint, unique within one receiver while
/// the endpoint stays open. 0 is reserved as the "no device" sentinel and is
/// never allocated.
pub type EndpointId = u32;

/// Errors produced while dealing with the OS MIDI subsystem.
#[derive(Debug, Error)]
pub enum MidiError {
    /// The requested input port index is not present.
    #[error("MIDI input port {0} does not exist")]
    PortOutOfRange(usize),
    /// An OS call failed with the given result code.
    #[error("{call} failed with code {code}")]
    Os { call: &'static str, code: u32 },
}
