//! Flat C entry points for the host engine.
//!
//! The host's scripting runtime binds these through its foreign-function
//! interface and calls them from the main update loop, one call at a time.
//! Absence is always signalled by sentinel values (0 or null), never by an
//! error: the host side has no way to receive one.

use std::ffi::{c_char, CString};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use miditap_core::MidiReceiver;

#[cfg(windows)]
type HostBackend = miditap_core::backend_winmm::WinmmBackend;
#[cfg(not(windows))]
type HostBackend = miditap_core::NullBackend;

struct Bridge {
    receiver: MidiReceiver<HostBackend>,
    // Backing storage for the string returned by GetEndpointName; reused on
    // every call, so the previous pointer dies with the next call.
    name_buf: Option<CString>,
}

// Single global guarded by one mutex: every exported call locks it, which
// also serializes rescans onto whichever thread the host is polling from.
static BRIDGE: Lazy<Mutex<Bridge>> = Lazy::new(|| {
    Mutex::new(Bridge {
        receiver: MidiReceiver::new(HostBackend::default()),
        name_buf: None,
    })
});

/// Reconciles with the OS device list and returns the number of open MIDI
/// input endpoints. May close and reopen every device, dropping queued
/// messages, when the device set changed.
#[no_mangle]
pub extern "C" fn CountEndpoints() -> i32 {
    BRIDGE.lock().receiver.endpoint_count() as i32
}

/// Returns the identifier of the endpoint at `index` in the table as last
/// rebuilt, or 0 when the index is out of range. Never rescans.
#[no_mangle]
pub extern "C" fn GetEndpointIdentifierAtIndex(index: i32) -> u32 {
    BRIDGE.lock().receiver.endpoint_at(index).unwrap_or(0)
}

/// Returns the display name of the endpoint with the given identifier as a
/// NUL-terminated UTF-8 string, or null when the identifier is unknown. The
/// pointer stays valid only until the next call to this function; callers
/// must copy the string out before calling again.
#[no_mangle]
pub extern "C" fn GetEndpointName(id: u32) -> *const c_char {
    let mut bridge = BRIDGE.lock();
    let Some(name) = bridge.receiver.endpoint_name(id) else {
        return std::ptr::null();
    };
    let name = name.replace('\0', "");
    let Ok(name) = CString::new(name) else {
        return std::ptr::null();
    };
    bridge.name_buf.insert(name).as_ptr()
}

/// Reconciles with the OS device list, then removes and returns the oldest
/// pending message in its packed 64-bit form (low 32 bits source identifier,
/// then status, data1 and data2 bytes). Returns 0 when nothing is pending.
#[no_mangle]
pub extern "C" fn DequeueIncomingData() -> u64 {
    BRIDGE
        .lock()
        .receiver
        .dequeue()
        .map(|msg| msg.encode())
        .unwrap_or(0)
}

/// Closes every open device and discards pending messages. Intended for the
/// host's shutdown path; polling again afterwards reopens devices.
#[no_mangle]
pub extern "C" fn Shutdown() {
    let mut bridge = BRIDGE.lock();
    bridge.receiver.shutdown();
    bridge.name_buf = None;
}
