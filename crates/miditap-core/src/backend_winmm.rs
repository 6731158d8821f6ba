//! Input backend over the Windows multimedia (winmm) MIDI API.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;
use windows_sys::Win32::Media::Audio::{
    midiInClose, midiInGetDevCapsW, midiInGetID, midiInGetNumDevs, midiInOpen, midiInStart,
    midiInStop, HMIDIIN, MIDIINCAPSW,
};

use crate::{EndpointId, MessageQueue, MidiBackend, MidiError, PackedMessage};

// Local constants; the module exports for these vary across windows-sys
// versions.
const CALLBACK_FUNCTION: u32 = 0x0003_0000;
const MMSYSERR_NOERROR: u32 = 0;
const MIM_DATA: u32 = 0x3C3;

/// Per-connection state handed to the driver callback via `dwInstance`.
struct CallbackContext {
    id: EndpointId,
    queue: Arc<MessageQueue>,
}

/// Driver callback. Runs on a thread owned by winmm; it must not block or
/// call back into device-management functions. Everything except plain data
/// events is ignored.
unsafe extern "system" fn midi_in_proc(
    _handle: HMIDIIN,
    msg: u32,
    instance: usize,
    param1: usize,
    _param2: usize,
) {
    if msg != MIM_DATA || instance == 0 {
        return;
    }
    let ctx = &*(instance as *const CallbackContext);
    let status = (param1 & 0xFF) as u8;
    let data1 = ((param1 >> 8) & 0xFF) as u8;
    let data2 = ((param1 >> 16) & 0xFF) as u8;
    ctx.queue
        .push(PackedMessage::new(ctx.id, status, data1, data2));
}

struct Connection {
    // HMIDIIN and the context pointer, stored as usize so the backend stays
    // Send. The context box outlives the handle: winmm may invoke the
    // callback until midiInClose returns.
    handle: usize,
    ctx: usize,
}

/// Backend implemented over the winmm `midiIn*` family.
#[derive(Default)]
pub struct WinmmBackend {
    connections: HashMap<EndpointId, Connection>,
}

impl MidiBackend for WinmmBackend {
    fn device_count(&self) -> usize {
        unsafe { midiInGetNumDevs() as usize }
    }

    fn open_input(
        &mut self,
        port_index: usize,
        id: EndpointId,
        queue: Arc<MessageQueue>,
    ) -> Result<(), MidiError> {
        let ctx = Box::into_raw(Box::new(CallbackContext { id, queue }));
        let mut handle: HMIDIIN = unsafe { std::mem::zeroed() };
        let code = unsafe {
            midiInOpen(
                &mut handle,
                port_index as u32,
                midi_in_proc as usize,
                ctx as usize,
                CALLBACK_FUNCTION,
            )
        };
        if code != MMSYSERR_NOERROR {
            unsafe { drop(Box::from_raw(ctx)) };
            return Err(MidiError::Os {
                call: "midiInOpen",
                code,
            });
        }

        let code = unsafe { midiInStart(handle) };
        if code != MMSYSERR_NOERROR {
            unsafe {
                midiInClose(handle);
                drop(Box::from_raw(ctx));
            }
            return Err(MidiError::Os {
                call: "midiInStart",
                code,
            });
        }

        self.connections.insert(
            id,
            Connection {
                handle: handle as usize,
                ctx: ctx as usize,
            },
        );
        Ok(())
    }

    fn close_input(&mut self, id: EndpointId) {
        let Some(conn) = self.connections.remove(&id) else {
            return;
        };
        let handle = conn.handle as HMIDIIN;
        unsafe {
            let code = midiInStop(handle);
            if code != MMSYSERR_NOERROR {
                warn!(id, code, "midiInStop failed");
            }
            let code = midiInClose(handle);
            if code != MMSYSERR_NOERROR {
                warn!(id, code, "midiInClose failed");
            }
            // No callbacks can arrive past midiInClose; the context is safe
            // to reclaim now.
            drop(Box::from_raw(conn.ctx as *mut CallbackContext));
        }
    }

    fn endpoint_name(&self, id: EndpointId) -> Option<String> {
        let conn = self.connections.get(&id)?;
        let handle = conn.handle as HMIDIIN;

        let mut device_id: u32 = 0;
        let code = unsafe { midiInGetID(handle, &mut device_id) };
        if code != MMSYSERR_NOERROR {
            return None;
        }

        let mut caps: MIDIINCAPSW = unsafe { std::mem::zeroed() };
        let code = unsafe {
            midiInGetDevCapsW(
                device_id as usize,
                &mut caps,
                std::mem::size_of::<MIDIINCAPSW>() as u32,
            )
        };
        if code != MMSYSERR_NOERROR {
            return None;
        }

        let len = caps
            .szPname
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(caps.szPname.len());
        Some(String::from_utf16_lossy(&caps.szPname[..len]))
    }
}
