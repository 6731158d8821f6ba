use crate::EndpointId;

/// A short MIDI message paired with the endpoint it arrived on.
///
/// The packed `u64` form is what crosses the FFI boundary: bits 0-31 carry
/// the source identifier, bits 32-39 the status byte, bits 40-47 data1 and
/// bits 48-55 data2. The top byte stays zero. Since identifiers are never 0,
/// no real message encodes to 0 and the all-zero value is free to mean
/// "queue empty".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackedMessage {
    /// Identifier of the endpoint the message arrived on.
    pub source: EndpointId,
    /// MIDI status byte.
    pub status: u8,
    /// First data byte.
    pub data1: u8,
    /// Second data byte.
    pub data2: u8,
}

impl PackedMessage {
    /// Creates a message from raw driver bytes.
    pub fn new(source: EndpointId, status: u8, data1: u8, data2: u8) -> Self {
        Self {
            source,
            status,
            data1,
            data2,
        }
    }

    /// Packs the message into its 64-bit wire form.
    pub fn encode(self) -> u64 {
        u64::from(self.source)
            | u64::from(self.status) << 32
            | u64::from(self.data1) << 40
            | u64::from(self.data2) << 48
    }

    /// Rebuilds a message from its 64-bit wire form.
    pub fn decode(raw: u64) -> Self {
        Self {
            source: raw as u32,
            status: (raw >> 32) as u8,
            data1: (raw >> 40) as u8,
            data2: (raw >> 48) as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn encodes_fields_into_documented_bit_positions() {
        let msg = PackedMessage::new(0xDEAD_BEEF, 0x90, 60, 100);
        let raw = msg.encode();
        assert_eq!(raw & 0xFFFF_FFFF, 0xDEAD_BEEF);
        assert_eq!((raw >> 32) & 0xFF, 0x90);
        assert_eq!((raw >> 40) & 0xFF, 60);
        assert_eq!((raw >> 48) & 0xFF, 100);
        assert_eq!(raw >> 56, 0);
    }

    #[test]
    fn decode_inverts_encode() {
        let msg = PackedMessage::new(1, 0xB0, 7, 127);
        assert_eq!(PackedMessage::decode(msg.encode()), msg);
    }

    #[test]
    fn nonzero_source_never_encodes_to_the_empty_sentinel() {
        let msg = PackedMessage::new(1, 0, 0, 0);
        assert_ne!(msg.encode(), 0);
    }
}
