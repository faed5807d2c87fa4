//! # SGP Frame Layout
//!
//! Wire format and in-memory packet model for the simulator gateway
//! protocol. Every transmission is exactly one fixed-size frame:
//!
//! ```text
//! byte 0      identifier
//! bytes 1-8   payload, little-endian, zero-filled past the datatype width
//! bytes 9-10  ack field, u16 little-endian (reserved, carried opaquely)
//! bytes 11-12 CRC-16, little-endian, computed over bytes 0-10
//! ```
//!
//! The CRC always covers exactly the 11-byte frame portion, never itself.

/// Total frame size on the wire
pub const FRAME_SIZE: usize = 13;

/// Payload field width
pub const FRAME_PAYLOAD_SIZE: usize = 8;

/// Number of leading bytes covered by the CRC
pub const FRAME_CRC_RANGE: usize = 11;

const PAYLOAD_OFFSET: usize = 1;
const ACK_OFFSET: usize = 9;
const CRC_OFFSET: usize = 11;

/// One raw 13-byte frame as exchanged on the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame([u8; FRAME_SIZE]);

impl RawFrame {
    /// Wrap a 13-byte buffer received from the link
    pub fn from_bytes(bytes: [u8; FRAME_SIZE]) -> Self {
        Self(bytes)
    }

    /// The full frame, ready for transmission
    pub fn as_bytes(&self) -> &[u8; FRAME_SIZE] {
        &self.0
    }

    pub fn identifier(&self) -> u8 {
        self.0[0]
    }

    /// Payload field copied out of the frame
    pub fn payload(&self) -> [u8; FRAME_PAYLOAD_SIZE] {
        let mut payload = [0u8; FRAME_PAYLOAD_SIZE];
        payload.copy_from_slice(&self.0[PAYLOAD_OFFSET..PAYLOAD_OFFSET + FRAME_PAYLOAD_SIZE]);
        payload
    }

    /// The opaque acknowledgment field
    pub fn ack(&self) -> u16 {
        u16::from_le_bytes([self.0[ACK_OFFSET], self.0[ACK_OFFSET + 1]])
    }

    /// The stored checksum field
    pub fn crc(&self) -> u16 {
        u16::from_le_bytes([self.0[CRC_OFFSET], self.0[CRC_OFFSET + 1]])
    }

    /// The 11 bytes the checksum is computed over
    pub fn frame_portion(&self) -> &[u8] {
        &self.0[..FRAME_CRC_RANGE]
    }
}

/// Decoded process value, tagged by the lexicon datatype
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    I8(i8),
    I16(i16),
    I32(i32),
    F32(f32),
    F64(f64),
}

/// Acknowledgment bookkeeping on a queued packet
///
/// The wire ack field is reserved for a future acknowledgment protocol and
/// is carried without interpretation; `retrieved` marks that the packet has
/// already been handed to the link once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub value: u16,
    pub retrieved: bool,
}

/// Checksum bookkeeping on a queued packet
///
/// `verified` records that a check was performed at all; `good` records its
/// outcome. A mismatch is recorded, not rejected; discarding is the
/// caller's policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrcField {
    pub value: u16,
    pub verified: bool,
    pub good: bool,
}

/// In-memory form of one frame, owned by the queue slot holding it
///
/// The payload stays as raw bytes until a consumer interprets it through the
/// lexicon; admission must be able to hold frames whose identifier the
/// lexicon does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    pub identifier: u8,
    pub payload: [u8; FRAME_PAYLOAD_SIZE],
    pub ack: Ack,
    pub crc: CrcField,
}

impl Packet {
    /// Serialize the packet fields back into a 13-byte frame
    pub fn to_raw(&self) -> RawFrame {
        let mut bytes = [0u8; FRAME_SIZE];
        bytes[0] = self.identifier;
        bytes[PAYLOAD_OFFSET..PAYLOAD_OFFSET + FRAME_PAYLOAD_SIZE].copy_from_slice(&self.payload);
        bytes[ACK_OFFSET..ACK_OFFSET + 2].copy_from_slice(&self.ack.value.to_le_bytes());
        bytes[CRC_OFFSET..CRC_OFFSET + 2].copy_from_slice(&self.crc.value.to_le_bytes());
        RawFrame(bytes)
    }
}
