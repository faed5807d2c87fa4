//! # Frame Decoder
//!
//! Splits raw frames into their fields and interprets payloads through the
//! lexicon.
//!
//! Splitting never validates the checksum; that happens at queue admission,
//! where the outcome is recorded on the packet rather than acted on.

use super::lexicon::{self, CodecError, DataType};
use super::protocol::{Packet, RawFrame, Value, Ack, CrcField, FRAME_PAYLOAD_SIZE};

/// Split a raw frame into its packet form
///
/// Field extraction only; the CRC is carried over unverified and the
/// bookkeeping flags start cleared.
pub fn decode_frame(raw: &RawFrame) -> Packet {
    Packet {
        identifier: raw.identifier(),
        payload: raw.payload(),
        ack: Ack { value: raw.ack(), retrieved: false },
        crc: CrcField { value: raw.crc(), verified: false, good: false },
    }
}

/// Interpret a payload according to the identifier's lexicon datatype
///
/// # Errors
///
/// The same lexicon errors as encoding: [`CodecError::BadId`] for reserved
/// identifiers, [`CodecError::NoDatatype`] for unknown ones.
pub fn decode_value(identifier: u8, payload: &[u8; FRAME_PAYLOAD_SIZE]) -> Result<Value, CodecError> {
    let entry = lexicon::find(identifier)?;

    Ok(match entry.datatype {
        DataType::Bool => Value::Bool(payload[0] != 0),
        DataType::U8 => Value::U8(payload[0]),
        DataType::U16 => Value::U16(u16::from_le_bytes([payload[0], payload[1]])),
        DataType::U32 => Value::U32(u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]])),
        DataType::I8 => Value::I8(payload[0] as i8),
        DataType::I16 => Value::I16(i16::from_le_bytes([payload[0], payload[1]])),
        DataType::I32 => Value::I32(i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]])),
        DataType::F32 => Value::F32(f32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]])),
        DataType::F64 => Value::F64(f64::from_le_bytes(*payload)),
    })
}
