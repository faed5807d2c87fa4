//! # Frame Encoder
//!
//! Serializes (identifier, typed value) pairs into raw frames.
//!
//! The lexicon supplies the datatype: integer encodes are range-checked
//! against it, the little-endian byte representation fills the smallest
//! needed payload prefix, the remainder stays zero, and the CRC of the
//! 11-byte frame portion is written into the trailing field.

use super::crc::CrcEngine;
use super::lexicon::{self, CodecError, DataType, ID_FILLER};
use super::protocol::{RawFrame, FRAME_CRC_RANGE, FRAME_SIZE};

/// Encode an integer value for the given identifier
///
/// # Errors
///
/// [`CodecError::BadId`]/[`CodecError::NoDatatype`] from the lexicon lookup,
/// [`CodecError::OutOfRange`] when the value violates the datatype's domain
/// (`Bool` accepts exactly 0 and 1). Fractional identifiers accept the
/// integer numerically and convert it.
pub fn encode_int(crc: &CrcEngine, identifier: u8, value: i64) -> Result<RawFrame, CodecError> {
    let entry = lexicon::find(identifier)?;
    let mut bytes = [0u8; FRAME_SIZE];
    bytes[0] = identifier;

    let out_of_range = || CodecError::OutOfRange { datatype: entry.datatype, value };

    match entry.datatype {
        DataType::Bool => {
            if value != 0 && value != 1 {
                return Err(out_of_range());
            }
            bytes[1] = value as u8;
        }
        DataType::U8 => {
            if !(0..=i64::from(u8::MAX)).contains(&value) {
                return Err(out_of_range());
            }
            bytes[1] = value as u8;
        }
        DataType::U16 => {
            if !(0..=i64::from(u16::MAX)).contains(&value) {
                return Err(out_of_range());
            }
            bytes[1..3].copy_from_slice(&(value as u16).to_le_bytes());
        }
        DataType::U32 => {
            if !(0..=i64::from(u32::MAX)).contains(&value) {
                return Err(out_of_range());
            }
            bytes[1..5].copy_from_slice(&(value as u32).to_le_bytes());
        }
        DataType::I8 => {
            if !(i64::from(i8::MIN)..=i64::from(i8::MAX)).contains(&value) {
                return Err(out_of_range());
            }
            bytes[1..2].copy_from_slice(&(value as i8).to_le_bytes());
        }
        DataType::I16 => {
            if !(i64::from(i16::MIN)..=i64::from(i16::MAX)).contains(&value) {
                return Err(out_of_range());
            }
            bytes[1..3].copy_from_slice(&(value as i16).to_le_bytes());
        }
        DataType::I32 => {
            if !(i64::from(i32::MIN)..=i64::from(i32::MAX)).contains(&value) {
                return Err(out_of_range());
            }
            bytes[1..5].copy_from_slice(&(value as i32).to_le_bytes());
        }
        // Fractional identifiers take the integer as-is, no range check
        DataType::F32 => {
            bytes[1..5].copy_from_slice(&(value as f32).to_le_bytes());
        }
        DataType::F64 => {
            bytes[1..9].copy_from_slice(&(value as f64).to_le_bytes());
        }
    }

    write_crc(crc, &mut bytes);
    Ok(RawFrame::from_bytes(bytes))
}

/// Encode a fractional value for the given identifier
///
/// Only `F32`/`F64` identifiers are accepted; everything else fails with
/// [`CodecError::NoDatatype`]. There is no range check, since every floating
/// value is representable. Encoding an `f64` under an `F32` identifier
/// narrows it silently; callers pick the identifier, and with it the
/// precision.
pub fn encode_frac(crc: &CrcEngine, identifier: u8, value: f64) -> Result<RawFrame, CodecError> {
    let entry = lexicon::find(identifier)?;
    let mut bytes = [0u8; FRAME_SIZE];
    bytes[0] = identifier;

    match entry.datatype {
        DataType::F32 => {
            bytes[1..5].copy_from_slice(&(value as f32).to_le_bytes());
        }
        DataType::F64 => {
            bytes[1..9].copy_from_slice(&value.to_le_bytes());
        }
        _ => return Err(CodecError::NoDatatype(identifier)),
    }

    write_crc(crc, &mut bytes);
    Ok(RawFrame::from_bytes(bytes))
}

/// Build the keep-alive frame sent when there is nothing real to transmit
///
/// Filler identifier, all-zero payload, valid CRC. Infallible: the filler
/// identifier does not depend on the lexicon.
pub fn filler_frame(crc: &CrcEngine) -> RawFrame {
    let mut bytes = [0u8; FRAME_SIZE];
    bytes[0] = ID_FILLER;
    write_crc(crc, &mut bytes);
    RawFrame::from_bytes(bytes)
}

fn write_crc(crc: &CrcEngine, bytes: &mut [u8; FRAME_SIZE]) {
    let checksum = crc.frame_checksum(&bytes[..FRAME_CRC_RANGE]);
    bytes[FRAME_CRC_RANGE..].copy_from_slice(&checksum.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgp::crc::CrcConfig;
    use crate::sgp::decoder::{decode_frame, decode_value};
    use crate::sgp::protocol::Value;

    fn engine() -> CrcEngine {
        CrcEngine::new(CrcConfig::default()).unwrap()
    }

    #[test]
    fn test_encode_int_round_trips_every_integer_type() {
        let crc = engine();
        let cases: &[(u8, i64, Value)] = &[
            (0xA0, 200, Value::U8(200)),
            (0xA1, 60_000, Value::U16(60_000)),
            (0xA2, 4_000_000_000, Value::U32(4_000_000_000)),
            (0xA3, -100, Value::I8(-100)),
            (0xA4, -30_000, Value::I16(-30_000)),
            (0xA5, -2_000_000_000, Value::I32(-2_000_000_000)),
            (0xA8, 1, Value::Bool(true)),
        ];

        for &(id, input, expected) in cases {
            let frame = encode_int(&crc, id, input).unwrap();
            let packet = decode_frame(&frame);
            assert_eq!(decode_value(packet.identifier, &packet.payload).unwrap(), expected);
        }
    }

    #[test]
    fn test_encode_frac_round_trips() {
        let crc = engine();

        let frame = encode_frac(&crc, 0xA6, 27.5).unwrap();
        let packet = decode_frame(&frame);
        assert_eq!(decode_value(packet.identifier, &packet.payload).unwrap(), Value::F32(27.5));

        let frame = encode_frac(&crc, 0xA7, -0.125).unwrap();
        let packet = decode_frame(&frame);
        assert_eq!(decode_value(packet.identifier, &packet.payload).unwrap(), Value::F64(-0.125));
    }

    #[test]
    fn test_encode_int_accepts_fractional_identifiers() {
        let crc = engine();
        let frame = encode_int(&crc, 0xA6, 42).unwrap();
        let packet = decode_frame(&frame);
        assert_eq!(decode_value(packet.identifier, &packet.payload).unwrap(), Value::F32(42.0));
    }

    #[test]
    fn test_encode_frac_rejects_integer_identifiers() {
        let crc = engine();
        assert_eq!(encode_frac(&crc, 0xA0, 1.0).err(), Some(CodecError::NoDatatype(0xA0)));
    }

    #[test]
    fn test_range_boundaries() {
        let crc = engine();

        // (id, just-below-min, min, max, just-above-max)
        let cases: &[(u8, i64, i64, i64, i64)] = &[
            (0xA0, -1, 0, 255, 256),
            (0xA1, -1, 0, 65_535, 65_536),
            (0xA2, -1, 0, 4_294_967_295, 4_294_967_296),
            (0xA3, -129, -128, 127, 128),
            (0xA4, -32_769, -32_768, 32_767, 32_768),
            (0xA5, -2_147_483_649, -2_147_483_648, 2_147_483_647, 2_147_483_648),
        ];

        for &(id, below, min, max, above) in cases {
            assert!(encode_int(&crc, id, min).is_ok(), "id 0x{:02X} min", id);
            assert!(encode_int(&crc, id, max).is_ok(), "id 0x{:02X} max", id);
            assert!(
                matches!(encode_int(&crc, id, below), Err(CodecError::OutOfRange { .. })),
                "id 0x{:02X} below min",
                id
            );
            assert!(
                matches!(encode_int(&crc, id, above), Err(CodecError::OutOfRange { .. })),
                "id 0x{:02X} above max",
                id
            );
        }

        // Bool accepts exactly 0 and 1
        assert!(encode_int(&crc, 0xA8, 0).is_ok());
        assert!(encode_int(&crc, 0xA8, 1).is_ok());
        assert!(matches!(encode_int(&crc, 0xA8, 2), Err(CodecError::OutOfRange { .. })));
    }

    #[test]
    fn test_bad_identifiers() {
        let crc = engine();
        assert_eq!(encode_int(&crc, 0x00, 0).err(), Some(CodecError::BadId(0x00)));
        assert_eq!(encode_int(&crc, 0xFF, 0).err(), Some(CodecError::BadId(0xFF)));
        assert_eq!(encode_int(&crc, 0x42, 0).err(), Some(CodecError::NoDatatype(0x42)));
    }

    #[test]
    fn test_payload_little_endian_and_zero_filled() {
        let crc = engine();
        let frame = encode_int(&crc, 0xA1, 0x1234).unwrap();
        let bytes = frame.as_bytes();
        assert_eq!(bytes[1], 0x34);
        assert_eq!(bytes[2], 0x12);
        assert_eq!(&bytes[3..9], &[0u8; 6], "unused payload bytes must stay zero");
        // Ack field untouched by encoding
        assert_eq!(frame.ack(), 0);
    }

    #[test]
    fn test_crc_field_matches_frame_portion() {
        let crc = engine();
        let frame = encode_int(&crc, 0xA5, -123_456).unwrap();
        assert_eq!(frame.crc(), crc.frame_checksum(frame.frame_portion()));
    }

    #[test]
    fn test_filler_frame_shape() {
        let crc = engine();
        let frame = filler_frame(&crc);
        assert_eq!(frame.identifier(), ID_FILLER);
        assert_eq!(frame.payload(), [0u8; 8]);
        assert_eq!(frame.crc(), crc.frame_checksum(frame.frame_portion()));
    }
}
