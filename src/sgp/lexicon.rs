//! # Value Lexicon
//!
//! Static registry binding each one-byte frame identifier to the primitive
//! datatype, display name and unit of the process value it carries.
//!
//! The lexicon is the single source of truth for the codec: encoding selects
//! its range check and payload width from it, decoding selects the
//! interpretation. Any identifier not present here is a hard encode error.
//! Lookup is a linear scan; the table is small and read-only after startup.

use thiserror::Error;

/// Reserved identifier, never valid on the wire (bus idle low)
pub const ID_RESERVED_LOW: u8 = 0x00;

/// Reserved identifier, never valid on the wire (bus idle high)
pub const ID_RESERVED_HIGH: u8 = 0xFF;

/// Keep-alive filler frame, sent when the transmit queue is empty
pub const ID_FILLER: u8 = 0x01;

/// Round-trip latency probe counter
pub const ID_TEST_LATENCY: u8 = 0xA9;

// Outbound setpoints
pub const ID_SETPOINT_BATTERY_1: u8 = 0xB1;
pub const ID_SETPOINT_BATTERY_2: u8 = 0xB2;
pub const ID_SETPOINT_GENERATOR_1: u8 = 0xB3;
pub const ID_SETPOINT_GENERATOR_2: u8 = 0xB4;
pub const ID_OVERLOAD: u8 = 0xB5;

// Inbound process values
pub const ID_POWER_BATTERY_1: u8 = 0xC1;
pub const ID_POWER_BATTERY_2: u8 = 0xC2;
pub const ID_SOC_BATTERY_1: u8 = 0xC3;
pub const ID_SOC_BATTERY_2: u8 = 0xC4;
pub const ID_POWER_GENERATOR_1: u8 = 0xC5;
pub const ID_POWER_GENERATOR_2: u8 = 0xC6;
pub const ID_FUEL_EFFICIENCY_1: u8 = 0xC7;
pub const ID_FUEL_EFFICIENCY_2: u8 = 0xC8;
pub const ID_OPERATING_MODE: u8 = 0xC9;

/// Primitive datatypes a frame payload can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Bool,
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
    F32,
    F64,
}

impl DataType {
    /// Number of payload bytes this datatype occupies (the rest stays zero)
    pub fn payload_len(self) -> usize {
        match self {
            DataType::Bool | DataType::U8 | DataType::I8 => 1,
            DataType::U16 | DataType::I16 => 2,
            DataType::U32 | DataType::I32 | DataType::F32 => 4,
            DataType::F64 => 8,
        }
    }
}

/// One lexicon row
#[derive(Debug, Clone, Copy)]
pub struct LexiconEntry {
    pub identifier: u8,
    pub datatype: DataType,
    pub name: &'static str,
    pub unit: &'static str,
}

const fn entry(identifier: u8, datatype: DataType, name: &'static str, unit: &'static str) -> LexiconEntry {
    LexiconEntry { identifier, datatype, name, unit }
}

/// The process value dictionary, ordered by identifier group
pub const LEXICON: &[LexiconEntry] = &[
    // Filler
    entry(ID_FILLER, DataType::U8, "Filler", "-"),
    // Test values
    entry(0xA0, DataType::U8, "Test UINT8", "T"),
    entry(0xA1, DataType::U16, "Test UINT16", "T"),
    entry(0xA2, DataType::U32, "Test UINT32", "T"),
    entry(0xA3, DataType::I8, "Test SINT8", "T"),
    entry(0xA4, DataType::I16, "Test SINT16", "T"),
    entry(0xA5, DataType::I32, "Test SINT32", "T"),
    entry(0xA6, DataType::F32, "Test FRAC32", "T"),
    entry(0xA7, DataType::F64, "Test FRAC64", "T"),
    entry(0xA8, DataType::Bool, "Test BOOL", "T"),
    entry(ID_TEST_LATENCY, DataType::U32, "Test latency", "T"),
    // Outbound
    entry(ID_SETPOINT_BATTERY_1, DataType::I32, "Setpoint battery 1", "kW"),
    entry(ID_SETPOINT_BATTERY_2, DataType::I32, "Setpoint battery 2", "kW"),
    entry(ID_SETPOINT_GENERATOR_1, DataType::U32, "Setpoint DG 1", "kW"),
    entry(ID_SETPOINT_GENERATOR_2, DataType::U32, "Setpoint DG 2", "kW"),
    entry(ID_OVERLOAD, DataType::Bool, "Overload", "bool"),
    // Inbound
    entry(ID_POWER_BATTERY_1, DataType::F64, "Power battery 1", "kW"),
    entry(ID_POWER_BATTERY_2, DataType::F64, "Power battery 2", "kW"),
    entry(ID_SOC_BATTERY_1, DataType::F32, "SOC battery 1", "%"),
    entry(ID_SOC_BATTERY_2, DataType::F32, "SOC battery 2", "%"),
    entry(ID_POWER_GENERATOR_1, DataType::U32, "Power DG 1", "kW"),
    entry(ID_POWER_GENERATOR_2, DataType::U32, "Power DG 2", "kW"),
    entry(ID_FUEL_EFFICIENCY_1, DataType::F32, "SFOC 1", "%"),
    entry(ID_FUEL_EFFICIENCY_2, DataType::F32, "SFOC 2", "%"),
    entry(ID_OPERATING_MODE, DataType::U8, "OPstate", "enum"),
];

/// Codec-level protocol errors
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum CodecError {
    /// Identifier is one of the reserved wire values
    #[error("identifier 0x{0:02X} is reserved")]
    BadId(u8),

    /// Identifier is absent from the lexicon
    #[error("identifier 0x{0:02X} has no datatype in the lexicon")]
    NoDatatype(u8),

    /// Integer value outside the identifier's datatype domain
    #[error("value {value} out of range for {datatype:?}")]
    OutOfRange { datatype: DataType, value: i64 },
}

/// Look an identifier up in the lexicon
///
/// # Errors
///
/// [`CodecError::BadId`] for the reserved identifiers 0x00/0xFF,
/// [`CodecError::NoDatatype`] for anything not in the table.
pub fn find(identifier: u8) -> Result<&'static LexiconEntry, CodecError> {
    if identifier == ID_RESERVED_LOW || identifier == ID_RESERVED_HIGH {
        return Err(CodecError::BadId(identifier));
    }
    LEXICON
        .iter()
        .find(|entry| entry.identifier == identifier)
        .ok_or(CodecError::NoDatatype(identifier))
}
