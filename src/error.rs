//! # Error Types
//!
//! Crate-level error type for EMS Bridge using `thiserror`.
//!
//! Each concern keeps its own typed enum next to its code (`CrcError`,
//! `CodecError`, `QueueError`, `LinkError`); this type aggregates them for
//! callers that cross concerns.

use thiserror::Error;

/// Main error type for EMS Bridge
#[derive(Debug, Error)]
pub enum EmsBridgeError {
    /// CRC engine configuration errors
    #[error("CRC configuration error: {0}")]
    Crc(#[from] crate::sgp::crc::CrcError),

    /// Codec protocol errors (bad identifier, value out of range)
    #[error("codec error: {0}")]
    Codec(#[from] crate::sgp::lexicon::CodecError),

    /// Queue resource errors
    #[error("queue error: {0}")]
    Queue(#[from] crate::queue::QueueError),

    /// Simulator link errors
    #[error("link error: {0}")]
    Link(#[from] crate::link::LinkError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for EMS Bridge
pub type Result<T> = std::result::Result<T, EmsBridgeError>;
