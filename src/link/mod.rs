//! # Simulator Link Module
//!
//! The duplex frame link to the real-time plant simulator.
//!
//! This module handles:
//! - The opaque full-duplex exchange collaborator and its serial implementation
//! - The transport tick that feeds and drains the frame queues
//! - Inbound deduplication and CRC-gated admission

pub mod exchange;
pub mod driver;

use thiserror::Error;

pub use driver::{Delivery, LinkDriver};
pub use exchange::{FrameExchange, SerialExchange};

/// Link setup and I/O errors
#[derive(Debug, Error)]
pub enum LinkError {
    /// No simulator device answered on any candidate path
    #[error("no simulator link found, tried: {0}")]
    PortNotFound(String),

    /// Serial port error
    #[error("serial link error: {0}")]
    Serial(String),
}
