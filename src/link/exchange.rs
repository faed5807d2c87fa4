//! # Frame Exchange Collaborator
//!
//! One full-duplex exchange moves exactly one 13-byte frame in each
//! direction. The trait keeps the transport tick independent of the physical
//! link: production uses a serial device, tests use a scripted mock. Timeout
//! semantics belong to the implementation, not to the tick.

use async_trait::async_trait;
use std::io;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

use super::LinkError;
use crate::sgp::protocol::{RawFrame, FRAME_SIZE};

/// Default simulator device paths to try (in order of preference)
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyACM0", // USB CDC devices
    "/dev/ttyUSB0", // USB-to-serial adapters
];

/// Default link baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// One full-duplex frame exchange with the peer
#[async_trait]
pub trait FrameExchange: Send {
    /// Transmit `outbound` and produce the frame received in the same slot
    ///
    /// An `Err` means no usable frame arrived this tick; the caller treats
    /// it as silence, never as a reason to crash.
    async fn exchange(&mut self, outbound: &RawFrame) -> io::Result<RawFrame>;
}

/// Serial implementation of the frame exchange
///
/// The host side of the link runs over a USB serial bridge; the peer clocks
/// a frame back for every frame written, so one write-then-read pair stands
/// in for the simultaneous transfer of the real bus.
pub struct SerialExchange {
    port: tokio_serial::SerialStream,
    device_path: String,
}

impl std::fmt::Debug for SerialExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialExchange")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl SerialExchange {
    /// Open the simulator link, auto-detecting the device path
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::PortNotFound`] when no default path opens.
    pub fn open(baud_rate: u32) -> Result<Self, LinkError> {
        Self::open_with_paths(DEFAULT_DEVICE_PATHS, baud_rate)
    }

    /// Open the simulator link trying the given device paths in order
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self, LinkError> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Successfully opened simulator link at {}", path);
                    return Ok(Self {
                        port,
                        device_path: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(LinkError::PortNotFound(paths.join(", ")))
    }

    /// Open a specific serial port with 8N1 link settings
    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream, LinkError> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| LinkError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    /// The device path of the opened link
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl FrameExchange for SerialExchange {
    async fn exchange(&mut self, outbound: &RawFrame) -> io::Result<RawFrame> {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        self.port.write_all(outbound.as_bytes()).await?;
        self.port.flush().await?;

        let mut inbound = [0u8; FRAME_SIZE];
        self.port.read_exact(&mut inbound).await?;

        debug!("Exchanged one frame pair ({} bytes each way)", FRAME_SIZE);
        Ok(RawFrame::from_bytes(inbound))
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Scripted exchange for driving the transport tick in tests
    ///
    /// Pops the next scripted inbound response per exchange and records
    /// every outbound frame it was handed.
    #[derive(Clone, Default)]
    pub struct ScriptedExchange {
        pub inbound: Arc<Mutex<VecDeque<Result<RawFrame, io::ErrorKind>>>>,
        pub sent: Arc<Mutex<Vec<RawFrame>>>,
    }

    impl ScriptedExchange {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_inbound(&self, frame: RawFrame) {
            self.inbound.lock().unwrap().push_back(Ok(frame));
        }

        pub fn push_error(&self, kind: io::ErrorKind) {
            self.inbound.lock().unwrap().push_back(Err(kind));
        }

        pub fn sent_frames(&self) -> Vec<RawFrame> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FrameExchange for ScriptedExchange {
        async fn exchange(&mut self, outbound: &RawFrame) -> io::Result<RawFrame> {
            self.sent.lock().unwrap().push(*outbound);
            match self.inbound.lock().unwrap().pop_front() {
                Some(Ok(frame)) => Ok(frame),
                Some(Err(kind)) => Err(io::Error::new(kind, "scripted exchange error")),
                None => Err(io::Error::new(io::ErrorKind::WouldBlock, "script exhausted")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_and_baud() {
        assert_eq!(DEFAULT_DEVICE_PATHS.len(), 2);
        assert_eq!(DEFAULT_DEVICE_PATHS[0], "/dev/ttyACM0");
        assert_eq!(DEFAULT_BAUD_RATE, 115_200);
    }

    #[test]
    fn test_open_with_invalid_paths_returns_error() {
        let invalid_paths = &["/dev/nonexistent0", "/dev/nonexistent1"];
        let result = SerialExchange::open_with_paths(invalid_paths, DEFAULT_BAUD_RATE);

        match result {
            Err(LinkError::PortNotFound(msg)) => {
                assert!(msg.contains("/dev/nonexistent0"));
                assert!(msg.contains("/dev/nonexistent1"));
            }
            other => panic!("Expected PortNotFound, got: {:?}", other.map(|e| e.device_path().to_string())),
        }
    }

    #[test]
    fn test_open_with_empty_paths_returns_error() {
        let empty_paths: &[&str] = &[];
        let result = SerialExchange::open_with_paths(empty_paths, DEFAULT_BAUD_RATE);
        assert!(matches!(result, Err(LinkError::PortNotFound(_))));
    }
}
