//! # Inbound Deduplication
//!
//! A fixed-duplex link clocks a frame in every tick whether or not the peer
//! had anything new to say, so the same frame arrives over and over until
//! the peer moves on. This filter remembers exactly the last frame seen and
//! suppresses reprocessing of byte-identical repeats.
//!
//! History depth is one: a frame that matches anything older than the
//! immediately preceding one is still reported as new.

use crate::sgp::protocol::RawFrame;

/// Single-slot memory of the most recently seen inbound frame
#[derive(Debug, Default)]
pub struct DedupFilter {
    last: Option<RawFrame>,
}

impl DedupFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report whether `frame` differs from the previous inbound frame
    ///
    /// An exact byte match returns `false` and leaves the memory unchanged;
    /// any difference returns `true` and overwrites the memory.
    pub fn is_new(&mut self, frame: &RawFrame) -> bool {
        if self.last.as_ref() == Some(frame) {
            return false;
        }
        self.last = Some(*frame);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgp::protocol::FRAME_SIZE;

    fn frame(fill: u8) -> RawFrame {
        RawFrame::from_bytes([fill; FRAME_SIZE])
    }

    #[test]
    fn test_history_depth_is_exactly_one() {
        let mut filter = DedupFilter::new();
        let x = frame(0xAB);
        let y = frame(0xCD);

        assert!(filter.is_new(&x));
        assert!(!filter.is_new(&x));
        assert!(filter.is_new(&y));
        // X was seen before, but only the immediately previous frame counts
        assert!(filter.is_new(&x));
    }

    #[test]
    fn test_single_byte_difference_is_new() {
        let mut filter = DedupFilter::new();
        let mut bytes = [0x55u8; FRAME_SIZE];
        assert!(filter.is_new(&RawFrame::from_bytes(bytes)));
        bytes[FRAME_SIZE - 1] ^= 0x01;
        assert!(filter.is_new(&RawFrame::from_bytes(bytes)));
    }

    #[test]
    fn test_all_zero_first_frame_is_new() {
        let mut filter = DedupFilter::new();
        assert!(filter.is_new(&frame(0x00)));
        assert!(!filter.is_new(&frame(0x00)));
    }
}
