//! # Bounded Frame FIFO
//!
//! Capacity-limited FIFO of packets, one per link direction.
//!
//! Insertion order is transmission/arrival order: producers append at the
//! tail, the link serializes and retires from the head. A fixed-duplex link
//! must always have something to clock out, so reading from an empty
//! transmit queue synthesizes a filler frame instead of failing.
//!
//! Structural mutations are not atomic; shared queues are wrapped in
//! [`SharedQueue`] and every post/get/remove happens under the lock.

pub mod dedup;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::sgp::crc::CrcEngine;
use crate::sgp::decoder::decode_frame;
use crate::sgp::encoder::{self, filler_frame};
use crate::sgp::protocol::{Packet, RawFrame};

/// Queue operation errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue already holds its maximum number of packets
    #[error("queue is full ({capacity} packets)")]
    Full { capacity: usize },

    /// No packet exists to remove
    #[error("no packet exists in the queue")]
    Empty,
}

/// A frame queue shared between tasks
pub type SharedQueue = Arc<Mutex<FrameQueue>>;

/// Bounded FIFO of owned packets
#[derive(Debug)]
pub struct FrameQueue {
    packets: VecDeque<Packet>,
    capacity: usize,
}

impl FrameQueue {
    /// Create an empty queue holding at most `capacity` packets
    ///
    /// The capacity is clamped to at least one packet so the filler frame
    /// always has room.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            packets: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Wrap a queue for cross-task sharing
    pub fn shared(capacity: usize) -> SharedQueue {
        Arc::new(Mutex::new(Self::with_capacity(capacity)))
    }

    /// Number of packets currently queued
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Maximum number of packets this queue may hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The oldest queued packet, if any
    pub fn head(&self) -> Option<&Packet> {
        self.packets.front()
    }

    /// Append a raw frame at the tail
    ///
    /// With `check_crc` the stored checksum is compared against a fresh
    /// computation over the frame portion and the outcome is recorded on the
    /// packet (`verified = true`, `good` = match). A mismatch is recorded,
    /// not rejected; discarding is the caller's policy.
    ///
    /// # Errors
    ///
    /// [`QueueError::Full`] when the queue is at capacity; the frame is not
    /// queued and existing packets are untouched.
    pub fn post_array(&mut self, raw: &RawFrame, check_crc: bool, crc: &CrcEngine) -> Result<(), QueueError> {
        if self.packets.len() >= self.capacity {
            return Err(QueueError::Full { capacity: self.capacity });
        }

        let mut packet = decode_frame(raw);
        if check_crc {
            packet.crc.verified = true;
            packet.crc.good = packet.crc.value == crc.frame_checksum(raw.frame_portion());
        }

        self.packets.push_back(packet);
        Ok(())
    }

    /// Encode an integer value and append it at the tail
    ///
    /// Outbound frames are trusted at construction and not self-verified.
    pub fn post_int(&mut self, crc: &CrcEngine, identifier: u8, value: i64) -> crate::error::Result<()> {
        let frame = encoder::encode_int(crc, identifier, value)?;
        self.post_array(&frame, false, crc)?;
        Ok(())
    }

    /// Encode a fractional value and append it at the tail
    pub fn post_frac(&mut self, crc: &CrcEngine, identifier: u8, value: f64) -> crate::error::Result<()> {
        let frame = encoder::encode_frac(crc, identifier, value)?;
        self.post_array(&frame, false, crc)?;
        Ok(())
    }

    /// Drop the oldest packet
    ///
    /// # Errors
    ///
    /// [`QueueError::Empty`] when there is nothing to remove.
    pub fn remove_head(&mut self) -> Result<(), QueueError> {
        self.packets.pop_front().map(|_| ()).ok_or(QueueError::Empty)
    }

    /// Serialize the next outbound frame without removing it
    ///
    /// An empty queue first synthesizes and enqueues one filler frame, so
    /// the link always has something to transmit. The served packet is
    /// marked `retrieved`; when the head was already handed out once and a
    /// successor exists, the successor is served instead. Removal is the
    /// caller's separate responsibility.
    pub fn get_array(&mut self, crc: &CrcEngine) -> RawFrame {
        if self.packets.is_empty() {
            let filler = filler_frame(crc);
            // cannot fail: the queue is empty and capacity is at least 1
            let _ = self.post_array(&filler, false, crc);
        }

        let index = if self.packets[0].ack.retrieved && self.packets.len() > 1 {
            1
        } else {
            0
        };
        let packet = &mut self.packets[index];
        packet.ack.retrieved = true;
        packet.to_raw()
    }
}
