//! # Transport Tick
//!
//! The repeating protocol turn that keeps the duplex link fed. Every tick:
//!
//! 1. serialize the next outbound frame (or a synthesized filler) from the
//!    transmit queue,
//! 2. run one full-duplex exchange through the collaborator,
//! 3. admit the inbound frame to the receive queue with CRC checking,
//!    unless its identifier is reserved or the dedup filter has just seen
//!    the same bytes,
//! 4. retire exactly one transmitted frame: the head is dropped
//!    unconditionally after every completed exchange; the wire ack field is
//!    reserved and never evaluated, so delivery to the peer is not
//!    confirmed,
//! 5. drain the receive queue, discarding packets whose recorded CRC check
//!    failed and decoding the rest into deliveries for the consumer.
//!
//! A failed exchange counts as "no data received this tick": nothing is
//! admitted, nothing is retired, nothing is delivered.

use std::sync::{MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::diag::{self, DiagCode};
use crate::queue::dedup::DedupFilter;
use crate::queue::{FrameQueue, SharedQueue};
use crate::sgp::crc::CrcEngine;
use crate::sgp::decoder::decode_value;
use crate::sgp::lexicon::{ID_FILLER, ID_RESERVED_HIGH, ID_RESERVED_LOW};
use crate::sgp::protocol::Value;

use super::exchange::FrameExchange;

/// One decoded value handed to the consumer
pub type Delivery = (u8, Value);

/// Drives the protocol turn over an exchange collaborator
///
/// Owns the CRC engine and the dedup filter exclusively; the queues are
/// shared with the producer and consumer tasks.
pub struct LinkDriver<E: FrameExchange> {
    exchange: E,
    crc: CrcEngine,
    transmit: SharedQueue,
    receive: SharedQueue,
    dedup: DedupFilter,
}

impl<E: FrameExchange> LinkDriver<E> {
    pub fn new(exchange: E, crc: CrcEngine, transmit: SharedQueue, receive: SharedQueue) -> Self {
        Self {
            exchange,
            crc,
            transmit,
            receive,
            dedup: DedupFilter::new(),
        }
    }

    /// Execute one protocol turn
    ///
    /// Returns the values decoded from the receive queue this turn, in
    /// arrival order. Exchange failures surface as an empty delivery list,
    /// never as an error.
    pub async fn run_tick(&mut self) -> Vec<Delivery> {
        let outbound = lock(&self.transmit).get_array(&self.crc);

        let inbound = match self.exchange.exchange(&outbound).await {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Frame exchange failed, no data this tick: {}", e);
                diag::record(DiagCode::ExchangeFailed);
                return Vec::new();
            }
        };

        let identifier = inbound.identifier();
        let sentinel = matches!(identifier, ID_RESERVED_LOW | ID_RESERVED_HIGH | ID_FILLER);
        if !sentinel && self.dedup.is_new(&inbound) {
            if let Err(e) = lock(&self.receive).post_array(&inbound, true, &self.crc) {
                warn!("Receive queue rejected frame 0x{:02X}: {}", identifier, e);
                diag::record(DiagCode::QueueFull);
            }
        }

        // No acknowledgment protocol: drop the transmitted head whether or
        // not the peer actually took it.
        {
            let mut transmit = lock(&self.transmit);
            if !transmit.is_empty() {
                let _ = transmit.remove_head();
            }
        }

        self.drain_receive()
    }

    /// Empty the receive queue into a delivery list
    fn drain_receive(&mut self) -> Vec<Delivery> {
        let mut deliveries = Vec::new();
        let mut receive = lock(&self.receive);

        loop {
            let (identifier, payload, good) = match receive.head() {
                Some(packet) => (packet.identifier, packet.payload, packet.crc.good),
                None => break,
            };

            if good {
                match decode_value(identifier, &payload) {
                    Ok(value) => deliveries.push((identifier, value)),
                    Err(e) => {
                        warn!("Discarding undecodable frame: {}", e);
                        diag::record(DiagCode::NoDatatype);
                    }
                }
            } else {
                debug!("Discarding frame 0x{:02X} with bad checksum", identifier);
                diag::record(DiagCode::BadCrc);
            }

            let _ = receive.remove_head();
        }

        deliveries
    }
}

fn lock(queue: &SharedQueue) -> MutexGuard<'_, FrameQueue> {
    // A poisoning panic cannot corrupt the deque; keep going with the data.
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}
