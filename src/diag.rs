//! # Diagnostics Slot
//!
//! Process-wide memory of the most recent transport fault, for inspection
//! from a debugger or a status report. Control flow never reads it: every
//! fault also surfaces as a typed `Result` at its call site, and this slot
//! only answers "what went wrong last" after the fact.

use std::sync::atomic::{AtomicU8, Ordering};

/// Fault categories fed into the slot by the transport paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DiagCode {
    QueueFull = 1,
    QueueEmpty = 2,
    BadCrc = 3,
    BadIdentifier = 4,
    NoDatatype = 5,
    PayloadOutOfRange = 6,
    ExchangeFailed = 7,
}

impl DiagCode {
    fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(DiagCode::QueueFull),
            2 => Some(DiagCode::QueueEmpty),
            3 => Some(DiagCode::BadCrc),
            4 => Some(DiagCode::BadIdentifier),
            5 => Some(DiagCode::NoDatatype),
            6 => Some(DiagCode::PayloadOutOfRange),
            7 => Some(DiagCode::ExchangeFailed),
            _ => None,
        }
    }
}

/// Single-value fault memory
#[derive(Debug)]
pub struct DiagSlot {
    code: AtomicU8,
}

impl DiagSlot {
    pub const fn new() -> Self {
        Self { code: AtomicU8::new(0) }
    }

    /// Overwrite the slot with the latest fault
    pub fn record(&self, code: DiagCode) {
        self.code.store(code as u8, Ordering::Relaxed);
    }

    /// The most recently recorded fault, if any
    pub fn last(&self) -> Option<DiagCode> {
        DiagCode::from_raw(self.code.load(Ordering::Relaxed))
    }

    /// Clear the slot back to "no fault"
    pub fn reset(&self) {
        self.code.store(0, Ordering::Relaxed);
    }
}

impl Default for DiagSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide slot
static DIAG: DiagSlot = DiagSlot::new();

pub fn record(code: DiagCode) {
    DIAG.record(code);
}

pub fn last() -> Option<DiagCode> {
    DIAG.last()
}

pub fn reset() {
    DIAG.reset();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_records_latest_fault() {
        let slot = DiagSlot::new();
        assert_eq!(slot.last(), None);

        slot.record(DiagCode::BadCrc);
        assert_eq!(slot.last(), Some(DiagCode::BadCrc));

        slot.record(DiagCode::QueueFull);
        assert_eq!(slot.last(), Some(DiagCode::QueueFull), "latest fault wins");

        slot.reset();
        assert_eq!(slot.last(), None);
    }

    #[test]
    fn test_unknown_raw_value_reads_as_none() {
        assert_eq!(DiagCode::from_raw(0), None);
        assert_eq!(DiagCode::from_raw(200), None);
    }
}
