//! # EMS Bridge Library
//!
//! Transport layer between an energy management system and a real-time
//! plant simulator over a duplex, fixed-length-frame link.
//!
//! This library provides the frame codec (configurable CRC, identifier
//! lexicon, typed encode/decode), the bounded frame queues with inbound
//! deduplication, the transport tick that keeps the duplex link fed, and
//! the rule engine that produces power setpoints from the shared plant
//! state.

pub mod config;
pub mod error;
pub mod diag;
pub mod sgp;
pub mod queue;
pub mod link;
pub mod ems;
pub mod telemetry;
