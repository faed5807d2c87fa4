//! # Plant State Store
//!
//! Shared snapshot of the plant as last reported by the simulator, plus the
//! operator's optimization strategy. The transport task writes decoded
//! inbound values into it, the rule engine reads it to plan setpoints, the
//! display task reads it for snapshots.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::sgp::lexicon::{
    ID_FUEL_EFFICIENCY_1, ID_FUEL_EFFICIENCY_2, ID_OPERATING_MODE, ID_POWER_BATTERY_1,
    ID_POWER_BATTERY_2, ID_POWER_GENERATOR_1, ID_POWER_GENERATOR_2, ID_SOC_BATTERY_1,
    ID_SOC_BATTERY_2, ID_TEST_LATENCY,
};
use crate::sgp::protocol::Value;

pub const BATTERY_COUNT: usize = 2;
pub const GENERATOR_COUNT: usize = 2;

/// Plant operating modes as reported by the simulator
///
/// Wire values follow the simulator's mode list, with 0 meaning "not
/// started yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    Init,
    SailEmpty,
    DeployGear,
    Trail,
    CollectGear,
    SailFull,
    Rainbow,
    ShorePump,
    Dumping,
    Bunkering,
}

impl OperatingMode {
    /// Map a wire mode byte onto a mode, if it names one
    pub fn from_wire(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(OperatingMode::Init),
            1 => Some(OperatingMode::SailEmpty),
            2 => Some(OperatingMode::DeployGear),
            3 => Some(OperatingMode::Trail),
            4 => Some(OperatingMode::CollectGear),
            5 => Some(OperatingMode::SailFull),
            6 => Some(OperatingMode::Rainbow),
            7 => Some(OperatingMode::ShorePump),
            8 => Some(OperatingMode::Dumping),
            9 => Some(OperatingMode::Bunkering),
            _ => None,
        }
    }

    /// Total plant power demand associated with the mode, in kW
    pub fn reference_power(self) -> i64 {
        match self {
            OperatingMode::Init => 0,
            OperatingMode::SailEmpty | OperatingMode::SailFull => 2500,
            OperatingMode::DeployGear | OperatingMode::CollectGear => 0,
            OperatingMode::Trail => 3150,
            OperatingMode::Rainbow => 3300,
            OperatingMode::ShorePump => 3950,
            OperatingMode::Dumping => 2150,
            OperatingMode::Bunkering => 600,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OperatingMode::Init => "initializing",
            OperatingMode::SailEmpty => "sailing empty",
            OperatingMode::DeployGear => "deploying gear",
            OperatingMode::Trail => "trailing",
            OperatingMode::CollectGear => "collecting gear",
            OperatingMode::SailFull => "sailing full",
            OperatingMode::Rainbow => "rainbowing",
            OperatingMode::ShorePump => "shore pumping",
            OperatingMode::Dumping => "dumping",
            OperatingMode::Bunkering => "bunkering",
        }
    }
}

/// Operator-selected optimization strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Even split, no optimization
    Inefficient,
    /// Keep batteries charged ahead of demand
    Soc,
    /// Favor battery power to keep generators at their efficient point
    FuelEfficient,
}

/// Shared plant state between the transport, producer and display tasks
pub type SharedPlantState = Arc<Mutex<PlantState>>;

/// The value store the link feeds and the rule engine reads
#[derive(Debug, Clone)]
pub struct PlantState {
    pub strategy: Strategy,
    pub mode: OperatingMode,
    pub generator_power: [u32; GENERATOR_COUNT],
    pub battery_power: [f64; BATTERY_COUNT],
    pub battery_soc: [f32; BATTERY_COUNT],
    pub fuel_efficiency: [f32; GENERATOR_COUNT],
    pub latency_counter: u32,
    /// Sticky fallback flag toggled by the charge planner
    pub inefficiency_on: bool,
}

impl PlantState {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            mode: OperatingMode::Init,
            generator_power: [0; GENERATOR_COUNT],
            battery_power: [0.0; BATTERY_COUNT],
            battery_soc: [0.0; BATTERY_COUNT],
            fuel_efficiency: [0.0; GENERATOR_COUNT],
            latency_counter: 0,
            inefficiency_on: true,
        }
    }

    pub fn shared(strategy: Strategy) -> SharedPlantState {
        Arc::new(Mutex::new(Self::new(strategy)))
    }

    /// Write one decoded inbound value into its field
    ///
    /// Identifiers without a plant-state field are ignored with a debug log;
    /// the link delivers whatever the lexicon knows, not only what the rule
    /// engine cares about.
    pub fn apply(&mut self, identifier: u8, value: Value) {
        match (identifier, value) {
            (ID_POWER_BATTERY_1, Value::F64(v)) => self.battery_power[0] = v,
            (ID_POWER_BATTERY_2, Value::F64(v)) => self.battery_power[1] = v,
            (ID_SOC_BATTERY_1, Value::F32(v)) => self.battery_soc[0] = v,
            (ID_SOC_BATTERY_2, Value::F32(v)) => self.battery_soc[1] = v,
            (ID_POWER_GENERATOR_1, Value::U32(v)) => self.generator_power[0] = v,
            (ID_POWER_GENERATOR_2, Value::U32(v)) => self.generator_power[1] = v,
            (ID_FUEL_EFFICIENCY_1, Value::F32(v)) => self.fuel_efficiency[0] = v,
            (ID_FUEL_EFFICIENCY_2, Value::F32(v)) => self.fuel_efficiency[1] = v,
            (ID_TEST_LATENCY, Value::U32(v)) => self.latency_counter = v,
            (ID_OPERATING_MODE, Value::U8(raw)) => match OperatingMode::from_wire(raw) {
                Some(mode) => self.mode = mode,
                None => warn!("Simulator reported unknown operating mode {}", raw),
            },
            (id, value) => {
                debug!("No plant-state field for identifier 0x{:02X} ({:?})", id, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_wire_round_trip() {
        for raw in 0..=9u8 {
            let mode = OperatingMode::from_wire(raw).unwrap();
            assert!(!mode.label().is_empty());
        }
        assert_eq!(OperatingMode::from_wire(10), None);
        assert_eq!(OperatingMode::from_wire(0xFF), None);
    }

    #[test]
    fn test_reference_powers() {
        assert_eq!(OperatingMode::SailEmpty.reference_power(), 2500);
        assert_eq!(OperatingMode::SailFull.reference_power(), 2500);
        assert_eq!(OperatingMode::ShorePump.reference_power(), 3950);
        assert_eq!(OperatingMode::Bunkering.reference_power(), 600);
        assert_eq!(OperatingMode::DeployGear.reference_power(), 0);
    }

    #[test]
    fn test_apply_maps_inbound_values() {
        let mut state = PlantState::new(Strategy::Soc);

        state.apply(ID_POWER_BATTERY_1, Value::F64(69.0));
        state.apply(ID_POWER_BATTERY_2, Value::F64(420.0));
        state.apply(ID_SOC_BATTERY_1, Value::F32(27.0));
        state.apply(ID_SOC_BATTERY_2, Value::F32(27.0));
        state.apply(ID_POWER_GENERATOR_1, Value::U32(666));
        state.apply(ID_POWER_GENERATOR_2, Value::U32(555));
        state.apply(ID_FUEL_EFFICIENCY_1, Value::F32(99.0));
        state.apply(ID_FUEL_EFFICIENCY_2, Value::F32(11.0));
        state.apply(ID_OPERATING_MODE, Value::U8(5));

        assert_eq!(state.battery_power, [69.0, 420.0]);
        assert_eq!(state.battery_soc, [27.0, 27.0]);
        assert_eq!(state.generator_power, [666, 555]);
        assert_eq!(state.fuel_efficiency, [99.0, 11.0]);
        assert_eq!(state.mode, OperatingMode::SailFull);
    }

    #[test]
    fn test_apply_ignores_unmapped_identifiers() {
        let mut state = PlantState::new(Strategy::Soc);
        let before = state.clone();

        // Filler-adjacent test value, and a type that does not match its field
        state.apply(0xA0, Value::U8(1));
        state.apply(ID_POWER_BATTERY_1, Value::U8(1));
        state.apply(ID_OPERATING_MODE, Value::U8(42));

        assert_eq!(state.battery_power, before.battery_power);
        assert_eq!(state.mode, before.mode);
    }
}
