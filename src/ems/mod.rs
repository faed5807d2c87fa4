//! # EMS Rule Engine
//!
//! The value-producer side of the bridge: a shared plant-state store fed by
//! decoded inbound frames, and the rule engine that plans and posts power
//! setpoints from it every producer cycle.

pub mod state;
pub mod rules;

pub use rules::{plan_setpoints, post_setpoints, rule_check, RuleOutcome, Setpoints};
pub use state::{OperatingMode, PlantState, SharedPlantState, Strategy};

use crate::queue::SharedQueue;
use crate::sgp::crc::CrcEngine;
use crate::sgp::lexicon::ID_TEST_LATENCY;
use std::sync::PoisonError;
use tracing::warn;

/// One producer cycle: post the latency probe, then the planned setpoints
///
/// The latency counter goes out every cycle so the link stays measurable
/// even before the simulator leaves its init mode. A full transmit queue
/// drops this cycle's posts and the next cycle tries again with fresh
/// values.
pub fn produce_setpoints(
    state: &SharedPlantState,
    transmit: &SharedQueue,
    crc: &CrcEngine,
    cycle_counter: u32,
) {
    let plan = {
        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
        plan_setpoints(&mut state)
    };

    let mut transmit = transmit.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = transmit.post_int(crc, ID_TEST_LATENCY, i64::from(cycle_counter)) {
        warn!("Dropping latency probe this cycle: {}", e);
        return;
    }

    if let Some(setpoints) = plan {
        if let Err(e) = post_setpoints(&mut transmit, crc, &setpoints) {
            warn!("Dropping setpoint posts this cycle: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::FrameQueue;
    use crate::sgp::crc::CrcConfig;

    #[test]
    fn test_produce_posts_probe_only_while_initializing() {
        let crc = CrcEngine::new(CrcConfig::default()).unwrap();
        let state = PlantState::shared(Strategy::Soc);
        let transmit = FrameQueue::shared(8);

        produce_setpoints(&state, &transmit, &crc, 1);
        assert_eq!(transmit.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_produce_posts_probe_and_setpoints_once_running() {
        let crc = CrcEngine::new(CrcConfig::default()).unwrap();
        let state = PlantState::shared(Strategy::Soc);
        {
            let mut state = state.lock().unwrap();
            state.mode = OperatingMode::Bunkering;
            state.battery_soc = [60.0, 60.0];
        }
        let transmit = FrameQueue::shared(8);

        produce_setpoints(&state, &transmit, &crc, 2);
        assert_eq!(transmit.lock().unwrap().len(), 5, "probe plus four setpoints");
    }

    #[test]
    fn test_produce_survives_full_queue() {
        let crc = CrcEngine::new(CrcConfig::default()).unwrap();
        let state = PlantState::shared(Strategy::Soc);
        let transmit = FrameQueue::shared(1);

        produce_setpoints(&state, &transmit, &crc, 1);
        produce_setpoints(&state, &transmit, &crc, 2);
        assert_eq!(transmit.lock().unwrap().len(), 1, "full queue drops the cycle");
    }
}
