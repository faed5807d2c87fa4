//! # Setpoint Planner
//!
//! The rule engine that turns the current plant state into the four power
//! setpoints transmitted each producer cycle. Strategy selection splits the
//! mode's total power demand across two generators and two batteries;
//! battery charge overrides preempt every strategy when state of charge
//! falls below its threshold.

use super::state::{PlantState, Strategy, BATTERY_COUNT, GENERATOR_COUNT};
use crate::queue::FrameQueue;
use crate::sgp::crc::CrcEngine;
use crate::sgp::lexicon::{
    ID_SETPOINT_BATTERY_1, ID_SETPOINT_BATTERY_2, ID_SETPOINT_GENERATOR_1, ID_SETPOINT_GENERATOR_2,
};

/// SOC below which charging preempts any strategy, in percent
pub const MINIMUM_SOC: f32 = 25.0;

/// SOC below which the SOC strategy starts charging, in percent
pub const CHARGING_SOC: f32 = 35.0;

/// SOC above which charge current is no longer scheduled, in percent
pub const MAXIMUM_SOC: f32 = 70.0;

/// Combined generator capacity, in kW
pub const MAX_GENERATOR_POWER: i64 = 3800;

/// Single generator capacity, in kW
pub const MAX_GENERATOR_1_POWER: i64 = 1900;

/// Above this demand a charge request falls back to a plain generator split
const CHARGE_FALLBACK_POWER_LIMIT: i64 = 3000;

/// What the rule check decided this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    Inefficient,
    SocBalance,
    FuelEfficiency,
    ChargeBattery1,
    ChargeBattery2,
    ChargeBothBatteries,
}

/// Planned power setpoints for one producer cycle, in kW
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setpoints {
    pub generator: [i64; GENERATOR_COUNT],
    pub battery: [i64; BATTERY_COUNT],
}

/// Decide between the strategy calculation and a charge override
pub fn rule_check(state: &PlantState) -> RuleOutcome {
    let threshold = match state.strategy {
        Strategy::Soc => CHARGING_SOC,
        Strategy::Inefficient | Strategy::FuelEfficient => MINIMUM_SOC,
    };

    let low_1 = state.battery_soc[0] < threshold;
    let low_2 = state.battery_soc[1] < threshold;

    match (low_1, low_2) {
        (true, true) => RuleOutcome::ChargeBothBatteries,
        (true, false) => RuleOutcome::ChargeBattery1,
        (false, true) => RuleOutcome::ChargeBattery2,
        (false, false) => match state.strategy {
            Strategy::Inefficient => RuleOutcome::Inefficient,
            Strategy::Soc => RuleOutcome::SocBalance,
            Strategy::FuelEfficient => RuleOutcome::FuelEfficiency,
        },
    }
}

/// Plan the setpoints for the current mode, if the plant has started
///
/// Returns `None` while the simulator still reports the init mode; there is
/// nothing to command yet.
pub fn plan_setpoints(state: &mut PlantState) -> Option<Setpoints> {
    if state.mode == super::state::OperatingMode::Init {
        return None;
    }

    let total = state.mode.reference_power();
    let outcome = rule_check(state);
    Some(ready_setpoints(state, total, outcome))
}

/// Split `total` demand across generators and batteries per the outcome
fn ready_setpoints(state: &mut PlantState, total: i64, outcome: RuleOutcome) -> Setpoints {
    let pct = |share: f64| (total as f64 * share) as i64;
    let mut generator = [0i64; GENERATOR_COUNT];
    let mut battery = [0i64; BATTERY_COUNT];

    match outcome {
        RuleOutcome::Inefficient => {
            generator = [pct(0.25), pct(0.25)];
            battery = [pct(0.25), pct(0.25)];
        }

        RuleOutcome::SocBalance => {
            if total == 600 {
                // Bunkering: low demand, top the batteries up from the generators
                generator = [pct(0.5), pct(0.5)];
                if state.battery_soc[0] < MAXIMUM_SOC {
                    battery[0] = -1000;
                    generator[0] += 1000;
                }
                if state.battery_soc[1] < MAXIMUM_SOC {
                    battery[1] = -1000;
                    generator[1] += 1000;
                }
            }
            if total == 2150 {
                // Dumping: moderate demand, smaller charge bias
                generator = [pct(0.5), pct(0.5)];
                if state.battery_soc[0] < MAXIMUM_SOC {
                    generator[0] += 500;
                    battery[0] = -500;
                }
                if state.battery_soc[1] < MAXIMUM_SOC {
                    generator[1] += 500;
                    battery[1] = -500;
                }
            }
            if total >= 2500 {
                generator = [pct(0.4), pct(0.4)];
                battery = [pct(0.1), pct(0.1)];
            }
        }

        RuleOutcome::FuelEfficiency => {
            if total == 600 || total == 2150 {
                // Low enough to run on batteries alone
                battery = [pct(0.5), pct(0.5)];
            }
            if total == 3950 {
                generator = [pct(0.5), 0];
                battery = [pct(0.25), pct(0.25)];
            }
            if (2500..3950).contains(&total) {
                // One generator pinned at its efficient point, batteries take the rest
                generator = [MAX_GENERATOR_1_POWER, 0];
                let remainder = (total - MAX_GENERATOR_1_POWER) / 2;
                battery = [remainder, remainder];
            }
        }

        RuleOutcome::ChargeBattery1 | RuleOutcome::ChargeBattery2 | RuleOutcome::ChargeBothBatteries => {
            if total > CHARGE_FALLBACK_POWER_LIMIT {
                // Near the generator ceiling there is no headroom to charge from
                state.inefficiency_on = true;
                generator = [pct(0.5), pct(0.5)];
            } else {
                state.inefficiency_on = state.strategy == Strategy::Inefficient;
                let headroom = (MAX_GENERATOR_POWER - total).max(0);

                match outcome {
                    RuleOutcome::ChargeBattery1 | RuleOutcome::ChargeBattery2 => {
                        let index = if outcome == RuleOutcome::ChargeBattery1 { 0 } else { 1 };
                        if headroom > 1000 {
                            battery[index] = -1000;
                            generator = [pct(0.5) + 500, pct(0.5) + 500];
                        } else {
                            battery[index] = -headroom;
                            generator = [pct(0.5) + headroom / 2, pct(0.5) + headroom / 2];
                        }
                    }
                    _ => {
                        if headroom > 2000 {
                            battery = [-1000, -1000];
                            generator = [pct(0.5) + 1000, pct(0.5) + 1000];
                        } else {
                            battery = [-(headroom / 2), -(headroom / 2)];
                            generator = [pct(0.5) + headroom / 2, pct(0.5) + headroom / 2];
                        }
                    }
                }
            }
        }
    }

    Setpoints { generator, battery }
}

/// Post the planned setpoints onto the transmit queue as typed frames
pub fn post_setpoints(
    queue: &mut FrameQueue,
    crc: &CrcEngine,
    setpoints: &Setpoints,
) -> crate::error::Result<()> {
    queue.post_int(crc, ID_SETPOINT_BATTERY_1, setpoints.battery[0])?;
    queue.post_int(crc, ID_SETPOINT_BATTERY_2, setpoints.battery[1])?;
    queue.post_int(crc, ID_SETPOINT_GENERATOR_1, setpoints.generator[0])?;
    queue.post_int(crc, ID_SETPOINT_GENERATOR_2, setpoints.generator[1])?;
    Ok(())
}
