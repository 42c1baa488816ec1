//! Threshold-crossing ignition detection.
//!
//! Two detectors, matching the two driver binaries. Both use a coarse gate
//! to decide that ignition happened at all and a finer threshold to place it
//! in time, and they differ in how they combine results across the sweep:
//! the temperature detector lets later (stronger) compressions overwrite the
//! event, while the CO2 detector locks in the first trajectory that ignites.

use log::warn;

use crate::sweep::{SweepOutput, Trajectory};

/// Temperature-rise gate: a sample-to-sample jump this large means the
/// trajectory ignited.
const TEMP_GATE: f64 = 300.0;
/// Temperature-rise threshold used to place the ignition instant.
const TEMP_LOCATE: f64 = 5.0;

/// CO2 mole fraction that counts as evidence of ignition.
const CO2_GATE: f64 = 1e-5;
/// CO2 mole fraction used to place the ignition instant.
const CO2_LOCATE: f64 = 2e-4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IgnitionEvent {
    /// delay from the start of the trajectory [s]
    pub time: f64,
    /// temperature at the event sample [K]
    pub temperature: f64,
    /// CO2 mole fraction at the event sample, when the detector tracks it
    pub co2_fraction: Option<f64>,
}

/// Scan one trajectory for an ignition-scale temperature jump.
///
/// The event is placed at the sample after the first rise above
/// [`TEMP_LOCATE`], which on a coarse grid can sit well before the jump that
/// passed the gate.
pub fn temperature_jump(times: &[f64], traj: &Trajectory) -> Option<IgnitionEvent> {
    let temps = &traj.temperatures;
    if !temps.windows(2).any(|w| w[1] - w[0] > TEMP_GATE) {
        return None;
    }
    // the gate guarantees a match: a 300 K rise is also a 5 K rise
    let i = temps.windows(2).position(|w| w[1] - w[0] > TEMP_LOCATE)?;
    Some(IgnitionEvent {
        time: times[i + 1],
        temperature: temps[i + 1],
        co2_fraction: None,
    })
}

/// Scan one trajectory for CO2 accumulation past the ignition threshold.
///
/// The gate and the locator use different thresholds; a trajectory can pass
/// the gate while never reaching the locator level, in which case no event
/// is reported.
pub fn co2_buildup(times: &[f64], traj: &Trajectory) -> Option<IgnitionEvent> {
    let co2 = &traj.co2_fractions;
    if !co2.iter().any(|&x| x > CO2_GATE) {
        return None;
    }
    match co2.iter().position(|&x| x > CO2_LOCATE) {
        Some(i) => Some(IgnitionEvent {
            time: times[i],
            temperature: traj.temperatures[i],
            co2_fraction: Some(co2[i]),
        }),
        None => {
            warn!(
                "v = {:.4} m^3/kg: CO2 passed {CO2_GATE:.0e} but never {CO2_LOCATE:.0e}; \
                 no ignition point placed",
                traj.specific_volume
            );
            None
        }
    }
}

/// Sweep-level temperature detection: every igniting trajectory overwrites
/// the event, so the last (most compressed) one wins.
pub fn temperature_sweep(output: &SweepOutput) -> Option<IgnitionEvent> {
    let mut event = None;
    for traj in &output.trajectories {
        if let Some(e) = temperature_jump(&output.times, traj) {
            event = Some(e);
        }
    }
    event
}

/// Sweep-level CO2 detection: the first igniting trajectory wins and later
/// ones are not consulted.
pub fn co2_sweep(output: &SweepOutput) -> Option<IgnitionEvent> {
    output
        .trajectories
        .iter()
        .find_map(|traj| co2_buildup(&output.times, traj))
}
