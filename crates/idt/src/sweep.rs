//! Compression sweep: isentropic end states fed to fresh reactors.
//!
//! For each target specific volume the initial charge is brought to the same
//! entropy at that volume, sealed into a [`WellMixedReactor`] and integrated
//! over a fixed sampling grid. All trajectories are kept for plotting and
//! ignition detection.

use log::{debug, info};
use stiff::{Integrator, TolControl};

use crate::{mechanism::Mechanism, reactor::WellMixedReactor, Error};
use gas::{GasState, ONE_ATM};

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

#[derive(Clone, Debug)]
pub struct SweepConfig {
    /// charge temperature before compression [K]
    pub initial_temperature: f64,
    /// charge pressure before compression [Pa]
    pub initial_pressure: f64,
    /// molar composition string, e.g. `"CH4:1.0, O2:2.0, N2:7.52"`
    pub composition: String,
    /// post-compression specific volumes to sweep [m^3/kg]
    pub volumes: Vec<f64>,
    /// sampling instants [s], shared by every trajectory
    pub times: Vec<f64>,
    pub rtol: f64,
    pub atol: f64,
}

impl Default for SweepConfig {
    /// Stoichiometric methane/air at standard conditions, compressed up to
    /// 50:1 and watched for 10 ms.
    fn default() -> Self {
        SweepConfig {
            initial_temperature: 273.15,
            initial_pressure: ONE_ATM,
            composition: "CH4:1.0, O2:2.0, N2:7.52".to_owned(),
            volumes: linspace(1.0, 0.02, 100),
            times: linspace(0.0, 0.01, 1000),
            rtol: 1e-6,
            atol: 1e-12,
        }
    }
}

/// Sampled history of one reactor in the sweep.
#[derive(Clone, Debug)]
pub struct Trajectory {
    pub specific_volume: f64,
    pub temperatures: Vec<f64>,
    pub pressures: Vec<f64>,
    pub co2_fractions: Vec<f64>,
}

#[derive(Clone, Debug)]
pub struct SweepOutput {
    pub times: Vec<f64>,
    pub trajectories: Vec<Trajectory>,
}

pub fn run(cfg: &SweepConfig) -> Result<SweepOutput, Error> {
    let charge = GasState::from_tpx(
        cfg.initial_temperature,
        cfg.initial_pressure,
        &cfg.composition,
    )?;
    let s0 = charge.entropy_mass();

    let mut trajectories = Vec::with_capacity(cfg.volumes.len());
    for &v in &cfg.volumes {
        let mut state = charge.clone();
        state.set_sv(s0, v)?;
        info!(
            "v = {v:.4} m^3/kg: compressed to T = {:.1} K, P = {:.2} atm",
            state.temperature(),
            state.pressure() / ONE_ATM
        );

        let y0 = WellMixedReactor::initial_state(&state);
        let reactor = WellMixedReactor::new(&state, Mechanism::new()?);
        let mut ode = Integrator::new(
            reactor,
            0.0,
            y0,
            TolControl::scalar(cfg.rtol, cfg.atol),
        );

        let mut traj = Trajectory {
            specific_volume: v,
            temperatures: Vec::with_capacity(cfg.times.len()),
            pressures: Vec::with_capacity(cfg.times.len()),
            co2_fractions: Vec::with_capacity(cfg.times.len()),
        };
        for &t in &cfg.times {
            ode.advance(t)?;
            let y = ode.state();
            traj.temperatures.push(WellMixedReactor::temperature(y));
            traj.pressures.push(ode.problem().pressure(y));
            traj.co2_fractions.push(ode.problem().co2_mole_fraction(y));
        }
        debug!(
            "v = {v:.4}: {} steps, {} rhs evals, {} Jacobians",
            ode.counters().steps,
            ode.counters().rhs_evals,
            ode.counters().jac_evals
        );
        trajectories.push(traj);
    }

    Ok(SweepOutput {
        times: cfg.times.clone(),
        trajectories,
    })
}
