//! Constant-volume, adiabatic well-mixed reactor.
//!
//! The state vector is `[T, Y_1 .. Y_N]`: temperature followed by the species
//! mass fractions. Density is fixed at construction (rigid, closed vessel),
//! so the governing equations are
//!
//! ```text
//! dY_k/dt = W_k wdot_k / rho
//! dT/dt   = -sum_k u_k wdot_k / (rho cv)
//! ```
//!
//! with `u_k` the molar internal energies and `cv` the mixture-averaged
//! constant-volume heat capacity.

use nalgebra::{DVector, Dyn};
use stiff::OdeProblem;

use crate::mechanism::Mechanism;
use gas::{
    mixture,
    species::{self, N_SPECIES},
    GasState, GAS_CONSTANT,
};

pub struct WellMixedReactor {
    density: f64,
    mechanism: Mechanism,
}

impl WellMixedReactor {
    /// Seal the given gas state into a rigid vessel.
    pub fn new(state: &GasState, mechanism: Mechanism) -> Self {
        WellMixedReactor {
            density: state.density(),
            mechanism,
        }
    }

    /// Pack a gas state into the reactor's state-vector layout.
    pub fn initial_state(state: &GasState) -> DVector<f64> {
        let y_mass = state.mass_fractions();
        let mut y = DVector::zeros(1 + N_SPECIES);
        y[0] = state.temperature();
        y.rows_mut(1, N_SPECIES).copy_from(&y_mass);
        y
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn temperature(y: &DVector<f64>) -> f64 {
        y[0]
    }

    /// Ideal-gas pressure [Pa] of a state vector.
    pub fn pressure(&self, y: &DVector<f64>) -> f64 {
        let x = mixture::mass_to_mole(&y.rows(1, N_SPECIES).clone_owned());
        self.density * (GAS_CONSTANT / mixture::mean_molar_mass(&x)) * y[0]
    }

    pub fn co2_mole_fraction(&self, y: &DVector<f64>) -> f64 {
        let x = mixture::mass_to_mole(&y.rows(1, N_SPECIES).clone_owned());
        x[self.mechanism.co2_index()]
    }
}

impl OdeProblem<Dyn> for WellMixedReactor {
    fn dim(&self) -> Dyn {
        Dyn(1 + N_SPECIES)
    }

    fn rhs(&self, _t: f64, y: &DVector<f64>, dydt: &mut DVector<f64>) -> Result<(), stiff::Error> {
        let temp = y[0];
        if !(temp > 0.0) || !temp.is_finite() {
            return Err(stiff::Error::RhsFail);
        }

        let table = species::all();
        let mut conc = DVector::zeros(N_SPECIES);
        for k in 0..N_SPECIES {
            conc[k] = self.density * y[1 + k] / table[k].molar_mass;
        }

        let mut wdot = DVector::zeros(N_SPECIES);
        self.mechanism.net_production_rates(temp, &conc, &mut wdot);

        let x = mixture::mass_to_mole(&y.rows(1, N_SPECIES).clone_owned());
        let cv = (mixture::cp_mole(temp, &x) - GAS_CONSTANT) / mixture::mean_molar_mass(&x);

        let mut heat_release = 0.0;
        for k in 0..N_SPECIES {
            dydt[1 + k] = table[k].molar_mass * wdot[k] / self.density;
            heat_release += mixture::internal_energy_species(temp, k) * wdot[k];
        }
        dydt[0] = -heat_release / (self.density * cv);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use gas::ONE_ATM;

    const METHANE_AIR: &str = "CH4:1.0, O2:2.0, N2:7.52";

    fn reactor_at(temp: f64) -> (WellMixedReactor, DVector<f64>) {
        let state = GasState::from_tpx(temp, ONE_ATM, METHANE_AIR).unwrap();
        let y = WellMixedReactor::initial_state(&state);
        let reactor = WellMixedReactor::new(&state, Mechanism::new().unwrap());
        (reactor, y)
    }

    #[test]
    fn state_vector_layout() {
        let (_, y) = reactor_at(273.15);
        assert_eq!(y.len(), 1 + N_SPECIES);
        assert_eq!(y[0], 273.15);
        assert_relative_eq!(y.rows(1, N_SPECIES).sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pressure_reproduces_sealed_state() {
        let state = GasState::from_tpx(900.0, 5.0 * ONE_ATM, METHANE_AIR).unwrap();
        let y = WellMixedReactor::initial_state(&state);
        let reactor = WellMixedReactor::new(&state, Mechanism::new().unwrap());
        assert_relative_eq!(reactor.pressure(&y), 5.0 * ONE_ATM, max_relative = 1e-10);
    }

    #[test]
    fn cold_mixture_barely_evolves() {
        let (reactor, y) = reactor_at(300.0);
        let mut dydt = DVector::zeros(1 + N_SPECIES);
        reactor.rhs(0.0, &y, &mut dydt).unwrap();
        assert_abs_diff_eq!(dydt.norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn hot_mixture_heats_up_while_consuming_fuel() {
        let (reactor, y) = reactor_at(1600.0);
        let mut dydt = DVector::zeros(1 + N_SPECIES);
        reactor.rhs(0.0, &y, &mut dydt).unwrap();

        let i = |n| 1 + species::index(n).unwrap();
        assert!(dydt[0] > 0.0, "dT/dt = {}", dydt[0]);
        assert!(dydt[i("CH4")] < 0.0);
        assert!(dydt[i("O2")] < 0.0);
        assert_eq!(dydt[i("N2")], 0.0);
        // mass is conserved up to the rounding in the tabulated molar masses
        let scale = dydt[i("CH4")].abs();
        assert_abs_diff_eq!(dydt.rows(1, N_SPECIES).sum(), 0.0, epsilon = 1e-4 * scale);
    }

    #[test]
    fn unphysical_temperature_is_a_recoverable_rhs_failure() {
        let (reactor, mut y) = reactor_at(1600.0);
        y[0] = -10.0;
        let mut dydt = DVector::zeros(1 + N_SPECIES);
        assert!(reactor.rhs(0.0, &y, &mut dydt).is_err());
    }
}
