//! Two-step global methane oxidation kinetics.
//!
//! Westbrook-Dryer global rates:
//!
//! ```text
//! CH4 + 1.5 O2 -> CO + 2 H2O
//! CO + 0.5 O2 <-> CO2
//! ```
//!
//! The rate constants are the classic CGS fits, so concentrations are
//! converted to mol/cm^3 for the rate evaluation and the production rates
//! back to mol/(m^3 s).

use nalgebra::DVector;

use crate::Error;

// Step 1: A [CH4]^0.7 [O2]^0.8 exp(-Ta/T), CGS units.
const A1: f64 = 1.59e13;
const TA1: f64 = 24_358.0;

// Step 2 forward: A [CO] [H2O]^0.5 [O2]^0.25 exp(-Ta/T).
const A2: f64 = 3.98e14;
// Step 2 reverse: A [CO2] exp(-Ta/T).
const A3: f64 = 5.0e8;
const TA2: f64 = 20_131.0;

/// Species bookkeeping for the two-step mechanism: indices into the global
/// species table, resolved once at construction.
#[derive(Clone, Debug)]
pub struct Mechanism {
    i_ch4: usize,
    i_o2: usize,
    i_co: usize,
    i_co2: usize,
    i_h2o: usize,
}

impl Mechanism {
    pub fn new() -> Result<Self, Error> {
        let idx = |name: &str| {
            gas::species::index(name).ok_or_else(|| gas::Error::UnknownSpecies {
                name: name.to_owned(),
            })
        };
        Ok(Mechanism {
            i_ch4: idx("CH4")?,
            i_o2: idx("O2")?,
            i_co: idx("CO")?,
            i_co2: idx("CO2")?,
            i_h2o: idx("H2O")?,
        })
    }

    pub fn co2_index(&self) -> usize {
        self.i_co2
    }

    /// Net molar production rates [mol/(m^3 s)] from the temperature [K] and
    /// molar concentrations [mol/m^3].
    ///
    /// Concentrations are clamped at zero before the fractional-order powers;
    /// small negative excursions are integration noise, not physics.
    pub fn net_production_rates(&self, temp: f64, conc: &DVector<f64>, wdot: &mut DVector<f64>) {
        let c = |i: usize| (conc[i] * 1e-6).max(0.0);
        let ch4 = c(self.i_ch4);
        let o2 = c(self.i_o2);
        let co = c(self.i_co);
        let co2 = c(self.i_co2);
        let h2o = c(self.i_h2o);

        let r1 = A1 * (-TA1 / temp).exp() * ch4.powf(0.7) * o2.powf(0.8);
        let k2 = (-TA2 / temp).exp();
        let r2 = A2 * k2 * co * h2o.sqrt() * o2.powf(0.25) - A3 * k2 * co2;

        wdot.fill(0.0);
        wdot[self.i_ch4] = -r1;
        wdot[self.i_o2] = -1.5 * r1 - 0.5 * r2;
        wdot[self.i_co] = r1 - r2;
        wdot[self.i_h2o] = 2.0 * r1;
        wdot[self.i_co2] = r2;
        // back to SI volumetric rates
        *wdot *= 1e6;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use gas::species::N_SPECIES;

    fn rates(temp: f64, set: &[(&str, f64)]) -> DVector<f64> {
        let mech = Mechanism::new().unwrap();
        let mut conc = DVector::zeros(N_SPECIES);
        for &(name, c) in set {
            conc[gas::species::index(name).unwrap()] = c;
        }
        let mut wdot = DVector::zeros(N_SPECIES);
        mech.net_production_rates(temp, &conc, &mut wdot);
        wdot
    }

    #[test]
    fn cold_mixture_is_inert_in_practice() {
        let wdot = rates(300.0, &[("CH4", 10.0), ("O2", 20.0), ("N2", 75.0)]);
        // exp(-24358/300) ~ 1e-36 kills the rate entirely
        for w in wdot.iter() {
            assert_abs_diff_eq!(*w, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn fuel_oxidation_stoichiometry() {
        let wdot = rates(2000.0, &[("CH4", 5.0), ("O2", 10.0), ("N2", 40.0)]);
        let i = |n| gas::species::index(n).unwrap();

        assert!(wdot[i("CH4")] < 0.0);
        assert!(wdot[i("O2")] < 0.0);
        assert!(wdot[i("H2O")] > 0.0);
        assert_eq!(wdot[i("N2")], 0.0);
        // without CO or H2O present, step 2 is frozen: CO appears one-to-one
        // with CH4 consumption and H2O at twice that rate
        assert_relative_eq!(wdot[i("CO")], -wdot[i("CH4")], max_relative = 1e-12);
        assert_relative_eq!(wdot[i("H2O")], -2.0 * wdot[i("CH4")], max_relative = 1e-12);
        assert_relative_eq!(wdot[i("O2")], 1.5 * wdot[i("CH4")], max_relative = 1e-12);
    }

    #[test]
    fn co2_dissociates_toward_equilibrium() {
        // only CO2 present: the reverse of step 2 must produce CO and O2
        let wdot = rates(2500.0, &[("CO2", 5.0)]);
        let i = |n| gas::species::index(n).unwrap();
        assert!(wdot[i("CO2")] < 0.0);
        assert!(wdot[i("CO")] > 0.0);
        assert_relative_eq!(wdot[i("O2")], -0.5 * wdot[i("CO2")], max_relative = 1e-12);
    }

    #[test]
    fn negative_concentrations_are_treated_as_zero() {
        let wdot = rates(2000.0, &[("CH4", -1e-9), ("O2", 10.0)]);
        assert_eq!(wdot[gas::species::index("CH4").unwrap()], 0.0);
    }

    #[test]
    fn element_conservation() {
        let wdot = rates(
            1800.0,
            &[("CH4", 3.0), ("O2", 8.0), ("CO", 1.0), ("H2O", 2.0), ("CO2", 0.5)],
        );
        let i = |n| gas::species::index(n).unwrap();
        let carbon = wdot[i("CH4")] + wdot[i("CO")] + wdot[i("CO2")];
        let hydrogen = 4.0 * wdot[i("CH4")] + 2.0 * wdot[i("H2O")];
        let oxygen =
            2.0 * wdot[i("O2")] + wdot[i("CO")] + 2.0 * wdot[i("CO2")] + wdot[i("H2O")];
        assert_abs_diff_eq!(carbon, 0.0, epsilon = 1e-6 * wdot.abs().max());
        assert_abs_diff_eq!(hydrogen, 0.0, epsilon = 1e-6 * wdot.abs().max());
        assert_abs_diff_eq!(oxygen, 0.0, epsilon = 1e-6 * wdot.abs().max());
    }
}
