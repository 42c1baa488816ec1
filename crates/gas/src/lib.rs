//! Ideal-gas mixture thermodynamics on NASA-7 polynomials.
//!
//! A [`GasState`] carries temperature, pressure and a mole-fraction vector
//! over the fixed species table in [`species`]. State setters mirror the
//! usual solution-object surface of kinetics packages: `TPX` from a
//! composition string, and `SV` (specific entropy + specific volume) for
//! isentropic-compression states.

use log::trace;
use nalgebra::DVector;

mod error;
pub mod mixture;
pub mod nasa7;
pub mod species;

pub use error::Error;

/// Universal gas constant [J/(mol K)].
pub const GAS_CONSTANT: f64 = 8.314462618;

/// Standard atmosphere [Pa]; also the NASA-polynomial reference pressure.
pub const ONE_ATM: f64 = 101_325.0;

/// Iteration cap for the entropy/volume Newton solve.
const SV_MAX_ITER: usize = 50;

#[derive(Debug, Clone)]
pub struct GasState {
    temperature: f64,
    pressure: f64,
    mole_fractions: DVector<f64>,
}

impl GasState {
    /// Build a state from temperature [K], pressure [Pa] and a composition
    /// string of the form `"CH4:1.0, O2:2.0, N2:7.52"`. Amounts are molar and
    /// normalized to fractions.
    pub fn from_tpx(temperature: f64, pressure: f64, composition: &str) -> Result<Self, Error> {
        check_tp(temperature, pressure)?;
        let mole_fractions = parse_composition(composition)?;
        Ok(GasState {
            temperature,
            pressure,
            mole_fractions,
        })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn mole_fractions(&self) -> &DVector<f64> {
        &self.mole_fractions
    }

    /// Mole fraction of a named species.
    pub fn mole_fraction(&self, name: &str) -> Result<f64, Error> {
        let i = species::index(name).ok_or_else(|| Error::UnknownSpecies {
            name: name.to_owned(),
        })?;
        Ok(self.mole_fractions[i])
    }

    pub fn mass_fractions(&self) -> DVector<f64> {
        mixture::mole_to_mass(&self.mole_fractions)
    }

    /// Mean molar mass [kg/mol].
    pub fn mean_molar_mass(&self) -> f64 {
        mixture::mean_molar_mass(&self.mole_fractions)
    }

    /// Mass-specific gas constant [J/(kg K)].
    pub fn specific_gas_constant(&self) -> f64 {
        GAS_CONSTANT / self.mean_molar_mass()
    }

    /// Specific volume [m^3/kg].
    pub fn specific_volume(&self) -> f64 {
        self.specific_gas_constant() * self.temperature / self.pressure
    }

    /// Density [kg/m^3].
    pub fn density(&self) -> f64 {
        1.0 / self.specific_volume()
    }

    /// Mass-specific heat capacity at constant pressure [J/(kg K)].
    pub fn cp_mass(&self) -> f64 {
        mixture::cp_mole(self.temperature, &self.mole_fractions) / self.mean_molar_mass()
    }

    /// Mass-specific heat capacity at constant volume [J/(kg K)].
    pub fn cv_mass(&self) -> f64 {
        (mixture::cp_mole(self.temperature, &self.mole_fractions) - GAS_CONSTANT)
            / self.mean_molar_mass()
    }

    /// Mass-specific mixture entropy [J/(kg K)].
    pub fn entropy_mass(&self) -> f64 {
        mixture::entropy_mole(self.temperature, self.pressure, &self.mole_fractions)
            / self.mean_molar_mass()
    }

    /// Replace the composition from a mass-fraction vector aligned with the
    /// species table. Entries are normalized; negatives are rejected.
    pub fn set_mass_fractions(&mut self, y: &DVector<f64>) -> Result<(), Error> {
        if y.len() != species::N_SPECIES || y.iter().any(|v| *v < 0.0 || !v.is_finite()) {
            return Err(Error::IllegalState {
                msg: format!("invalid mass-fraction vector {y}"),
            });
        }
        let total = y.sum();
        if total <= 0.0 {
            return Err(Error::IllegalState {
                msg: "mass fractions sum to zero".to_owned(),
            });
        }
        self.mole_fractions = mixture::mass_to_mole(&(y / total));
        Ok(())
    }

    pub fn set_tp(&mut self, temperature: f64, pressure: f64) -> Result<(), Error> {
        check_tp(temperature, pressure)?;
        self.temperature = temperature;
        self.pressure = pressure;
        Ok(())
    }

    /// Move the state to the given mass-specific entropy [J/(kg K)] and
    /// specific volume [m^3/kg] at fixed composition.
    ///
    /// With composition fixed, `P = R T / (M v)` closes the system and the
    /// entropy residual is solved for T by Newton iteration using
    /// `ds/dT|_v = cv/T`.
    pub fn set_sv(&mut self, s_target: f64, v: f64) -> Result<(), Error> {
        if !(v > 0.0) || !v.is_finite() {
            return Err(Error::IllegalState {
                msg: format!("specific volume must be positive, got {v}"),
            });
        }
        let rs = self.specific_gas_constant();
        let mbar = self.mean_molar_mass();
        let s_scale = s_target.abs().max(1.0);

        let mut temp = self.temperature;
        for iter in 0..SV_MAX_ITER {
            let pressure = rs * temp / v;
            let s = mixture::entropy_mole(temp, pressure, &self.mole_fractions) / mbar;
            let residual = s - s_target;
            trace!("set_sv iter {iter}: T = {temp:.6} K, ds = {residual:.3e}");
            if residual.abs() < 1e-10 * s_scale {
                self.temperature = temp;
                self.pressure = pressure;
                return Ok(());
            }
            let cv = (mixture::cp_mole(temp, &self.mole_fractions) - GAS_CONSTANT) / mbar;
            // ds/dT at constant v is cv/T
            let step = -residual * temp / cv;
            temp = (temp + step).clamp(0.2 * temp, 5.0 * temp);
        }
        Err(Error::EntropyVolumeSolve { s_target, v })
    }
}

fn check_tp(temperature: f64, pressure: f64) -> Result<(), Error> {
    if !(temperature > 0.0) || !temperature.is_finite() {
        return Err(Error::IllegalState {
            msg: format!("temperature must be positive, got {temperature}"),
        });
    }
    if !(pressure > 0.0) || !pressure.is_finite() {
        return Err(Error::IllegalState {
            msg: format!("pressure must be positive, got {pressure}"),
        });
    }
    Ok(())
}

fn parse_composition(composition: &str) -> Result<DVector<f64>, Error> {
    let mut x = DVector::zeros(species::N_SPECIES);
    for entry in composition.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (name, amount) = entry.split_once(':').ok_or_else(|| Error::BadComposition {
            entry: entry.to_owned(),
        })?;
        let amount: f64 = amount
            .trim()
            .parse()
            .map_err(|_| Error::BadComposition {
                entry: entry.to_owned(),
            })?;
        if !(amount >= 0.0) || !amount.is_finite() {
            return Err(Error::BadComposition {
                entry: entry.to_owned(),
            });
        }
        let i = species::index(name.trim()).ok_or_else(|| Error::UnknownSpecies {
            name: name.trim().to_owned(),
        })?;
        x[i] += amount;
    }
    let total = x.sum();
    if total <= 0.0 {
        return Err(Error::EmptyComposition {
            composition: composition.to_owned(),
        });
    }
    x /= total;
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const METHANE_AIR: &str = "CH4:1.0, O2:2.0, N2:7.52";

    fn initial_state() -> GasState {
        GasState::from_tpx(273.15, ONE_ATM, METHANE_AIR).unwrap()
    }

    #[test]
    fn composition_parsing() {
        let gas = initial_state();
        assert_relative_eq!(gas.mole_fraction("CH4").unwrap(), 1.0 / 10.52, epsilon = 1e-12);
        assert_relative_eq!(gas.mole_fraction("O2").unwrap(), 2.0 / 10.52, epsilon = 1e-12);
        assert_relative_eq!(gas.mole_fractions().sum(), 1.0, epsilon = 1e-12);
        assert_eq!(gas.mole_fraction("CO2").unwrap(), 0.0);
    }

    #[test]
    fn composition_errors() {
        assert!(matches!(
            GasState::from_tpx(300.0, ONE_ATM, "XE:1.0"),
            Err(Error::UnknownSpecies { .. })
        ));
        assert!(matches!(
            GasState::from_tpx(300.0, ONE_ATM, "CH4"),
            Err(Error::BadComposition { .. })
        ));
        assert!(matches!(
            GasState::from_tpx(300.0, ONE_ATM, "CH4:0.0"),
            Err(Error::EmptyComposition { .. })
        ));
        assert!(matches!(
            GasState::from_tpx(-5.0, ONE_ATM, METHANE_AIR),
            Err(Error::IllegalState { .. })
        ));
    }

    #[test]
    fn initial_specific_volume() {
        // R_s ~ 301 J/(kg K) for this mixture, so v ~ 0.81 m^3/kg at 1 atm
        let v = initial_state().specific_volume();
        assert!(v > 0.79 && v < 0.83, "v = {v}");
    }

    #[test]
    fn mass_fractions_normalized() {
        let y = initial_state().mass_fractions();
        assert_relative_eq!(y.sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn mass_fraction_round_trip() {
        let mut gas = initial_state();
        let x0 = gas.mole_fractions().clone();
        let y = gas.mass_fractions();
        gas.set_mass_fractions(&y).unwrap();
        assert_relative_eq!((gas.mole_fractions() - x0).norm(), 0.0, epsilon = 1e-12);

        let bad = DVector::from_vec(vec![-1.0; species::N_SPECIES]);
        assert!(gas.set_mass_fractions(&bad).is_err());
    }

    #[test]
    fn isentropic_compression_preserves_entropy() {
        let mut gas = initial_state();
        let s0 = gas.entropy_mass();
        let v0 = gas.specific_volume();

        gas.set_sv(s0, v0 / 2.0).unwrap();

        assert_relative_eq!(gas.entropy_mass(), s0, max_relative = 1e-9);
        assert_relative_eq!(gas.specific_volume(), v0 / 2.0, max_relative = 1e-9);
        assert!(gas.temperature() > 273.15);
        assert!(gas.pressure() > ONE_ATM);
    }

    #[test]
    fn compression_temperature_within_gamma_bracket() {
        let mut gas = initial_state();
        let s0 = gas.entropy_mass();
        let v0 = gas.specific_volume();
        let t0 = gas.temperature();
        let gamma0 = gas.cp_mass() / gas.cv_mass();

        gas.set_sv(s0, v0 / 2.0).unwrap();
        let gamma1 = gas.cp_mass() / gas.cv_mass();

        // Variable-cp truth lies between the constant-gamma estimates taken
        // at the two endpoint temperatures.
        let (glo, ghi) = if gamma0 < gamma1 {
            (gamma0, gamma1)
        } else {
            (gamma1, gamma0)
        };
        let t_lo = t0 * 2.0_f64.powf(glo - 1.0);
        let t_hi = t0 * 2.0_f64.powf(ghi - 1.0);
        assert!(
            gas.temperature() > 0.995 * t_lo && gas.temperature() < 1.005 * t_hi,
            "T = {}, bracket [{t_lo}, {t_hi}]",
            gas.temperature()
        );
    }

    #[test]
    fn expansion_cools() {
        let mut gas = initial_state();
        let s0 = gas.entropy_mass();
        let v0 = gas.specific_volume();
        gas.set_sv(s0, 2.0 * v0).unwrap();
        assert!(gas.temperature() < 273.15);
    }
}
