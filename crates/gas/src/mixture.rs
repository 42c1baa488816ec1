//! Mixture-averaged properties as free functions over `(T, X)`.
//!
//! Kept separate from [`crate::GasState`] so that callers holding a raw
//! composition vector (the reactor right-hand side in particular) can
//! evaluate properties without building a full state object.

use nalgebra::DVector;

use crate::{species, GAS_CONSTANT, ONE_ATM};

/// Mean molar mass [kg/mol] of a mole-fraction vector.
pub fn mean_molar_mass(x: &DVector<f64>) -> f64 {
    species::all()
        .iter()
        .zip(x.iter())
        .map(|(sp, xk)| sp.molar_mass * xk)
        .sum()
}

/// Mixture molar heat capacity at constant pressure [J/(mol K)].
pub fn cp_mole(temp: f64, x: &DVector<f64>) -> f64 {
    GAS_CONSTANT
        * species::all()
            .iter()
            .zip(x.iter())
            .map(|(sp, xk)| xk * sp.thermo.cp_r(temp))
            .sum::<f64>()
}

/// Mixture molar enthalpy [J/mol].
pub fn enthalpy_mole(temp: f64, x: &DVector<f64>) -> f64 {
    GAS_CONSTANT
        * temp
        * species::all()
            .iter()
            .zip(x.iter())
            .map(|(sp, xk)| xk * sp.thermo.h_rt(temp))
            .sum::<f64>()
}

/// Molar internal energy [J/mol] of a single species.
pub fn internal_energy_species(temp: f64, species_index: usize) -> f64 {
    let sp = &species::all()[species_index];
    GAS_CONSTANT * temp * (sp.thermo.h_rt(temp) - 1.0)
}

/// Mixture molar entropy [J/(mol K)] at temperature and total pressure,
/// including the ideal mixing term over the partial pressures.
pub fn entropy_mole(temp: f64, pressure: f64, x: &DVector<f64>) -> f64 {
    species::all()
        .iter()
        .zip(x.iter())
        .filter(|(_, &xk)| xk > 0.0)
        .map(|(sp, &xk)| {
            xk * GAS_CONSTANT * (sp.thermo.s_r(temp) - (xk * pressure / ONE_ATM).ln())
        })
        .sum()
}

/// Convert mole fractions to mass fractions.
pub fn mole_to_mass(x: &DVector<f64>) -> DVector<f64> {
    let mbar = mean_molar_mass(x);
    DVector::from_iterator(
        x.len(),
        species::all()
            .iter()
            .zip(x.iter())
            .map(|(sp, xk)| xk * sp.molar_mass / mbar),
    )
}

/// Convert mass fractions to mole fractions.
pub fn mass_to_mole(y: &DVector<f64>) -> DVector<f64> {
    let mut x = DVector::from_iterator(
        y.len(),
        species::all()
            .iter()
            .zip(y.iter())
            .map(|(sp, yk)| yk / sp.molar_mass),
    );
    let total = x.sum();
    if total > 0.0 {
        x /= total;
    }
    x
}
