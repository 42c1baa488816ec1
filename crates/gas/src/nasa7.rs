//! Standard-state thermodynamic functions from 7-coefficient NASA polynomials.
//!
//! Two temperature ranges per species, joined at `t_mid`. The non-dimensional
//! forms are
//!
//! ```math
//! cp/R  = a1 + a2 T + a3 T^2 + a4 T^3 + a5 T^4
//! h/RT  = a1 + a2/2 T + a3/3 T^2 + a4/4 T^3 + a5/5 T^4 + a6/T
//! s/R   = a1 ln T + a2 T + a3/2 T^2 + a4/3 T^3 + a5/4 T^4 + a7
//! ```

/// One species' polynomial data.
#[derive(Debug, Clone, Copy)]
pub struct Nasa7 {
    /// Range-switch temperature [K]
    pub t_mid: f64,
    /// Low-temperature range coefficients a1..a7
    pub low: [f64; 7],
    /// High-temperature range coefficients a1..a7
    pub high: [f64; 7],
}

impl Nasa7 {
    fn coeffs(&self, temp: f64) -> &[f64; 7] {
        if temp < self.t_mid {
            &self.low
        } else {
            &self.high
        }
    }

    /// Non-dimensional standard-state heat capacity, `cp°/R`.
    pub fn cp_r(&self, temp: f64) -> f64 {
        let a = self.coeffs(temp);
        a[0] + temp * (a[1] + temp * (a[2] + temp * (a[3] + temp * a[4])))
    }

    /// Non-dimensional standard-state enthalpy, `h°/(R T)`.
    pub fn h_rt(&self, temp: f64) -> f64 {
        let a = self.coeffs(temp);
        a[0] + temp
            * (a[1] / 2.0 + temp * (a[2] / 3.0 + temp * (a[3] / 4.0 + temp * a[4] / 5.0)))
            + a[5] / temp
    }

    /// Non-dimensional standard-state entropy at the reference pressure, `s°/R`.
    pub fn s_r(&self, temp: f64) -> f64 {
        let a = self.coeffs(temp);
        a[0] * temp.ln()
            + temp * (a[1] + temp * (a[2] / 2.0 + temp * (a[3] / 3.0 + temp * a[4] / 4.0)))
            + a[6]
    }
}
