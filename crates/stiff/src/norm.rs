//! Weighted root-mean-square norms.

use nalgebra::{Dim, Matrix, Storage, U1};

pub trait NormWrms<Rhs> {
    /// Weighted root-mean-square norm, `sqrt(sum((x_i w_i)^2) / n)`.
    fn norm_wrms(&self, w: &Rhs) -> f64;
}

impl<D, SA, SB> NormWrms<Matrix<f64, D, U1, SB>> for Matrix<f64, D, U1, SA>
where
    D: Dim,
    SA: Storage<f64, D, U1>,
    SB: Storage<f64, D, U1>,
{
    fn norm_wrms(&self, w: &Matrix<f64, D, U1, SB>) -> f64 {
        let n = self.nrows();
        debug_assert_eq!(n, w.nrows());
        let sum: f64 = self
            .iter()
            .zip(w.iter())
            .map(|(x, w)| (x * w).powi(2))
            .sum();
        (sum / n as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    #[test]
    fn uniform_weights() {
        let x = DVector::from_element(32, -0.5);
        let w = DVector::from_element(32, 0.5);
        assert_eq!(x.norm_wrms(&w), 0.25);
    }

    #[test]
    fn zero_weight_masks_component() {
        let x = DVector::from_vec(vec![1.0e12, 2.0]);
        let w = DVector::from_vec(vec![0.0, 1.0]);
        assert_eq!(x.norm_wrms(&w), (4.0f64 / 2.0).sqrt());
    }
}
