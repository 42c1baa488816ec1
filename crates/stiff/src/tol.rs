//! Error-weight vectors from relative/absolute tolerances.

use nalgebra::{allocator::Allocator, DefaultAllocator, Dim, OVector};

/// Tolerance specification. The error weight vector is loaded as
///
/// ```math
/// ewt[i] = 1 / (rtol * |y[i]| + atol[i])
/// ```
///
/// with a scalar or per-component absolute tolerance.
#[derive(Clone, Debug)]
pub enum TolControl<D>
where
    D: Dim,
    DefaultAllocator: Allocator<f64, D>,
{
    Scalar {
        rtol: f64,
        atol: f64,
    },
    Vector {
        rtol: f64,
        atol: OVector<f64, D>,
    },
}

impl<D> TolControl<D>
where
    D: Dim,
    DefaultAllocator: Allocator<f64, D>,
{
    pub fn scalar(rtol: f64, atol: f64) -> Self {
        Self::Scalar { rtol, atol }
    }

    pub fn vector(rtol: f64, atol: OVector<f64, D>) -> Self {
        Self::Vector { rtol, atol }
    }

    /// Load `ewt` for the current solution vector.
    pub fn error_weights(&self, y: &OVector<f64, D>, ewt: &mut OVector<f64, D>) {
        match self {
            Self::Scalar { rtol, atol } => {
                y.iter().zip(ewt.iter_mut()).for_each(|(y, ewt)| {
                    *ewt = (rtol * y.abs() + atol).recip();
                });
            }
            Self::Vector { rtol, atol } => {
                y.iter()
                    .zip(atol.iter())
                    .zip(ewt.iter_mut())
                    .for_each(|((y, atol), ewt)| {
                        *ewt = (rtol * y.abs() + atol).recip();
                    });
            }
        }
    }
}
