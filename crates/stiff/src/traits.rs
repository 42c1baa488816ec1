//! Problem specification.

use nalgebra::{allocator::Allocator, DefaultAllocator, Dim, OVector};

use crate::Error;

/// A first-order initial-value problem `y' = f(t, y)`.
///
/// The integrator builds the Jacobian `df/dy` by forward finite differences,
/// so implementors only supply the right-hand side.
pub trait OdeProblem<D>
where
    D: Dim,
    DefaultAllocator: Allocator<f64, D>,
{
    /// State-vector dimension.
    fn dim(&self) -> D;

    /// Evaluate `dydt = f(t, y)`.
    ///
    /// An `Err` during a step attempt is treated as recoverable: the driver
    /// retries with a smaller step before giving up.
    fn rhs(&self, t: f64, y: &OVector<f64, D>, dydt: &mut OVector<f64, D>) -> Result<(), Error>;
}
