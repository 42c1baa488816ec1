//! Implicit integration for stiff initial-value problems.
//!
//! The crate is layered the way the classic implicit-solver codes are: a
//! weighted-RMS norm and tolerance machinery at the bottom, a dense LU
//! solver and a Newton iteration above them, and an adaptive implicit-Euler
//! driver on top. Problems implement [`OdeProblem`] and hand a state vector
//! of any `nalgebra` dimension to [`Integrator`].

pub mod bdf;
pub mod dense;
mod error;
pub mod newton;
pub mod norm;
pub mod tol;
mod traits;

pub use bdf::{Counters, Integrator};
pub use error::Error;
pub use tol::TolControl;
pub use traits::OdeProblem;
