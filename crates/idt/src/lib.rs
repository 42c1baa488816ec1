//! Ignition delay of methane/air under isentropic compression.
//!
//! A charge of stoichiometric methane/air is compressed at constant entropy
//! to a range of final specific volumes; each end state is sealed into a
//! constant-volume reactor and integrated in time. The sampled trajectories
//! are scanned for an ignition event and rendered as figures.

use thiserror::Error;

pub mod detect;
pub mod mechanism;
pub mod plot;
pub mod reactor;
pub mod sweep;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Thermo(#[from] gas::Error),

    #[error(transparent)]
    Integration(#[from] stiff::Error),
}
