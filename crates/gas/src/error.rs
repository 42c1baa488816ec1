use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown species `{name}`")]
    UnknownSpecies { name: String },

    #[error("Malformed composition entry `{entry}`")]
    BadComposition { entry: String },

    #[error("Composition `{composition}` has no positive species amount")]
    EmptyComposition { composition: String },

    #[error("Non-physical state input: {msg}")]
    IllegalState { msg: String },

    /// The Newton iteration for the entropy/volume state setter stalled.
    #[error("Entropy-volume solve did not converge: s = {s_target:.6e} J/(kg K), v = {v:.6e} m^3/kg")]
    EntropyVolumeSolve { s_target: f64, v: f64 },
}
