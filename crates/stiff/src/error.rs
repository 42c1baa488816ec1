use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Zero pivot during LU factorization of the iteration matrix.
    #[error("LU factorization failed: zero pivot in column {col}")]
    LuFactFail { col: usize },

    /// The Newton iteration appears to be diverging or ran out of
    /// iterations; the step driver may recover by shrinking the step.
    #[error("Newton iteration failed to converge")]
    ConvergenceRecover,

    /// The right-hand-side function could not be evaluated.
    #[error("The ODE right-hand side failed to evaluate")]
    RhsFail,

    #[error("At t = {t:.5e}, repeated Newton convergence failures exhausted the retry budget")]
    RepeatedConvergenceFail { t: f64 },

    #[error("At t = {t:.5e}, the local error test failed repeatedly")]
    ErrFail { t: f64 },

    #[error("At t = {t:.5e}, the step size h = {h:.5e} fell below the minimum")]
    StepTooSmall { t: f64, h: f64 },

    #[error("At t = {t:.5e}, the solver took {mxstep} internal steps but could not reach tout")]
    TooMuchWork { t: f64, mxstep: usize },

    #[error("tout = {tout:.5e} is behind the current time t = {t:.5e}")]
    BadTout { tout: f64, t: f64 },
}
