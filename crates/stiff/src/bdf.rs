//! Adaptive implicit-Euler (BDF1) step driver.
//!
//! Each step solves `y_{n+1} = y_n + h f(t_{n+1}, y_{n+1})` by Newton
//! iteration on a finite-difference iteration matrix `I - h df/dy`. The
//! local error is estimated from the gap between the implicit solution and
//! the explicit predictor `y_n + h f_n`, measured in the weighted-RMS norm,
//! and the step size adapts to hold that estimate at or below one.

use log::{debug, trace};
use nalgebra::{allocator::Allocator, DefaultAllocator, Dim, OMatrix, OVector};

use crate::{
    dense::DenseLu,
    newton::{Newton, NewtonProblem},
    norm::NormWrms,
    tol::TolControl,
    Error, OdeProblem,
};

const MAX_STEPS_DEFAULT: usize = 100_000;
const MAX_ERR_TEST_FAILS: usize = 10;
const MAX_CONV_FAILS: usize = 10;
const MAX_NEWTON_ITERS: usize = 10;
/// Newton tolerance in weighted-RMS units; well below the error-test level.
const NEWTON_TOL: f64 = 0.05;
const H_MIN: f64 = 1e-16;
/// Absolute floor for finite-difference increments.
const FD_FLOOR: f64 = 1e-10;

/// Work counters, in the style of the usual implicit-solver statistics.
#[derive(Clone, Copy, Debug, Default)]
pub struct Counters {
    /// accepted internal steps
    pub steps: usize,
    /// right-hand-side evaluations
    pub rhs_evals: usize,
    /// iteration-matrix builds
    pub jac_evals: usize,
    /// local error test failures
    pub err_test_fails: usize,
    /// Newton convergence failures
    pub conv_fails: usize,
}

pub struct Integrator<P, D>
where
    P: OdeProblem<D>,
    D: Dim,
    DefaultAllocator: Allocator<f64, D> + Allocator<f64, D, D> + Allocator<usize, D>,
{
    problem: P,
    t: f64,
    y: OVector<f64, D>,
    /// next step size to attempt; zero until the first step picks one
    h: f64,
    max_steps: usize,
    tol: TolControl<D>,
    ewt: OVector<f64, D>,
    /// `f(t, y)` at the current solution point
    fcur: OVector<f64, D>,
    fcur_valid: bool,
    newton: Newton<D>,
    lu: DenseLu<D>,
    iter_matrix: OMatrix<f64, D, D>,
    counters: Counters,
}

impl<P, D> Integrator<P, D>
where
    P: OdeProblem<D>,
    D: Dim,
    DefaultAllocator: Allocator<f64, D> + Allocator<f64, D, D> + Allocator<usize, D>,
{
    pub fn new(problem: P, t0: f64, y0: OVector<f64, D>, tol: TolControl<D>) -> Self {
        let dim = problem.dim();
        Integrator {
            problem,
            t: t0,
            y: y0,
            h: 0.0,
            max_steps: MAX_STEPS_DEFAULT,
            tol,
            ewt: OVector::zeros_generic(dim, nalgebra::Const::<1>),
            fcur: OVector::zeros_generic(dim, nalgebra::Const::<1>),
            fcur_valid: false,
            newton: Newton::new(dim, MAX_NEWTON_ITERS),
            lu: DenseLu::new(dim),
            iter_matrix: OMatrix::zeros_generic(dim, dim),
            counters: Counters::default(),
        }
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn state(&self) -> &OVector<f64, D> {
        &self.y
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn set_max_steps(&mut self, max_steps: usize) {
        self.max_steps = max_steps;
    }

    /// Integrate to the absolute time `tout` and stop exactly there.
    pub fn advance(&mut self, tout: f64) -> Result<(), Error> {
        if tout < self.t - 1e-12 * self.t.abs().max(1.0) {
            return Err(Error::BadTout { tout, t: self.t });
        }

        let mut local_steps = 0;
        while self.t < tout {
            self.tol.error_weights(&self.y, &mut self.ewt);

            if !self.fcur_valid {
                self.problem.rhs(self.t, &self.y, &mut self.fcur)?;
                self.counters.rhs_evals += 1;
                self.fcur_valid = true;
            }

            if self.h == 0.0 {
                self.h = self.initial_step(tout);
                debug!("initial step size h0 = {:.3e}", self.h);
            }

            self.step_once(tout)?;

            local_steps += 1;
            if local_steps >= self.max_steps && self.t < tout {
                return Err(Error::TooMuchWork {
                    t: self.t,
                    mxstep: self.max_steps,
                });
            }
        }
        Ok(())
    }

    /// Heuristic first step: a move of ~0.1 weighted-RMS units.
    fn initial_step(&self, tout: f64) -> f64 {
        let span = tout - self.t;
        let fnorm = self.fcur.norm_wrms(&self.ewt);
        let h0 = if fnorm > 0.0 {
            (0.1 / fnorm).min(span)
        } else {
            1e-6 * span
        };
        h0.max(H_MIN)
    }

    /// Take exactly one accepted step, shrinking `h` on Newton or error-test
    /// failures as needed.
    fn step_once(&mut self, tout: f64) -> Result<(), Error> {
        let mut nef = 0;
        let mut ncf = 0;

        loop {
            let h_left = tout - self.t;
            let reaches_tout = self.h >= h_left;
            let h = if reaches_tout { h_left } else { self.h };
            let t_new = if reaches_tout { tout } else { self.t + h };

            // explicit predictor, also the reference for the error estimate
            let mut y_pred = self.y.clone();
            y_pred.axpy(h, &self.fcur, 1.0);
            let mut y_new = y_pred.clone();

            let newton_result = {
                let mut step = ImplicitStep {
                    problem: &self.problem,
                    y_prev: &self.y,
                    t_new,
                    h,
                    iter_matrix: &mut self.iter_matrix,
                    lu: &mut self.lu,
                    fbase: self.fcur.clone_owned(),
                    ypert: self.y.clone_owned(),
                    fpert: self.fcur.clone_owned(),
                    rhs_evals: 0,
                    jac_evals: 0,
                };
                let result =
                    self.newton
                        .solve(&mut step, &y_pred, &mut y_new, &self.ewt, NEWTON_TOL, true);
                self.counters.rhs_evals += step.rhs_evals;
                self.counters.jac_evals += step.jac_evals;
                result
            };

            match newton_result {
                Ok(()) => {}
                Err(Error::ConvergenceRecover) | Err(Error::LuFactFail { .. }) => {
                    ncf += 1;
                    self.counters.conv_fails += 1;
                    if ncf >= MAX_CONV_FAILS {
                        return Err(Error::RepeatedConvergenceFail { t: self.t });
                    }
                    self.h = 0.25 * h;
                    if self.h <= H_MIN {
                        return Err(Error::StepTooSmall { t: self.t, h: self.h });
                    }
                    trace!("Newton failure at t = {:.6e}, retrying with h = {:.3e}", self.t, self.h);
                    continue;
                }
                Err(e) => return Err(e),
            }

            // local truncation error of the implicit Euler step:
            // (h^2/2) y'' ~ (y_new - y_pred) / 2
            let err_vec = &y_new - &y_pred;
            let err = 0.5 * err_vec.norm_wrms(&self.ewt);

            if err > 1.0 {
                nef += 1;
                self.counters.err_test_fails += 1;
                if nef >= MAX_ERR_TEST_FAILS {
                    return Err(Error::ErrFail { t: self.t });
                }
                let shrink = (0.9 / err.sqrt()).clamp(0.1, 0.5);
                self.h = h * shrink;
                if self.h <= H_MIN {
                    return Err(Error::StepTooSmall { t: self.t, h: self.h });
                }
                trace!("error test failed at t = {:.6e}, err = {err:.3e}", self.t);
                continue;
            }

            // accept; the implicit relation hands back f(t_new, y_new) for free
            self.fcur.copy_from(&y_new);
            self.fcur.axpy(-1.0, &self.y, 1.0);
            self.fcur.unscale_mut(h);
            self.y.copy_from(&y_new);
            self.t = t_new;
            self.counters.steps += 1;

            let grow = if err < 1e-10 {
                2.0
            } else {
                (0.9 / err.sqrt()).clamp(0.2, 2.0)
            };
            self.h = (h * grow).max(H_MIN);
            trace!(
                "step {}: t = {:.6e}, h = {:.3e}, err = {:.3e}",
                self.counters.steps,
                self.t,
                h,
                err
            );
            return Ok(());
        }
    }
}

/// The nonlinear system of one implicit-Euler step,
/// `G(y) = y - y_n - h f(t_{n+1}, y)`.
struct ImplicitStep<'a, P, D>
where
    P: OdeProblem<D>,
    D: Dim,
    DefaultAllocator: Allocator<f64, D> + Allocator<f64, D, D> + Allocator<usize, D>,
{
    problem: &'a P,
    y_prev: &'a OVector<f64, D>,
    t_new: f64,
    h: f64,
    iter_matrix: &'a mut OMatrix<f64, D, D>,
    lu: &'a mut DenseLu<D>,
    fbase: OVector<f64, D>,
    ypert: OVector<f64, D>,
    fpert: OVector<f64, D>,
    rhs_evals: usize,
    jac_evals: usize,
}

impl<'a, P, D> NewtonProblem<D> for ImplicitStep<'a, P, D>
where
    P: OdeProblem<D>,
    D: Dim,
    DefaultAllocator: Allocator<f64, D> + Allocator<f64, D, D> + Allocator<usize, D>,
{
    fn residual(&mut self, y: &OVector<f64, D>, g: &mut OVector<f64, D>) -> Result<(), Error> {
        self.rhs_evals += 1;
        self.problem
            .rhs(self.t_new, y, g)
            .map_err(|_| Error::ConvergenceRecover)?;
        let n = y.nrows();
        for i in 0..n {
            g[i] = y[i] - self.y_prev[i] - self.h * g[i];
        }
        Ok(())
    }

    fn setup(&mut self, y: &OVector<f64, D>) -> Result<(), Error> {
        self.jac_evals += 1;
        self.rhs_evals += 1;
        self.problem
            .rhs(self.t_new, y, &mut self.fbase)
            .map_err(|_| Error::ConvergenceRecover)?;

        let srur = f64::EPSILON.sqrt();
        let n = y.nrows();
        for j in 0..n {
            let yj = y[j];
            let sigma = (srur * yj.abs()).max(FD_FLOOR);
            self.ypert.copy_from(y);
            self.ypert[j] = yj + sigma;
            self.rhs_evals += 1;
            self.problem
                .rhs(self.t_new, &self.ypert, &mut self.fpert)
                .map_err(|_| Error::ConvergenceRecover)?;
            let inv = sigma.recip();
            for i in 0..n {
                self.iter_matrix[(i, j)] = -self.h * (self.fpert[i] - self.fbase[i]) * inv;
            }
        }
        for i in 0..n {
            self.iter_matrix[(i, i)] += 1.0;
        }

        self.lu.factor(self.iter_matrix)
    }

    fn solve(&mut self, b: &mut OVector<f64, D>) -> Result<(), Error> {
        self.lu.solve(self.iter_matrix, b);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::{DVector, Dyn};

    /// `y' = -k y`
    struct Decay {
        rate: f64,
    }

    impl OdeProblem<Dyn> for Decay {
        fn dim(&self) -> Dyn {
            Dyn(1)
        }
        fn rhs(&self, _t: f64, y: &DVector<f64>, dydt: &mut DVector<f64>) -> Result<(), Error> {
            dydt[0] = -self.rate * y[0];
            Ok(())
        }
    }

    /// `y' = -lambda (y - cos t)`, strongly damped toward the forcing.
    struct Forced {
        lambda: f64,
    }

    impl OdeProblem<Dyn> for Forced {
        fn dim(&self) -> Dyn {
            Dyn(1)
        }
        fn rhs(&self, t: f64, y: &DVector<f64>, dydt: &mut DVector<f64>) -> Result<(), Error> {
            dydt[0] = -self.lambda * (y[0] - t.cos());
            Ok(())
        }
    }

    /// `A -> B`: the component sum is a linear invariant.
    struct Chain {
        rate: f64,
    }

    impl OdeProblem<Dyn> for Chain {
        fn dim(&self) -> Dyn {
            Dyn(2)
        }
        fn rhs(&self, _t: f64, y: &DVector<f64>, dydt: &mut DVector<f64>) -> Result<(), Error> {
            dydt[0] = -self.rate * y[0];
            dydt[1] = self.rate * y[0];
            Ok(())
        }
    }

    #[test]
    fn exponential_decay() {
        let mut ode = Integrator::new(
            Decay { rate: 1.0 },
            0.0,
            DVector::from_vec(vec![1.0]),
            TolControl::scalar(1e-6, 1e-12),
        );
        ode.advance(1.0).unwrap();
        assert_relative_eq!(ode.state()[0], (-1.0f64).exp(), max_relative = 2e-3);
        assert!(ode.counters().steps > 10);
        assert!(ode.counters().jac_evals > 0);
    }

    #[test]
    fn advance_in_pieces_matches_single_advance() {
        let y0 = DVector::from_vec(vec![1.0]);
        let tol = TolControl::scalar(1e-6, 1e-12);

        let mut a = Integrator::new(Decay { rate: 2.0 }, 0.0, y0.clone(), tol.clone());
        a.advance(1.0).unwrap();

        let mut b = Integrator::new(Decay { rate: 2.0 }, 0.0, y0, tol);
        for i in 1..=10 {
            b.advance(0.1 * i as f64).unwrap();
        }

        assert_abs_diff_eq!(a.state()[0], b.state()[0], epsilon = 1e-3);
        assert_relative_eq!(b.time(), 1.0);
    }

    #[test]
    fn advance_to_current_time_is_a_noop() {
        let mut ode = Integrator::new(
            Decay { rate: 1.0 },
            0.0,
            DVector::from_vec(vec![1.0]),
            TolControl::scalar(1e-6, 1e-12),
        );
        ode.advance(0.0).unwrap();
        assert_eq!(ode.counters().steps, 0);
        assert_eq!(ode.state()[0], 1.0);
    }

    #[test]
    fn backwards_tout_is_rejected() {
        let mut ode = Integrator::new(
            Decay { rate: 1.0 },
            0.0,
            DVector::from_vec(vec![1.0]),
            TolControl::scalar(1e-6, 1e-12),
        );
        ode.advance(0.5).unwrap();
        assert!(matches!(ode.advance(0.1), Err(Error::BadTout { .. })));
    }

    #[test]
    fn stiff_relaxation_tracks_forcing() {
        let mut ode = Integrator::new(
            Forced { lambda: 1e4 },
            0.0,
            DVector::from_vec(vec![0.0]),
            TolControl::scalar(1e-6, 1e-10),
        );
        ode.advance(1.0).unwrap();
        // the slow manifold is y ~ cos t up to O(1/lambda)
        assert_abs_diff_eq!(ode.state()[0], 1.0f64.cos(), epsilon = 5e-3);
    }

    #[test]
    fn linear_invariant_is_preserved() {
        let mut ode = Integrator::new(
            Chain { rate: 5.0 },
            0.0,
            DVector::from_vec(vec![1.0, 0.0]),
            TolControl::scalar(1e-6, 1e-12),
        );
        ode.advance(1.0).unwrap();
        let y = ode.state();
        assert_abs_diff_eq!(y[0] + y[1], 1.0, epsilon = 1e-4);
        assert_relative_eq!(y[0], (-5.0f64).exp(), max_relative = 1e-2);
    }
}
