//! Newton iteration for the implicit step equation.

use log::trace;
use nalgebra::{allocator::Allocator, DefaultAllocator, Dim, OVector};

use crate::{norm::NormWrms, Error};

/// The nonlinear system `G(y) = 0` solved once per implicit step, together
/// with its linearization. Implemented by the step object of the integrator;
/// tests supply algebraic systems directly.
pub trait NewtonProblem<D>
where
    D: Dim,
    DefaultAllocator: Allocator<f64, D>,
{
    /// Evaluate `g = G(y)`.
    fn residual(&mut self, y: &OVector<f64, D>, g: &mut OVector<f64, D>) -> Result<(), Error>;

    /// Build and factor the iteration matrix `dG/dy` at `y`.
    fn setup(&mut self, y: &OVector<f64, D>) -> Result<(), Error>;

    /// Solve the linear system with the factored iteration matrix,
    /// overwriting `b` with the solution.
    fn solve(&mut self, b: &mut OVector<f64, D>) -> Result<(), Error>;
}

#[derive(Clone, Debug)]
pub struct Newton<D>
where
    D: Dim,
    DefaultAllocator: Allocator<f64, D>,
{
    /// Newton update vector
    delta: OVector<f64, D>,
    /// current number of iterations in a solve attempt
    curiter: usize,
    /// maximum number of iterations in a solve attempt
    maxiters: usize,
    /// total number of iterations across all solves
    niters: usize,
    /// total number of convergence failures across all solves
    nconvfails: usize,
}

impl<D> Newton<D>
where
    D: Dim,
    DefaultAllocator: Allocator<f64, D>,
{
    pub fn new(dim: D, maxiters: usize) -> Self {
        Newton {
            delta: OVector::zeros_generic(dim, nalgebra::Const::<1>),
            curiter: 0,
            maxiters,
            niters: 0,
            nconvfails: 0,
        }
    }

    /// Solve `G(y) = 0` starting from the prediction `y0`.
    ///
    /// Convergence is tested on the weighted-RMS norm of the update against
    /// `tol`. On a recoverable failure with a possibly stale iteration
    /// matrix, one retry is made after a fresh [`NewtonProblem::setup`].
    pub fn solve<P>(
        &mut self,
        problem: &mut P,
        y0: &OVector<f64, D>,
        y: &mut OVector<f64, D>,
        w: &OVector<f64, D>,
        tol: f64,
        call_setup: bool,
    ) -> Result<(), Error>
    where
        P: NewtonProblem<D>,
    {
        let mut call_setup = call_setup;
        // whether the current attempt runs on a freshly built matrix
        let mut fresh = call_setup;

        loop {
            if call_setup {
                problem.setup(y0)?;
            }

            let result = self.iterate(problem, y0, y, w, tol);
            match result {
                Ok(()) => return Ok(()),
                Err(Error::ConvergenceRecover) => {
                    self.nconvfails += 1;
                    if fresh {
                        return Err(Error::ConvergenceRecover);
                    }
                    trace!("Newton: retrying with a fresh iteration matrix");
                    call_setup = true;
                    fresh = true;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn iterate<P>(
        &mut self,
        problem: &mut P,
        y0: &OVector<f64, D>,
        y: &mut OVector<f64, D>,
        w: &OVector<f64, D>,
        tol: f64,
    ) -> Result<(), Error>
    where
        P: NewtonProblem<D>,
    {
        problem.residual(y0, &mut self.delta)?;
        y.copy_from(y0);
        self.curiter = 0;
        let mut prev_norm = f64::INFINITY;

        loop {
            self.niters += 1;

            // right-hand side of the linear system is the negated residual
            self.delta.neg_mut();
            problem.solve(&mut self.delta)?;
            *y += &self.delta;

            let delnrm = self.delta.norm_wrms(w);
            trace!("Newton iter {}: |delta| = {delnrm:.3e}", self.curiter);

            if self.curiter > 0 && delnrm > 2.0 * prev_norm {
                return Err(Error::ConvergenceRecover);
            }
            if delnrm <= tol {
                return Ok(());
            }

            self.curiter += 1;
            if self.curiter >= self.maxiters {
                return Err(Error::ConvergenceRecover);
            }
            prev_norm = delnrm;
            problem.residual(y, &mut self.delta)?;
        }
    }

    pub fn num_iters(&self) -> usize {
        self.niters
    }

    pub fn num_conv_fails(&self) -> usize {
        self.nconvfails
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::DenseLu;
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector, Dyn};

    /// `x^2 + y^2 = 5`, `x y = 2`; root at (2, 1).
    struct Circle {
        jac: DMatrix<f64>,
        lu: DenseLu<Dyn>,
    }

    impl NewtonProblem<Dyn> for Circle {
        fn residual(&mut self, y: &DVector<f64>, g: &mut DVector<f64>) -> Result<(), Error> {
            g[0] = y[0] * y[0] + y[1] * y[1] - 5.0;
            g[1] = y[0] * y[1] - 2.0;
            Ok(())
        }

        fn setup(&mut self, y: &DVector<f64>) -> Result<(), Error> {
            self.jac[(0, 0)] = 2.0 * y[0];
            self.jac[(0, 1)] = 2.0 * y[1];
            self.jac[(1, 0)] = y[1];
            self.jac[(1, 1)] = y[0];
            self.lu.factor(&mut self.jac)
        }

        fn solve(&mut self, b: &mut DVector<f64>) -> Result<(), Error> {
            self.lu.solve(&self.jac, b);
            Ok(())
        }
    }

    #[test]
    fn converges_to_known_root() {
        let mut problem = Circle {
            jac: DMatrix::zeros(2, 2),
            lu: DenseLu::new(Dyn(2)),
        };
        let mut newton = Newton::new(Dyn(2), 20);

        let y0 = DVector::from_vec(vec![2.2, 1.2]);
        let mut y = DVector::zeros(2);
        let w = DVector::from_element(2, 1.0);

        newton
            .solve(&mut problem, &y0, &mut y, &w, 1e-10, true)
            .expect("should converge");

        assert_relative_eq!(y[0], 2.0, max_relative = 1e-8);
        assert_relative_eq!(y[1], 1.0, max_relative = 1e-8);
        assert!(newton.num_iters() < 20);
    }

    #[test]
    fn stale_matrix_reports_recoverable_failure() {
        // A single iteration with the matrix from a far-away point cannot
        // reach the tolerance, so the solver must signal a recoverable
        // failure after its fresh retry.
        let mut problem = Circle {
            jac: DMatrix::zeros(2, 2),
            lu: DenseLu::new(Dyn(2)),
        };
        let mut newton = Newton::new(Dyn(2), 1);

        let y0 = DVector::from_vec(vec![10.0, 10.0]);
        let mut y = DVector::zeros(2);
        let w = DVector::from_element(2, 1.0);

        let result = newton.solve(&mut problem, &y0, &mut y, &w, 1e-14, true);
        assert!(matches!(result, Err(Error::ConvergenceRecover)));
        assert!(newton.num_conv_fails() > 0);
    }
}
