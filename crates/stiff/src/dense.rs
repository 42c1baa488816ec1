//! Direct dense linear solver: LU with partial pivoting.
//!
//! The iteration matrix of the implicit step is small (number of species +
//! 1), so a dense factorization is the right tool. The factorization
//! overwrites the input matrix with L (unit lower, stored multipliers) and U;
//! pivot rows are kept for the solve phase.

use nalgebra::{allocator::Allocator, DefaultAllocator, Dim, Matrix, OVector, StorageMut, U1};

use crate::Error;

#[derive(Clone, Debug)]
pub struct DenseLu<D>
where
    D: Dim,
    DefaultAllocator: Allocator<usize, D>,
{
    pivots: OVector<usize, D>,
}

impl<D> DenseLu<D>
where
    D: Dim,
    DefaultAllocator: Allocator<usize, D>,
{
    pub fn new(dim: D) -> Self {
        DenseLu {
            pivots: OVector::zeros_generic(dim, nalgebra::Const::<1>),
        }
    }

    /// Factor the square matrix `a` in place. On a zero pivot the error
    /// carries the offending column (numbered from one).
    pub fn factor<S>(&mut self, a: &mut Matrix<f64, D, D, S>) -> Result<(), Error>
    where
        S: StorageMut<f64, D, D>,
    {
        let n = a.nrows();
        debug_assert_eq!(n, a.ncols());
        debug_assert_eq!(n, self.pivots.len());

        for k in 0..n {
            // pick the largest-magnitude entry in column k at or below the diagonal
            let mut p = k;
            for i in (k + 1)..n {
                if a[(i, k)].abs() > a[(p, k)].abs() {
                    p = i;
                }
            }
            self.pivots[k] = p;

            if a[(p, k)] == 0.0 {
                return Err(Error::LuFactFail { col: k + 1 });
            }

            if p != k {
                for j in 0..n {
                    a.swap((k, j), (p, j));
                }
            }

            // store multipliers in the eliminated positions
            let inv_pivot = a[(k, k)].recip();
            for i in (k + 1)..n {
                a[(i, k)] *= inv_pivot;
            }

            for j in (k + 1)..n {
                let a_kj = a[(k, j)];
                if a_kj != 0.0 {
                    for i in (k + 1)..n {
                        let m = a[(i, k)];
                        a[(i, j)] -= m * a_kj;
                    }
                }
            }
        }
        Ok(())
    }

    /// Solve `A x = b` using a previous [`DenseLu::factor`], overwriting `b`
    /// with the solution.
    pub fn solve<SA, SB>(&self, a: &Matrix<f64, D, D, SA>, b: &mut Matrix<f64, D, U1, SB>)
    where
        SA: StorageMut<f64, D, D>,
        SB: StorageMut<f64, D, U1>,
    {
        let n = a.ncols();

        // apply the row permutation
        for k in 0..n {
            let p = self.pivots[k];
            if p != k {
                b.swap((k, 0), (p, 0));
            }
        }

        // forward substitution with the unit lower factor
        for k in 0..n {
            let bk = b[k];
            for i in (k + 1)..n {
                b[i] -= a[(i, k)] * bk;
            }
        }

        // back substitution with the upper factor
        for k in (0..n).rev() {
            b[k] /= a[(k, k)];
            let bk = b[k];
            for i in 0..k {
                b[i] -= a[(i, k)] * bk;
            }
        }
    }
}
