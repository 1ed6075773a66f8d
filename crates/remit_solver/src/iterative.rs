//! Iterative solution path
//!
//! Gantree: L3_Iterative → GmresSolver
//!
//! Restarted GMRES with a left Jacobi preconditioner against any
//! `LinearOperator`. `max_iter` bounds the number of restart cycles; a
//! solve that does not reach the tolerance within that budget is an error.

use crate::norms::{onenorm_inverse_estimate, InverseSolver};
use crate::operator::{LinearOperator, MatrixFreeOperator, Transposed};
use crate::reduced::{ColumnScaling, ObservedStates};
use crate::solution::Solution;
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use remit_calibration::TensorCals;
use remit_core::solver::GMRES_RESTART;
use remit_core::{RemitError, RemitResult};
use std::time::Instant;

/// Converged GMRES result
#[derive(Debug, Clone)]
pub struct GmresSolution {
    /// Solution vector
    pub x: DVector<f64>,
    /// Total Arnoldi steps taken
    pub iterations: usize,
    /// Final preconditioned residual norm
    pub residual: f64,
}

/// Restarted, Jacobi-preconditioned GMRES
/// Gantree: GmresSolver // GMRES
pub struct GmresSolver<'o, O: LinearOperator + ?Sized> {
    op: &'o O,
    /// Inverse diagonal, zero diagonal entries are left unscaled
    inv_diag: DVector<f64>,
    tol: f64,
    max_iter: usize,
    restart: usize,
}

impl<'o, O: LinearOperator + ?Sized> GmresSolver<'o, O> {
    /// Create a solver with relative and absolute tolerance `tol`
    pub fn new(op: &'o O, tol: f64, max_iter: usize) -> Self {
        let inv_diag = op.diagonal().map(|d| if d != 0.0 { 1.0 / d } else { 1.0 });
        Self {
            op,
            inv_diag,
            tol,
            max_iter,
            restart: GMRES_RESTART,
        }
    }

    /// Override the Krylov subspace size per cycle
    pub fn with_restart(mut self, restart: usize) -> Self {
        self.restart = restart.max(1);
        self
    }

    #[inline]
    fn precondition(&self, v: DVector<f64>) -> DVector<f64> {
        v.component_mul(&self.inv_diag)
    }

    fn residual(&self, b: &DVector<f64>, x: &DVector<f64>) -> DVector<f64> {
        self.precondition(b - self.op.apply(x))
    }

    /// Solve A x = b from a zero initial guess
    /// Gantree: solve(&b) -> Result<GmresSolution> // GMRES 풀이
    pub fn run(&self, b: &DVector<f64>) -> RemitResult<GmresSolution> {
        let n = self.op.dim();
        let restart = self.restart.min(n).max(1);
        let target = (self.tol * self.precondition(b.clone()).norm()).max(self.tol);

        let mut x = DVector::zeros(n);
        let mut r = self.residual(b, &x);
        let mut beta = r.norm();
        let mut iterations = 0;

        for cycle in 0..self.max_iter {
            if beta <= target {
                break;
            }

            let mut basis: Vec<DVector<f64>> = Vec::with_capacity(restart + 1);
            basis.push(r / beta);
            let mut h = DMatrix::<f64>::zeros(restart + 1, restart);
            let mut cs = vec![0.0; restart];
            let mut sn = vec![0.0; restart];
            let mut g = DVector::<f64>::zeros(restart + 1);
            g[0] = beta;
            let mut steps = 0;

            for j in 0..restart {
                let mut w = self.precondition(self.op.apply(&basis[j]));
                for (i, v) in basis.iter().enumerate() {
                    let hij = w.dot(v);
                    h[(i, j)] = hij;
                    w.axpy(-hij, v, 1.0);
                }
                let w_norm = w.norm();
                h[(j + 1, j)] = w_norm;

                for i in 0..j {
                    let upper = cs[i] * h[(i, j)] + sn[i] * h[(i + 1, j)];
                    h[(i + 1, j)] = -sn[i] * h[(i, j)] + cs[i] * h[(i + 1, j)];
                    h[(i, j)] = upper;
                }
                let denom = h[(j, j)].hypot(h[(j + 1, j)]);
                (cs[j], sn[j]) = if denom == 0.0 {
                    (1.0, 0.0)
                } else {
                    (h[(j, j)] / denom, h[(j + 1, j)] / denom)
                };
                h[(j, j)] = cs[j] * h[(j, j)] + sn[j] * h[(j + 1, j)];
                h[(j + 1, j)] = 0.0;
                g[j + 1] = -sn[j] * g[j];
                g[j] *= cs[j];

                steps = j + 1;
                iterations += 1;
                if g[j + 1].abs() <= target || w_norm == 0.0 {
                    break;
                }
                basis.push(w / w_norm);
            }

            // Back substitution on the rotated Hessenberg matrix
            let mut y = vec![0.0; steps];
            for i in (0..steps).rev() {
                let tail: f64 = (i + 1..steps).map(|k| h[(i, k)] * y[k]).sum();
                if h[(i, i)] == 0.0 {
                    return Err(RemitError::SingularMatrix);
                }
                y[i] = (g[i] - tail) / h[(i, i)];
            }
            for (yi, v) in y.iter().zip(&basis) {
                x.axpy(*yi, v, 1.0);
            }

            r = self.residual(b, &x);
            beta = r.norm();
            debug!("GMRES cycle {}: {} steps, residual {:.3e}", cycle, steps, beta);
        }

        if beta <= target {
            Ok(GmresSolution {
                x,
                iterations,
                residual: beta,
            })
        } else {
            Err(RemitError::ConvergenceFailed {
                iterations,
                residual: beta,
            })
        }
    }
}

impl<O: LinearOperator + ?Sized> InverseSolver for GmresSolver<'_, O> {
    fn dim(&self) -> usize {
        self.op.dim()
    }

    fn solve(&self, b: &DVector<f64>) -> RemitResult<DVector<f64>> {
        self.run(b).map(|s| s.x)
    }

    fn solve_transpose(&self, b: &DVector<f64>) -> RemitResult<DVector<f64>> {
        let transposed = Transposed(self.op);
        GmresSolver::new(&transposed, self.tol, self.max_iter)
            .with_restart(self.restart)
            .run(b)
            .map(|s| s.x)
    }
}

/// Solver settings for the iterative path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterativeOptions {
    /// Relative and absolute tolerance
    pub tol: f64,
    /// Maximum restart cycles
    pub max_iter: usize,
    /// Estimate ‖A⁻¹‖₁ after solving
    pub return_overhead: bool,
}

/// Solve the reduced system matrix-free
/// Gantree: iterative_solve(observed,cals,d,scaling,opts) -> Result<Solution> // 반복 풀이
pub fn iterative_solve(
    observed: &ObservedStates,
    cals: &TensorCals,
    distance: usize,
    scaling: ColumnScaling,
    options: IterativeOptions,
) -> RemitResult<Solution> {
    let op = MatrixFreeOperator::new(observed, cals, distance, scaling)?;

    let start = Instant::now();
    let solver = GmresSolver::new(&op, options.tol, options.max_iter);
    info!("Diagonal build time: {:?}", start.elapsed());

    let start = Instant::now();
    let rhs = observed.probabilities();
    info!("Counts to vector time: {:?}", start.elapsed());

    let start = Instant::now();
    let solved = solver.run(&rhs)?;
    info!(
        "Iterative solver time: {:?} ({} iterations, residual {:.3e})",
        start.elapsed(),
        solved.iterations,
        solved.residual
    );

    let gamma = if options.return_overhead {
        let start = Instant::now();
        let gamma = onenorm_inverse_estimate(&solver)?;
        info!("Overhead estimate time: {:?}", start.elapsed());
        Some(gamma)
    } else {
        None
    };

    Ok(Solution {
        values: solved.x.iter().copied().collect(),
        col_norms: op.col_norms().to_vec(),
        iterations: Some(solved.iterations),
        gamma,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direct::direct_solve;
    use approx::assert_abs_diff_eq;
    use remit_calibration::AssignmentMatrix;
    use remit_core::Counts;

    fn setup() -> (ObservedStates, TensorCals) {
        let counts: Counts = [
            ("0000", 410),
            ("0001", 32),
            ("0010", 25),
            ("1111", 380),
            ("1110", 40),
            ("0111", 36),
            ("1000", 21),
            ("1011", 30),
            ("0100", 26),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();
        let obs = ObservedStates::from_counts(&counts, 4).unwrap();
        let mats: Vec<_> = [(0.02, 0.05), (0.01, 0.08), (0.03, 0.04), (0.015, 0.06)]
            .iter()
            .map(|&(a, b)| AssignmentMatrix::from_error_rates(a, b).unwrap())
            .collect();
        (obs, TensorCals::from_matrices(&mats))
    }

    fn options(tol: f64, max_iter: usize) -> IterativeOptions {
        IterativeOptions {
            tol,
            max_iter,
            return_overhead: false,
        }
    }

    #[test]
    fn test_matches_direct_for_all_distances() {
        let (obs, cals) = setup();
        for d in 0..=4 {
            let direct = direct_solve(&obs, &cals, d, ColumnScaling::Raw, false).unwrap();
            let iter = iterative_solve(&obs, &cals, d, ColumnScaling::Raw, options(1e-12, 25)).unwrap();
            for (a, b) in direct.values.iter().zip(&iter.values) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-8);
            }
            for (a, b) in direct.col_norms.iter().zip(&iter.col_norms) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
            }
            assert!(iter.iterations.unwrap() > 0);
        }
    }

    #[test]
    fn test_zero_iterations_fails() {
        let (obs, cals) = setup();
        let err = iterative_solve(&obs, &cals, 2, ColumnScaling::Raw, options(1e-5, 0)).unwrap_err();
        assert!(matches!(
            err,
            RemitError::ConvergenceFailed { iterations: 0, .. }
        ));
    }

    #[test]
    fn test_restart_still_converges() {
        let (obs, cals) = setup();
        let op = MatrixFreeOperator::new(&obs, &cals, 4, ColumnScaling::Raw).unwrap();
        let b = obs.probabilities();
        let sol = GmresSolver::new(&op, 1e-10, 50).with_restart(2).run(&b).unwrap();
        let residual = op.apply(&sol.x) - &b;
        assert!(residual.norm() < 1e-8);
    }

    #[test]
    fn test_transpose_solve() {
        let (obs, cals) = setup();
        let op = MatrixFreeOperator::new(&obs, &cals, 2, ColumnScaling::Raw).unwrap();
        let solver = GmresSolver::new(&op, 1e-12, 25);
        let b = DVector::from_iterator(obs.len(), (0..obs.len()).map(|i| i as f64 - 3.0));
        let y = solver.solve_transpose(&b).unwrap();
        let back = op.apply_transpose(&y);
        for i in 0..obs.len() {
            assert_abs_diff_eq!(back[i], b[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_overhead_agrees_with_direct() {
        let (obs, cals) = setup();
        let direct = direct_solve(&obs, &cals, 3, ColumnScaling::Raw, true).unwrap();
        let opts = IterativeOptions {
            tol: 1e-12,
            max_iter: 25,
            return_overhead: true,
        };
        let iter = iterative_solve(&obs, &cals, 3, ColumnScaling::Raw, opts).unwrap();
        assert_abs_diff_eq!(direct.gamma.unwrap(), iter.gamma.unwrap(), epsilon = 1e-6);
    }
}
