//! Direct solution path
//!
//! Gantree: L3_Direct → DirectSolver
//!
//! LU-factorizes the dense reduced matrix once; the factorization answers
//! the solve, the transpose solves of the overhead estimate, and nothing
//! else touches the matrix afterwards.

use crate::norms::{onenorm_inverse_estimate, InverseSolver};
use crate::reduced::{ColumnScaling, ObservedStates, ReducedSystem};
use crate::solution::Solution;
use log::info;
use nalgebra::{DVector, Dyn, LU};
use remit_calibration::TensorCals;
use remit_core::{RemitError, RemitResult};
use std::time::Instant;

/// LU factorization of a reduced matrix
/// Gantree: LuFactorization // LU 분해
pub struct LuFactorization {
    lu: LU<f64, Dyn, Dyn>,
    dim: usize,
}

impl LuFactorization {
    /// Factorize a reduced system
    pub fn new(system: ReducedSystem) -> Self {
        Self {
            dim: system.dim(),
            lu: system.matrix.lu(),
        }
    }
}

impl InverseSolver for LuFactorization {
    fn dim(&self) -> usize {
        self.dim
    }

    fn solve(&self, b: &DVector<f64>) -> RemitResult<DVector<f64>> {
        self.lu.solve(b).ok_or(RemitError::SingularMatrix)
    }

    /// A = P⁻¹LU, so Aᵀy = b is Uᵀz = b, Lᵀw = z, y = P⁻¹w
    fn solve_transpose(&self, b: &DVector<f64>) -> RemitResult<DVector<f64>> {
        let z = self
            .lu
            .u()
            .transpose()
            .solve_lower_triangular(b)
            .ok_or(RemitError::SingularMatrix)?;
        let mut w = self
            .lu
            .l()
            .transpose()
            .solve_upper_triangular(&z)
            .ok_or(RemitError::SingularMatrix)?;
        self.lu.p().inv_permute_rows(&mut w);
        Ok(w)
    }
}

/// Solve the reduced system by dense LU
/// Gantree: direct_solve(observed,cals,d,scaling,overhead) -> Result<Solution> // 직접 풀이
pub fn direct_solve(
    observed: &ObservedStates,
    cals: &TensorCals,
    distance: usize,
    scaling: ColumnScaling,
    return_overhead: bool,
) -> RemitResult<Solution> {
    let system = ReducedSystem::build(observed, cals, distance, scaling)?;
    let col_norms = system.col_norms.clone();

    let start = Instant::now();
    let rhs = observed.probabilities();
    info!("Counts to vector time: {:?}", start.elapsed());

    let start = Instant::now();
    let lu = LuFactorization::new(system);
    let x = lu.solve(&rhs)?;
    info!("Direct solver time: {:?}", start.elapsed());

    let gamma = if return_overhead {
        let start = Instant::now();
        let gamma = onenorm_inverse_estimate(&lu)?;
        info!("Overhead estimate time: {:?}", start.elapsed());
        Some(gamma)
    } else {
        None
    };

    Ok(Solution {
        values: x.iter().copied().collect(),
        col_norms,
        iterations: None,
        gamma,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::DMatrix;
    use remit_calibration::AssignmentMatrix;
    use remit_core::Counts;

    fn counts(pairs: &[(&str, u64)]) -> Counts {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn cals(n: usize) -> TensorCals {
        TensorCals::from_matrices(&vec![AssignmentMatrix::from_error_rates(0.03, 0.07).unwrap(); n])
    }

    #[test]
    fn test_zero_distance_is_elementwise_division() {
        let c = counts(&[("00", 50), ("11", 30), ("01", 20)]);
        let obs = ObservedStates::from_counts(&c, 2).unwrap();
        let t = cals(2);
        let sol = direct_solve(&obs, &t, 0, ColumnScaling::Raw, false).unwrap();
        let p = obs.probabilities();
        for (i, state) in obs.states().iter().enumerate() {
            assert_abs_diff_eq!(sol.values[i], p[i] / t.diagonal_element(state), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_full_support_sums_to_one() {
        let c = counts(&[("00", 40), ("01", 25), ("10", 20), ("11", 15)]);
        let obs = ObservedStates::from_counts(&c, 2).unwrap();
        let sol = direct_solve(&obs, &cals(2), 2, ColumnScaling::Raw, false).unwrap();
        assert_abs_diff_eq!(sol.values.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_transpose_solve() {
        let c = counts(&[("000", 5), ("001", 3), ("011", 2), ("111", 7)]);
        let obs = ObservedStates::from_counts(&c, 3).unwrap();
        let system = ReducedSystem::build(&obs, &cals(3), 2, ColumnScaling::Raw).unwrap();
        let a: DMatrix<f64> = system.matrix.clone();
        let lu = LuFactorization::new(system);
        let b = DVector::from_vec(vec![1.0, -2.0, 0.5, 3.0]);
        let y = lu.solve_transpose(&b).unwrap();
        let back = a.transpose() * y;
        for i in 0..4 {
            assert_abs_diff_eq!(back[i], b[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_overhead_matches_exact_inverse_norm() {
        let c = counts(&[("00", 40), ("01", 25), ("10", 20), ("11", 15)]);
        let obs = ObservedStates::from_counts(&c, 2).unwrap();
        let t = cals(2);
        let sol = direct_solve(&obs, &t, 2, ColumnScaling::Raw, true).unwrap();
        let a = ReducedSystem::build(&obs, &t, 2, ColumnScaling::Raw).unwrap().matrix;
        let exact = a
            .try_inverse()
            .unwrap()
            .column_iter()
            .map(|c| c.lp_norm(1))
            .fold(0.0, f64::max);
        let gamma = sol.gamma.unwrap();
        assert!(gamma <= exact * (1.0 + 1e-10));
        assert!(gamma >= 0.5 * exact);
        assert!(gamma >= 1.0);
    }

    #[test]
    fn test_singular_matrix() {
        let faulty = AssignmentMatrix::new([[0.5, 0.5], [0.5, 0.5]]).unwrap();
        let t = TensorCals::from_matrices(&[faulty]);
        let obs = ObservedStates::from_counts(&counts(&[("0", 1), ("1", 1)]), 1).unwrap();
        assert_eq!(
            direct_solve(&obs, &t, 1, ColumnScaling::Raw, false).unwrap_err(),
            RemitError::SingularMatrix
        );
    }
}
