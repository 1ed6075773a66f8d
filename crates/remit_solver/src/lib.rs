//! # REMIT Solver
//!
//! Hamming-truncated reduced systems and their two solution paths: dense
//! LU over the explicit matrix, and Jacobi-preconditioned GMRES over a
//! matrix-free operator. Both report raw column norms and can estimate the
//! mitigation overhead from the 1-norm of the inverse.
//!
//! ## Gantree Architecture
//!
//! ```text
//! remit_solver // L3: Solvers (완료)
//!     L3_Reduced // 축소 시스템 (완료)
//!         ObservedStates // 최초 등장 순서, 검증 (완료)
//!         ReducedSystem // 밀집 행렬 + 열 노름 (완료)
//!     L3_Operator // 행렬 없는 연산자 (완료)
//!         apply(), apply_transpose(), diagonal(), col_norms()
//!     L3_Direct // LU 풀이 (완료)
//!     L3_Iterative // GMRES + Jacobi (완료)
//!     L3_Overhead // Hager/Higham 1-노름 추정 (완료)
//!     L3_Diagnostics // 대각 우세 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use remit_solver::prelude::*;
//! use remit_calibration::AssignmentMatrix;
//! use remit_core::Counts;
//!
//! let counts: Counts = [("00", 480), ("11", 470), ("01", 50)]
//!     .iter()
//!     .map(|(k, v)| (k.to_string(), *v))
//!     .collect();
//! let observed = ObservedStates::from_counts(&counts, 2).unwrap();
//! let cals = TensorCals::from_matrices(&[AssignmentMatrix::from_error_rates(0.02, 0.05).unwrap(); 2]);
//!
//! let solution = direct_solve(&observed, &cals, 2, ColumnScaling::Raw, true).unwrap();
//! let quasi = observed.to_quasi(&solution.values);
//! assert_eq!(quasi.len(), 3);
//! assert!(solution.mitigation_overhead().unwrap() >= 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Observed states and dense reduced matrix (Gantree: L3_Reduced)
pub mod reduced;

/// Matrix-free operator (Gantree: L3_Operator)
pub mod operator;

/// Inverse 1-norm estimation (Gantree: L3_Overhead)
pub mod norms;

/// Direct LU path (Gantree: L3_Direct)
pub mod direct;

/// GMRES path (Gantree: L3_Iterative)
pub mod iterative;

/// Diagonal-dominance diagnostic (Gantree: L3_Diagnostics)
pub mod sdd;

/// Solver output
pub mod solution;

// ============================================================================
// Re-exports
// ============================================================================

pub use direct::{direct_solve, LuFactorization};
pub use iterative::{iterative_solve, GmresSolution, GmresSolver, IterativeOptions};
pub use norms::{onenorm_inverse_estimate, InverseSolver};
pub use operator::{LinearOperator, MatrixFreeOperator, Transposed};
pub use reduced::{ColumnScaling, ObservedStates, ReducedSystem};
pub use remit_calibration::TensorCals;
pub use sdd::is_sdd;
pub use solution::Solution;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases

    pub use crate::direct::direct_solve;
    pub use crate::iterative::{iterative_solve, IterativeOptions};
    pub use crate::norms::{onenorm_inverse_estimate, InverseSolver};
    pub use crate::operator::{LinearOperator, MatrixFreeOperator};
    pub use crate::reduced::{ColumnScaling, ObservedStates, ReducedSystem};
    pub use crate::sdd::is_sdd;
    pub use crate::solution::Solution;
    pub use remit_calibration::TensorCals;
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use approx::assert_abs_diff_eq;
    use remit_calibration::{AssignmentMatrix, ReadoutSampler};
    use remit_core::{Bitstring, Counts};

    fn channel_matrices(n: usize) -> Vec<AssignmentMatrix> {
        (0..n)
            .map(|q| {
                AssignmentMatrix::from_error_rates(0.01 + 0.004 * q as f64, 0.04 + 0.003 * q as f64)
                    .unwrap()
            })
            .collect()
    }

    fn noisy_counts(n: usize, shots: u64, seed: u64) -> (Counts, Vec<AssignmentMatrix>) {
        let mats = channel_matrices(n);
        let ideal = vec![
            ("0".repeat(n), 0.5),
            ("1".repeat(n), 0.5),
        ];
        let mut sampler = ReadoutSampler::new(mats.clone(), Some(seed));
        (sampler.sample_distribution(&ideal, shots).unwrap(), mats)
    }

    fn full_solution(observed: &ObservedStates, cals: &TensorCals) -> Vec<f64> {
        direct_solve(observed, cals, observed.num_channels(), ColumnScaling::Raw, false)
            .unwrap()
            .values
    }

    fn l1(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
    }

    #[test]
    fn test_direct_and_iterative_col_norms_agree_for_every_distance() {
        let (counts, mats) = noisy_counts(8, 4000, 11);
        let observed = ObservedStates::from_counts(&counts, 8).unwrap();
        let cals = TensorCals::from_matrices(&mats);
        let opts = IterativeOptions {
            tol: 1e-10,
            max_iter: 25,
            return_overhead: false,
        };
        for d in 0..=8 {
            let direct = direct_solve(&observed, &cals, d, ColumnScaling::Raw, false).unwrap();
            let iter = iterative_solve(&observed, &cals, d, ColumnScaling::Raw, opts).unwrap();
            for (a, b) in direct.col_norms.iter().zip(&iter.col_norms) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
            }
            assert!(l1(&direct.values, &iter.values) < 1e-6);
        }
    }

    #[test]
    fn test_truncation_refines_monotonically() {
        let n = 6;
        let mats = channel_matrices(n);
        let sampler = ReadoutSampler::new(mats.clone(), None);
        let ideal = vec![("0".repeat(n), 0.5), ("1".repeat(n), 0.5)];
        let counts: Counts = sampler
            .exact_noisy_distribution(&ideal)
            .unwrap()
            .into_iter()
            .map(|(key, p)| (key, (p * 10_000.0).round() as u64))
            .filter(|(_, c)| *c > 0)
            .collect();
        let observed = ObservedStates::from_counts(&counts, n).unwrap();
        let cals = TensorCals::from_matrices(&mats);
        let exact = full_solution(&observed, &cals);

        let errors: Vec<f64> = (0..=n)
            .map(|d| {
                let sol = direct_solve(&observed, &cals, d, ColumnScaling::Raw, false).unwrap();
                l1(&sol.values, &exact)
            })
            .collect();
        for pair in errors.windows(2) {
            assert!(pair[1] <= pair[0], "errors {:?}", errors);
        }
        assert!(errors[n] < 1e-12);
    }

    #[test]
    fn test_round_trip_preserves_keys_and_mass() {
        let (counts, mats) = noisy_counts(5, 2000, 3);
        let observed = ObservedStates::from_counts(&counts, 5).unwrap();
        let cals = TensorCals::from_matrices(&mats);
        let sol = direct_solve(&observed, &cals, 2, ColumnScaling::Renormalized, false).unwrap();
        let quasi = observed.to_quasi(&sol.values);

        assert_eq!(
            quasi.keys().collect::<Vec<_>>(),
            counts.keys().collect::<Vec<_>>()
        );
        assert_abs_diff_eq!(quasi.sum(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_correction_recovers_ideal_mass() {
        let (counts, mats) = noisy_counts(4, 20_000, 8);
        let observed = ObservedStates::from_counts(&counts, 4).unwrap();
        let cals = TensorCals::from_matrices(&mats);
        let quasi = observed.to_quasi(&full_solution(&observed, &cals));
        let zeros = quasi.get("0000").unwrap_or(0.0);
        let ones = quasi.get("1111").unwrap_or(0.0);
        assert!((zeros + ones - 1.0).abs() < 0.03);
        assert!(is_sdd(&observed, &cals, 4).unwrap());
        assert!(observed.index_of(&Bitstring::parse("0000").unwrap()).is_some());
    }
}
