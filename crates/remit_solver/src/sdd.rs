//! Diagonal-dominance diagnostic
//!
//! Gantree: L3_Diagnostics → is_sdd
//!
//! A strictly diagonally dominant reduced matrix is nonsingular and the
//! Jacobi-preconditioned iteration behaves well on it.

use crate::reduced::ObservedStates;
use remit_calibration::TensorCals;
use remit_core::RemitResult;

/// Is the truncated reduced matrix strictly diagonally dominant by rows?
/// Gantree: is_sdd(observed,cals,d) -> Result<bool> // 대각 우세 검사
pub fn is_sdd(observed: &ObservedStates, cals: &TensorCals, distance: usize) -> RemitResult<bool> {
    observed.check_cals(cals)?;
    let distance = distance.min(observed.num_channels());
    let states = observed.states();

    for row in 0..observed.len() {
        let diag = cals.diagonal_element(&states[row]).abs();
        let mut off = 0.0;
        observed.for_each_neighbour(row, distance, |col| {
            if col != row {
                off += cals.element(&states[row], &states[col]).abs();
            }
        });
        if off >= diag {
            return Ok(false);
        }
    }
    Ok(true)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use remit_calibration::AssignmentMatrix;
    use remit_core::Counts;

    fn all_states(n: usize) -> ObservedStates {
        let counts: Counts = (0..1u64 << n)
            .map(|v| (format!("{:0width$b}", v, width = n), 1))
            .collect();
        ObservedStates::from_counts(&counts, n).unwrap()
    }

    fn cals(rows: [[f64; 4]; 5]) -> TensorCals {
        let mats: Vec<_> = rows
            .iter()
            .map(|&r| AssignmentMatrix::from_row_major(r).unwrap())
            .collect();
        TensorCals::from_matrices(&mats)
    }

    #[test]
    fn test_poor_readout_is_not_sdd() {
        let bad = cals([
            [0.99, 0.08288574, 0.01, 0.91711426],
            [0.91967773, 0.14404297, 0.08032227, 0.85595703],
            [0.9, 0.13195801, 0.1, 0.86804199],
            [0.85, 0.0703125, 0.15, 0.9296875],
            [0.9, 0.23425293, 0.1, 0.76574707],
        ]);
        assert!(!is_sdd(&all_states(5), &bad, 5).unwrap());
    }

    #[test]
    fn test_good_readout_is_sdd() {
        let good = cals([
            [1.0, 0.05419922, 0.0, 0.94580078],
            [0.95532227, 0.06750488, 0.04467773, 0.93249512],
            [0.99047852, 0.03967285, 0.00952148, 0.96032715],
            [0.96643066, 0.09606934, 0.03356934, 0.90393066],
            [0.99255371, 0.06066895, 0.00744629, 0.93933105],
        ]);
        assert!(is_sdd(&all_states(5), &good, 5).unwrap());
    }

    #[test]
    fn test_truncation_restores_dominance() {
        let bad = cals([[0.9, 0.2, 0.1, 0.8]; 5]);
        let obs = all_states(5);
        assert!(!is_sdd(&obs, &bad, 5).unwrap());
        assert!(is_sdd(&obs, &bad, 0).unwrap());
    }
}
