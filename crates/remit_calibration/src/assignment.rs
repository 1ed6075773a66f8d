//! Single-channel assignment matrices
//!
//! Gantree: L2_Calibration → AssignmentMatrix
//!
//! `A[i][j] = P(observed = i | prepared = j)`. Columns are probability
//! vectors, so every valid matrix is column-stochastic.

use remit_core::calibration::COLUMN_SUM_TOL;
use remit_core::{RemitError, RemitResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 2×2 column-stochastic readout assignment matrix
/// Gantree: AssignmentMatrix // 할당 행렬
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[[f64; 2]; 2]", into = "[[f64; 2]; 2]")]
pub struct AssignmentMatrix {
    /// entries[observed][prepared]
    entries: [[f64; 2]; 2],
}

impl AssignmentMatrix {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create with validation
    /// Gantree: new([[f64;2];2]) -> Result<Self> // 생성+검증
    pub fn new(entries: [[f64; 2]; 2]) -> RemitResult<Self> {
        for row in &entries {
            for &value in row {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(RemitError::InvalidAssignmentMatrix(format!(
                        "entry {} outside [0, 1]",
                        value
                    )));
                }
            }
        }
        for prepared in 0..2 {
            let sum = entries[0][prepared] + entries[1][prepared];
            if (sum - 1.0).abs() > COLUMN_SUM_TOL {
                return Err(RemitError::InvalidAssignmentMatrix(format!(
                    "column {} sums to {}",
                    prepared, sum
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Create from flip probabilities P(1|0) and P(0|1)
    pub fn from_error_rates(p1_given_0: f64, p0_given_1: f64) -> RemitResult<Self> {
        Self::new([
            [1.0 - p1_given_0, p0_given_1],
            [p1_given_0, 1.0 - p0_given_1],
        ])
    }

    /// Create from the flat row-major layout `[a00, a01, a10, a11]`
    pub fn from_row_major(flat: [f64; 4]) -> RemitResult<Self> {
        Self::new([[flat[0], flat[1]], [flat[2], flat[3]]])
    }

    /// Error-free channel
    pub fn ideal() -> Self {
        Self {
            entries: [[1.0, 0.0], [0.0, 1.0]],
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// P(observed | prepared)
    #[inline]
    pub fn get(&self, observed: usize, prepared: usize) -> f64 {
        self.entries[observed][prepared]
    }

    /// Flat row-major layout `[a00, a01, a10, a11]`
    /// Gantree: row_major() -> [f64;4] // 평탄화
    pub fn row_major(&self) -> [f64; 4] {
        [
            self.entries[0][0],
            self.entries[0][1],
            self.entries[1][0],
            self.entries[1][1],
        ]
    }

    /// Mean probability of a correct assignment
    /// Gantree: fidelity() -> f64 // 판독 충실도
    pub fn fidelity(&self) -> f64 {
        0.5 * (self.entries[0][0] + self.entries[1][1])
    }

    /// Reading 0 is at least as likely after preparing 1 as after preparing 0
    pub fn is_faulty(&self) -> bool {
        self.entries[0][1] >= self.entries[0][0]
    }
}

impl Default for AssignmentMatrix {
    fn default() -> Self {
        Self::ideal()
    }
}

impl TryFrom<[[f64; 2]; 2]> for AssignmentMatrix {
    type Error = RemitError;

    fn try_from(value: [[f64; 2]; 2]) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssignmentMatrix> for [[f64; 2]; 2] {
    fn from(value: AssignmentMatrix) -> Self {
        value.entries
    }
}

impl fmt::Display for AssignmentMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[[{:.4}, {:.4}], [{:.4}, {:.4}]]",
            self.entries[0][0], self.entries[0][1], self.entries[1][0], self.entries[1][1]
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_valid_matrix() {
        let a = AssignmentMatrix::new([[0.98, 0.05], [0.02, 0.95]]).unwrap();
        assert_eq!(a.get(1, 0), 0.02);
        assert_abs_diff_eq!(a.fidelity(), 0.965, epsilon = 1e-12);
        assert!(!a.is_faulty());
    }

    #[test]
    fn test_rejects_bad_column_sum() {
        assert!(AssignmentMatrix::new([[0.9, 0.1], [0.2, 0.9]]).is_err());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(AssignmentMatrix::new([[1.1, 0.0], [-0.1, 1.0]]).is_err());
        assert!(AssignmentMatrix::new([[f64::NAN, 0.0], [0.0, 1.0]]).is_err());
    }

    #[test]
    fn test_error_rates() {
        let a = AssignmentMatrix::from_error_rates(0.01, 0.03).unwrap();
        for (got, want) in a.row_major().iter().zip([0.99, 0.03, 0.01, 0.97]) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_row_major_roundtrip() {
        let a = AssignmentMatrix::from_error_rates(0.02, 0.07).unwrap();
        let b = AssignmentMatrix::from_row_major(a.row_major()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_faulty() {
        let bad = AssignmentMatrix::new([[0.4, 0.6], [0.6, 0.4]]).unwrap();
        assert!(bad.is_faulty());
        assert!(!AssignmentMatrix::ideal().is_faulty());
    }

    #[test]
    fn test_serde_validates() {
        let json = "[[0.9,0.2],[0.1,0.8]]";
        let a: AssignmentMatrix = serde_json::from_str(json).unwrap();
        assert_eq!(a.get(0, 1), 0.2);
        assert!(serde_json::from_str::<AssignmentMatrix>("[[0.9,0.2],[0.3,0.8]]").is_err());
    }
}
