//! Solver output

use serde::{Deserialize, Serialize};

/// Raw result of one reduced-system solve, in canonical state order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Quasi-probabilities
    pub values: Vec<f64>,
    /// Raw truncated column 1-norms
    pub col_norms: Vec<f64>,
    /// Krylov iterations, iterative path only
    pub iterations: Option<usize>,
    /// Estimate of ‖A⁻¹‖₁ when requested
    pub gamma: Option<f64>,
}

impl Solution {
    /// Mitigation overhead γ², when γ was estimated
    pub fn mitigation_overhead(&self) -> Option<f64> {
        self.gamma.map(|g| g * g)
    }
}
