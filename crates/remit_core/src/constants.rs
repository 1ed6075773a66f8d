//! Constants for REMIT
//!
//! Gantree: L0_Foundation → Constants
//!
//! Solver defaults, calibration tolerances, and memory sizing parameters.

// ============================================================================
// Solver Constants
// Gantree: solver // 솔버 상수
// ============================================================================

pub mod solver {
    //! Defaults for the direct and iterative solution paths

    /// Default convergence tolerance (relative and absolute) for GMRES
    /// Gantree: DEFAULT_TOL: f64 = 1e-5
    pub const DEFAULT_TOL: f64 = 1e-5;

    /// Default maximum number of GMRES restart cycles
    /// Gantree: DEFAULT_MAX_ITER: usize = 25
    pub const DEFAULT_MAX_ITER: usize = 25;

    /// Largest number of distinct bitstrings handled by the direct path
    /// Gantree: DEFAULT_ITER_THRESHOLD: usize = 4096
    pub const DEFAULT_ITER_THRESHOLD: usize = 4096;

    /// Krylov subspace size per GMRES restart cycle
    pub const GMRES_RESTART: usize = 20;

    /// Maximum power iterations of the 1-norm inverse estimator
    pub const ONENORM_MAX_ITER: usize = 5;
}

// ============================================================================
// Calibration Constants
// Gantree: calibration // 캘리브레이션 상수
// ============================================================================

pub mod calibration {
    //! Tolerances for assignment matrices

    /// Allowed deviation of an assignment-matrix column sum from 1
    pub const COLUMN_SUM_TOL: f64 = 1e-6;

    /// Number of matrix entries stored per channel in a flat calibration array
    pub const ENTRIES_PER_CHANNEL: usize = 4;
}

// ============================================================================
// Memory Constants
// Gantree: memory // 메모리 상수
// ============================================================================

pub mod memory {
    //! Parameters of the direct-path memory estimate

    /// Bytes per stored matrix entry (f64)
    pub const BYTES_PER_ENTRY: u64 = 8;

    /// Fraction of available memory the dense matrix may occupy
    pub const MAX_MEMORY_FRACTION: f64 = 0.5;

    /// Estimated bytes for an m×m dense system plus its right-hand side
    /// Gantree: dense_footprint(m) -> u64 // (m²+m)×8
    #[inline]
    pub const fn dense_footprint(num_elems: u64) -> u64 {
        num_elems
            .saturating_mul(num_elems)
            .saturating_add(num_elems)
            .saturating_mul(BYTES_PER_ENTRY)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_defaults() {
        assert_eq!(solver::DEFAULT_TOL, 1e-5);
        assert_eq!(solver::DEFAULT_MAX_ITER, 25);
        assert_eq!(solver::DEFAULT_ITER_THRESHOLD, 4096);
    }

    #[test]
    fn test_dense_footprint() {
        assert_eq!(memory::dense_footprint(0), 0);
        assert_eq!(memory::dense_footprint(10), (100 + 10) * 8);
        assert_eq!(memory::dense_footprint(u64::MAX), u64::MAX);
    }
}
