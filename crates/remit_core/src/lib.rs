//! # REMIT Core
//!
//! Core types for readout error mitigation: bitstrings, counts, Hamming
//! balls, and quasi-probability distributions.
//!
//! ## Gantree Architecture
//!
//! ```text
//! remit_core // L0+L1: Foundation + Distributions (완료)
//!     L0_Foundation // 기반 타입/상수/에러 (완료)
//!         CoreTypes // Bitstring, Counts, ChannelId (완료)
//!         Constants // 솔버/캘리브레이션/메모리 상수 (완료)
//!         Errors // 에러 타입 (완료)
//!     L1_Truncation // 해밍 절단 (완료)
//!         HammingBall // 해밍 볼 열거 (완료)
//!     L1_Distribution // 분포 (완료)
//!         QuasiDistribution // 준확률 분포 (완료)
//!         ProbDistribution // 최근접 확률 분포 (완료)
//!         QuasiCollection // 배치 결과 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use remit_core::prelude::*;
//!
//! let center = Bitstring::parse("0110").unwrap();
//! let neighbours: Vec<_> = hamming_ball(&center, 1).collect();
//! assert_eq!(neighbours.len(), 5);
//! ```
//!
//! ## Nearest Probability Distribution
//!
//! ```rust
//! use remit_core::prelude::*;
//!
//! let quasi: QuasiDistribution = vec![
//!     ("00".to_string(), 1.1),
//!     ("11".to_string(), -0.1),
//! ]
//! .into_iter()
//! .collect();
//!
//! let (probs, distance) = quasi.nearest_probability_distribution_with_distance();
//! assert!((probs.get("00").unwrap() - 1.0).abs() < 1e-12);
//! assert!(distance > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Hamming ball enumeration (Gantree: L1_Truncation → HammingBall)
pub mod hamming;

/// Distributions (Gantree: L1_Distribution)
pub mod distribution;

// ============================================================================
// Re-exports
// ============================================================================

pub use constants::{calibration, memory, solver};
pub use distribution::{
    euclidean_distance, project_to_simplex, ProbDistribution, QuasiCollection, QuasiDistribution,
};
pub use error::{RemitError, RemitResult};
pub use hamming::{ball_size, hamming_ball, hamming_terms, HammingBall};
pub use types::{total_shots, Bitstring, ChannelId, Counts};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use remit_core::prelude::*;
    //! ```

    pub use crate::constants::{calibration, memory, solver};
    pub use crate::distribution::{
        project_to_simplex, ProbDistribution, QuasiCollection, QuasiDistribution,
    };
    pub use crate::error::{RemitError, RemitResult};
    pub use crate::hamming::{ball_size, hamming_ball, hamming_terms, HammingBall};
    pub use crate::types::{total_shots, Bitstring, ChannelId, Counts};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_ball_around_parsed_key() {
        let center = Bitstring::parse("10101").unwrap();
        let ball: Vec<_> = hamming_ball(&center, 2).collect();
        assert_eq!(ball.len() as u64, ball_size(5, 2));
        assert_eq!(ball[0], center);
        assert!(ball.iter().all(|b| b.len() == 5));
    }

    #[test]
    fn test_projection_of_valid_distribution_is_identity() {
        let quasi: QuasiDistribution = vec![
            ("00".to_string(), 0.25),
            ("01".to_string(), 0.25),
            ("10".to_string(), 0.5),
        ]
        .into_iter()
        .collect();
        let (probs, distance) = quasi.nearest_probability_distribution_with_distance();
        assert_eq!(distance, 0.0);
        assert_eq!(probs.as_map(), quasi.as_map());
    }

    #[test]
    fn test_error_propagation_from_parse() {
        let err = Bitstring::parse("10x").unwrap_err();
        assert!(err.is_shape_error());
    }
}
