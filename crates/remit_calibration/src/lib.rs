//! # REMIT Calibration
//!
//! Per-channel readout calibration: assignment matrices, the calibration
//! store, estimators from calibration-experiment counts, snapshot caching,
//! and a seeded readout-noise sampler.
//!
//! ## Gantree Architecture
//!
//! ```text
//! remit_calibration // L2: Calibration (완료)
//!     AssignmentMatrix // 2×2 할당 행렬 (완료)
//!         new(), from_error_rates(), row_major(), fidelity(), is_faulty()
//!     TensorCals // 평탄 텐서 캘리브레이션 (완료)
//!         from_flat(), element(), diagonal_element()
//!     CalibrationSet // 채널별 저장소 (완료)
//!         missing_channels(), faulty_channels(), readout_fidelity()
//!         tensor_cals() - 측정 채널 순서로 형성
//!     Estimators // 추정기 (완료)
//!         balanced_cal_strings(), estimate_balanced()
//!         estimate_independent(), estimate_marginal()
//!     CalibrationCache // Arc 스냅샷 캐시 (완료)
//!         get_or_fetch() - 캐시 또는 취득
//!     ReadoutSampler // 시드 판독 샘플러 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use remit_calibration::prelude::*;
//!
//! let set = CalibrationSet::uniform("lab", 4, 0.02, 0.05).unwrap();
//! assert!(set.missing_channels(&[0, 1, 2, 3]).is_empty());
//!
//! // Bit position 0 is channel 2, bit position 1 is channel 0
//! let cals = set.tensor_cals(&[2, 0]).unwrap();
//! assert_eq!(cals.to_flat().len(), 8);
//! ```
//!
//! ## Snapshots
//!
//! ```rust
//! use remit_calibration::prelude::*;
//! use std::time::Duration;
//!
//! let cache = CalibrationCache::new(Duration::from_secs(600));
//! let snapshot = cache
//!     .get_or_fetch("lab", || CalibrationSet::uniform("lab", 3, 0.01, 0.01))
//!     .unwrap();
//! assert_eq!(snapshot.num_channels(), 3);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Assignment matrices (Gantree: L2_Calibration → AssignmentMatrix)
pub mod assignment;

/// Tensored calibration array (Gantree: L2_Calibration → TensorCals)
pub mod tensor;

/// Calibration store (Gantree: L2_Calibration → CalibrationSet)
pub mod calibration_set;

/// Estimators (Gantree: L2_Calibration → Estimators)
pub mod estimator;

/// Snapshot cache (Gantree: L2_Calibration → CalibrationCache)
pub mod calibration_cache;

/// Readout sampler (Gantree: L2_Calibration → ReadoutSampler)
pub mod sampler;

// ============================================================================
// Re-exports
// ============================================================================

pub use assignment::AssignmentMatrix;
pub use calibration_cache::CalibrationCache;
pub use calibration_set::{CalibrationMethod, CalibrationSet};
pub use estimator::{balanced_cal_strings, estimate_balanced, estimate_independent, estimate_marginal};
pub use sampler::ReadoutSampler;
pub use tensor::TensorCals;

// ============================================================================
// Prelude
// ============================================================================

/// Convenient imports for common use cases
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use remit_calibration::prelude::*;
    //! ```

    pub use crate::assignment::AssignmentMatrix;
    pub use crate::calibration_cache::CalibrationCache;
    pub use crate::calibration_set::{CalibrationMethod, CalibrationSet};
    pub use crate::estimator::{
        balanced_cal_strings, estimate_balanced, estimate_independent, estimate_marginal,
    };
    pub use crate::sampler::ReadoutSampler;
    pub use crate::tensor::TensorCals;
}

// ============================================================================
// Integration Tests
// ============================================================================
