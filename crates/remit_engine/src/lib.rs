//! # REMIT Engine
//!
//! Readout-error correction over a calibration snapshot: configuration,
//! direct/iterative path selection, batch handling, and diagnostics.
//!
//! ## Gantree Architecture
//!
//! ```text
//! remit_engine // L4: Engine (완료)
//!     MitigationConfig // 보정 설정 (완료)
//!         distance, method, tol, max_iter, iter_threshold
//!         return_mitigation_overhead, column_scaling
//!     MemoryProbe // 메모리 조회 (완료)
//!         select_path() - 크기/메모리 기반 경로 선택
//!     Boundary // 입력 정규화 (완료)
//!         CountsInput, ChannelSpec → Request
//!         CorrectionOutput
//!     Mitigator // 보정기 (완료)
//!         apply_correction() - 단일 분포
//!         apply() - 단일 또는 일괄
//!         missing_channels(), reduced_cal_matrix(), check_sdd()
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use remit_engine::prelude::*;
//! use remit_calibration::CalibrationSet;
//! use remit_core::Counts;
//!
//! let calibration = CalibrationSet::uniform("lab", 2, 0.02, 0.05).unwrap();
//! let mitigator = Mitigator::new(calibration);
//!
//! let counts: Counts = [("00", 480), ("11", 470), ("01", 50)]
//!     .iter()
//!     .map(|(k, v)| (k.to_string(), *v))
//!     .collect();
//! let correction = mitigator.apply_correction(&counts, &[0, 1]).unwrap();
//! let probs = correction.quasi.nearest_probability_distribution();
//! assert!(probs.iter().all(|(_, p)| *p >= 0.0));
//! ```
//!
//! ## Acquire and Retry
//!
//! ```rust
//! use remit_engine::prelude::*;
//! use remit_calibration::{CalibrationCache, CalibrationSet};
//! use std::time::Duration;
//!
//! let cache = CalibrationCache::new(Duration::from_secs(600));
//! let spec = ChannelSpec::List(vec![0, 1]);
//!
//! let empty = Mitigator::new(CalibrationSet::new("lab", 2));
//! assert_eq!(empty.missing_channels(&spec), vec![0, 1]);
//!
//! let snapshot = cache
//!     .get_or_fetch("lab", || CalibrationSet::uniform("lab", 2, 0.01, 0.03))
//!     .unwrap();
//! assert!(Mitigator::new(snapshot).missing_channels(&spec).is_empty());
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Configuration (Gantree: L4_Engine → MitigationConfig)
pub mod config;

/// Memory probe and path selection (Gantree: L4_Engine → MemoryProbe)
pub mod memory;

/// Boundary tagged unions (Gantree: L4_Engine → Boundary)
pub mod input;

/// Orchestration (Gantree: L4_Engine → Mitigator)
pub mod mitigator;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ColumnScaling, MitigationConfig, SolveMethod, SolvePath};
pub use input::{normalize, ChannelSpec, Correction, CorrectionOutput, CountsInput, Job, Request};
pub use memory::{select_path, FixedMemory, MemoryProbe, SystemMemory};
pub use mitigator::{Mitigator, ReducedCalMatrix, SolveDetails};

// ============================================================================
// Prelude
// ============================================================================

/// Convenient imports for common use cases
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use remit_engine::prelude::*;
    //! ```

    pub use crate::config::{ColumnScaling, MitigationConfig, SolveMethod, SolvePath};
    pub use crate::input::{ChannelSpec, Correction, CorrectionOutput, CountsInput};
    pub use crate::memory::{FixedMemory, MemoryProbe, SystemMemory};
    pub use crate::mitigator::{Mitigator, SolveDetails};
}

// ============================================================================
// Integration Tests
// ============================================================================
