//! Error types for REMIT
//!
//! Gantree: L0_Foundation → Errors
//!
//! Every failure in the correction core is returned synchronously at the
//! point of detection. Nothing is downgraded to a warning.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for REMIT
/// Gantree: RemitError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemitError {
    // ========================================================================
    // Shape Errors
    // ========================================================================
    /// Bitstring length does not match the number of channels
    /// Gantree: LengthMismatch{{len,channels}} // 길이 불일치
    #[error("Bitstring length ({bitstring_len}) does not match number of channels ({num_channels})")]
    LengthMismatch {
        bitstring_len: usize,
        num_channels: usize,
    },

    /// Keys of one counts mapping have different lengths
    #[error("Bitstring '{key}' has length {len}, expected {expected}")]
    InconsistentKeyLength {
        key: String,
        len: usize,
        expected: usize,
    },

    /// Invalid bitstring format
    #[error("Invalid bitstring '{0}': must contain only '0' and '1'")]
    InvalidBitstring(String),

    /// Number of count mappings and channel lists differ
    #[error("Length of counts ({counts}) does not match length of channel lists ({channels})")]
    BatchLengthMismatch { counts: usize, channels: usize },

    // ========================================================================
    // Input Errors
    // ========================================================================
    /// No bitstrings, or all counts are zero
    /// Gantree: EmptyCounts // 빈 입력
    #[error("Input counts are empty")]
    EmptyCounts,

    /// Total shots do not fit in 64 bits
    #[error("Total shot count overflows u64")]
    ShotOverflow,

    // ========================================================================
    // Calibration Errors
    // ========================================================================
    /// One or more requested channels have no calibration
    /// Gantree: MissingCalibration{{channels}} // 캘리브레이션 없음
    #[error("Missing calibration for channels: {channels:?}")]
    MissingCalibration { channels: Vec<usize> },

    /// Channel index outside the calibration store
    #[error("Channel {channel} out of range: store holds {num_channels} channels")]
    ChannelOutOfRange { channel: usize, num_channels: usize },

    /// Assignment matrix violates the column-stochastic invariant
    #[error("Invalid assignment matrix: {0}")]
    InvalidAssignmentMatrix(String),

    /// Malformed calibration data (flat arrays, calibration counts)
    #[error("Invalid calibration data: {0}")]
    InvalidCalibrationData(String),

    /// Correction requested over channels with unusable calibration
    #[error("Using faulty channels: {0:?}")]
    FaultyChannels(Vec<usize>),

    // ========================================================================
    // Solver Errors
    // ========================================================================
    /// Iterative solver exhausted its iteration budget
    /// Gantree: ConvergenceFailed{{iters,residual}} // 수렴 실패
    #[error("GMRES did not converge after {iterations} iterations (residual {residual:.3e})")]
    ConvergenceFailed { iterations: usize, residual: f64 },

    /// Dense factorization hit an exactly singular pivot
    #[error("Reduced matrix is singular")]
    SingularMatrix,

    /// Unrecognized solver mode
    /// Gantree: InvalidMethod(String) // 잘못된 방법
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for REMIT operations
/// Gantree: RemitResult<T> // type alias
pub type RemitResult<T> = Result<T, RemitError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for RemitError {
    fn from(err: serde_json::Error) -> Self {
        RemitError::JsonError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl RemitError {
    /// Check if the caller may fix the cause and retry.
    ///
    /// Only missing calibration qualifies: an outer layer can acquire the
    /// channels and call again. The core itself never retries.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RemitError::MissingCalibration { .. })
    }

    /// Check if error is a shape error
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            RemitError::LengthMismatch { .. }
                | RemitError::InconsistentKeyLength { .. }
                | RemitError::InvalidBitstring(_)
                | RemitError::BatchLengthMismatch { .. }
        )
    }

    /// Check if error is a calibration error
    pub fn is_calibration_error(&self) -> bool {
        matches!(
            self,
            RemitError::MissingCalibration { .. }
                | RemitError::ChannelOutOfRange { .. }
                | RemitError::InvalidAssignmentMatrix(_)
                | RemitError::InvalidCalibrationData(_)
                | RemitError::FaultyChannels(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
