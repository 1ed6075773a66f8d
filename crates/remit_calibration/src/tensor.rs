//! Tensored calibration array
//!
//! Gantree: L2_Calibration → TensorCals
//!
//! Per-bit-position assignment entries in the flat layout consumed by the
//! solvers: four row-major values per channel, bit position 0 first. The
//! implicit noise matrix is the tensor product of these 2×2 blocks; it is
//! never formed.

use crate::assignment::AssignmentMatrix;
use remit_core::calibration::ENTRIES_PER_CHANNEL;
use remit_core::{Bitstring, RemitError, RemitResult};
use serde::{Deserialize, Serialize};

/// Calibration entries ordered by bit position
/// Gantree: TensorCals // 텐서 캘리브레이션
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorCals {
    /// entries[k] = row-major A for bit position k
    entries: Vec<[f64; 4]>,
}

impl TensorCals {
    /// Build from matrices ordered by bit position
    pub fn from_matrices(matrices: &[AssignmentMatrix]) -> Self {
        Self {
            entries: matrices.iter().map(AssignmentMatrix::row_major).collect(),
        }
    }

    /// Build from a flat array, four values per channel
    /// Gantree: from_flat(&[f64]) -> Result<Self> // 평탄 배열
    pub fn from_flat(flat: &[f64]) -> RemitResult<Self> {
        if flat.len() % ENTRIES_PER_CHANNEL != 0 {
            return Err(RemitError::InvalidCalibrationData(format!(
                "flat calibration length {} is not a multiple of {}",
                flat.len(),
                ENTRIES_PER_CHANNEL
            )));
        }
        let entries = flat
            .chunks_exact(ENTRIES_PER_CHANNEL)
            .map(|c| AssignmentMatrix::from_row_major([c[0], c[1], c[2], c[3]]).map(|m| m.row_major()))
            .collect::<RemitResult<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Flat array, four values per channel
    pub fn to_flat(&self) -> Vec<f64> {
        self.entries.iter().flatten().copied().collect()
    }

    /// Number of channels (bit positions)
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.entries.len()
    }

    /// Tensor-product entry M[row, col] = Π_k A_k[row_k, col_k]
    /// Gantree: element(row,col) -> f64 // 텐서 원소
    #[inline]
    pub fn element(&self, row: &Bitstring, col: &Bitstring) -> f64 {
        debug_assert_eq!(row.len(), self.entries.len());
        self.entries
            .iter()
            .enumerate()
            .map(|(k, e)| e[2 * row.bit(k) + col.bit(k)])
            .product()
    }

    /// Diagonal entry M[s, s] = Π_k A_k[s_k, s_k]
    #[inline]
    pub fn diagonal_element(&self, state: &Bitstring) -> f64 {
        self.entries
            .iter()
            .enumerate()
            .map(|(k, e)| e[3 * state.bit(k)])
            .product()
    }
}

// ============================================================================
// Tests
// ============================================================================
