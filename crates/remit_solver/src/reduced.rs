//! Observed states and the explicit reduced matrix
//!
//! Gantree: L3_Reduced → ObservedStates, ReducedSystem
//!
//! The distinct bitstrings of a counts mapping, in order of first
//! appearance, label the rows and columns of the reduced system. The same
//! order maps counts to the right-hand side and the solution back to keys.

use log::info;
use nalgebra::{DMatrix, DVector};
use remit_calibration::TensorCals;
use remit_core::{hamming_ball, hamming_terms, Bitstring, Counts, QuasiDistribution, RemitError, RemitResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// Column treatment of the truncated operator
/// Gantree: ColumnScaling // 열 정규화
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnScaling {
    /// Entries are the tensor products themselves
    Raw,
    /// Each column is divided by its truncated 1-norm, so every truncated
    /// solve sums to 1
    #[default]
    Renormalized,
}

// ============================================================================
// ObservedStates
// ============================================================================

/// Distinct observed bitstrings in canonical order
/// Gantree: ObservedStates // 관측 상태
#[derive(Debug, Clone)]
pub struct ObservedStates {
    keys: Vec<String>,
    states: Vec<Bitstring>,
    counts: Vec<u64>,
    index: HashMap<Bitstring, usize>,
    num_channels: usize,
    shots: u64,
}

impl ObservedStates {
    /// Validate counts over `num_channels` channels and fix the state order
    /// Gantree: from_counts(&Counts,n) -> Result<Self> // 검증+순서 고정
    pub fn from_counts(counts: &Counts, num_channels: usize) -> RemitResult<Self> {
        let first_len = counts.keys().next().map(String::len).ok_or(RemitError::EmptyCounts)?;
        if first_len != num_channels {
            return Err(RemitError::LengthMismatch {
                bitstring_len: first_len,
                num_channels,
            });
        }

        let mut out = Self {
            keys: Vec::with_capacity(counts.len()),
            states: Vec::with_capacity(counts.len()),
            counts: Vec::with_capacity(counts.len()),
            index: HashMap::with_capacity(counts.len()),
            num_channels,
            shots: 0,
        };
        for (key, &count) in counts {
            if key.len() != num_channels {
                return Err(RemitError::InconsistentKeyLength {
                    key: key.clone(),
                    len: key.len(),
                    expected: num_channels,
                });
            }
            let state = Bitstring::parse(key)?;
            out.index.insert(state.clone(), out.states.len());
            out.keys.push(key.clone());
            out.states.push(state);
            out.counts.push(count);
            out.shots = out.shots.checked_add(count).ok_or(RemitError::ShotOverflow)?;
        }

        if out.shots == 0 {
            return Err(RemitError::EmptyCounts);
        }
        Ok(out)
    }

    /// Number of distinct states m
    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false for a validated set
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Bitstring length n
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Total shots
    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// Keys in canonical order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Parsed states in canonical order
    pub fn states(&self) -> &[Bitstring] {
        &self.states
    }

    /// Raw counts in canonical order
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Position of a state in the canonical order
    #[inline]
    pub fn index_of(&self, state: &Bitstring) -> Option<usize> {
        self.index.get(state).copied()
    }

    /// Empirical probability vector count / shots
    /// Gantree: probabilities() -> DVector // 우변 벡터
    pub fn probabilities(&self) -> DVector<f64> {
        let shots = self.shots as f64;
        DVector::from_iterator(self.len(), self.counts.iter().map(|&c| c as f64 / shots))
    }

    /// Label a solution vector with the canonical keys
    /// Gantree: to_quasi(&[f64]) -> QuasiDistribution // 결과 매핑
    pub fn to_quasi(&self, values: &[f64]) -> QuasiDistribution {
        self.keys
            .iter()
            .cloned()
            .zip(values.iter().copied())
            .collect::<QuasiDistribution>()
            .with_shots(self.shots)
    }

    /// Observed states within `distance` of state `idx`, itself included
    ///
    /// Enumerates the Hamming ball when it is smaller than the observed set,
    /// otherwise scans the observed set with a distance check.
    pub(crate) fn for_each_neighbour<F>(&self, idx: usize, distance: usize, mut f: F)
    where
        F: FnMut(usize),
    {
        let center = &self.states[idx];
        if distance >= self.num_channels {
            (0..self.len()).for_each(f);
        } else if hamming_terms(self.num_channels, distance, self.len()) < self.len() {
            for neighbour in hamming_ball(center, distance) {
                if let Some(other) = self.index_of(&neighbour) {
                    f(other);
                }
            }
        } else {
            for (other, state) in self.states.iter().enumerate() {
                if center.within_distance(state, distance) {
                    f(other);
                }
            }
        }
    }

    pub(crate) fn check_cals(&self, cals: &TensorCals) -> RemitResult<()> {
        if cals.num_channels() != self.num_channels {
            return Err(RemitError::LengthMismatch {
                bitstring_len: self.num_channels,
                num_channels: cals.num_channels(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// ReducedSystem
// ============================================================================

/// Explicit reduced matrix over the observed states
/// Gantree: ReducedSystem // 축소 시스템
#[derive(Debug, Clone)]
pub struct ReducedSystem {
    /// m×m matrix, rows and columns in canonical order
    pub matrix: DMatrix<f64>,
    /// Raw truncated column 1-norms
    pub col_norms: Vec<f64>,
    /// Effective truncation distance
    pub distance: usize,
}

impl ReducedSystem {
    /// Build the dense matrix for the given distance (clamped to n)
    /// Gantree: build(observed,cals,d,scaling) -> Result<Self> // 밀집 행렬 생성
    pub fn build(
        observed: &ObservedStates,
        cals: &TensorCals,
        distance: usize,
        scaling: ColumnScaling,
    ) -> RemitResult<Self> {
        observed.check_cals(cals)?;
        let distance = distance.min(observed.num_channels());
        let m = observed.len();
        let start = Instant::now();

        let mut matrix = DMatrix::<f64>::zeros(m, m);
        let states = observed.states();
        for col in 0..m {
            observed.for_each_neighbour(col, distance, |row| {
                matrix[(row, col)] = cals.element(&states[row], &states[col]);
            });
        }

        let col_norms: Vec<f64> = matrix.column_iter().map(|c| c.lp_norm(1)).collect();
        if scaling == ColumnScaling::Renormalized {
            for (mut column, &norm) in matrix.column_iter_mut().zip(&col_norms) {
                if norm > 0.0 {
                    column /= norm;
                }
            }
        }

        info!("Reduced matrix build time: {:?} (m = {}, d = {})", start.elapsed(), m, distance);
        Ok(Self {
            matrix,
            col_norms,
            distance,
        })
    }

    /// Dimension m
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }
}

// ============================================================================
// Tests
// ============================================================================
