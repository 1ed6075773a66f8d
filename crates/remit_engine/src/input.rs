//! Boundary inputs and outputs
//!
//! Gantree: L4_Engine → CountsInput, ChannelSpec, CorrectionOutput
//!
//! Callers hand in one distribution or a batch, and channel assignments as
//! a list, a bit-position mapping, or one of those per circuit. Everything
//! is normalized once into `(counts, channels)` jobs before solving.

use remit_core::{ChannelId, Counts, QuasiCollection, QuasiDistribution, RemitError, RemitResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::mitigator::SolveDetails;

/// Observed counts for one circuit or a batch
/// Gantree: CountsInput // 입력 분포
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CountsInput {
    /// One distribution
    Single(Counts),
    /// One distribution per circuit
    Batch(Vec<Counts>),
}

/// Physical channels behind each bit position
/// Gantree: ChannelSpec // 채널 지정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelSpec {
    /// `list[k]` is measured into bit position k, shared by every circuit
    List(Vec<ChannelId>),
    /// Bit position → channel, shared by every circuit
    Mapping(BTreeMap<usize, ChannelId>),
    /// One list per circuit
    PerCircuit(Vec<Vec<ChannelId>>),
    /// One mapping per circuit
    PerCircuitMappings(Vec<BTreeMap<usize, ChannelId>>),
}

impl ChannelSpec {
    /// Channels ordered by bit position for a single mapping
    /// Gantree: mapping_to_list(&BTreeMap) -> Result<Vec<ChannelId>> // 매핑 정규화
    pub fn mapping_to_list(mapping: &BTreeMap<usize, ChannelId>) -> RemitResult<Vec<ChannelId>> {
        // BTreeMap iterates in key order, so keys must be exactly 0..len
        for (expected, &pos) in mapping.keys().enumerate() {
            if pos != expected {
                return Err(RemitError::InvalidConfig(format!(
                    "bit positions must be contiguous from 0, missing position {}",
                    expected
                )));
            }
        }
        Ok(mapping.values().copied().collect())
    }

    /// Every channel referenced by any circuit, deduplicated and sorted
    pub fn all_channels(&self) -> Vec<ChannelId> {
        let mut all: Vec<ChannelId> = match self {
            Self::List(list) => list.clone(),
            Self::Mapping(map) => map.values().copied().collect(),
            Self::PerCircuit(lists) => lists.iter().flatten().copied().collect(),
            Self::PerCircuitMappings(maps) => maps.iter().flat_map(|m| m.values().copied()).collect(),
        };
        all.sort_unstable();
        all.dedup();
        all
    }

    fn per_circuit(&self, circuits: usize) -> RemitResult<Vec<Vec<ChannelId>>> {
        let lists = match self {
            Self::List(list) => return Ok(vec![list.clone(); circuits]),
            Self::Mapping(map) => return Ok(vec![Self::mapping_to_list(map)?; circuits]),
            Self::PerCircuit(lists) => lists.clone(),
            Self::PerCircuitMappings(maps) => maps
                .iter()
                .map(Self::mapping_to_list)
                .collect::<RemitResult<Vec<_>>>()?,
        };
        if lists.len() != circuits {
            return Err(RemitError::BatchLengthMismatch {
                counts: circuits,
                channels: lists.len(),
            });
        }
        Ok(lists)
    }
}

impl From<Vec<ChannelId>> for ChannelSpec {
    fn from(list: Vec<ChannelId>) -> Self {
        Self::List(list)
    }
}

impl From<BTreeMap<usize, ChannelId>> for ChannelSpec {
    fn from(mapping: BTreeMap<usize, ChannelId>) -> Self {
        Self::Mapping(mapping)
    }
}

impl From<Counts> for CountsInput {
    fn from(counts: Counts) -> Self {
        Self::Single(counts)
    }
}

impl From<Vec<Counts>> for CountsInput {
    fn from(batch: Vec<Counts>) -> Self {
        Self::Batch(batch)
    }
}

/// One normalized correction job
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Observed counts
    pub counts: Counts,
    /// Channel behind each bit position
    pub channels: Vec<ChannelId>,
}

/// Normalized request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Jobs in input order
    pub jobs: Vec<Job>,
    /// Whether the caller passed a batch
    pub is_batch: bool,
}

/// Pair counts with channels, checking batch lengths
/// Gantree: normalize(CountsInput,ChannelSpec) -> Result<Request> // 입력 정규화
pub fn normalize(counts: CountsInput, channels: ChannelSpec) -> RemitResult<Request> {
    let (batch, is_batch) = match counts {
        CountsInput::Single(c) => (vec![c], false),
        CountsInput::Batch(b) => (b, true),
    };
    let lists = channels.per_circuit(batch.len())?;
    let jobs = batch
        .into_iter()
        .zip(lists)
        .map(|(counts, channels)| Job { counts, channels })
        .collect();
    Ok(Request { jobs, is_batch })
}

/// Corrected distribution with its solve diagnostics
/// Gantree: Correction // 보정 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    /// Quasi-probabilities over the observed keys
    pub quasi: QuasiDistribution,
    /// How the system was solved
    pub details: SolveDetails,
}

/// Result shaped like the input
/// Gantree: CorrectionOutput // 출력
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CorrectionOutput {
    /// Result of a single distribution
    Single(Correction),
    /// Results of a batch, in input order
    Batch {
        /// Corrected distributions
        quasis: QuasiCollection,
        /// Per-item diagnostics
        details: Vec<SolveDetails>,
    },
}

impl CorrectionOutput {
    /// Number of corrected distributions
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch { quasis, .. } => quasis.len(),
        }
    }

    /// Check if a batch output is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The single result, if this is not a batch
    pub fn single(&self) -> Option<&Correction> {
        match self {
            Self::Single(c) => Some(c),
            Self::Batch { .. } => None,
        }
    }

    /// All distributions as a collection
    pub fn into_collection(self) -> QuasiCollection {
        match self {
            Self::Single(c) => QuasiCollection::new(vec![c.quasi]),
            Self::Batch { quasis, .. } => quasis,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(key: &str) -> Counts {
        [(key.to_string(), 10u64)].into_iter().collect()
    }

    #[test]
    fn test_single_with_list() {
        let req = normalize(counts("01").into(), vec![3usize, 1].into()).unwrap();
        assert!(!req.is_batch);
        assert_eq!(req.jobs.len(), 1);
        assert_eq!(req.jobs[0].channels, vec![3, 1]);
    }

    #[test]
    fn test_mapping_orders_by_bit_position() {
        let map: BTreeMap<usize, ChannelId> = [(1, 7), (0, 4), (2, 5)].into_iter().collect();
        assert_eq!(ChannelSpec::mapping_to_list(&map).unwrap(), vec![4, 7, 5]);

        let gap: BTreeMap<usize, ChannelId> = [(0, 1), (2, 3)].into_iter().collect();
        assert!(ChannelSpec::mapping_to_list(&gap).is_err());
    }

    #[test]
    fn test_batch_shares_list() {
        let req = normalize(
            CountsInput::Batch(vec![counts("0"), counts("1")]),
            ChannelSpec::List(vec![2]),
        )
        .unwrap();
        assert!(req.is_batch);
        assert!(req.jobs.iter().all(|j| j.channels == vec![2]));
    }

    #[test]
    fn test_batch_length_mismatch() {
        let err = normalize(
            CountsInput::Batch(vec![counts("0"), counts("1")]),
            ChannelSpec::PerCircuit(vec![vec![0], vec![1], vec![2]]),
        )
        .unwrap_err();
        assert_eq!(err, RemitError::BatchLengthMismatch { counts: 2, channels: 3 });

        let err = normalize(
            CountsInput::Single(counts("0")),
            ChannelSpec::PerCircuit(vec![vec![0], vec![1]]),
        )
        .unwrap_err();
        assert!(err.is_shape_error());
    }

    #[test]
    fn test_per_circuit_mappings() {
        let a: BTreeMap<usize, ChannelId> = [(0, 3)].into_iter().collect();
        let b: BTreeMap<usize, ChannelId> = [(0, 5)].into_iter().collect();
        let spec = ChannelSpec::PerCircuitMappings(vec![a, b]);
        assert_eq!(spec.all_channels(), vec![3, 5]);
        let req = normalize(CountsInput::Batch(vec![counts("0"), counts("1")]), spec).unwrap();
        assert_eq!(req.jobs[1].channels, vec![5]);
    }
}
