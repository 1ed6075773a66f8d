//! Quasi-probability and probability distributions
//!
//! Gantree: L1_Distribution → QuasiDistribution, ProbDistribution
//!
//! A correction produces a [`QuasiDistribution`]: signed values over the
//! observed bitstrings that sum to one. [`project_to_simplex`] maps any such
//! vector to the closest probability vector in the Euclidean norm.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Simplex Projection
// ============================================================================

/// Euclidean projection onto the probability simplex
///
/// Exact closed form: sort descending, then scan from the smallest entry,
/// zeroing entries while `v_i + a/i < 0` and spreading the accumulated mass
/// `a` uniformly over the survivors.
/// Gantree: project_to_simplex(v) -> Vec<f64> // 최근접 확률분포
pub fn project_to_simplex(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    let mut sorted: Vec<f64> = order.iter().map(|&i| values[i]).collect();

    let mut acc = 0.0;
    let mut i = n;
    while i > 0 {
        let v = sorted[i - 1];
        if v + acc / (i as f64) < 0.0 {
            acc += v;
            sorted[i - 1] = 0.0;
            i -= 1;
        } else {
            let shift = acc / (i as f64);
            for x in &mut sorted[..i] {
                *x += shift;
            }
            break;
        }
    }

    let mut out = vec![0.0; n];
    for (pos, &idx) in order.iter().enumerate() {
        out[idx] = sorted[pos];
    }
    out
}

/// Euclidean distance between two equal-length vectors
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

// ============================================================================
// QuasiDistribution
// ============================================================================

/// Signed distribution over bitstrings produced by a correction
/// Gantree: QuasiDistribution // 준확률 분포
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuasiDistribution {
    /// Bitstring -> quasi-probability, in canonical solver order
    probs: IndexMap<String, f64>,

    /// Shots of the raw counts
    /// Gantree: shots: Option<u64> // 샷 수
    shots: Option<u64>,

    /// Mitigation overhead γ²
    /// Gantree: mitigation_overhead: Option<f64> // 오버헤드
    mitigation_overhead: Option<f64>,
}

impl QuasiDistribution {
    /// Create from bitstring -> value pairs
    pub fn new(probs: IndexMap<String, f64>) -> Self {
        Self {
            probs,
            shots: None,
            mitigation_overhead: None,
        }
    }

    /// Annotate with the shot count
    pub fn with_shots(mut self, shots: u64) -> Self {
        self.shots = Some(shots);
        self
    }

    /// Annotate with the mitigation overhead (γ²)
    pub fn with_mitigation_overhead(mut self, overhead: f64) -> Self {
        self.mitigation_overhead = Some(overhead);
        self
    }

    /// Shots of the raw counts, if annotated
    pub fn shots(&self) -> Option<u64> {
        self.shots
    }

    /// Mitigation overhead, if computed
    pub fn mitigation_overhead(&self) -> Option<f64> {
        self.mitigation_overhead
    }

    /// Value for a bitstring
    pub fn get(&self, key: &str) -> Option<f64> {
        self.probs.get(key).copied()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Iterate over (bitstring, value) in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.probs.iter()
    }

    /// Bitstrings in canonical order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.probs.keys()
    }

    /// Sum of all quasi-probabilities
    pub fn sum(&self) -> f64 {
        self.probs.values().sum()
    }

    /// Smallest entry (most negative)
    pub fn min_value(&self) -> Option<f64> {
        self.probs.values().copied().reduce(f64::min)
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &IndexMap<String, f64> {
        &self.probs
    }

    /// Nearest probability distribution (Euclidean)
    /// Gantree: nearest_probability_distribution() -> ProbDistribution // 투영
    pub fn nearest_probability_distribution(&self) -> ProbDistribution {
        self.nearest_probability_distribution_with_distance().0
    }

    /// Nearest probability distribution and its Euclidean distance to `self`
    pub fn nearest_probability_distribution_with_distance(&self) -> (ProbDistribution, f64) {
        let values: Vec<f64> = self.probs.values().copied().collect();
        let projected = project_to_simplex(&values);
        let distance = euclidean_distance(&values, &projected);
        let probs = self.probs.keys().cloned().zip(projected).collect();
        (
            ProbDistribution {
                probs,
                shots: self.shots,
            },
            distance,
        )
    }
}

impl FromIterator<(String, f64)> for QuasiDistribution {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for QuasiDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuasiDistribution({} entries, sum={:.6}", self.len(), self.sum())?;
        if let Some(overhead) = self.mitigation_overhead {
            write!(f, ", overhead={:.4}", overhead)?;
        }
        write!(f, ")")
    }
}

// ============================================================================
// ProbDistribution
// ============================================================================

/// Valid probability distribution: non-negative entries summing to one
/// Gantree: ProbDistribution // 확률 분포
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbDistribution {
    probs: IndexMap<String, f64>,
    shots: Option<u64>,
}

impl ProbDistribution {
    /// Value for a bitstring
    pub fn get(&self, key: &str) -> Option<f64> {
        self.probs.get(key).copied()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Shots carried over from the quasi-distribution
    pub fn shots(&self) -> Option<u64> {
        self.shots
    }

    /// Iterate over (bitstring, probability)
    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.probs.iter()
    }

    /// Sum of all probabilities
    pub fn sum(&self) -> f64 {
        self.probs.values().sum()
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &IndexMap<String, f64> {
        &self.probs
    }
}

// ============================================================================
// QuasiCollection
// ============================================================================

/// Ordered collection of quasi-distributions from a batch correction
/// Gantree: QuasiCollection // 배치 결과
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuasiCollection {
    items: Vec<QuasiDistribution>,
}

impl QuasiCollection {
    /// Create from a list of distributions
    pub fn new(items: Vec<QuasiDistribution>) -> Self {
        Self { items }
    }

    /// Number of distributions
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distribution at index
    pub fn get(&self, index: usize) -> Option<&QuasiDistribution> {
        self.items.get(index)
    }

    /// Iterate over distributions
    pub fn iter(&self) -> impl Iterator<Item = &QuasiDistribution> {
        self.items.iter()
    }

    /// Shots of each distribution
    pub fn shots(&self) -> Vec<Option<u64>> {
        self.items.iter().map(|q| q.shots()).collect()
    }

    /// Mitigation overhead of each distribution
    pub fn mitigation_overheads(&self) -> Vec<Option<f64>> {
        self.items.iter().map(|q| q.mitigation_overhead()).collect()
    }

    /// Nearest probability distribution of each item
    pub fn nearest_probability_distributions(&self) -> Vec<ProbDistribution> {
        self.items
            .iter()
            .map(QuasiDistribution::nearest_probability_distribution)
            .collect()
    }
}

impl FromIterator<QuasiDistribution> for QuasiCollection {
    fn from_iter<I: IntoIterator<Item = QuasiDistribution>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for QuasiCollection {
    type Item = QuasiDistribution;
    type IntoIter = std::vec::IntoIter<QuasiDistribution>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
