//! Seeded readout-noise sampler
//!
//! Gantree: L2_Calibration → ReadoutSampler
//!
//! Applies independent per-channel assignment noise to prepared states and
//! returns counts. Used to synthesize observed data with a known ideal
//! distribution behind it.

use crate::assignment::AssignmentMatrix;
use crate::calibration_set::CalibrationSet;
use crate::tensor::TensorCals;
use log::debug;
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use remit_core::{Bitstring, ChannelId, Counts, RemitError, RemitResult};

/// Largest channel count for which the exact noisy distribution is formed
pub const MAX_EXACT_CHANNELS: usize = 16;

/// Readout sampler over a fixed set of measured channels
/// Gantree: ReadoutSampler // 판독 샘플러
#[derive(Debug, Clone)]
pub struct ReadoutSampler {
    /// matrices[k] applies to bit position k
    matrices: Vec<AssignmentMatrix>,
    rng: ChaCha8Rng,
}

impl ReadoutSampler {
    /// Create a sampler, seeded for reproducibility when `seed` is given
    pub fn new(matrices: Vec<AssignmentMatrix>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { matrices, rng }
    }

    /// Sampler for `channels` of a calibration set, `channels[k]` at bit k
    pub fn from_calibration(
        set: &CalibrationSet,
        channels: &[ChannelId],
        seed: Option<u64>,
    ) -> RemitResult<Self> {
        let missing = set.missing_channels(channels);
        if !missing.is_empty() {
            return Err(RemitError::MissingCalibration { channels: missing });
        }
        let matrices = channels
            .iter()
            .filter_map(|&q| set.get(q).copied())
            .collect();
        Ok(Self::new(matrices, seed))
    }

    /// Number of measured channels
    pub fn num_channels(&self) -> usize {
        self.matrices.len()
    }

    /// Noisy readout of one prepared state, repeated `shots` times
    /// Gantree: sample_prepared(&Bitstring,shots) -> Result<Counts> // 준비 상태 샘플
    pub fn sample_prepared(&mut self, prepared: &Bitstring, shots: u64) -> RemitResult<Counts> {
        self.check_width(prepared.len())?;
        let mut counts = Counts::new();
        for _ in 0..shots {
            let observed = self.read(prepared);
            *counts.entry(observed.to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Draw prepared states from `ideal`, then read them out noisily
    /// Gantree: sample_distribution(ideal,shots) -> Result<Counts> // 분포 샘플
    pub fn sample_distribution(&mut self, ideal: &[(String, f64)], shots: u64) -> RemitResult<Counts> {
        let states = ideal
            .iter()
            .map(|(key, _)| {
                let bits = Bitstring::parse(key)?;
                self.check_width(bits.len())?;
                Ok(bits)
            })
            .collect::<RemitResult<Vec<_>>>()?;
        let weights = WeightedIndex::new(ideal.iter().map(|(_, p)| *p))
            .map_err(|e| RemitError::InvalidConfig(format!("invalid ideal distribution: {}", e)))?;

        let mut counts = Counts::new();
        for _ in 0..shots {
            let prepared = &states[weights.sample(&mut self.rng)];
            let observed = self.read(prepared);
            *counts.entry(observed.to_string()).or_insert(0) += 1;
        }
        debug!(
            "Sampled {} shots over {} channels into {} outcomes",
            shots,
            self.num_channels(),
            counts.len()
        );
        Ok(counts)
    }

    /// Exact noisy distribution M·p over all 2^n outcomes (n ≤ 16)
    /// Gantree: exact_noisy_distribution(ideal) -> Result<Vec<(String,f64)>> // 정확 분포
    pub fn exact_noisy_distribution(&self, ideal: &[(String, f64)]) -> RemitResult<Vec<(String, f64)>> {
        let n = self.num_channels();
        if n > MAX_EXACT_CHANNELS {
            return Err(RemitError::InvalidConfig(format!(
                "exact distribution limited to {} channels, got {}",
                MAX_EXACT_CHANNELS, n
            )));
        }
        let cals = TensorCals::from_matrices(&self.matrices);
        let prepared = ideal
            .iter()
            .map(|(key, p)| {
                let bits = Bitstring::parse(key)?;
                self.check_width(bits.len())?;
                Ok((bits, *p))
            })
            .collect::<RemitResult<Vec<_>>>()?;

        Ok((0..1u64 << n)
            .map(|value| {
                let observed = Bitstring::from_u64(value, n);
                let prob: f64 = prepared
                    .iter()
                    .map(|(col, p)| cals.element(&observed, col) * p)
                    .sum();
                (observed.to_string(), prob)
            })
            .collect())
    }

    fn read(&mut self, prepared: &Bitstring) -> Bitstring {
        let mut observed = prepared.clone();
        for (k, matrix) in self.matrices.iter().enumerate() {
            let bit = prepared.bit(k);
            // P(flip | prepared = bit)
            let flip = matrix.get(1 - bit, bit);
            if flip > 0.0 && self.rng.gen::<f64>() < flip {
                observed.flip(k);
            }
        }
        observed
    }

    fn check_width(&self, len: usize) -> RemitResult<()> {
        if len != self.num_channels() {
            return Err(RemitError::LengthMismatch {
                bitstring_len: len,
                num_channels: self.num_channels(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
