//! Assignment-matrix estimators
//!
//! Gantree: L2_Calibration → Estimators
//!
//! Turn calibration-experiment counts into per-channel assignment matrices.
//! Acquisition (running the experiments) happens elsewhere; every estimator
//! receives counts over all measured channels, with bit position k holding
//! the outcome of `channels[k]`.

use crate::assignment::AssignmentMatrix;
use remit_core::{total_shots, Bitstring, Counts, RemitError, RemitResult};

/// The 2n preparation patterns of a balanced calibration
///
/// Pattern pairs are complementary, so every channel is prepared in |0⟩
/// exactly n times and in |1⟩ exactly n times.
/// Gantree: balanced_cal_strings(n) -> Vec<String> // 균형 패턴
pub fn balanced_cal_strings(num_channels: usize) -> Vec<String> {
    let mut strings = Vec::with_capacity(2 * num_channels);
    for rep in 1..=num_channels {
        let blocks = num_channels.div_ceil(rep);
        let mut even = String::with_capacity(blocks * rep);
        let mut odd = String::with_capacity(blocks * rep);
        for block in 0..blocks {
            let (a, b) = if block % 2 == 0 { ('0', '1') } else { ('1', '0') };
            even.extend(std::iter::repeat(a).take(rep));
            odd.extend(std::iter::repeat(b).take(rep));
        }
        even.truncate(num_channels);
        odd.truncate(num_channels);
        strings.push(even);
        strings.push(odd);
    }
    strings
}

/// Estimate from one |0⟩ and one |1⟩ experiment per channel
///
/// `experiments[k]` holds the counts for preparing bit position k in
/// |0⟩ and in |1⟩ (all other channels in |0⟩).
/// Gantree: estimate_independent(&[(Counts,Counts)]) -> Result<Vec<A>> // 독립 추정
pub fn estimate_independent(experiments: &[(Counts, Counts)]) -> RemitResult<Vec<AssignmentMatrix>> {
    let num_channels = experiments.len();
    experiments
        .iter()
        .enumerate()
        .map(|(k, (prep0, prep1))| {
            let p0 = matching_fraction(prep0, num_channels, k, false)?;
            let p1 = matching_fraction(prep1, num_channels, k, true)?;
            AssignmentMatrix::from_error_rates(1.0 - p0, 1.0 - p1)
        })
        .collect()
}

/// Estimate from the all-zeros and all-ones experiments
/// Gantree: estimate_marginal(&Counts,&Counts,n) -> Result<Vec<A>> // 주변 추정
pub fn estimate_marginal(
    all_zeros: &Counts,
    all_ones: &Counts,
    num_channels: usize,
) -> RemitResult<Vec<AssignmentMatrix>> {
    (0..num_channels)
        .map(|k| {
            let p0 = matching_fraction(all_zeros, num_channels, k, false)?;
            let p1 = matching_fraction(all_ones, num_channels, k, true)?;
            AssignmentMatrix::from_error_rates(1.0 - p0, 1.0 - p1)
        })
        .collect()
}

/// Estimate from the balanced patterns
///
/// `experiments[i]` are the counts for `balanced_cal_strings(n)[i]`. Each
/// correct readout of a channel contributes `1 / (shots × n)` to the
/// diagonal entry of the prepared state, which averages over the n
/// experiments preparing that state.
/// Gantree: estimate_balanced(&[Counts],n) -> Result<Vec<A>> // 균형 추정
pub fn estimate_balanced(
    experiments: &[Counts],
    num_channels: usize,
) -> RemitResult<Vec<AssignmentMatrix>> {
    let patterns = balanced_cal_strings(num_channels);
    if experiments.len() != patterns.len() {
        return Err(RemitError::InvalidCalibrationData(format!(
            "balanced calibration needs {} experiments, got {}",
            patterns.len(),
            experiments.len()
        )));
    }

    // diag[k] = [P(0|0), P(1|1)]
    let mut diag = vec![[0.0f64; 2]; num_channels];
    for (pattern, counts) in patterns.iter().zip(experiments) {
        let target = Bitstring::parse(pattern)?;
        let denom = experiment_shots(counts)? as f64 * num_channels as f64;
        let mut good = vec![0u64; num_channels];
        for (key, &count) in counts {
            let observed = parse_key(key, num_channels)?;
            for (k, g) in good.iter_mut().enumerate() {
                if observed.bit(k) == target.bit(k) {
                    *g += count;
                }
            }
        }
        for (k, g) in good.into_iter().enumerate() {
            diag[k][target.bit(k)] += g as f64 / denom;
        }
    }

    diag.into_iter()
        .map(|[p00, p11]| AssignmentMatrix::from_error_rates(1.0 - p00, 1.0 - p11))
        .collect()
}

// ============================================================================
// Helpers
// ============================================================================

fn experiment_shots(counts: &Counts) -> RemitResult<u64> {
    match total_shots(counts)? {
        0 => Err(RemitError::EmptyCounts),
        shots => Ok(shots),
    }
}

fn parse_key(key: &str, num_channels: usize) -> RemitResult<Bitstring> {
    let bits = Bitstring::parse(key)?;
    if bits.len() != num_channels {
        return Err(RemitError::InconsistentKeyLength {
            key: key.to_string(),
            len: bits.len(),
            expected: num_channels,
        });
    }
    Ok(bits)
}

/// Fraction of shots where bit position `k` reads `expected`
fn matching_fraction(
    counts: &Counts,
    num_channels: usize,
    k: usize,
    expected: bool,
) -> RemitResult<f64> {
    let shots = experiment_shots(counts)?;
    let mut hits = 0u64;
    for (key, &count) in counts {
        if parse_key(key, num_channels)?.get(k) == Some(expected) {
            hits += count;
        }
    }
    Ok(hits as f64 / shots as f64)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn counts(pairs: &[(&str, u64)]) -> Counts {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_balanced_strings() {
        let s = balanced_cal_strings(3);
        assert_eq!(s, vec!["010", "101", "001", "110", "000", "111"]);
    }

    #[test]
    fn test_balanced_strings_are_balanced() {
        let n = 7;
        let s = balanced_cal_strings(n);
        assert_eq!(s.len(), 2 * n);
        for pos in 0..n {
            let ones = s.iter().filter(|p| p.as_bytes()[pos] == b'1').count();
            assert_eq!(ones, n);
        }
    }

    #[test]
    fn test_marginal() {
        let zeros = counts(&[("00", 90), ("01", 10)]);
        let ones = counts(&[("11", 80), ("01", 20)]);
        let mats = estimate_marginal(&zeros, &ones, 2).unwrap();
        // bit 0 never flips on "01"/"11" outcomes of the ones experiment
        assert_abs_diff_eq!(mats[0].get(0, 0), 0.9, epsilon = 1e-12);
        assert_abs_diff_eq!(mats[0].get(1, 1), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mats[1].get(0, 0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mats[1].get(1, 1), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_independent() {
        let experiments = vec![
            (counts(&[("0", 95), ("1", 5)]), counts(&[("1", 90), ("0", 10)])),
        ];
        let mats = estimate_independent(&experiments).unwrap();
        assert_abs_diff_eq!(mats[0].get(1, 0), 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(mats[0].get(0, 1), 0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_balanced_ideal_readout() {
        let n = 3;
        let experiments: Vec<Counts> = balanced_cal_strings(n)
            .into_iter()
            .map(|p| counts(&[(p.as_str(), 1000)]))
            .collect();
        let mats = estimate_balanced(&experiments, n).unwrap();
        for m in mats {
            assert_abs_diff_eq!(m.get(0, 0), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(m.get(1, 1), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_balanced_wrong_experiment_count() {
        let experiments = vec![counts(&[("00", 10)])];
        assert!(estimate_balanced(&experiments, 2).is_err());
    }

    #[test]
    fn test_rejects_inconsistent_keys() {
        let zeros = counts(&[("00", 90), ("1", 10)]);
        let ones = counts(&[("11", 100)]);
        assert!(matches!(
            estimate_marginal(&zeros, &ones, 2),
            Err(RemitError::InconsistentKeyLength { .. })
        ));
    }
}
