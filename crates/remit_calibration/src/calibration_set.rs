//! Per-channel calibration store
//!
//! Gantree: L2_Calibration → CalibrationSet
//!
//! Holds one assignment matrix (or nothing) per physical channel. A set is
//! filled during acquisition, then shared read-only as a snapshot for the
//! duration of every correction that uses it.

use crate::assignment::AssignmentMatrix;
use crate::tensor::TensorCals;
use remit_core::{ChannelId, RemitError, RemitResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime};

/// How the assignment matrices were estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CalibrationMethod {
    /// 2n complementary patterns covering every channel
    #[default]
    Balanced,
    /// One |0⟩/|1⟩ pair of experiments per channel
    Independent,
    /// All-zeros and all-ones experiments
    Marginal,
    /// Matrices supplied directly
    Manual,
}

impl FromStr for CalibrationMethod {
    type Err = RemitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "balanced" => Ok(Self::Balanced),
            "independent" => Ok(Self::Independent),
            "marginal" => Ok(Self::Marginal),
            "manual" => Ok(Self::Manual),
            _ => Err(RemitError::InvalidCalibrationData(format!(
                "unknown calibration method '{}'",
                s
            ))),
        }
    }
}

/// Calibration data for every channel of a measurement system
/// Gantree: CalibrationSet // 캘리브레이션 저장소
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationSet {
    /// System name
    /// Gantree: system_name: String // 시스템 이름
    pub system_name: String,

    /// Acquisition timestamp
    /// Gantree: timestamp: SystemTime // 취득 시간
    #[serde(with = "system_time_serde")]
    pub timestamp: SystemTime,

    /// Estimation method
    pub method: CalibrationMethod,

    /// Shots per calibration experiment, if known
    pub shots: Option<u64>,

    /// Assignment matrix per channel, `None` = uncalibrated
    /// Gantree: matrices: Vec<Option<AssignmentMatrix>> // 채널별 행렬
    matrices: Vec<Option<AssignmentMatrix>>,
}

impl CalibrationSet {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an uncalibrated store for `num_channels` channels
    pub fn new(system_name: &str, num_channels: usize) -> Self {
        Self {
            system_name: system_name.to_string(),
            timestamp: SystemTime::now(),
            method: CalibrationMethod::Manual,
            shots: None,
            matrices: vec![None; num_channels],
        }
    }

    /// Create from one matrix per channel
    /// Gantree: from_matrices(name,Vec<A>) -> Self // 행렬에서 생성
    pub fn from_matrices(system_name: &str, matrices: Vec<AssignmentMatrix>) -> Self {
        let mut set = Self::new(system_name, 0);
        set.matrices = matrices.into_iter().map(Some).collect();
        set
    }

    /// Same flip probabilities on every channel (for testing/simulation)
    pub fn uniform(
        system_name: &str,
        num_channels: usize,
        p1_given_0: f64,
        p0_given_1: f64,
    ) -> RemitResult<Self> {
        let matrix = AssignmentMatrix::from_error_rates(p1_given_0, p0_given_1)?;
        Ok(Self::from_matrices(system_name, vec![matrix; num_channels]))
    }

    /// Set calibration method tag
    pub fn with_method(mut self, method: CalibrationMethod) -> Self {
        self.method = method;
        self
    }

    /// Set shots per calibration experiment
    pub fn with_shots(mut self, shots: u64) -> Self {
        self.shots = Some(shots);
        self
    }

    // ========================================================================
    // Mutation (acquisition phase only)
    // ========================================================================

    /// Store the matrix of one channel
    pub fn set(&mut self, channel: ChannelId, matrix: AssignmentMatrix) -> RemitResult<()> {
        let num_channels = self.matrices.len();
        let slot = self
            .matrices
            .get_mut(channel)
            .ok_or(RemitError::ChannelOutOfRange {
                channel,
                num_channels,
            })?;
        *slot = Some(matrix);
        Ok(())
    }

    /// Store estimated matrices for a list of channels
    pub fn set_many(
        &mut self,
        channels: &[ChannelId],
        matrices: Vec<AssignmentMatrix>,
    ) -> RemitResult<()> {
        if channels.len() != matrices.len() {
            return Err(RemitError::InvalidCalibrationData(format!(
                "{} channels but {} matrices",
                channels.len(),
                matrices.len()
            )));
        }
        for (&channel, matrix) in channels.iter().zip(matrices) {
            self.set(channel, matrix)?;
        }
        self.timestamp = SystemTime::now();
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of channels in the store
    /// Gantree: num_channels(&self) -> usize // 채널 수
    pub fn num_channels(&self) -> usize {
        self.matrices.len()
    }

    /// Matrix of a channel, if calibrated
    pub fn get(&self, channel: ChannelId) -> Option<&AssignmentMatrix> {
        self.matrices.get(channel).and_then(Option::as_ref)
    }

    /// Check if a channel has calibration data
    pub fn is_calibrated(&self, channel: ChannelId) -> bool {
        self.get(channel).is_some()
    }

    /// Check if no channel has calibration data
    pub fn is_uncalibrated(&self) -> bool {
        self.matrices.iter().all(Option::is_none)
    }

    /// Copy of all per-channel matrices
    pub fn to_matrices(&self) -> Vec<Option<AssignmentMatrix>> {
        self.matrices.clone()
    }

    /// Requested channels without calibration, in request order, deduplicated
    /// Gantree: missing_channels(&[ChannelId]) -> Vec<ChannelId> // 누락 채널
    pub fn missing_channels(&self, channels: &[ChannelId]) -> Vec<ChannelId> {
        let mut missing = Vec::new();
        for &channel in channels {
            if !self.is_calibrated(channel) && !missing.contains(&channel) {
                missing.push(channel);
            }
        }
        missing
    }

    /// Channels whose calibration cannot distinguish 0 from 1
    /// Gantree: faulty_channels() -> Vec<ChannelId> // 불량 채널
    pub fn faulty_channels(&self) -> Vec<ChannelId> {
        self.matrices
            .iter()
            .enumerate()
            .filter_map(|(q, m)| m.filter(AssignmentMatrix::is_faulty).map(|_| q))
            .collect()
    }

    /// Readout fidelity per channel (all channels when `channels` is None)
    /// Gantree: readout_fidelity(channels) -> Vec<Option<f64>> // 판독 충실도
    pub fn readout_fidelity(&self, channels: Option<&[ChannelId]>) -> RemitResult<Vec<Option<f64>>> {
        if self.is_uncalibrated() {
            return Err(RemitError::MissingCalibration {
                channels: (0..self.num_channels()).collect(),
            });
        }
        let all: Vec<ChannelId> = (0..self.num_channels()).collect();
        let channels = channels.unwrap_or(&all);
        if let Some(&channel) = channels.iter().find(|&&q| q >= self.num_channels()) {
            return Err(RemitError::ChannelOutOfRange {
                channel,
                num_channels: self.num_channels(),
            });
        }
        Ok(channels
            .iter()
            .map(|&q| self.get(q).map(AssignmentMatrix::fidelity))
            .collect())
    }

    /// Tensored calibration for a measurement, `channels[k]` is bit position k
    /// Gantree: tensor_cals(&[ChannelId]) -> Result<TensorCals> // 텐서 형성
    pub fn tensor_cals(&self, channels: &[ChannelId]) -> RemitResult<TensorCals> {
        let missing = self.missing_channels(channels);
        if !missing.is_empty() {
            return Err(RemitError::MissingCalibration { channels: missing });
        }
        let matrices = channels
            .iter()
            .map(|&q| {
                self.get(q).copied().ok_or(RemitError::MissingCalibration {
                    channels: vec![q],
                })
            })
            .collect::<RemitResult<Vec<_>>>()?;
        Ok(TensorCals::from_matrices(&matrices))
    }

    /// Check if calibration is fresh (within TTL)
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        match self.timestamp.elapsed() {
            Ok(elapsed) => elapsed < ttl,
            Err(_) => false,
        }
    }

    /// Get age of calibration
    pub fn age(&self) -> Option<Duration> {
        self.timestamp.elapsed().ok()
    }
}

impl fmt::Display for CalibrationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let calibrated = self.matrices.iter().filter(|m| m.is_some()).count();
        write!(
            f,
            "CalibrationSet({}, {}/{} calibrated, {:?})",
            self.system_name,
            calibrated,
            self.num_channels(),
            self.method
        )
    }
}

// ============================================================================
// SystemTime Serde Helper
// ============================================================================

mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_secs(secs))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_new_is_uncalibrated() {
        let set = CalibrationSet::new("test", 5);
        assert_eq!(set.num_channels(), 5);
        assert!(set.is_uncalibrated());
        assert_eq!(set.missing_channels(&[0, 2, 2]), vec![0, 2]);
    }

    #[test]
    fn test_set_and_missing() {
        let mut set = CalibrationSet::new("test", 4);
        set.set(1, AssignmentMatrix::ideal()).unwrap();
        assert!(set.is_calibrated(1));
        assert_eq!(set.missing_channels(&[0, 1, 3]), vec![0, 3]);
        // Out-of-range channels are reported as missing
        assert_eq!(set.missing_channels(&[1, 9]), vec![9]);
    }

    #[test]
    fn test_set_out_of_range() {
        let mut set = CalibrationSet::new("test", 2);
        let err = set.set(5, AssignmentMatrix::ideal()).unwrap_err();
        assert_eq!(
            err,
            RemitError::ChannelOutOfRange {
                channel: 5,
                num_channels: 2
            }
        );
    }

    #[test]
    fn test_tensor_cals_order() {
        let a = AssignmentMatrix::from_error_rates(0.01, 0.02).unwrap();
        let b = AssignmentMatrix::from_error_rates(0.03, 0.04).unwrap();
        let set = CalibrationSet::from_matrices("test", vec![a, b]);

        // Bit position 0 measures channel 1
        let cals = set.tensor_cals(&[1, 0]).unwrap();
        let flat = cals.to_flat();
        assert_eq!(&flat[..4], &b.row_major());
        assert_eq!(&flat[4..], &a.row_major());
    }

    #[test]
    fn test_tensor_cals_missing() {
        let mut set = CalibrationSet::new("test", 3);
        set.set(0, AssignmentMatrix::ideal()).unwrap();
        let err = set.tensor_cals(&[0, 1, 2]).unwrap_err();
        assert_eq!(err, RemitError::MissingCalibration { channels: vec![1, 2] });
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_faulty_channels() {
        let good = AssignmentMatrix::from_error_rates(0.01, 0.02).unwrap();
        let bad = AssignmentMatrix::new([[0.45, 0.5], [0.55, 0.5]]).unwrap();
        let set = CalibrationSet::from_matrices("test", vec![good, bad, good]);
        assert_eq!(set.faulty_channels(), vec![1]);
    }

    #[test]
    fn test_readout_fidelity() {
        let mut set = CalibrationSet::new("test", 3);
        assert!(set.readout_fidelity(None).is_err());

        set.set(0, AssignmentMatrix::from_error_rates(0.02, 0.04).unwrap())
            .unwrap();
        let fids = set.readout_fidelity(None).unwrap();
        assert_abs_diff_eq!(fids[0].unwrap(), 0.97, epsilon = 1e-12);
        assert_eq!(fids[1], None);

        assert!(set.readout_fidelity(Some(&[7])).is_err());
    }

    #[test]
    fn test_set_many_length_mismatch() {
        let mut set = CalibrationSet::new("test", 3);
        assert!(set.set_many(&[0, 1], vec![AssignmentMatrix::ideal()]).is_err());
        set.set_many(&[0, 2], vec![AssignmentMatrix::ideal(); 2])
            .unwrap();
        assert_eq!(set.missing_channels(&[0, 1, 2]), vec![1]);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("Balanced".parse::<CalibrationMethod>().unwrap(), CalibrationMethod::Balanced);
        assert!("tomography".parse::<CalibrationMethod>().is_err());
    }

    #[test]
    fn test_serialization() {
        let set = CalibrationSet::uniform("dev", 3, 0.01, 0.02).unwrap().with_shots(1000);
        let json = serde_json::to_string(&set).unwrap();
        let restored: CalibrationSet = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.system_name, "dev");
        assert_eq!(restored.num_channels(), 3);
        assert_eq!(restored.shots, Some(1000));
        assert_eq!(restored.get(2), set.get(2));
    }

    #[test]
    fn test_freshness() {
        let set = CalibrationSet::new("test", 1);
        assert!(set.is_fresh(Duration::from_secs(60)));
    }
}
