//! Correction orchestration
//!
//! Gantree: L4_Engine → Mitigator
//!
//! Holds an immutable calibration snapshot and runs the full
//! counts → reduced system → solve → quasi-distribution flow over it.
//! Missing calibration is reported, never fetched here; callers query
//! `missing_channels`, acquire, and retry with a fresh snapshot.

use crate::config::{MitigationConfig, SolvePath};
use crate::input::{normalize, ChannelSpec, Correction, CorrectionOutput, CountsInput};
use crate::memory::{select_path, MemoryProbe, SystemMemory};
use log::{info, warn};
use nalgebra::DMatrix;
use remit_calibration::{CalibrationSet, TensorCals};
use remit_core::{ChannelId, Counts, QuasiCollection, RemitError, RemitResult};
use remit_solver::{direct_solve, is_sdd, iterative_solve, IterativeOptions, ObservedStates, ReducedSystem};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Diagnostics of one correction
/// Gantree: SolveDetails // 풀이 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveDetails {
    /// Path that produced the result
    pub method: SolvePath,

    /// Wall time of the whole correction
    pub duration: Duration,

    /// Number of distinct observed bitstrings
    pub dimension: usize,

    /// Krylov iterations (iterative path only)
    pub iterations: Option<usize>,

    /// Raw truncated column 1-norms in canonical order
    pub col_norms: Vec<f64>,
}

/// Explicit reduced matrix with its canonical ordering
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedCalMatrix {
    /// Truncated m×m matrix
    pub matrix: DMatrix<f64>,
    /// Row/column keys in first-appearance order
    pub keys: Vec<String>,
    /// Counts in the same order
    pub counts: Vec<u64>,
    /// Raw column 1-norms
    pub col_norms: Vec<f64>,
}

/// Readout-error mitigator over one calibration snapshot
/// Gantree: Mitigator // 보정기
pub struct Mitigator {
    /// Calibration snapshot
    calibration: Arc<CalibrationSet>,

    /// Correction settings
    config: MitigationConfig,

    /// Available-memory source for `Auto`
    probe: Box<dyn MemoryProbe>,
}

impl Mitigator {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a mitigator with default settings
    pub fn new(calibration: impl Into<Arc<CalibrationSet>>) -> Self {
        Self {
            calibration: calibration.into(),
            config: MitigationConfig::default(),
            probe: Box::new(SystemMemory),
        }
    }

    /// Replace the settings
    pub fn with_config(mut self, config: MitigationConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the memory probe
    pub fn with_memory_probe(mut self, probe: impl MemoryProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Calibration snapshot
    pub fn calibration(&self) -> &Arc<CalibrationSet> {
        &self.calibration
    }

    /// Current settings
    pub fn config(&self) -> &MitigationConfig {
        &self.config
    }

    /// Channels referenced by `channels` that have no calibration
    /// Gantree: missing_channels(&ChannelSpec) -> Vec<ChannelId> // 누락 채널
    pub fn missing_channels(&self, channels: &ChannelSpec) -> Vec<ChannelId> {
        self.calibration.missing_channels(&channels.all_channels())
    }

    /// Readout fidelity of the snapshot
    pub fn readout_fidelity(&self, channels: Option<&[ChannelId]>) -> RemitResult<Vec<Option<f64>>> {
        self.calibration.readout_fidelity(channels)
    }

    // ========================================================================
    // Correction
    // ========================================================================

    /// Correct one distribution measured on `channels`
    /// Gantree: apply_correction(&Counts,&[ChannelId]) -> Result<Correction> // 단일 보정
    pub fn apply_correction(&self, counts: &Counts, channels: &[ChannelId]) -> RemitResult<Correction> {
        self.config.validate()?;
        let start = Instant::now();

        let observed = ObservedStates::from_counts(counts, channels.len())?;
        let cals = self.cals_for(channels)?;
        let distance = self.config.effective_distance(channels.len());
        let path = select_path(
            self.config.method,
            observed.len(),
            self.config.iter_threshold,
            self.probe.as_ref(),
        );

        let solution = match path {
            SolvePath::Direct => direct_solve(
                &observed,
                &cals,
                distance,
                self.config.column_scaling,
                self.config.return_mitigation_overhead,
            )?,
            SolvePath::Iterative => iterative_solve(
                &observed,
                &cals,
                distance,
                self.config.column_scaling,
                IterativeOptions {
                    tol: self.config.tol,
                    max_iter: self.config.max_iter,
                    return_overhead: self.config.return_mitigation_overhead,
                },
            )?,
        };

        let conversion = Instant::now();
        let mut quasi = observed.to_quasi(&solution.values);
        if let Some(overhead) = solution.mitigation_overhead() {
            quasi = quasi.with_mitigation_overhead(overhead);
        }
        info!("Vector to quasi time: {:?}", conversion.elapsed());

        let details = SolveDetails {
            method: path,
            duration: start.elapsed(),
            dimension: observed.len(),
            iterations: solution.iterations,
            col_norms: solution.col_norms,
        };
        info!(
            "Corrected {} states on {} channels (d = {}, {}) in {:?}",
            details.dimension,
            channels.len(),
            distance,
            path,
            details.duration
        );
        Ok(Correction { quasi, details })
    }

    /// Correct a single distribution or a batch
    /// Gantree: apply(CountsInput,ChannelSpec) -> Result<CorrectionOutput> // 일괄 보정
    pub fn apply(&self, counts: CountsInput, channels: ChannelSpec) -> RemitResult<CorrectionOutput> {
        let request = normalize(counts, channels)?;
        let mut corrections = request
            .jobs
            .iter()
            .map(|job| self.apply_correction(&job.counts, &job.channels))
            .collect::<RemitResult<Vec<_>>>()?;

        if !request.is_batch {
            return corrections
                .pop()
                .map(CorrectionOutput::Single)
                .ok_or_else(|| RemitError::InternalError("single request produced no job".to_string()));
        }
        let (quasis, details): (Vec<_>, Vec<_>) =
            corrections.into_iter().map(|c| (c.quasi, c.details)).unzip();
        Ok(CorrectionOutput::Batch {
            quasis: QuasiCollection::new(quasis),
            details,
        })
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Explicit truncated matrix for inspection
    /// Gantree: reduced_cal_matrix(&Counts,&[ChannelId]) -> Result<ReducedCalMatrix> // 축소 행렬
    pub fn reduced_cal_matrix(&self, counts: &Counts, channels: &[ChannelId]) -> RemitResult<ReducedCalMatrix> {
        let observed = ObservedStates::from_counts(counts, channels.len())?;
        let cals = self.cals_for(channels)?;
        let distance = self.config.effective_distance(channels.len());
        let system = ReducedSystem::build(&observed, &cals, distance, self.config.column_scaling)?;
        Ok(ReducedCalMatrix {
            matrix: system.matrix,
            keys: observed.keys().to_vec(),
            counts: observed.counts().to_vec(),
            col_norms: system.col_norms,
        })
    }

    /// Is the truncated matrix strictly diagonally dominant?
    /// Gantree: check_sdd(&Counts,&[ChannelId]) -> Result<bool> // 대각 우세
    pub fn check_sdd(&self, counts: &Counts, channels: &[ChannelId]) -> RemitResult<bool> {
        let observed = ObservedStates::from_counts(counts, channels.len())?;
        let cals = self.cals_for(channels)?;
        is_sdd(&observed, &cals, self.config.effective_distance(channels.len()))
    }

    fn cals_for(&self, channels: &[ChannelId]) -> RemitResult<TensorCals> {
        let missing = self.calibration.missing_channels(channels);
        if !missing.is_empty() {
            warn!(
                "Channels {:?} have no calibration in snapshot '{}'",
                missing, self.calibration.system_name
            );
            return Err(RemitError::MissingCalibration { channels: missing });
        }
        let faulty: Vec<ChannelId> = self
            .calibration
            .faulty_channels()
            .into_iter()
            .filter(|q| channels.contains(q))
            .collect();
        if !faulty.is_empty() {
            return Err(RemitError::FaultyChannels(faulty));
        }
        self.calibration.tensor_cals(channels)
    }
}

// ============================================================================
// Tests
// ============================================================================
