//! Correction configuration
//!
//! Gantree: L4_Engine → MitigationConfig
//!
//! Truncation distance, solution path, and solver tolerances for one
//! correction request.

use remit_core::solver::{DEFAULT_ITER_THRESHOLD, DEFAULT_MAX_ITER, DEFAULT_TOL};
use remit_core::{RemitError, RemitResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub use remit_solver::ColumnScaling;

/// Requested solution path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SolveMethod {
    /// Choose by size and available memory
    #[default]
    Auto,
    /// Dense LU
    Direct,
    /// Matrix-free GMRES
    Iterative,
}

impl FromStr for SolveMethod {
    type Err = RemitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "direct" => Ok(Self::Direct),
            "iterative" => Ok(Self::Iterative),
            other => Err(RemitError::InvalidMethod(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for SolveMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for SolveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Direct => "direct",
            Self::Iterative => "iterative",
        };
        f.pad(name)
    }
}

/// Concrete path a correction ran on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolvePath {
    /// Dense LU
    Direct,
    /// Matrix-free GMRES
    Iterative,
}

impl fmt::Display for SolvePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.pad("direct"),
            Self::Iterative => f.pad("iterative"),
        }
    }
}

/// Settings for a correction call
/// Gantree: MitigationConfig // 보정 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MitigationConfig {
    /// Truncation distance, `None` = number of measured channels
    pub distance: Option<usize>,

    /// Solution path
    pub method: SolveMethod,

    /// GMRES relative and absolute tolerance
    pub tol: f64,

    /// GMRES restart-cycle budget
    pub max_iter: usize,

    /// Largest system solved directly under `Auto`
    pub iter_threshold: usize,

    /// Annotate results with γ²
    pub return_mitigation_overhead: bool,

    /// Column treatment of the truncated operator
    pub column_scaling: ColumnScaling,
}

impl MitigationConfig {
    /// Set truncation distance
    pub fn with_distance(mut self, distance: usize) -> Self {
        self.distance = Some(distance);
        self
    }

    /// Set solution path
    pub fn with_method(mut self, method: SolveMethod) -> Self {
        self.method = method;
        self
    }

    /// Set GMRES tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set GMRES restart-cycle budget
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set direct-path size threshold
    pub fn with_iter_threshold(mut self, threshold: usize) -> Self {
        self.iter_threshold = threshold;
        self
    }

    /// Request the mitigation overhead
    pub fn with_mitigation_overhead(mut self, enabled: bool) -> Self {
        self.return_mitigation_overhead = enabled;
        self
    }

    /// Set column treatment
    pub fn with_column_scaling(mut self, scaling: ColumnScaling) -> Self {
        self.column_scaling = scaling;
        self
    }

    /// Distance for `num_channels` measured channels
    pub fn effective_distance(&self, num_channels: usize) -> usize {
        self.distance.unwrap_or(num_channels).min(num_channels)
    }

    /// Validate configuration
    pub fn validate(&self) -> RemitResult<()> {
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(RemitError::InvalidConfig(format!(
                "tol must be positive, got {}",
                self.tol
            )));
        }
        Ok(())
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> RemitResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        // An unknown method is an InvalidMethod, not a JSON error
        if let Some(method) = value.get("method").and_then(serde_json::Value::as_str) {
            method.parse::<SolveMethod>()?;
        }
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> RemitResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for MitigationConfig {
    fn default() -> Self {
        Self {
            distance: None,
            method: SolveMethod::Auto,
            tol: DEFAULT_TOL,
            max_iter: DEFAULT_MAX_ITER,
            iter_threshold: DEFAULT_ITER_THRESHOLD,
            return_mitigation_overhead: false,
            column_scaling: ColumnScaling::Renormalized,
        }
    }
}

impl fmt::Display for MitigationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.distance {
            Some(d) => write!(f, "MitigationConfig(d={}, {}, tol={:e})", d, self.method, self.tol),
            None => write!(f, "MitigationConfig(d=n, {}, tol={:e})", self.method, self.tol),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
