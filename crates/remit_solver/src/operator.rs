//! Matrix-free reduced operator
//!
//! Gantree: L3_Operator → MatrixFreeOperator
//!
//! Answers forward and transpose products of the truncated tensor-product
//! operator from the observed states and the per-channel calibration. Work
//! per product is proportional to m times the Hamming-ball size, never 2^n.

use crate::reduced::{ColumnScaling, ObservedStates};
use log::info;
use nalgebra::DVector;
use remit_calibration::TensorCals;
use remit_core::RemitResult;
use std::time::Instant;

/// Square linear operator acting on dense vectors
/// Gantree: LinearOperator // 선형 연산자
pub trait LinearOperator {
    /// Dimension
    fn dim(&self) -> usize;

    /// y = A x
    fn apply(&self, x: &DVector<f64>) -> DVector<f64>;

    /// y = Aᵀ x
    fn apply_transpose(&self, x: &DVector<f64>) -> DVector<f64>;

    /// diag(A)
    fn diagonal(&self) -> DVector<f64>;
}

/// Transpose view of an operator
pub struct Transposed<'o, O: ?Sized>(pub &'o O);

impl<O: LinearOperator + ?Sized> LinearOperator for Transposed<'_, O> {
    fn dim(&self) -> usize {
        self.0.dim()
    }

    fn apply(&self, x: &DVector<f64>) -> DVector<f64> {
        self.0.apply_transpose(x)
    }

    fn apply_transpose(&self, x: &DVector<f64>) -> DVector<f64> {
        self.0.apply(x)
    }

    fn diagonal(&self) -> DVector<f64> {
        self.0.diagonal()
    }
}

/// Truncated operator evaluated on demand
/// Gantree: MatrixFreeOperator // 행렬 없는 연산자
#[derive(Debug, Clone)]
pub struct MatrixFreeOperator<'a> {
    observed: &'a ObservedStates,
    cals: &'a TensorCals,
    distance: usize,
    /// Raw truncated column 1-norms
    col_norms: Vec<f64>,
    /// Per-column divisor, all ones for raw scaling
    col_scale: Vec<f64>,
}

impl<'a> MatrixFreeOperator<'a> {
    /// Build the operator context for distance `distance` (clamped to n)
    /// Gantree: new(observed,cals,d,scaling) -> Result<Self> // 컨텍스트 생성
    pub fn new(
        observed: &'a ObservedStates,
        cals: &'a TensorCals,
        distance: usize,
        scaling: ColumnScaling,
    ) -> RemitResult<Self> {
        observed.check_cals(cals)?;
        let start = Instant::now();
        let distance = distance.min(observed.num_channels());
        let states = observed.states();

        let col_norms: Vec<f64> = (0..observed.len())
            .map(|col| {
                let mut norm = 0.0;
                observed.for_each_neighbour(col, distance, |row| {
                    norm += cals.element(&states[row], &states[col]).abs();
                });
                norm
            })
            .collect();

        let col_scale = match scaling {
            ColumnScaling::Raw => vec![1.0; col_norms.len()],
            ColumnScaling::Renormalized => col_norms
                .iter()
                .map(|&n| if n > 0.0 { n } else { 1.0 })
                .collect(),
        };

        info!("MatVec build time: {:?} (m = {}, d = {})", start.elapsed(), observed.len(), distance);
        Ok(Self {
            observed,
            cals,
            distance,
            col_norms,
            col_scale,
        })
    }

    /// Effective truncation distance
    pub fn distance(&self) -> usize {
        self.distance
    }

    /// Raw truncated column 1-norms
    /// Gantree: col_norms() -> &[f64] // 열 노름
    pub fn col_norms(&self) -> &[f64] {
        &self.col_norms
    }

    /// Observed states labelling rows and columns
    pub fn observed(&self) -> &ObservedStates {
        self.observed
    }

    #[inline]
    fn entry(&self, row: usize, col: usize) -> f64 {
        let states = self.observed.states();
        self.cals.element(&states[row], &states[col]) / self.col_scale[col]
    }
}

impl LinearOperator for MatrixFreeOperator<'_> {
    fn dim(&self) -> usize {
        self.observed.len()
    }

    /// y_r = Σ_c M[r, c] x_c over columns within distance of r
    fn apply(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_iterator(
            self.dim(),
            (0..self.dim()).map(|row| {
                let mut acc = 0.0;
                self.observed.for_each_neighbour(row, self.distance, |col| {
                    acc += self.entry(row, col) * x[col];
                });
                acc
            }),
        )
    }

    /// y_c = Σ_r M[r, c] x_r over rows within distance of c
    fn apply_transpose(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_iterator(
            self.dim(),
            (0..self.dim()).map(|col| {
                let mut acc = 0.0;
                self.observed.for_each_neighbour(col, self.distance, |row| {
                    acc += self.entry(row, col) * x[row];
                });
                acc
            }),
        )
    }

    fn diagonal(&self) -> DVector<f64> {
        let states = self.observed.states();
        DVector::from_iterator(
            self.dim(),
            states
                .iter()
                .zip(&self.col_scale)
                .map(|(s, scale)| self.cals.diagonal_element(s) / scale),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduced::ReducedSystem;
    use approx::assert_abs_diff_eq;
    use remit_calibration::AssignmentMatrix;
    use remit_core::Counts;

    fn setup() -> (ObservedStates, TensorCals) {
        let keys = ["00000", "00011", "10101", "11111", "01000", "00001", "11110", "10000"];
        let counts: Counts = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.to_string(), (i as u64 + 1) * 7))
            .collect();
        let obs = ObservedStates::from_counts(&counts, 5).unwrap();
        let mats: Vec<_> = (0..5)
            .map(|q| AssignmentMatrix::from_error_rates(0.02 + 0.005 * q as f64, 0.06 - 0.01 * q as f64).unwrap())
            .collect();
        (obs, TensorCals::from_matrices(&mats))
    }

    fn test_vector(m: usize) -> DVector<f64> {
        DVector::from_iterator(m, (0..m).map(|i| ((i * 37 % 11) as f64 - 5.0) / 3.0))
    }

    #[test]
    fn test_forward_and_transpose_match_dense() {
        let (obs, cals) = setup();
        for scaling in [ColumnScaling::Raw, ColumnScaling::Renormalized] {
            for d in 0..=5 {
                let op = MatrixFreeOperator::new(&obs, &cals, d, scaling).unwrap();
                let dense = ReducedSystem::build(&obs, &cals, d, scaling).unwrap().matrix;
                let x = test_vector(obs.len());

                let y = op.apply(&x);
                let y_dense = &dense * &x;
                let yt = op.apply_transpose(&x);
                let yt_dense = dense.transpose() * &x;
                for i in 0..obs.len() {
                    assert_abs_diff_eq!(y[i], y_dense[i], epsilon = 1e-12);
                    assert_abs_diff_eq!(yt[i], yt_dense[i], epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_adjoint_identity() {
        let (obs, cals) = setup();
        let op = MatrixFreeOperator::new(&obs, &cals, 2, ColumnScaling::Raw).unwrap();
        let x = test_vector(obs.len());
        let y = DVector::from_iterator(obs.len(), (0..obs.len()).map(|i| 1.0 / (i as f64 + 1.0)));
        // <Ax, y> == <x, Aᵀy>
        assert_abs_diff_eq!(op.apply(&x).dot(&y), x.dot(&op.apply_transpose(&y)), epsilon = 1e-12);
    }

    #[test]
    fn test_col_norms_match_dense() {
        let (obs, cals) = setup();
        for d in 0..=5 {
            let op = MatrixFreeOperator::new(&obs, &cals, d, ColumnScaling::Raw).unwrap();
            let sys = ReducedSystem::build(&obs, &cals, d, ColumnScaling::Raw).unwrap();
            for (a, b) in op.col_norms().iter().zip(&sys.col_norms) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_diagonal_matches_dense() {
        let (obs, cals) = setup();
        let op = MatrixFreeOperator::new(&obs, &cals, 1, ColumnScaling::Renormalized).unwrap();
        let dense = ReducedSystem::build(&obs, &cals, 1, ColumnScaling::Renormalized)
            .unwrap()
            .matrix;
        let diag = op.diagonal();
        for i in 0..obs.len() {
            assert_abs_diff_eq!(diag[i], dense[(i, i)], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_transposed_adapter() {
        let (obs, cals) = setup();
        let op = MatrixFreeOperator::new(&obs, &cals, 3, ColumnScaling::Raw).unwrap();
        let t = Transposed(&op);
        let x = test_vector(obs.len());
        assert_eq!(t.apply(&x), op.apply_transpose(&x));
        assert_eq!(t.apply_transpose(&x), op.apply(&x));
        assert_eq!(t.dim(), op.dim());
    }
}
