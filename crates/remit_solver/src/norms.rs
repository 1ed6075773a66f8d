//! Inverse 1-norm estimation
//!
//! Gantree: L3_Overhead → OneNormEstimator
//!
//! Hager/Higham estimate of ‖A⁻¹‖₁ from a handful of solves with A and Aᵀ.
//! The inverse is never formed, so the same estimator serves the dense
//! factorization and the matrix-free GMRES path.

use log::debug;
use nalgebra::DVector;
use remit_core::solver::ONENORM_MAX_ITER;
use remit_core::RemitResult;

/// Something that can apply A⁻¹ and A⁻ᵀ to a vector
/// Gantree: InverseSolver // 역행렬 적용
pub trait InverseSolver {
    /// Dimension
    fn dim(&self) -> usize;

    /// x = A⁻¹ b
    fn solve(&self, b: &DVector<f64>) -> RemitResult<DVector<f64>>;

    /// x = A⁻ᵀ b
    fn solve_transpose(&self, b: &DVector<f64>) -> RemitResult<DVector<f64>>;
}

/// Lower-bound estimate of ‖A⁻¹‖₁
/// Gantree: onenorm_inverse_estimate(&S) -> Result<f64> // γ 추정
pub fn onenorm_inverse_estimate<S: InverseSolver + ?Sized>(solver: &S) -> RemitResult<f64> {
    let n = solver.dim();
    if n == 0 {
        return Ok(0.0);
    }

    let mut x = DVector::from_element(n, 1.0 / n as f64);
    let mut est = 0.0f64;
    for iter in 0..ONENORM_MAX_ITER {
        let y = solver.solve(&x)?;
        let new_est = y.lp_norm(1);
        if iter > 0 && new_est <= est {
            break;
        }
        est = new_est;

        let signs = y.map(|v| if v >= 0.0 { 1.0 } else { -1.0 });
        let z = solver.solve_transpose(&signs)?;
        let j = z.iamax();
        debug!("1-norm estimate iteration {}: {:.6e}", iter, est);
        if z[j].abs() <= z.dot(&x) {
            break;
        }
        x = DVector::zeros(n);
        x[j] = 1.0;
    }

    // Alternating-sign vector catches sign cancellation
    let alternating = DVector::from_iterator(
        n,
        (0..n).map(|i| {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            let ramp = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
            sign * (1.0 + ramp)
        }),
    );
    let alt = 2.0 * solver.solve(&alternating)?.lp_norm(1) / (3.0 * n as f64);

    Ok(est.max(alt))
}

// ============================================================================
// Tests
// ============================================================================
