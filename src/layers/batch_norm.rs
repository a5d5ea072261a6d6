//! Batch normalization over the rows of a mini-batch.
//!
//! Forward, per column `j` over the `N` rows of the batch:
//!
//! ```text
//! mean     = Σ x / N
//! var      = Σ (x - mean)² / N
//! centered = x - mean
//! inv_std  = 1 / √(var + ε)
//! x_hat    = centered · inv_std
//! y        = γ · x_hat + β
//! ```
//!
//! Backward, given `dy = ∂L/∂y`:
//!
//! ```text
//! dβ     = Σ dy
//! dγ     = Σ x_hat · dy
//! dx_hat = dy · γ
//! dvar   = Σ dx_hat · centered · (-½) · inv_std³
//! dmean  = Σ (-dx_hat · inv_std) + dvar · (-2/N) · Σ centered
//! dx     = dx_hat · inv_std + dvar · (2/N) · centered + dmean / N
//! ```
//!
//! The three `dx` terms are the direct path through `x_hat`, the path through
//! the variance and the path through the mean.

use crate::math::matrix::Matrix;

/// Per-batch statistics kept between a forward pass and its backward pass.
///
/// `batch_norm_backward` takes the cache by value, so one cache serves
/// exactly one backward call.
#[derive(Debug, Clone)]
pub struct NormCache {
    /// x - mean, shape (N, D).
    pub centered: Matrix,
    /// 1 / √(var + ε), shape (1, D).
    pub inv_std: Matrix,
    /// Normalized input x_hat, shape (N, D).
    pub normalized: Matrix,
    /// γ used in the forward pass, shape (1, D).
    pub scale: Matrix,
}

#[derive(Debug, Clone)]
pub struct NormGradients {
    /// ∂L/∂x, shape (N, D).
    pub input: Matrix,
    /// ∂L/∂γ, shape (1, D).
    pub scale: Matrix,
    /// ∂L/∂β, shape (1, D).
    pub shift: Matrix,
}

pub fn batch_norm_forward(
    x: &Matrix,
    scale: &Matrix,
    shift: &Matrix,
    epsilon: f64,
) -> (Matrix, NormCache) {
    let mean = x.mean_rows();
    let var = x.variance_rows();

    let centered = x.broadcast_row(&mean, |v, m| v - m);
    let inv_std = var.map(|v| 1.0 / (v + epsilon).sqrt());
    let normalized = centered.broadcast_row(&inv_std, |c, s| c * s);

    let out = normalized
        .broadcast_row(scale, |n, g| g * n)
        .broadcast_row(shift, |n, b| n + b);

    let cache = NormCache {
        centered,
        inv_std,
        normalized,
        scale: scale.clone(),
    };

    (out, cache)
}

pub fn batch_norm_backward(grad_out: &Matrix, cache: NormCache) -> NormGradients {
    let n = grad_out.rows as f64;
    let NormCache { centered, inv_std, normalized, scale } = cache;

    let d_shift = grad_out.sum_rows();
    let d_scale = normalized.hadamard(grad_out).sum_rows();
    let d_normalized = grad_out.broadcast_row(&scale, |dy, g| dy * g);

    let inv_std_cubed = inv_std.map(|s| s.powi(3));
    let d_var = d_normalized
        .hadamard(&centered)
        .broadcast_row(&inv_std_cubed, |v, s3| v * -0.5 * s3)
        .sum_rows();

    let centered_sum = centered.sum_rows();
    let d_mean_direct = d_normalized
        .broadcast_row(&inv_std, |dx, s| -dx * s)
        .sum_rows();
    let d_mean_via_variance = d_var.zip_map(&centered_sum, |dv, cs| dv * (-2.0 / n) * cs);
    let d_mean = &d_mean_direct + &d_mean_via_variance;

    let dx_direct = d_normalized.broadcast_row(&inv_std, |dx, s| dx * s);
    let dx_via_variance = centered.broadcast_row(&d_var, |c, dv| dv * (2.0 / n) * c);
    let dx_via_mean = Matrix::zeros(grad_out.rows, grad_out.cols)
        .broadcast_row(&d_mean, |_, dm| dm / n);

    NormGradients {
        input: &(&dx_direct + &dx_via_variance) + &dx_via_mean,
        scale: d_scale,
        shift: d_shift,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> Matrix {
        Matrix::from_data(vec![
            vec![1.0, -2.0],
            vec![3.0, 0.5],
            vec![-1.0, 4.0],
            vec![2.0, 1.0],
        ])
    }

    #[test]
    fn forward_output_has_zero_mean_unit_variance() {
        let scale = Matrix::filled(1, 2, 1.0);
        let shift = Matrix::zeros(1, 2);
        let (out, _) = batch_norm_forward(&batch(), &scale, &shift, 1e-8);

        for &m in &out.mean_rows().data[0] {
            assert!(m.abs() < 1e-9);
        }
        for &v in &out.variance_rows().data[0] {
            assert!((v - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn scale_and_shift_are_applied_after_normalizing() {
        let scale = Matrix::from_data(vec![vec![2.0, 0.5]]);
        let shift = Matrix::from_data(vec![vec![3.0, -1.0]]);
        let (out, cache) = batch_norm_forward(&batch(), &scale, &shift, 1e-8);
        let means = out.mean_rows();
        assert!((means.data[0][0] - 3.0).abs() < 1e-9);
        assert!((means.data[0][1] + 1.0).abs() < 1e-9);
        assert_eq!(cache.scale, scale);
    }

    #[test]
    fn shift_and_scale_gradients_are_column_sums() {
        let scale = Matrix::filled(1, 2, 1.0);
        let shift = Matrix::zeros(1, 2);
        let (_, cache) = batch_norm_forward(&batch(), &scale, &shift, 1e-8);
        let normalized = cache.normalized.clone();
        let dout = Matrix::filled(4, 2, 1.0);

        let grads = batch_norm_backward(&dout, cache);
        assert_eq!(grads.shift.data, vec![vec![4.0, 4.0]]);
        let expected_scale = normalized.sum_rows();
        for j in 0..2 {
            assert!((grads.scale.data[0][j] - expected_scale.data[0][j]).abs() < 1e-12);
        }
    }

    #[test]
    fn constant_upstream_gradient_vanishes_through_normalization() {
        // Shifting every row by the same amount leaves x_hat unchanged.
        let scale = Matrix::from_data(vec![vec![1.5, -0.7]]);
        let shift = Matrix::zeros(1, 2);
        let (_, cache) = batch_norm_forward(&batch(), &scale, &shift, 1e-8);
        let grads = batch_norm_backward(&Matrix::filled(4, 2, 0.3), cache);
        for &dx in grads.input.data.iter().flatten() {
            assert!(dx.abs() < 1e-9);
        }
    }
}
