use crate::math::matrix::Matrix;

pub struct BceLoss;

impl BceLoss {
    /// Per-example BCE: -(y·ln(p + ε) + (1 - y)·ln(1 - p + ε)), same shape as `predicted`.
    pub fn loss(predicted: &Matrix, expected: &Matrix, eps: f64) -> Matrix {
        predicted.zip_map(expected, |p, y| -(y * (p + eps).ln() + (1.0 - y) * (1.0 - p + eps).ln()))
    }

    /// Batch cost: per-column sum of the per-example loss divided by the
    /// number of examples, summed over columns (there is one).
    pub fn cost(predicted: &Matrix, expected: &Matrix, eps: f64) -> f64 {
        let n = predicted.rows as f64;
        BceLoss::loss(predicted, expected, eps).sum_rows().scale(1.0 / n).sum()
    }

    /// Gradient w.r.t. the sigmoid's pre-activation: p - y.
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Matrix {
        predicted - expected
    }
}
