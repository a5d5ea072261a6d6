use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};
use crate::layers::batch_norm::{batch_norm_forward, NormCache};

/// Batch-norm parameters for one `layer_forward` call.
#[derive(Debug, Clone, Copy)]
pub struct Normalization<'a> {
    pub scale: &'a Matrix,
    pub shift: &'a Matrix,
    pub epsilon: f64,
}

/// Fully-connected layer over a whole batch: `z = input · weights + bias`,
/// optionally batch-normalized, then activated.
///
/// `bias` is (1, outputs) or (1, 1) and is broadcast down the rows. Returns the
/// activated output and, when `normalization` is given, the cache its backward
/// pass needs.
pub fn layer_forward(
    input: &Matrix,
    weights: &Matrix,
    bias: &Matrix,
    activation: ActivationFunction,
    normalization: Option<Normalization<'_>>,
) -> (Matrix, Option<NormCache>) {
    let z = (input * weights).broadcast_row(bias, |x, b| x + b);

    let (z, cache) = match normalization {
        Some(norm) => {
            let (out, cache) = batch_norm_forward(&z, norm.scale, norm.shift, norm.epsilon);
            (out, Some(cache))
        }
        None => (z, None),
    };

    let a = z.map(|x| activation.function(x));
    (a, cache)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affine_then_activation() {
        let input = Matrix::from_data(vec![vec![1.0, 2.0], vec![-1.0, 0.0]]);
        let weights = Matrix::from_data(vec![vec![1.0, -1.0], vec![0.5, 1.0]]);
        let bias = Matrix::from_data(vec![vec![0.0, -1.0]]);

        let (a, cache) = layer_forward(&input, &weights, &bias, ActivationFunction::ReLU, None);
        assert!(cache.is_none());
        // z = [[2, 0], [-1, 0]]
        assert_eq!(a.data, vec![vec![2.0, 0.0], vec![0.0, 0.0]]);
    }

    #[test]
    fn single_bias_broadcasts_over_one_output() {
        let input = Matrix::from_data(vec![vec![0.0, 0.0]]);
        let weights = Matrix::zeros(2, 1);
        let bias = Matrix::zeros(1, 1);
        let (a, _) = layer_forward(&input, &weights, &bias, ActivationFunction::Sigmoid, None);
        assert_eq!(a.data, vec![vec![0.5]]);
    }

    #[test]
    fn normalization_returns_cache() {
        let input = Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]);
        let weights = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, -1.0]]);
        let bias = Matrix::zeros(1, 2);
        let scale = Matrix::filled(1, 2, 1.0);
        let shift = Matrix::zeros(1, 2);
        let norm = Normalization { scale: &scale, shift: &shift, epsilon: 1e-8 };

        let (a, cache) = layer_forward(&input, &weights, &bias, ActivationFunction::Sigmoid, Some(norm));
        let cache = cache.expect("normalization requested");
        assert_eq!(cache.normalized.shape(), (3, 2));
        assert_eq!(a.shape(), (3, 2));
        assert!(a.data.iter().flatten().all(|&x| x > 0.0 && x < 1.0));
    }
}
