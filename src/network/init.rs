use rand::{rngs::StdRng, SeedableRng};

use crate::error::ConfigError;
use crate::math::matrix::Matrix;
use crate::network::params::{ParamId, Parameters};

/// Reads layer sizes given as a column vector, one size per row.
pub fn layer_sizes_from_column(sizes: &Matrix) -> Result<Vec<usize>, ConfigError> {
    if sizes.cols != 1 {
        return Err(ConfigError::NotAColumn { cols: sizes.cols });
    }
    sizes.data.iter()
        .map(|row| {
            let value = row[0];
            if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
                Err(ConfigError::NonIntegerLayerSize { value })
            } else {
                Ok(value as usize)
            }
        })
        .collect()
}

/// Creates weights, biases and (optionally) batch-norm parameters for every
/// consecutive pair of layers.
///
/// - `w{k}`: shape (sizes[k-1], sizes[k]), Xavier-initialized from `seed`.
/// - `b{k}`: zeros (1, sizes[k]); the final layer gets a single (1, 1) bias.
/// - `gamma{k}` / `beta{k}`: ones / zeros (1, sizes[k]) for every hidden
///   layer `k`, only when `batch_norm` is set.
pub fn initialise_params(
    layer_sizes: &[usize],
    num_layers: usize,
    n_features: usize,
    batch_norm: bool,
    seed: u64,
) -> Result<Parameters, ConfigError> {
    match layer_sizes.first() {
        Some(&first) if first == n_features => {}
        first => {
            return Err(ConfigError::FirstLayerMismatch {
                first_layer: first.copied().unwrap_or(0),
                features: n_features,
            })
        }
    }
    if layer_sizes.len() != num_layers {
        return Err(ConfigError::LayerCountMismatch {
            declared: num_layers,
            sizes: layer_sizes.len(),
        });
    }
    if let Some(index) = layer_sizes.iter().position(|&size| size == 0) {
        return Err(ConfigError::EmptyLayer { index });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut params = Parameters::new();

    for (i, pair) in layer_sizes.windows(2).enumerate() {
        let layer = i + 1;
        let (num_inputs, num_outputs) = (pair[0], pair[1]);

        params.insert(ParamId::weight(layer), Matrix::xavier(num_inputs, num_outputs, &mut rng));

        let bias = if layer == num_layers - 1 {
            Matrix::zeros(1, 1)
        } else {
            Matrix::zeros(1, num_outputs)
        };
        params.insert(ParamId::bias(layer), bias);

        if batch_norm && i != 0 {
            params.insert(ParamId::scale(i), Matrix::filled(1, num_inputs, 1.0));
            params.insert(ParamId::shift(i), Matrix::zeros(1, num_inputs));
        }
    }

    Ok(params)
}
