use crate::activation::activation::ActivationFunction;
use crate::error::ConfigError;
use crate::layers::batch_norm::{batch_norm_backward, NormCache};
use crate::layers::dense::{layer_forward, Normalization};
use crate::loss::bce::BceLoss;
use crate::math::matrix::Matrix;
use crate::network::init::initialise_params;
use crate::network::params::{Gradients, ParamId, Parameters};
use crate::network::spec::ModelSpec;

/// Input → hidden → single sigmoid output.
///
/// The backward pass is derived by hand for exactly this shape, so
/// `Network::new` rejects any other depth and any output width but one.
#[derive(Debug, Clone)]
pub struct Network {
    spec: ModelSpec,
    params: Parameters,
}

/// Everything a training-mode forward pass produces.
#[derive(Debug, Clone)]
pub struct ForwardPass {
    /// Raw sigmoid output, shape (N, 1).
    pub prediction: Matrix,
    /// Hidden-layer activation, shape (N, hidden).
    pub hidden: Matrix,
    /// Present when the network uses batch norm.
    pub norm_cache: Option<NormCache>,
}

impl Network {
    pub fn new(spec: ModelSpec, n_features: usize) -> Result<Network, ConfigError> {
        spec.validate()?;
        let params = initialise_params(
            &spec.layer_sizes,
            spec.num_layers,
            n_features,
            spec.batch_norm,
            spec.seed,
        )?;

        if spec.num_layers != 3 {
            return Err(ConfigError::UnsupportedDepth { num_layers: spec.num_layers });
        }
        let outputs = spec.layer_sizes[2];
        if outputs != 1 {
            return Err(ConfigError::MultipleOutputs { outputs });
        }

        log::debug!(
            "initialised network {:?} ({} parameter tensors, batch_norm = {})",
            spec.layer_sizes, params.len(), spec.batch_norm
        );
        Ok(Network { spec, params })
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn n_features(&self) -> usize {
        self.spec.layer_sizes[0]
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn param(&self, id: ParamId) -> &Matrix {
        self.params
            .value(id)
            .unwrap_or_else(|| panic!("parameter {} missing from an initialised network", id))
    }

    /// Training-mode forward pass over one batch.
    ///
    /// Batch norm always uses the statistics of `batch` itself; there are no
    /// running averages.
    pub fn forward_train(&self, batch: &Matrix) -> ForwardPass {
        let normalization = if self.spec.batch_norm {
            Some(Normalization {
                scale: self.param(ParamId::scale(1)),
                shift: self.param(ParamId::shift(1)),
                epsilon: self.spec.epsilon,
            })
        } else {
            None
        };

        let (hidden, norm_cache) = layer_forward(
            batch,
            self.param(ParamId::weight(1)),
            self.param(ParamId::bias(1)),
            self.spec.hidden_activation,
            normalization,
        );
        let (prediction, _) = layer_forward(
            &hidden,
            self.param(ParamId::weight(2)),
            self.param(ParamId::bias(2)),
            ActivationFunction::Sigmoid,
            None,
        );

        ForwardPass { prediction, hidden, norm_cache }
    }

    /// Raw output probabilities.
    pub fn predict_proba(&self, batch: &Matrix) -> Matrix {
        self.forward_train(batch).prediction
    }

    /// Inference-mode prediction: the output rounded to 0 or 1.
    pub fn predict(&self, batch: &Matrix) -> Matrix {
        self.predict_proba(batch).map(f64::round)
    }

    /// Backpropagates one batch and returns a gradient for every parameter,
    /// together with the raw prediction used for the cost.
    ///
    /// Weight gradients are summed over the batch; bias gradients are batch
    /// means.
    pub fn compute_gradients(&self, batch: &Matrix, labels: &Matrix) -> (Gradients, Matrix) {
        let n_examples = batch.rows as f64;
        let ForwardPass { prediction, hidden, norm_cache } = self.forward_train(batch);

        // Output layer: sigmoid + cross-entropy gives dZ2 = ŷ - y.
        let dz2 = BceLoss::derivative(&prediction, labels);
        let dw2 = &hidden.transpose() * &dz2;
        let db2 = Matrix::filled(1, 1, dz2.sum() / n_examples);

        // Back through w2 and the hidden activation.
        let activation = self.spec.hidden_activation;
        let d_hidden = (&dz2 * &self.param(ParamId::weight(2)).transpose())
            .hadamard(&hidden.map(|a| activation.derivative_from_output(a)));

        let mut gradients = Gradients::new();

        let dz1 = match norm_cache {
            Some(cache) => {
                let norm = batch_norm_backward(&d_hidden, cache);
                gradients.insert(ParamId::scale(1), norm.scale);
                gradients.insert(ParamId::shift(1), norm.shift);
                norm.input
            }
            None => d_hidden,
        };

        let dw1 = &batch.transpose() * &dz1;
        let db1 = dz1.mean_rows();

        gradients.insert(ParamId::weight(1), dw1);
        gradients.insert(ParamId::bias(1), db1);
        gradients.insert(ParamId::weight(2), dw2);
        gradients.insert(ParamId::bias(2), db2);

        (gradients, prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xor_batch() -> (Matrix, Matrix) {
        let x = Matrix::from_data(vec![
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.0, 0.0],
        ]);
        let y = Matrix::column(&[1.0, 0.0, 0.0, 1.0]);
        (x, y)
    }

    #[test]
    fn rejects_deeper_networks() {
        let spec = ModelSpec::new(vec![2, 3, 3, 1]);
        assert_eq!(
            Network::new(spec, 2).unwrap_err(),
            ConfigError::UnsupportedDepth { num_layers: 4 }
        );
    }

    #[test]
    fn rejects_multiple_outputs() {
        let spec = ModelSpec::new(vec![2, 3, 2]);
        assert_eq!(
            Network::new(spec, 2).unwrap_err(),
            ConfigError::MultipleOutputs { outputs: 2 }
        );
    }

    #[test]
    fn gradient_shapes_match_parameters() {
        let (x, y) = xor_batch();
        for batch_norm in [false, true] {
            let net = Network::new(ModelSpec::new(vec![2, 5, 1]).with_batch_norm(batch_norm), 2)
                .unwrap();
            let (grads, prediction) = net.compute_gradients(&x, &y);
            assert_eq!(prediction.shape(), (4, 1));
            assert_eq!(grads.len(), net.params().len());
            for (id, param) in net.params().iter() {
                let grad = grads.get(*id).expect("every parameter has a gradient");
                assert_eq!(grad.shape(), param.value.shape(), "{}", id);
            }
        }
    }

    #[test]
    fn predict_is_rounded_and_deterministic() {
        let (x, _) = xor_batch();
        let net = Network::new(ModelSpec::default(), 2).unwrap();
        let first = net.predict(&x);
        assert_eq!(first, net.predict(&x));
        assert!(first.data.iter().flatten().all(|&p| p == 0.0 || p == 1.0));
    }
}
