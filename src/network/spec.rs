use serde::{Serialize, Deserialize};
use crate::activation::activation::ActivationFunction;
use crate::error::ConfigError;

/// Architecture of the classifier plus the constants its forward pass needs.
///
/// Fields:
/// - `layer_sizes`       — neurons per layer, input first (e.g. `[2, 2, 1]`)
/// - `num_layers`        — declared layer count; must equal `layer_sizes.len()`
/// - `hidden_activation` — activation of the hidden layer (the output is
///                         always a sigmoid)
/// - `batch_norm`        — normalize the hidden pre-activations per batch
/// - `epsilon`           — added to the variance in batch norm and inside the
///                         logarithms of the cost
/// - `seed`              — seed for weight initialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub layer_sizes: Vec<usize>,
    pub num_layers: usize,
    #[serde(default = "default_hidden_activation")]
    pub hidden_activation: ActivationFunction,
    #[serde(default)]
    pub batch_norm: bool,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_hidden_activation() -> ActivationFunction {
    ActivationFunction::Sigmoid
}

fn default_epsilon() -> f64 {
    1e-8
}

fn default_seed() -> u64 {
    7
}

impl ModelSpec {
    /// Sigmoid hidden layer, no normalization, default epsilon and seed.
    pub fn new(layer_sizes: Vec<usize>) -> ModelSpec {
        ModelSpec {
            num_layers: layer_sizes.len(),
            layer_sizes,
            hidden_activation: default_hidden_activation(),
            batch_norm: false,
            epsilon: default_epsilon(),
            seed: default_seed(),
        }
    }

    pub fn with_batch_norm(mut self, batch_norm: bool) -> ModelSpec {
        self.batch_norm = batch_norm;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> ModelSpec {
        self.seed = seed;
        self
    }

    pub fn with_hidden_activation(mut self, activation: ActivationFunction) -> ModelSpec {
        self.hidden_activation = activation;
        self
    }

    /// Checks the constants the forward pass depends on. The layer sizes are
    /// checked while the parameters are built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.epsilon >= 0.0 && self.epsilon.is_finite()) {
            return Err(ConfigError::InvalidEpsilon { epsilon: self.epsilon });
        }
        Ok(())
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `ModelSpec` from a JSON file.
    pub fn load_json(path: &str) -> std::io::Result<ModelSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

impl Default for ModelSpec {
    /// 2 → 2 → 1 with batch norm, as in the reference run.
    fn default() -> Self {
        ModelSpec::new(vec![2, 2, 1]).with_batch_norm(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let spec: ModelSpec =
            serde_json::from_str(r#"{ "layer_sizes": [2, 4, 1], "num_layers": 3 }"#).unwrap();
        assert_eq!(spec.hidden_activation, ActivationFunction::Sigmoid);
        assert!(!spec.batch_norm);
        assert_eq!(spec.epsilon, 1e-8);
        assert_eq!(spec.seed, 7);
    }

    #[test]
    fn save_and_load_json() {
        let path = std::env::temp_dir().join("gatenet_model_spec_test.json");
        let path = path.to_str().unwrap();
        let spec = ModelSpec::new(vec![2, 8, 1])
            .with_batch_norm(true)
            .with_hidden_activation(ActivationFunction::ReLU);
        spec.save_json(path).unwrap();
        assert_eq!(ModelSpec::load_json(path).unwrap(), spec);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn negative_epsilon_from_json_is_rejected() {
        let spec: ModelSpec = serde_json::from_str(
            r#"{ "layer_sizes": [2, 2, 1], "num_layers": 3, "epsilon": -1.0 }"#,
        ).unwrap();
        assert_eq!(spec.validate(), Err(ConfigError::InvalidEpsilon { epsilon: -1.0 }));
        assert!(ModelSpec::default().validate().is_ok());
    }
}
