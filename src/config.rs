use serde::{Serialize, Deserialize};

use crate::network::spec::ModelSpec;
use crate::train::train_config::TrainConfig;

/// Everything the `gatenet` binary needs for one run.
///
/// The defaults reproduce the reference experiment: 5000 generated examples,
/// a 2 → 2 → 1 network with batch norm, 125 epochs of batch-32 Adam at
/// learning rate 0.1 (β1 = 0.9, β2 = 0.999), and ε = 1e-8 for the loss and
/// normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub model: ModelSpec,
    #[serde(default)]
    pub train: TrainConfig,
    #[serde(default = "default_examples")]
    pub n_examples: usize,
    #[serde(default)]
    pub data_seed: u64,
}

fn default_examples() -> usize {
    5000
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            model: ModelSpec::default(),
            train: TrainConfig::default(),
            n_examples: default_examples(),
            data_seed: 0,
        }
    }
}

impl RunConfig {
    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `RunConfig` from a JSON file; missing sections take
    /// their defaults.
    pub fn load_json(path: &str) -> std::io::Result<RunConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
