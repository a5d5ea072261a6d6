use serde::{Serialize, Deserialize};

use crate::error::ConfigError;
use crate::optim::OptimizerKind;

/// Configuration for a `Trainer` run.
///
/// # Fields
/// - `epochs`        — total number of full passes over the training data
/// - `batch_size`    — examples per mini-batch; the final batch of an epoch
///                     may be smaller
/// - `learning_rate` — step size for either optimizer
/// - `optimizer`     — plain gradient descent or Adam (with its decay rates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    #[serde(default)]
    pub optimizer: OptimizerKind,
}

impl TrainConfig {
    pub fn new(epochs: usize, batch_size: usize, learning_rate: f64, optimizer: OptimizerKind) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            learning_rate,
            optimizer,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ConfigError::InvalidLearningRate { learning_rate: self.learning_rate });
        }
        if let OptimizerKind::Adam(adam) = self.optimizer {
            adam.validate()?;
        }
        Ok(())
    }
}

impl Default for TrainConfig {
    /// 125 epochs of batch-32 Adam at learning rate 0.1.
    fn default() -> Self {
        TrainConfig::new(125, 32, 0.1, OptimizerKind::default())
    }
}
