pub mod adam;
pub mod sgd;

use serde::{Serialize, Deserialize};

use crate::error::TrainError;
use crate::network::params::{Gradients, Parameters};

pub use adam::{Adam, AdamConfig};
pub use sgd::Sgd;

/// Which update rule a training run uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizerKind {
    Sgd,
    Adam(AdamConfig),
}

impl Default for OptimizerKind {
    fn default() -> Self {
        OptimizerKind::Adam(AdamConfig::default())
    }
}

/// A constructed optimizer. Adam carries its timestep and is therefore
/// stateful; keep one instance for the whole run.
pub enum Optimizer {
    Sgd(Sgd),
    Adam(Adam),
}

impl Optimizer {
    pub fn new(kind: OptimizerKind, learning_rate: f64) -> Optimizer {
        match kind {
            OptimizerKind::Sgd => Optimizer::Sgd(Sgd::new(learning_rate)),
            OptimizerKind::Adam(config) => Optimizer::Adam(Adam::new(learning_rate, config)),
        }
    }

    pub fn step(&mut self, params: &mut Parameters, gradients: &Gradients) -> Result<(), TrainError> {
        match self {
            Optimizer::Sgd(sgd) => sgd.step(params, gradients),
            Optimizer::Adam(adam) => adam.step(params, gradients),
        }
    }

    /// Adam's update count; `None` for plain gradient descent.
    pub fn timestep(&self) -> Option<u64> {
        match self {
            Optimizer::Sgd(_) => None,
            Optimizer::Adam(adam) => Some(adam.timestep()),
        }
    }
}
