pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod data;
pub mod config;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use network::{Network, ModelSpec, ParamId, ParamKind, Parameters};
pub use loss::bce::BceLoss;
pub use optim::{Adam, AdamConfig, Optimizer, OptimizerKind, Sgd};
pub use train::{Trainer, TrainConfig, EpochStats, EpochHistory};
pub use data::Dataset;
pub use config::RunConfig;
pub use error::{ConfigError, DataError, TrainError};
