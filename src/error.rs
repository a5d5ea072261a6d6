use std::fmt;

use crate::network::params::ParamId;

/// Fatal problems with the declared architecture or hyper-parameters.
/// Raised while building a `Network` or `Trainer`, before any epoch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    FirstLayerMismatch { first_layer: usize, features: usize },
    LayerCountMismatch { declared: usize, sizes: usize },
    NotAColumn { cols: usize },
    NonIntegerLayerSize { value: f64 },
    EmptyLayer { index: usize },
    UnsupportedDepth { num_layers: usize },
    MultipleOutputs { outputs: usize },
    ZeroBatchSize,
    InvalidLearningRate { learning_rate: f64 },
    InvalidDecay { name: &'static str, value: f64 },
    InvalidEpsilon { epsilon: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FirstLayerMismatch { first_layer, features } => write!(
                f,
                "Number of inputs ({}) must match first entry in layer_sizes ({})",
                features, first_layer
            ),
            ConfigError::LayerCountMismatch { declared, sizes } => write!(
                f,
                "Number of layers defined ({}) must be equal to number of layers set ({})",
                sizes, declared
            ),
            ConfigError::NotAColumn { cols } => {
                write!(f, "layer_sizes must be a column vector, got {} columns", cols)
            }
            ConfigError::NonIntegerLayerSize { value } => {
                write!(f, "layer size {} is not a non-negative integer", value)
            }
            ConfigError::EmptyLayer { index } => write!(f, "layer {} has no neurons", index),
            ConfigError::UnsupportedDepth { num_layers } => write!(
                f,
                "only input/hidden/output networks are supported (3 layers), got {}",
                num_layers
            ),
            ConfigError::MultipleOutputs { outputs } => write!(
                f,
                "the output layer must have exactly one neuron, got {}",
                outputs
            ),
            ConfigError::ZeroBatchSize => write!(f, "batch_size must be at least 1"),
            ConfigError::InvalidLearningRate { learning_rate } => {
                write!(f, "learning rate {} must be positive and finite", learning_rate)
            }
            ConfigError::InvalidDecay { name, value } => {
                write!(f, "{} = {} must lie in [0, 1)", name, value)
            }
            ConfigError::InvalidEpsilon { epsilon } => {
                write!(f, "epsilon {} must be finite and non-negative", epsilon)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Malformed feature/label matrices.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    Empty,
    RowMismatch { features: usize, labels: usize },
    LabelColumns { cols: usize },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Empty => write!(f, "dataset has no examples"),
            DataError::RowMismatch { features, labels } => write!(
                f,
                "{} feature rows but {} label rows",
                features, labels
            ),
            DataError::LabelColumns { cols } => {
                write!(f, "labels must be a single column, got {}", cols)
            }
        }
    }
}

impl std::error::Error for DataError {}

/// Failures during a training run.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainError {
    Data(DataError),
    FeatureMismatch { expected: usize, got: usize },
    /// A gradient was produced for a parameter the store does not hold.
    UnknownParameter(ParamId),
    /// Adam's bias-corrected second moment is zero while the first is not.
    ZeroSecondMoment(ParamId),
    /// A parameter became NaN or infinite after an update.
    NonFinite(ParamId),
}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainError::Data(e) => write!(f, "invalid training data: {}", e),
            TrainError::FeatureMismatch { expected, got } => write!(
                f,
                "network expects {} features, batch has {}",
                expected, got
            ),
            TrainError::UnknownParameter(id) => write!(f, "no parameter named {}", id),
            TrainError::ZeroSecondMoment(id) => write!(
                f,
                "second moment of {} is zero, the adaptive update is undefined",
                id
            ),
            TrainError::NonFinite(id) => write!(f, "parameter {} is no longer finite", id),
        }
    }
}

impl std::error::Error for TrainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrainError::Data(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DataError> for TrainError {
    fn from(e: DataError) -> Self {
        TrainError::Data(e)
    }
}
