pub mod init;
pub mod network;
pub mod params;
pub mod spec;

pub use init::{initialise_params, layer_sizes_from_column};
pub use network::{ForwardPass, Network};
pub use params::{Gradients, Moment, Param, ParamId, ParamKind, Parameters};
pub use spec::ModelSpec;
