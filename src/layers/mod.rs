pub mod batch_norm;
pub mod dense;

pub use batch_norm::{batch_norm_backward, batch_norm_forward, NormCache, NormGradients};
pub use dense::{layer_forward, Normalization};
