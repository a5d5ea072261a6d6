use crate::error::TrainError;
use crate::network::params::{Gradients, Parameters};

pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// θ ← θ − lr·g for every parameter that has a gradient. Nothing is
    /// written back unless every updated value is finite.
    pub fn step(&self, params: &mut Parameters, gradients: &Gradients) -> Result<(), TrainError> {
        let mut staged = Vec::with_capacity(gradients.len());
        for (id, grad) in gradients.iter() {
            let current = params.value(*id).ok_or(TrainError::UnknownParameter(*id))?;
            let next = current - &grad.scale(self.learning_rate);
            if !next.is_finite() {
                return Err(TrainError::NonFinite(*id));
            }
            staged.push((*id, next));
        }
        for (id, value) in staged {
            if let Some(param) = params.get_mut(id) {
                param.value = value;
            }
        }
        Ok(())
    }
}
