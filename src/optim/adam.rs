use serde::{Serialize, Deserialize};

use crate::error::{ConfigError, TrainError};
use crate::math::matrix::Matrix;
use crate::network::params::{Gradients, Moment, ParamId, Parameters};

/// Decay rates and denominator constant for `Adam`.
///
/// `denominator_epsilon` defaults to 0, so the update is
/// `lr · m̂ / √v̂` with nothing added under the division.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdamConfig {
    pub beta1: f64,
    pub beta2: f64,
    #[serde(default)]
    pub denominator_epsilon: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        AdamConfig { beta1: 0.9, beta2: 0.999, denominator_epsilon: 0.0 }
    }
}

impl AdamConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("beta1", self.beta1), ("beta2", self.beta2)] {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::InvalidDecay { name, value });
            }
        }
        if !(self.denominator_epsilon >= 0.0 && self.denominator_epsilon.is_finite()) {
            return Err(ConfigError::InvalidDecay {
                name: "denominator_epsilon",
                value: self.denominator_epsilon,
            });
        }
        Ok(())
    }
}

/// Adaptive-moment optimizer.
///
/// The timestep counts mini-batch updates over the optimizer's whole
/// lifetime; it is never reset between epochs.
pub struct Adam {
    pub learning_rate: f64,
    pub config: AdamConfig,
    timestep: u64,
}

impl Adam {
    pub fn new(learning_rate: f64, config: AdamConfig) -> Adam {
        Adam { learning_rate, config, timestep: 0 }
    }

    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    /// One update for every parameter that has a gradient:
    ///
    /// ```text
    /// m ← β1·m + (1 − β1)·g
    /// v ← β2·v + (1 − β2)·g²
    /// θ ← θ − lr · (m / (1 − β1^t)) / (√(v / (1 − β2^t)) + ε)
    /// ```
    ///
    /// Every update is computed before any is written back, so on error the
    /// parameters, their moments and the timestep are left as they were.
    pub fn step(&mut self, params: &mut Parameters, gradients: &Gradients) -> Result<(), TrainError> {
        let t = self.timestep + 1;
        let AdamConfig { beta1, beta2, denominator_epsilon } = self.config;

        let mut staged = Vec::with_capacity(gradients.len());
        for (id, grad) in gradients.iter() {
            let mut param = params.get(*id).ok_or(TrainError::UnknownParameter(*id))?.clone();
            assert_eq!(
                grad.shape(), param.value.shape(),
                "gradient shape does not match parameter {}", id
            );

            param.update_moment(Moment::First, grad, beta1);
            param.update_moment(Moment::Second, grad, beta2);

            let m_hat = param.bias_corrected(Moment::First, beta1, t);
            let v_hat = param.bias_corrected(Moment::Second, beta2, t);
            let update = adaptive_update(*id, &m_hat, &v_hat, denominator_epsilon)?;

            param.value = &param.value - &update.scale(self.learning_rate);
            if !param.value.is_finite() {
                return Err(TrainError::NonFinite(*id));
            }
            staged.push((*id, param));
        }

        for (id, param) in staged {
            if let Some(slot) = params.get_mut(id) {
                *slot = param;
            }
        }
        self.timestep = t;

        log::trace!("adam step {} updated {} tensors", t, gradients.len());
        Ok(())
    }
}

/// m̂ / (√v̂ + ε), element-wise.
///
/// A zero denominator only gives a zero step when m̂ is zero as well (every
/// gradient so far was zero); otherwise the update is undefined and reported.
fn adaptive_update(
    id: ParamId,
    m_hat: &Matrix,
    v_hat: &Matrix,
    epsilon: f64,
) -> Result<Matrix, TrainError> {
    let mut update = Matrix::zeros(m_hat.rows, m_hat.cols);
    for i in 0..m_hat.rows {
        for j in 0..m_hat.cols {
            let denominator = v_hat.data[i][j].sqrt() + epsilon;
            let m = m_hat.data[i][j];
            update.data[i][j] = if denominator == 0.0 {
                if m != 0.0 {
                    log::warn!("{}: zero second moment with first moment {}", id, m);
                    return Err(TrainError::ZeroSecondMoment(id));
                }
                0.0
            } else {
                m / denominator
            };
        }
    }
    Ok(update)
}
