use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Largest f64 below 1. Sigmoid saturates to exactly 0 or 1 in f64 once
/// |x| passes ~37, so its output is clamped to stay strictly inside (0, 1).
const SIGMOID_MAX: f64 = 1.0 - f64::EPSILON / 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
}

impl ActivationFunction {
    /// Element-wise activation.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                (1.0 / (1.0 + E.powf(-x))).clamp(f64::MIN_POSITIVE, SIGMOID_MAX)
            },
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
        }
    }

    /// Element-wise derivative with respect to the pre-activation `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            },
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
        }
    }

    /// Same derivative, written in terms of the activation's output `a = f(x)`.
    ///
    /// Backprop only keeps the activated hidden layer around, so this is the
    /// form the gradient computation uses: σ'(x) = a·(1 − a), and ReLU's slope
    /// is 1 wherever the output is positive.
    pub fn derivative_from_output(&self, a: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => a * (1.0 - a),
            ActivationFunction::ReLU => if a > 0.0 { 1.0 } else { 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_stays_in_open_unit_interval() {
        for &x in &[-30.0, -5.0, -0.1, 0.0, 0.1, 5.0, 30.0] {
            let y = ActivationFunction::Sigmoid.function(x);
            assert!(y > 0.0 && y < 1.0, "sigmoid({x}) = {y}");
        }
        assert_eq!(ActivationFunction::Sigmoid.function(0.0), 0.5);
    }

    #[test]
    fn sigmoid_saturation_stays_inside_unit_interval() {
        for &x in &[-1e6, -800.0, -40.0, 40.0, 800.0, 1e6, f64::MAX, f64::MIN] {
            let y = ActivationFunction::Sigmoid.function(x);
            assert!(y > 0.0 && y < 1.0, "sigmoid({x}) = {y}");
        }
        assert_eq!(ActivationFunction::Sigmoid.function(40.0), SIGMOID_MAX);
        assert_eq!(ActivationFunction::Sigmoid.function(-800.0), f64::MIN_POSITIVE);
    }

    #[test]
    fn relu_is_non_negative_and_identity_above_zero() {
        for &x in &[-3.0, -1e-9, 0.0, 1e-9, 2.5, 100.0] {
            let y = ActivationFunction::ReLU.function(x);
            assert!(y >= 0.0);
            if x > 0.0 {
                assert_eq!(y, x);
            }
        }
    }

    #[test]
    fn output_form_matches_input_form() {
        for &x in &[-2.0, -0.5, 0.3, 1.7] {
            for act in [ActivationFunction::Sigmoid, ActivationFunction::ReLU] {
                let a = act.function(x);
                assert!((act.derivative(x) - act.derivative_from_output(a)).abs() < 1e-12);
            }
        }
    }
}
