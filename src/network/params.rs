use std::fmt;

use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;

/// What role a tensor plays inside its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    Weight,
    Bias,
    /// Batch-norm scale (gamma).
    Scale,
    /// Batch-norm shift (beta).
    Shift,
}

/// Typed parameter key. `layer` is 1-based: `w1`/`b1` connect the input to the
/// hidden layer, `gamma1`/`beta1` normalize hidden layer 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamId {
    pub layer: usize,
    pub kind: ParamKind,
}

impl ParamId {
    pub fn weight(layer: usize) -> ParamId {
        ParamId { layer, kind: ParamKind::Weight }
    }

    pub fn bias(layer: usize) -> ParamId {
        ParamId { layer, kind: ParamKind::Bias }
    }

    pub fn scale(layer: usize) -> ParamId {
        ParamId { layer, kind: ParamKind::Scale }
    }

    pub fn shift(layer: usize) -> ParamId {
        ParamId { layer, kind: ParamKind::Shift }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            ParamKind::Weight => "w",
            ParamKind::Bias => "b",
            ParamKind::Scale => "gamma",
            ParamKind::Shift => "beta",
        };
        write!(f, "{}{}", prefix, self.layer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moment {
    First,
    Second,
}

/// A trainable tensor together with its Adam moment accumulators.
///
/// Both moments are created with the value's shape and start at zero, so
/// they always exist as a pair, whether or not Adam is in use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub value: Matrix,
    first_moment: Matrix,
    second_moment: Matrix,
}

impl Param {
    pub fn new(value: Matrix) -> Param {
        let (rows, cols) = value.shape();
        Param {
            value,
            first_moment: Matrix::zeros(rows, cols),
            second_moment: Matrix::zeros(rows, cols),
        }
    }

    pub fn moment(&self, moment: Moment) -> &Matrix {
        match moment {
            Moment::First => &self.first_moment,
            Moment::Second => &self.second_moment,
        }
    }

    /// Exponential moving average update: m ← β·m + (1 − β)·g for the first
    /// moment, v ← β·v + (1 − β)·g² for the second.
    pub fn update_moment(&mut self, moment: Moment, gradient: &Matrix, beta: f64) {
        match moment {
            Moment::First => {
                self.first_moment = self.first_moment
                    .zip_map(gradient, |m, g| beta * m + (1.0 - beta) * g);
            }
            Moment::Second => {
                self.second_moment = self.second_moment
                    .zip_map(gradient, |v, g| beta * v + (1.0 - beta) * g * g);
            }
        }
    }

    /// Moment divided by `1 − β^timestep`.
    pub fn bias_corrected(&self, moment: Moment, beta: f64, timestep: u64) -> Matrix {
        let correction = bias_correction(beta, timestep);
        self.moment(moment).map(|m| m / correction)
    }
}

/// `1 − β^t`; tends to 1 as the timestep grows.
pub fn bias_correction(beta: f64, timestep: u64) -> f64 {
    1.0 - beta.powi(timestep.min(i32::MAX as u64) as i32)
}

/// Ordered parameter store. Entries keep their insertion order so that
/// iteration (and therefore update order) is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameters {
    entries: Vec<(ParamId, Param)>,
}

impl Parameters {
    pub fn new() -> Parameters {
        Parameters { entries: Vec::new() }
    }

    /// Adds a parameter; replaces the value if the id is already present.
    pub fn insert(&mut self, id: ParamId, value: Matrix) {
        match self.get_mut(id) {
            Some(param) => *param = Param::new(value),
            None => self.entries.push((id, Param::new(value))),
        }
    }

    pub fn get(&self, id: ParamId) -> Option<&Param> {
        self.entries.iter().find(|(key, _)| *key == id).map(|(_, p)| p)
    }

    pub fn get_mut(&mut self, id: ParamId) -> Option<&mut Param> {
        self.entries.iter_mut().find(|(key, _)| *key == id).map(|(_, p)| p)
    }

    pub fn value(&self, id: ParamId) -> Option<&Matrix> {
        self.get(id).map(|p| &p.value)
    }

    pub fn contains(&self, id: ParamId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParamId, &Param)> {
        self.entries.iter().map(|(id, p)| (id, p))
    }

    pub fn ids(&self) -> impl Iterator<Item = ParamId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Gradients of one mini-batch, keyed the same way as `Parameters`.
#[derive(Debug, Clone, Default)]
pub struct Gradients {
    entries: Vec<(ParamId, Matrix)>,
}

impl Gradients {
    pub fn new() -> Gradients {
        Gradients { entries: Vec::new() }
    }

    pub fn insert(&mut self, id: ParamId, gradient: Matrix) {
        self.entries.retain(|(key, _)| *key != id);
        self.entries.push((id, gradient));
    }

    pub fn get(&self, id: ParamId) -> Option<&Matrix> {
        self.entries.iter().find(|(key, _)| *key == id).map(|(_, g)| g)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParamId, &Matrix)> {
        self.entries.iter().map(|(id, g)| (id, g))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_follow_layer_index() {
        assert_eq!(ParamId::weight(1).to_string(), "w1");
        assert_eq!(ParamId::bias(2).to_string(), "b2");
        assert_eq!(ParamId::scale(1).to_string(), "gamma1");
        assert_eq!(ParamId::shift(1).to_string(), "beta1");
    }

    #[test]
    fn moments_start_at_zero_with_value_shape() {
        let p = Param::new(Matrix::filled(2, 3, 0.7));
        for moment in [Moment::First, Moment::Second] {
            assert_eq!(p.moment(moment), &Matrix::zeros(2, 3));
        }
    }

    #[test]
    fn moment_updates_are_exponential_averages() {
        let mut p = Param::new(Matrix::zeros(1, 1));
        let g = Matrix::from_data(vec![vec![2.0]]);
        p.update_moment(Moment::First, &g, 0.9);
        p.update_moment(Moment::Second, &g, 0.999);
        assert!((p.moment(Moment::First).data[0][0] - 0.2).abs() < 1e-12);
        assert!((p.moment(Moment::Second).data[0][0] - 0.004).abs() < 1e-12);

        // After one step bias correction recovers the raw gradient statistics.
        assert!((p.bias_corrected(Moment::First, 0.9, 1).data[0][0] - 2.0).abs() < 1e-9);
        assert!((p.bias_corrected(Moment::Second, 0.999, 1).data[0][0] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn insert_replaces_existing_entry() {
        let mut params = Parameters::new();
        params.insert(ParamId::weight(1), Matrix::zeros(2, 2));
        params.insert(ParamId::weight(1), Matrix::zeros(3, 3));
        assert_eq!(params.len(), 1);
        assert_eq!(params.value(ParamId::weight(1)).map(Matrix::shape), Some((3, 3)));
        assert!(!params.contains(ParamId::bias(1)));
    }
}
