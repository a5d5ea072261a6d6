use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::data::Dataset;
use crate::error::DataError;
use crate::math::matrix::Matrix;

/// 1 when both inputs agree (AND or NOR is true), else 0.
pub fn equality_label(a: f64, b: f64) -> f64 {
    if a == b { 1.0 } else { 0.0 }
}

/// `n` random binary input pairs labelled with `equality_label`.
pub fn equality_dataset(n: usize, seed: u64) -> Result<Dataset, DataError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let features: Vec<Vec<f64>> = (0..n)
        .map(|_| vec![rng.gen_range(0..2) as f64, rng.gen_range(0..2) as f64])
        .collect();
    let labels: Vec<f64> = features.iter().map(|row| equality_label(row[0], row[1])).collect();

    Dataset::new(Matrix::from_data(features), Matrix::column(&labels))
}

/// Fixed 16-example evaluation set.
pub fn held_out() -> Dataset {
    let pattern = [
        [1.0, 1.0], [0.0, 1.0], [1.0, 1.0], [0.0, 0.0],
        [1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.0, 0.0],
    ];
    let features: Vec<Vec<f64>> = pattern.iter().chain(pattern.iter()).map(|p| p.to_vec()).collect();
    let labels = [
        1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0,
        1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0,
    ];

    Dataset {
        features: Matrix::from_data(features),
        labels: Matrix::column(&labels),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_labels_follow_the_rule() {
        let data = equality_dataset(200, 3).unwrap();
        assert_eq!(data.len(), 200);
        assert_eq!(data.n_features(), 2);
        for (x, y) in data.features().data.iter().zip(data.labels().data.iter()) {
            assert!(x.iter().all(|&v| v == 0.0 || v == 1.0));
            assert_eq!(y[0], equality_label(x[0], x[1]));
        }
    }

    #[test]
    fn held_out_labels_follow_the_rule() {
        let data = held_out();
        assert_eq!(data.len(), 16);
        for (x, y) in data.features().data.iter().zip(data.labels().data.iter()) {
            assert_eq!(y[0], equality_label(x[0], x[1]));
        }
    }

    #[test]
    fn generation_is_seeded() {
        assert_eq!(equality_dataset(50, 9), equality_dataset(50, 9));
        assert_eq!(equality_dataset(0, 9), Err(DataError::Empty));
    }
}
