pub mod logic;

use crate::error::DataError;
use crate::math::matrix::Matrix;

pub use logic::{equality_dataset, held_out};

/// Row-aligned feature and label matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Matrix,
    labels: Matrix,
}

impl Dataset {
    pub fn new(features: Matrix, labels: Matrix) -> Result<Dataset, DataError> {
        if features.rows == 0 {
            return Err(DataError::Empty);
        }
        if features.rows != labels.rows {
            return Err(DataError::RowMismatch { features: features.rows, labels: labels.rows });
        }
        if labels.cols != 1 {
            return Err(DataError::LabelColumns { cols: labels.cols });
        }
        Ok(Dataset { features, labels })
    }

    pub fn features(&self) -> &Matrix {
        &self.features
    }

    pub fn labels(&self) -> &Matrix {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.features.rows
    }

    pub fn is_empty(&self) -> bool {
        self.features.rows == 0
    }

    pub fn n_features(&self) -> usize {
        self.features.cols
    }

    /// Contiguous mini-batches in row order; the last one may be short.
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = (Matrix, Matrix)> + '_ {
        assert!(batch_size > 0, "batch_size must be at least 1");
        (0..self.len()).step_by(batch_size).map(move |start| {
            let end = start + batch_size;
            (self.features.slice_rows(start, end), self.labels.slice_rows(start, end))
        })
    }
}
