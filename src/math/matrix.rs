use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::ops::{Add, Sub, Mul};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![value; cols]; rows]
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Draw two independent uniform samples in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Xavier initialization: samples from N(0, sqrt(1 / inputs)).
    ///
    /// Shape: (inputs, outputs), so that `batch * weights` maps a row of
    /// `inputs` features onto `outputs` neurons. Draws from the caller's RNG,
    /// so a seeded generator gives reproducible weights.
    pub fn xavier<R: Rng + ?Sized>(inputs: usize, outputs: usize, rng: &mut R) -> Matrix {
        let std_dev = (1.0 / inputs as f64).sqrt();
        let mut res = Matrix::zeros(inputs, outputs);
        for i in 0..inputs {
            for j in 0..outputs {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        let cols = data.first().map_or(0, |row| row.len());
        assert!(
            data.iter().all(|row| row.len() == cols),
            "All rows must have the same length"
        );
        Matrix {
            rows: data.len(),
            cols,
            data
        }
    }

    /// Builds a single-column matrix from a slice of values.
    pub fn column(values: &[f64]) -> Matrix {
        Matrix::from_data(values.iter().map(|&v| vec![v]).collect())
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect()
        }
    }

    /// Combines two same-shape matrices element by element.
    pub fn zip_map<F>(&self, other: &Matrix, functor: F) -> Matrix
    where
        F: Fn(f64, f64) -> f64,
    {
        assert_eq!(self.shape(), other.shape(), "Matrices are of incorrect sizes");
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(other.data.iter())
                .map(|(row_a, row_b)| {
                    row_a.iter().zip(row_b.iter()).map(|(&a, &b)| functor(a, b)).collect()
                })
                .collect()
        }
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, other: &Matrix) -> Matrix {
        self.zip_map(other, |a, b| a * b)
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    /// Applies `functor(x, row[j])` to every element in column `j`, where
    /// `row` is a (1, cols) matrix broadcast down all rows.
    pub fn broadcast_row<F>(&self, row: &Matrix, functor: F) -> Matrix
    where
        F: Fn(f64, f64) -> f64,
    {
        assert!(
            row.rows == 1 && (row.cols == self.cols || row.cols == 1),
            "Row of shape {:?} cannot broadcast over {:?}", row.shape(), self.shape()
        );
        let mut res = self.clone();
        for r in res.data.iter_mut() {
            for (j, x) in r.iter_mut().enumerate() {
                let b = if row.cols == 1 { row.data[0][0] } else { row.data[0][j] };
                *x = functor(*x, b);
            }
        }
        res
    }

    /// Column sums, shape (1, cols).
    pub fn sum_rows(&self) -> Matrix {
        let mut res = Matrix::zeros(1, self.cols);
        for row in &self.data {
            for (j, x) in row.iter().enumerate() {
                res.data[0][j] += x;
            }
        }
        res
    }

    /// Column means, shape (1, cols).
    pub fn mean_rows(&self) -> Matrix {
        self.sum_rows().scale(1.0 / self.rows as f64)
    }

    /// Population variance of every column, shape (1, cols).
    pub fn variance_rows(&self) -> Matrix {
        let mean = self.mean_rows();
        self.broadcast_row(&mean, |x, m| (x - m).powi(2)).mean_rows()
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().flatten().sum()
    }

    /// Copies rows `start..end` (clamped to the row count).
    pub fn slice_rows(&self, start: usize, end: usize) -> Matrix {
        let end = end.min(self.rows);
        let start = start.min(end);
        Matrix {
            rows: end - start,
            cols: self.cols,
            data: self.data[start..end].to_vec()
        }
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().flatten().all(|x| x.is_finite())
    }

    fn matmul(&self, rhs: &Matrix) -> Matrix {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        res
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }
        self.zip_map(rhs, |a, b| a + b)
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        &self - &rhs
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }
        self.zip_map(rhs, |a, b| a - b)
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        self.matmul(&rhs)
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        self.matmul(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn column_statistics() {
        let m = Matrix::from_data(vec![
            vec![1.0, 2.0],
            vec![3.0, 2.0],
            vec![5.0, 2.0],
        ]);
        assert_eq!(m.sum_rows().data, vec![vec![9.0, 6.0]]);
        assert_eq!(m.mean_rows().data, vec![vec![3.0, 2.0]]);
        let var = m.variance_rows();
        assert!((var.data[0][0] - 8.0 / 3.0).abs() < 1e-12);
        assert_eq!(var.data[0][1], 0.0);
    }

    #[test]
    fn broadcast_bias_over_rows() {
        let m = Matrix::zeros(3, 2);
        let bias = Matrix::from_data(vec![vec![1.0, -1.0]]);
        let out = m.broadcast_row(&bias, |x, b| x + b);
        assert!(out.data.iter().all(|row| row == &vec![1.0, -1.0]));

        let scalar = Matrix::from_data(vec![vec![0.5]]);
        let out = m.broadcast_row(&scalar, |x, b| x + b);
        assert!(out.data.iter().flatten().all(|&x| x == 0.5));
    }

    #[test]
    fn slice_rows_clamps_final_batch() {
        let m = Matrix::column(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let tail = m.slice_rows(4, 8);
        assert_eq!(tail.shape(), (1, 1));
        assert_eq!(tail.data[0][0], 5.0);
    }

    #[test]
    fn xavier_is_reproducible_for_a_seed() {
        let a = Matrix::xavier(2, 3, &mut StdRng::seed_from_u64(7));
        let b = Matrix::xavier(2, 3, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_eq!(a.shape(), (2, 3));
    }

    #[test]
    fn matmul_of_references() {
        let a = Matrix::from_data(vec![vec![1.0, 2.0]]);
        let b = Matrix::from_data(vec![vec![3.0], vec![4.0]]);
        assert_eq!((&a * &b).data, vec![vec![11.0]]);
    }
}
