//! Dense row-major matrix used at the model boundary.
//!
//! Columns are positional; callers attach meaning (vocab slots, topics) to
//! indices. Constructors return None for ragged or inconsistent input.

use serde::{Deserialize, Serialize};

use super::simplex::normalize;
use super::stable::compensated_sum;

/// Dense row-major `rows x cols` matrix of f64.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// All-zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build from a flat row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != rows * cols {
            return None;
        }
        Some(Self { rows, cols, data })
    }

    /// Build from nested rows. All rows must share one length.
    ///
    /// An empty row list yields a `0 x 0` matrix.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let n_rows = rows.len();
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n_rows * cols);
        for row in rows {
            if row.len() != cols {
                return None;
            }
            data.extend(row);
        }
        Some(Self {
            rows: n_rows,
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.data[row * self.cols + col])
    }

    /// Borrow one row. Panics if `row` is out of bounds.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Mutably borrow one row. Panics if `row` is out of bounds.
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics; a zero-column matrix still has `rows` empty rows.
        (0..self.rows).map(move |r| self.row(r))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Sum of each row.
    pub fn row_sums(&self) -> Vec<f64> {
        self.iter_rows().map(compensated_sum).collect()
    }

    /// Sum of each column.
    pub fn col_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.cols];
        for row in self.iter_rows() {
            for (s, v) in sums.iter_mut().zip(row) {
                *s += v;
            }
        }
        sums
    }

    /// Sum of every entry.
    pub fn total(&self) -> f64 {
        compensated_sum(&self.row_sums())
    }

    /// Divide every row by its own sum.
    ///
    /// Returns `Err(row)` with the first row whose sum is zero, negative,
    /// or not finite.
    pub fn normalize_rows(&self) -> Result<Matrix, usize> {
        let mut out = Matrix::zeros(self.rows, self.cols);
        for r in 0..self.rows {
            let normalized = normalize(self.row(r)).ok_or(r)?;
            out.row_mut(r).copy_from_slice(&normalized);
        }
        Ok(out)
    }

    /// Matrix product `self @ other`.
    ///
    /// Returns None when inner dimensions disagree.
    pub fn matmul(&self, other: &Matrix) -> Option<Matrix> {
        if self.cols != other.rows {
            return None;
        }
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            let lhs = self.row(i);
            let dst = out.row_mut(i);
            for (k, &a) in lhs.iter().enumerate() {
                if a == 0.0 {
                    continue;
                }
                for (d, &b) in dst.iter_mut().zip(other.row(k)) {
                    *d += a * b;
                }
            }
        }
        Some(out)
    }

    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.data[c * self.rows + r] = self.data[r * self.cols + c];
            }
        }
        out
    }

    /// Apply `f` to every entry.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_rejects_ragged() {
        assert!(Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_none());
        let m = Matrix::from_rows(vec![]).unwrap();
        assert_eq!(m.shape(), (0, 0));
    }

    #[test]
    fn row_and_col_sums() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.row_sums(), vec![6.0, 15.0]);
        assert_eq!(m.col_sums(), vec![5.0, 7.0, 9.0]);
        assert_eq!(m.total(), 21.0);
    }

    #[test]
    fn normalize_rows_reports_zero_row() {
        let m = Matrix::from_rows(vec![vec![1.0, 1.0], vec![0.0, 0.0]]).unwrap();
        assert_eq!(m.normalize_rows(), Err(1));

        let ok = Matrix::from_rows(vec![vec![1.0, 3.0]]).unwrap();
        assert_eq!(ok.normalize_rows().unwrap().row(0), &[0.25, 0.75]);
    }

    #[test]
    fn matmul_known_product() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![0.0, 1.0]]).unwrap();
        let b = Matrix::from_rows(vec![vec![1.0, 0.0, 1.0], vec![2.0, 1.0, 0.0]]).unwrap();
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.row(0), &[5.0, 2.0, 1.0]);
        assert_eq!(c.row(1), &[2.0, 1.0, 0.0]);
        assert!(b.matmul(&b).is_none());
    }

    #[test]
    fn transpose_roundtrip() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0]]).unwrap();
        let t = a.transpose();
        assert_eq!(t.shape(), (3, 1));
        assert_eq!(t.get(2, 0), Some(3.0));
        assert_eq!(t.transpose(), a);
    }
}
