//! Dense square matrices for zone-pair data.
//!
//! Distance and congestion tables are small (`zones × zones`, a few dozen
//! zones at most) and read-only for the lifetime of a run, so a flat
//! row-major `Vec<f64>` is all the storage we need. The serde representation
//! is the natural nested-rows form used by scenario files.

use serde::{Deserialize, Serialize};

/// Dense `n × n` matrix of `f64`, stored row-major.
///
/// Serializes as nested rows (`Vec<Vec<f64>>`), which is how scenario files
/// spell out distance and congestion tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct SquareMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SquareMatrix {
    /// Create an `n × n` matrix of zeros.
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// Build from nested rows. Every row must have length `rows.len()`.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, String> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(format!(
                    "matrix row {} has length {}, expected {}",
                    i,
                    row.len(),
                    n
                ));
            }
            data.extend_from_slice(&row);
        }
        Ok(Self { n, data })
    }

    /// Matrix dimension (number of rows == number of columns).
    #[inline]
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Entry at row `i`, column `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Mutable entry access, used by builders and tests.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.n + j] = value;
    }

    /// True if every diagonal entry is exactly zero.
    pub fn diagonal_is_zero(&self) -> bool {
        (0..self.n).all(|i| self.get(i, i) == 0.0)
    }

    /// True if no entry is negative (NaN entries fail this check).
    pub fn is_non_negative(&self) -> bool {
        self.data.iter().all(|v| *v >= 0.0)
    }
}

impl TryFrom<Vec<Vec<f64>>> for SquareMatrix {
    type Error = String;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        SquareMatrix::from_rows(rows)
    }
}

impl From<SquareMatrix> for Vec<Vec<f64>> {
    fn from(m: SquareMatrix) -> Self {
        (0..m.n)
            .map(|i| m.data[i * m.n..(i + 1) * m.n].to_vec())
            .collect()
    }
}
