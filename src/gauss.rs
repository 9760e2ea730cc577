// Gaussian elimination kernel: pivot search, linear dependence, rank,
// determinant, inverse and linear solve.

use crate::config::KernelConfig;
use crate::error::{MatrixError, Result};
use crate::matrix::{Matrix, MatrixBuilder};
use crate::scalar::{tolerance_or_default, ComplexScalar, ONE, ZERO};
use log::{debug, trace};
use num_complex::Complex64;

/// Pivots at or below `tolerance * scale` count as zero, where `scale` is
/// the largest entry norm of the input.
fn pivot_floor(matrix: &Matrix, tolerance: f64) -> f64 {
    let scale = matrix
        .as_array()
        .iter()
        .map(|z| z.norm_value())
        .fold(0.0, f64::max);
    tolerance * scale
}

/// Row indices that are linear combinations of the other rows, ascending.
///
/// Rows are consumed greedily column by column: the unconsumed row with the
/// largest entry in the current column becomes the pivot and is eliminated
/// from the remaining rows. Whatever is left once every column has been
/// visited is dependent.
pub fn linear_dependent_rows(matrix: &Matrix, epsilon: f64) -> Vec<usize> {
    let mut m = MatrixBuilder::from_matrix(matrix);
    let cols = m.cols();
    let mut remaining: Vec<usize> = (0..m.rows()).collect();

    for col_target in 0..cols {
        let mut pivot_key = 0;
        let mut pivot_max = 0.0;
        for (key, &row) in remaining.iter().enumerate() {
            let norm = m.get(row, col_target).norm_value();
            if norm > pivot_max {
                pivot_max = norm;
                pivot_key = key;
            }
        }
        if pivot_max <= epsilon {
            continue;
        }
        let pivot_row = remaining.remove(pivot_key);
        if col_target == cols - 1 {
            break;
        }
        let pivot = m.get(pivot_row, col_target);
        for &row in &remaining {
            let factor = m.get(row, col_target) / pivot;
            for col in col_target..cols {
                let value = m.get(row, col) - m.get(pivot_row, col) * factor;
                m.set(row, col, value);
            }
        }
    }
    remaining
}

impl Matrix {
    /// Row in `from..rows` with the largest entry norm in `column`, and that norm.
    pub fn max_row_number(&self, column: usize, from: usize) -> Result<(usize, f64)> {
        if column >= self.cols() || from >= self.rows() {
            return Err(MatrixError::InvalidArgument {
                op: "max_row_number",
                message: format!(
                    "column {} / row {} out of range for {}x{}",
                    column,
                    from,
                    self.rows(),
                    self.cols()
                ),
            });
        }
        Ok(MatrixBuilder::from_matrix(self).max_row_number(column, from))
    }

    /// See [`linear_dependent_rows`].
    pub fn linear_dependent_rows(&self, epsilon: Option<f64>) -> Vec<usize> {
        linear_dependent_rows(self, tolerance_or_default(epsilon))
    }

    /// Number of linearly independent rows.
    ///
    /// ```
    /// use complex_linalg::Matrix;
    ///
    /// let a = Matrix::create([[2.0, 3.0, 4.0], [1.0, 4.0, 2.0], [2.0, 1.0, 4.0]]).unwrap();
    /// assert_eq!(a.rank(None), 2);
    /// ```
    pub fn rank(&self, epsilon: Option<f64>) -> usize {
        self.rows() - self.linear_dependent_rows(epsilon).len()
    }

    /// Determinant via LU elimination with partial pivoting.
    pub fn det(&self) -> Result<Complex64> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare {
                op: "det",
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        let n = self.rows();
        let mut m = MatrixBuilder::from_matrix(self);
        let mut det = ONE;
        for k in 0..n {
            let (pivot_row, max) = m.max_row_number(k, k);
            if max == 0.0 {
                return Ok(ZERO);
            }
            if pivot_row != k {
                m.swap_rows(k, pivot_row);
                det = -det;
            }
            let pivot = m.get(k, k);
            det *= pivot;
            for row in k + 1..n {
                let factor = m.get(row, k) / pivot;
                for col in k..n {
                    let value = m.get(row, col) - m.get(k, col) * factor;
                    m.set(row, col, value);
                }
            }
        }
        Ok(det)
    }

    /// Inverse with the default configuration.
    pub fn inv(&self) -> Result<Matrix> {
        self.inv_with(&KernelConfig::default())
    }

    /// Inverse by Gauss-Jordan elimination with partial pivoting.
    ///
    /// Scalars and diagonal matrices take the reciprocal of their entries.
    pub fn inv_with(&self, config: &KernelConfig) -> Result<Matrix> {
        let singular = MatrixError::SingularOrRankDeficient { op: "inv" };
        if self.is_scalar() {
            let x = self.scalar();
            if x.is_zero_eps(0.0) {
                return Err(singular);
            }
            return Ok(Matrix::scalar_value(x.inv_value()));
        }
        if !self.is_square() {
            return Err(MatrixError::NotSquare {
                op: "inv",
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        let n = self.rows();
        if self.is_diagonal(Some(0.0)) {
            let mut y = MatrixBuilder::from_matrix(self);
            for i in 0..n {
                let x = y.get(i, i);
                if x.is_zero_eps(0.0) {
                    return Err(singular);
                }
                y.set(i, i, x.inv_value());
            }
            return Ok(y.build());
        }

        debug!("inv: Gauss-Jordan on {}x{}", n, n);
        let floor = pivot_floor(self, config.tolerance);
        let mut m = MatrixBuilder::from_matrix(self);
        m.concat_right(&Matrix::identity(n, n))?;
        let width = m.cols();
        for k in 0..n {
            let (pivot_row, max) = m.max_row_number(k, k);
            if max <= floor {
                trace!("inv: pivot {} vanished ({:e})", k, max);
                return Err(singular);
            }
            m.swap_rows(k, pivot_row);
            let normalize = m.get(k, k).inv_value();
            for col in k..width {
                let value = m.get(k, col) * normalize;
                m.set(k, col, value);
            }
            for row in 0..n {
                if row == k {
                    continue;
                }
                let factor = m.get(row, k);
                for col in k..width {
                    let value = m.get(row, col) - m.get(k, col) * factor;
                    m.set(row, col, value);
                }
            }
        }
        Ok(Matrix::filled(n, n, |(r, c)| m.get(r, n + c)))
    }

    /// Solves `self · x = b` with the default configuration.
    pub fn linsolve(&self, b: &Matrix) -> Result<Matrix> {
        self.linsolve_with(b, &KernelConfig::default())
    }

    /// Solves `self · x = b` for a column vector `b` by elimination with
    /// partial pivoting and back substitution.
    pub fn linsolve_with(&self, b: &Matrix, config: &KernelConfig) -> Result<Matrix> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare {
                op: "linsolve",
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        if b.rows() != self.rows() || b.cols() != 1 {
            return Err(MatrixError::DimensionMismatch {
                op: "linsolve",
                left: self.dim(),
                right: b.dim(),
            });
        }
        let n = self.rows();
        debug!("linsolve: {}x{} system", n, n);
        let floor = pivot_floor(self, config.tolerance);
        let mut m = MatrixBuilder::from_matrix(self);
        m.concat_right(b)?;

        for k in 0..n {
            let (pivot_row, max) = m.max_row_number(k, k);
            if max <= floor {
                return Err(MatrixError::SingularOrRankDeficient { op: "linsolve" });
            }
            m.swap_rows(k, pivot_row);
            let normalize = m.get(k, k).inv_value();
            for col in k..=n {
                let value = m.get(k, col) * normalize;
                m.set(k, col, value);
            }
            for row in k + 1..n {
                let factor = m.get(row, k);
                for col in k..=n {
                    let value = m.get(row, col) - m.get(k, col) * factor;
                    m.set(row, col, value);
                }
            }
        }

        let mut x = vec![ZERO; n];
        for row in (0..n).rev() {
            let mut value = m.get(row, n);
            for j in row + 1..n {
                value -= m.get(row, j) * x[j];
            }
            x[row] = value / m.get(row, row);
        }
        Ok(Matrix::filled(n, 1, |(r, _)| x[r]))
    }
}
