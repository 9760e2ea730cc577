// LU decomposition with partial (row) pivoting.

use crate::error::Result;
use crate::matrix::{Matrix, MatrixBuilder};
use crate::scalar::ONE;
use log::debug;

/// Factors of `Pᵗ·L·U = A`.
#[derive(Clone, Debug, PartialEq)]
pub struct LupResult {
    /// Unit lower triangular, `rows x min(rows, cols)`.
    pub l: Matrix,
    /// Upper triangular, `min(rows, cols) x cols`.
    pub u: Matrix,
    /// Row permutation, `rows x rows`.
    pub p: Matrix,
}

/// Doolittle elimination with partial pivoting.
///
/// Columns whose remaining entries are all exactly zero are skipped, so
/// singular and rectangular inputs still factor.
pub fn lup(a: &Matrix) -> Result<LupResult> {
    let (rows, cols) = a.dim();
    debug!("lup: {}x{}", rows, cols);

    let mut l = MatrixBuilder::zeros(rows, rows);
    let mut u = MatrixBuilder::from_matrix(a);
    let mut p = MatrixBuilder::from_owned(Matrix::identity(rows, rows));

    for k in 0..cols.min(rows) {
        let (pivot, max) = u.max_row_number(k, k);
        if max == 0.0 {
            continue;
        }
        if pivot != k {
            l.swap_rows(k, pivot);
            u.swap_rows(k, pivot);
            p.swap_rows(k, pivot);
        }
        let diagonal = u.get(k, k);
        for row in k + 1..rows {
            let factor = u.get(row, k) / diagonal;
            l.set(row, k, factor);
            for col in k..cols {
                let value = u.get(row, col) - u.get(k, col) * factor;
                u.set(row, col, value);
            }
        }
    }

    let min = rows.min(cols);
    l.resize(rows, min)?;
    u.resize(min, cols)?;
    for i in 0..min {
        l.set(i, i, ONE);
    }
    Ok(LupResult {
        l: l.build(),
        u: u.build(),
        p: p.build(),
    })
}

impl Matrix {
    /// See [`lup`].
    pub fn lup(&self) -> Result<LupResult> {
        lup(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(f: &LupResult) -> Matrix {
        f.p.transpose().mul(&f.l).unwrap().mul(&f.u).unwrap()
    }

    #[test]
    fn square_factorization() {
        let a = Matrix::create([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 10.0]]).unwrap();
        let f = a.lup().unwrap();
        assert!(reconstruct(&f).equals(&a, Some(1e-10)));
        let l = f.l.as_array();
        let u = f.u.as_array();
        for r in 0..3 {
            assert_eq!(l[[r, r]], ONE);
            for c in r + 1..3 {
                assert_eq!(l[[r, c]].norm(), 0.0);
            }
            for c in 0..r {
                assert!(u[[r, c]].norm() < 1e-12);
            }
        }
        assert!(f.p.is_orthogonal(None));
    }

    #[test]
    fn rectangular_shapes() {
        let wide = Matrix::create([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        let f = wide.lup().unwrap();
        assert_eq!(f.l.dim(), (2, 2));
        assert_eq!(f.u.dim(), (2, 3));
        assert!(reconstruct(&f).equals(&wide, Some(1e-10)));

        let tall = wide.transpose();
        let f = tall.lup().unwrap();
        assert_eq!(f.l.dim(), (3, 2));
        assert_eq!(f.u.dim(), (2, 2));
        assert_eq!(f.p.dim(), (3, 3));
        assert!(reconstruct(&f).equals(&tall, Some(1e-10)));
    }

    #[test]
    fn singular_input_skips_zero_columns() {
        let a = Matrix::create([[0.0, 1.0], [0.0, 2.0]]).unwrap();
        let f = a.lup().unwrap();
        assert!(reconstruct(&f).equals(&a, Some(1e-12)));
    }
}
