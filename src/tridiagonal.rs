// Householder reduction of a real symmetric matrix to tridiagonal form.

use crate::config::KernelConfig;
use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use log::{debug, trace};
use ndarray::Array2;
use num_complex::Complex64;

/// Factors of `P·H·Pᵗ = A`.
#[derive(Clone, Debug, PartialEq)]
pub struct TridiagResult {
    /// Orthogonal transform.
    pub p: Matrix,
    /// Symmetric tridiagonal matrix with the eigenvalues of `A`.
    pub h: Matrix,
}

/// Real working form shared with the eigensolver.
pub(crate) struct Tridiagonal {
    pub(crate) p: Array2<f64>,
    /// Main diagonal, length `n`.
    pub(crate) diagonal: Vec<f64>,
    /// First off-diagonal, `off_diagonal[i] = H[i][i + 1]`, length `n - 1`.
    pub(crate) off_diagonal: Vec<f64>,
}

/// Rejects inputs outside the real symmetric square domain.
pub(crate) fn check_real_symmetric(a: &Matrix, op: &'static str, tolerance: f64) -> Result<()> {
    if !a.is_square() {
        return Err(MatrixError::NotSquare {
            op,
            rows: a.rows(),
            cols: a.cols(),
        });
    }
    if !a.is_symmetric(Some(tolerance)) {
        return Err(MatrixError::NotSymmetric { op });
    }
    if !a.is_real(Some(tolerance)) {
        return Err(MatrixError::ComplexUnsupported { op });
    }
    Ok(())
}

/// Householder tridiagonalization after Okumura's formulation.
///
/// Row `k` of the work array holds the reflector `v` (scaled so `vᵗv = 2`)
/// once step `k` is done; the upper triangle of the trailing block receives
/// the rank-2 update. Reflectors whose source norm is below `tolerance` are
/// zero and the step is skipped.
pub(crate) fn householder(a: &Array2<f64>, tolerance: f64) -> Tridiagonal {
    let n = a.nrows();
    let mut a = a.clone();
    let mut d = vec![0.0; n];
    let mut e = vec![0.0; n.saturating_sub(1)];

    for k in 0..n.saturating_sub(2) {
        d[k] = a[[k, k]];

        let mut y1 = (k + 1..n).map(|i| a[[k, i]] * a[[k, i]]).sum::<f64>().sqrt();
        if y1 >= tolerance {
            if a[[k, k + 1]] < 0.0 {
                y1 = -y1;
            }
            let v0 = a[[k, k + 1]] + y1;
            let t = 1.0 / (v0 * y1).sqrt();
            a[[k, k + 1]] = v0 * t;
            for i in k + 2..n {
                a[[k, i]] *= t;
            }
        } else {
            for i in k + 1..n {
                a[[k, i]] = 0.0;
            }
        }
        e[k] = -y1;
        if e[k].abs() < tolerance {
            trace!("householder: step {} has a zero reflector", k);
            continue;
        }

        // p = A·v over the trailing block, read from its upper triangle
        for i in k + 1..n {
            let mut s = 0.0;
            for j in k + 1..i {
                s += a[[j, i]] * a[[k, j]];
            }
            for j in i..n {
                s += a[[i, j]] * a[[k, j]];
            }
            d[i] = s;
        }
        let t = (k + 1..n).map(|i| a[[k, i]] * d[i]).sum::<f64>() / 2.0;
        for i in (k + 1..n).rev() {
            let p = a[[k, i]];
            let q = d[i] - t * p;
            d[i] = q;
            for j in i..n {
                let r = p * d[j] + q * a[[k, j]];
                a[[i, j]] -= r;
            }
        }
    }
    if n >= 2 {
        d[n - 2] = a[[n - 2, n - 2]];
        e[n - 2] = a[[n - 2, n - 1]];
    }
    if n >= 1 {
        d[n - 1] = a[[n - 1, n - 1]];
    }

    // accumulate the reflectors backwards; row k ends up as the unit vector e_k
    for k in (0..n).rev() {
        if k + 2 < n {
            for i in k + 1..n {
                let t: f64 = (k + 1..n).map(|j| a[[k, j]] * a[[i, j]]).sum();
                for j in k + 1..n {
                    a[[i, j]] -= t * a[[k, j]];
                }
            }
        }
        for j in 0..n {
            a[[k, j]] = if j == k { 1.0 } else { 0.0 };
        }
    }

    Tridiagonal {
        p: a.reversed_axes(),
        diagonal: d,
        off_diagonal: e,
    }
}

fn to_complex(a: &Array2<f64>) -> Matrix {
    Matrix::from_array_unchecked(a.mapv(|x| Complex64::new(x, 0.0)))
}

pub fn tridiagonalize(a: &Matrix) -> Result<TridiagResult> {
    tridiagonalize_with(a, &KernelConfig::default())
}

/// Reduces a real symmetric matrix to `P·H·Pᵗ` with `H` tridiagonal.
pub fn tridiagonalize_with(a: &Matrix, config: &KernelConfig) -> Result<TridiagResult> {
    config.validate()?;
    check_real_symmetric(a, "tridiagonalize", config.tolerance)?;
    debug!("tridiagonalize: {}x{}", a.rows(), a.cols());

    let t = householder(&a.to_real_array(), config.tolerance);
    let n = a.rows();
    let h = Matrix::filled(n, n, |(r, c)| {
        let value = if r == c {
            t.diagonal[r]
        } else if r.abs_diff(c) == 1 {
            t.off_diagonal[r.min(c)]
        } else {
            0.0
        };
        Complex64::new(value, 0.0)
    });
    Ok(TridiagResult {
        p: to_complex(&t.p),
        h,
    })
}

impl Matrix {
    /// See [`tridiagonalize_with`].
    pub fn tridiagonalize(&self) -> Result<TridiagResult> {
        tridiagonalize(self)
    }

    pub fn tridiagonalize_with(&self, config: &KernelConfig) -> Result<TridiagResult> {
        tridiagonalize_with(self, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstructs(a: &Matrix) {
        let f = a.tridiagonalize().unwrap();
        assert!(f.h.is_tridiagonal(Some(1e-12)));
        assert!(f.h.is_symmetric(Some(1e-12)));
        assert!(f.p.is_orthogonal(Some(1e-9)));
        let back = f.p.mul(&f.h).unwrap().mul(&f.p.transpose()).unwrap();
        assert!(back.equals(a, Some(1e-9)), "P·H·Pᵗ differs:\n{}\n{}", back, a);
    }

    #[test]
    fn reduces_symmetric_matrices() {
        reconstructs(&Matrix::create([[4.0, 1.0, -2.0, 2.0], [1.0, 2.0, 0.0, 1.0], [-2.0, 0.0, 3.0, -2.0], [2.0, 1.0, -2.0, -1.0]]).unwrap());
        reconstructs(&Matrix::create([[2.0, 1.0], [1.0, 3.0]]).unwrap());
        reconstructs(&Matrix::create([[5.0]]).unwrap());
    }

    #[test]
    fn already_tridiagonal_input_skips_reflectors() {
        let a = Matrix::create([[1.0, 2.0, 0.0], [2.0, 1.0, 3.0], [0.0, 3.0, 1.0]]).unwrap();
        reconstructs(&a);
        let diag = Matrix::create([[1.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 3.0]]).unwrap();
        reconstructs(&diag);
    }

    #[test]
    fn rejects_unsupported_inputs() {
        let rect = Matrix::create([[1.0, 2.0, 3.0]]).unwrap();
        assert!(matches!(rect.tridiagonalize(), Err(MatrixError::NotSquare { .. })));
        let asym = Matrix::create([[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert!(matches!(asym.tridiagonalize(), Err(MatrixError::NotSymmetric { .. })));
        let complex = Matrix::create(vec![
            vec![Complex64::new(1.0, 1.0), Complex64::new(0.0, 0.0)],
            vec![Complex64::new(0.0, 0.0), Complex64::new(2.0, 0.0)],
        ])
        .unwrap();
        assert!(matches!(
            complex.tridiagonalize(),
            Err(MatrixError::ComplexUnsupported { op: "tridiagonalize" })
        ));
    }
}
