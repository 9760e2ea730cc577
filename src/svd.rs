// Singular value decomposition built on the symmetric eigensolver, and the
// Moore-Penrose pseudo-inverse derived from it.

use crate::config::KernelConfig;
use crate::eigen::eig_with;
use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use crate::qr::qr_with;
use crate::scalar::ZERO;
use log::debug;
use ndarray::s;
use num_complex::Complex64;

/// Factors of `U·S·Vᵗ = A`.
#[derive(Clone, Debug, PartialEq)]
pub struct SvdResult {
    /// Orthonormal, `rows x rows`.
    pub u: Matrix,
    /// Non-negative singular values on the diagonal, ascending, `rows x cols`.
    pub s: Matrix,
    /// Orthonormal, `cols x cols`.
    pub v: Matrix,
}

impl SvdResult {
    /// The diagonal of `s`.
    pub fn singular_values(&self) -> Vec<f64> {
        let s = self.s.as_array();
        (0..s.nrows().min(s.ncols())).map(|i| s[[i, i]].re).collect()
    }
}

/// `AᵗA` for a real `A`, symmetric entry for entry.
fn gram(a: &Matrix) -> Matrix {
    let x = a.as_array();
    let n = a.cols();
    Matrix::filled(n, n, |(i, j)| {
        let sum: f64 = x.rows().into_iter().map(|row| row[i].re * row[j].re).sum();
        Complex64::new(sum, 0.0)
    })
}

pub fn svd(a: &Matrix) -> Result<SvdResult> {
    svd_with(a, &KernelConfig::default())
}

/// SVD of a real matrix through the eigen-decomposition of `AᵗA`.
///
/// With `k = min(rows, cols)`, the `k` largest eigenpairs fill the diagonal
/// of `S` in ascending order. Only the `rank(A)` largest of them carry a
/// non-zero singular value; the matching columns of `U` are `A·v / σ`, and
/// the remaining columns are an orthonormal completion.
pub fn svd_with(a: &Matrix, config: &KernelConfig) -> Result<SvdResult> {
    config.validate()?;
    if !a.is_real(Some(config.tolerance)) {
        return Err(MatrixError::ComplexUnsupported { op: "svd" });
    }
    let (m, n) = a.dim();
    let k = m.min(n);
    let rank = a.rank(Some(config.tolerance));
    debug!("svd: {}x{} of rank {}", m, n, rank);

    let decomposition = eig_with(&gram(a), config)?;
    let eigenvalues = decomposition.eigenvalues();
    let v0 = decomposition.v.as_array();

    // column i < k of V pairs with S[i][i]: the k largest eigenpairs first
    let order: Vec<usize> = (n - k..n).chain(0..n - k).collect();
    let v = Matrix::filled(n, n, |(r, c)| v0[[r, order[c]]]);

    let mut sigma = vec![0.0; k];
    for i in k - rank..k {
        let value = eigenvalues[order[i]].max(0.0).sqrt();
        if value > config.tolerance {
            sigma[i] = value;
        }
    }
    let first = sigma.iter().position(|&x| x > 0.0).unwrap_or(k);

    let s = Matrix::filled(m, n, |(r, c)| {
        if r == c && r < k {
            Complex64::new(sigma[r], 0.0)
        } else {
            ZERO
        }
    });

    let mut w = ndarray::Array2::from_elem((m, m), ZERO);
    if first < k {
        let basis = v.as_array().slice(s![.., first..k]).to_owned();
        let projected = a.as_array().dot(&basis);
        for (offset, col) in (first..k).enumerate() {
            let scale = 1.0 / sigma[col];
            for r in 0..m {
                w[[r, col]] = projected[[r, offset]] * scale;
            }
        }
    }
    let u = qr_with(&Matrix::from_array_unchecked(w), config)?.q;

    Ok(SvdResult { u, s, v })
}

pub fn pinv(a: &Matrix) -> Result<Matrix> {
    pinv_with(a, &KernelConfig::default())
}

/// Moore-Penrose pseudo-inverse `V·S⁺·Uᴴ`.
pub fn pinv_with(a: &Matrix, config: &KernelConfig) -> Result<Matrix> {
    let SvdResult { u, s, v } = svd_with(a, config)?;
    let (m, n) = a.dim();
    let diagonal = s.as_array();
    let s_plus = Matrix::filled(n, m, |(r, c)| {
        let x = if r == c && r < m.min(n) {
            diagonal[[r, r]]
        } else {
            ZERO
        };
        if x == ZERO {
            ZERO
        } else {
            x.inv()
        }
    });
    v.mul(&s_plus)?.mul(&u.ctranspose())
}

impl Matrix {
    /// See [`svd_with`].
    pub fn svd(&self) -> Result<SvdResult> {
        svd(self)
    }

    pub fn svd_with(&self, config: &KernelConfig) -> Result<SvdResult> {
        svd_with(self, config)
    }

    /// See [`pinv_with`].
    pub fn pinv(&self) -> Result<Matrix> {
        pinv(self)
    }

    pub fn pinv_with(&self, config: &KernelConfig) -> Result<Matrix> {
        pinv_with(self, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn check(a: &Matrix) -> SvdResult {
        let f = a.svd().unwrap();
        assert_eq!(f.u.dim(), (a.rows(), a.rows()));
        assert_eq!(f.s.dim(), a.dim());
        assert_eq!(f.v.dim(), (a.cols(), a.cols()));
        let values = f.singular_values();
        assert!(values.iter().all(|&x| x >= 0.0));
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        let back = f.u.mul(&f.s).unwrap().mul(&f.v.transpose()).unwrap();
        assert!(back.equals(a, Some(1e-8)), "U·S·Vᵗ differs:\n{}\n{}", back, a);
        assert!(f.u.transpose().mul(&f.u).unwrap().is_identity(Some(1e-8)));
        assert!(f.v.transpose().mul(&f.v).unwrap().is_identity(Some(1e-8)));
        f
    }

    #[test]
    fn square_full_rank() {
        let f = check(&Matrix::create([[3.0, 0.0], [0.0, -5.0]]).unwrap());
        let values = f.singular_values();
        assert_abs_diff_eq!(values[0], 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(values[1], 5.0, epsilon = 1e-10);
    }

    #[test]
    fn rectangular_and_rank_deficient() {
        check(&Matrix::create([[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).unwrap());
        check(&Matrix::create([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap());
        check(&Matrix::create([[1.0, 2.0], [2.0, 4.0]]).unwrap());
        check(&Matrix::create([[1.0, 2.0, 1.0]]).unwrap());
        check(&Matrix::create([[2.0, 3.0, 4.0], [1.0, 4.0, 2.0], [2.0, 1.0, 4.0]]).unwrap());
        let zero = check(&Matrix::zeros(2, 3).unwrap());
        assert!(zero.s.is_zeros(None));
    }

    #[test]
    fn pseudo_inverse_identities() {
        for a in [
            Matrix::create([[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).unwrap(),
            Matrix::create([[1.0, 2.0], [2.0, 4.0]]).unwrap(),
            Matrix::create([[4.0, 7.0], [2.0, 6.0]]).unwrap(),
        ] {
            let p = a.pinv().unwrap();
            assert_eq!(p.dim(), (a.cols(), a.rows()));
            let apa = a.mul(&p).unwrap().mul(&a).unwrap();
            assert!(apa.equals(&a, Some(1e-8)));
            let pap = p.mul(&a).unwrap().mul(&p).unwrap();
            assert!(pap.equals(&p, Some(1e-8)));
        }
        let square = Matrix::create([[4.0, 7.0], [2.0, 6.0]]).unwrap();
        assert!(square.pinv().unwrap().equals(&square.inv().unwrap(), Some(1e-8)));
    }

    #[test]
    fn complex_input_is_rejected() {
        let a = Matrix::create(vec![vec![Complex64::new(1.0, 1.0)]]).unwrap();
        assert!(matches!(a.svd(), Err(MatrixError::ComplexUnsupported { op: "svd" })));
        assert!(a.pinv().is_err());
    }
}
