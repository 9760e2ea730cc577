// Symmetric eigen-decomposition: Householder tridiagonalization followed by
// implicit-shift QR sweeps with Givens rotations.

use crate::config::KernelConfig;
use crate::error::{MatrixError, Result};
use crate::matrix::{Matrix, MatrixBuilder};
use crate::tridiagonal::{check_real_symmetric, householder};
use log::{debug, trace, warn};
use num_complex::Complex64;

/// Factors of `V·D·Vᵗ = A`.
#[derive(Clone, Debug, PartialEq)]
pub struct EigResult {
    /// Orthonormal eigenvectors as columns, ordered like `d`.
    pub v: Matrix,
    /// Diagonal matrix of eigenvalues, ascending.
    pub d: Matrix,
}

impl EigResult {
    /// The diagonal of `d`.
    pub fn eigenvalues(&self) -> Vec<f64> {
        let d = self.d.as_array();
        (0..d.nrows()).map(|i| d[[i, i]].re).collect()
    }
}

/// `e` couples `d0` and `d1`; it counts as zero relative to the larger of
/// their magnitudes and `scale`, so clusters of zero eigenvalues still deflate.
#[inline]
fn negligible(e: f64, d0: f64, d1: f64, tolerance: f64, scale: f64) -> bool {
    e.abs() <= tolerance * (d0.abs() + d1.abs()).max(scale)
}

/// Largest absolute row sum of the tridiagonal matrix.
fn tridiagonal_norm(d: &[f64], e: &[f64]) -> f64 {
    (0..d.len())
        .map(|i| {
            let below = e.get(i + 1).map_or(0.0, |x| x.abs());
            d[i].abs() + e[i].abs() + below
        })
        .fold(0.0, f64::max)
}

/// Givens pair `(c, s)` rotating `(x, y)` onto the first axis.
#[inline]
fn givens(x: f64, y: f64) -> (f64, f64) {
    if x == 0.0 && y == 0.0 {
        (1.0, 0.0)
    } else if x.abs() >= y.abs() {
        let t = -y / x;
        let c = 1.0 / (t * t + 1.0).sqrt();
        (c, t * c)
    } else {
        let t = -x / y;
        let s = 1.0 / (t * t + 1.0).sqrt();
        (t * s, s)
    }
}

pub fn eig(a: &Matrix) -> Result<EigResult> {
    eig_with(a, &KernelConfig::default())
}

/// Eigen-decomposition of a real symmetric matrix.
///
/// Each deflation boundary `h` gets at most `config.eig_max_iterations`
/// Wilkinson-shifted sweeps; running out is reported as
/// [`MatrixError::ConvergenceFailure`] and no partial result is returned.
pub fn eig_with(a: &Matrix, config: &KernelConfig) -> Result<EigResult> {
    config.validate()?;
    check_real_symmetric(a, "eig", config.tolerance)?;
    let n = a.rows();
    let tol = config.tolerance;
    debug!("eig: {}x{}", n, n);

    let tri = householder(&a.to_real_array(), tol);
    let mut v = tri.p;
    let mut d = tri.diagonal;
    // e[i] couples d[i - 1] and d[i]; e[0] is unused
    let mut e = vec![0.0; n];
    e[1..].copy_from_slice(&tri.off_diagonal);
    let scale = tridiagonal_norm(&d, &e);

    for h in (1..n).rev() {
        let mut j = h;
        while j >= 1 && !negligible(e[j], d[j - 1], d[j], tol, scale) {
            j -= 1;
        }
        if j == h {
            continue;
        }

        let mut iterations = 0;
        loop {
            iterations += 1;
            if iterations > config.eig_max_iterations {
                warn!(
                    "eig: boundary {} did not converge in {} iterations",
                    h, config.eig_max_iterations
                );
                return Err(MatrixError::ConvergenceFailure {
                    op: "eig",
                    boundary: h,
                    iterations: config.eig_max_iterations,
                });
            }

            let w = (d[h - 1] - d[h]) / 2.0;
            let t = e[h] * e[h];
            let mut s = (w * w + t).sqrt();
            if w < 0.0 {
                s = -s;
            }
            let mut x = d[j] - d[h] + t / (w + s);
            let mut y = e[j + 1];
            for k in j..h {
                let (c, s) = givens(x, y);
                let w = d[k] - d[k + 1];
                let t = (w * s + 2.0 * c * e[k + 1]) * s;
                d[k] -= t;
                d[k + 1] += t;
                if k > j {
                    e[k] = c * e[k] - s * y;
                }
                e[k + 1] += s * (c * w - 2.0 * s * e[k + 1]);
                for i in 0..n {
                    let vx = v[[i, k]];
                    let vy = v[[i, k + 1]];
                    v[[i, k]] = c * vx - s * vy;
                    v[[i, k + 1]] = s * vx + c * vy;
                }
                if k + 1 < h {
                    x = e[k + 1];
                    y = -s * e[k + 2];
                    e[k + 2] *= c;
                }
            }
            if negligible(e[h], d[h - 1], d[h], tol, scale) {
                trace!("eig: boundary {} converged after {} sweep(s)", h, iterations);
                break;
            }
        }
    }

    // stable ascending sort of the eigenpairs
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&p, &q| d[p].total_cmp(&d[q]));

    let mut vectors = MatrixBuilder::from_owned(Matrix::from_array_unchecked(
        v.mapv(|x| Complex64::new(x, 0.0)),
    ));
    let mut slot_of: Vec<usize> = (0..n).collect();
    let mut column_in: Vec<usize> = (0..n).collect();
    for (target, &source) in order.iter().enumerate() {
        let from = slot_of[source];
        if from != target {
            vectors.swap_columns(target, from);
            let displaced = column_in[target];
            column_in.swap(target, from);
            slot_of[displaced] = from;
            slot_of[source] = target;
        }
    }
    let sorted: Vec<f64> = order.iter().map(|&i| d[i]).collect();
    let values = Matrix::filled(n, n, |(r, c)| {
        if r == c {
            Complex64::new(sorted[r], 0.0)
        } else {
            Complex64::new(0.0, 0.0)
        }
    });

    Ok(EigResult {
        v: vectors.build(),
        d: values,
    })
}

impl Matrix {
    /// See [`eig_with`].
    ///
    /// ```
    /// use complex_linalg::Matrix;
    ///
    /// let a = Matrix::create([[2.0, 1.0], [1.0, 2.0]]).unwrap();
    /// let values = a.eig().unwrap().eigenvalues();
    /// assert!((values[0] - 1.0).abs() < 1e-10);
    /// assert!((values[1] - 3.0).abs() < 1e-10);
    /// ```
    pub fn eig(&self) -> Result<EigResult> {
        eig(self)
    }

    pub fn eig_with(&self, config: &KernelConfig) -> Result<EigResult> {
        eig_with(self, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn check(a: &Matrix) -> EigResult {
        let f = a.eig().unwrap();
        let values = f.eigenvalues();
        assert!(values.windows(2).all(|w| w[0] <= w[1]), "{:?}", values);
        assert!(f.d.is_diagonal(None));
        assert!(f.v.transpose().mul(&f.v).unwrap().is_identity(Some(1e-9)));
        let back = f.v.mul(&f.d).unwrap().mul(&f.v.transpose()).unwrap();
        assert!(back.equals(a, Some(1e-9)), "V·D·Vᵗ differs:\n{}\n{}", back, a);
        f
    }

    #[test]
    fn known_spectrum() {
        let f = check(&Matrix::create([[2.0, -1.0, 0.0], [-1.0, 2.0, -1.0], [0.0, -1.0, 2.0]]).unwrap());
        let expected = [2.0 - 2f64.sqrt(), 2.0, 2.0 + 2f64.sqrt()];
        for (got, want) in f.eigenvalues().iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-10);
        }
    }

    #[test]
    fn repeated_and_negative_eigenvalues() {
        check(&Matrix::create([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]).unwrap());
        check(&Matrix::create([[0.0, 1.0], [1.0, 0.0]]).unwrap());
        check(&Matrix::create([[-3.0, 0.0], [0.0, -7.0]]).unwrap());
        check(&Matrix::create([[4.0, 1.0, -2.0, 2.0], [1.0, 2.0, 0.0, 1.0], [-2.0, 0.0, 3.0, -2.0], [2.0, 1.0, -2.0, -1.0]]).unwrap());
        check(&Matrix::create([[7.0]]).unwrap());
    }

    #[test]
    fn iteration_cap_is_reported() {
        let a = Matrix::create([[1.0, 2.0, 0.5], [2.0, -1.0, 3.0], [0.5, 3.0, 4.0]]).unwrap();
        let config = KernelConfig {
            eig_max_iterations: 1,
            tolerance: 1e-300,
            ..KernelConfig::default()
        };
        let err = a.eig_with(&config).unwrap_err();
        assert!(matches!(err, MatrixError::ConvergenceFailure { op: "eig", iterations: 1, .. }));
    }

    #[test]
    fn zero_eigenvalue_clusters_deflate() {
        // Gram matrix of a rank one 2x6 input: five zero eigenvalues
        let v = [1.0, 2.0, 3.0, -1.0, 0.5, 2.0];
        let rows: Vec<Vec<f64>> = v.iter().map(|&x| v.iter().map(|&y| 5.0 * x * y).collect()).collect();
        let a = Matrix::create(rows).unwrap();
        let f = a.eig().unwrap();
        let values = f.eigenvalues();
        let norm_sqr: f64 = v.iter().map(|x| x * x).sum();
        assert_abs_diff_eq!(values[5], 5.0 * norm_sqr, epsilon = 1e-8);
        for &x in &values[..5] {
            assert!(x.abs() < 1e-8, "{:?}", values);
        }
        assert!(f.v.transpose().mul(&f.v).unwrap().is_identity(Some(1e-9)));
        let back = f.v.mul(&f.d).unwrap().mul(&f.v.transpose()).unwrap();
        assert!(back.equals(&a, Some(1e-8)));
    }

    #[test]
    fn rejects_non_symmetric() {
        let a = Matrix::create([[1.0, 2.0], [0.0, 1.0]]).unwrap();
        assert!(matches!(a.eig(), Err(MatrixError::NotSymmetric { op: "eig" })));
        let wide = Matrix::create([[1.0, 2.0]]).unwrap();
        assert!(matches!(wide.eig(), Err(MatrixError::NotSquare { .. })));
    }
}
