// Gram-Schmidt QR decomposition with completion of rank deficient columns.

use crate::config::KernelConfig;
use crate::error::{MatrixError, Result};
use crate::gauss::linear_dependent_rows;
use crate::matrix::{Matrix, MatrixBuilder};
use crate::random::{ChaChaGaussian, GaussianSource};
use crate::scalar::{ONE, ZERO};
use log::{debug, trace, warn};
use num_complex::Complex64;

/// Factors of `Q·R = A`.
#[derive(Clone, Debug, PartialEq)]
pub struct QrResult {
    /// Unitary, `rows x rows`.
    pub q: Matrix,
    /// Upper triangular (row echelon for wide inputs), `rows x cols`.
    pub r: Matrix,
}

/// Output of one orthonormalization pass.
pub(crate) struct Orthonormalized {
    pub(crate) q: MatrixBuilder,
    pub(crate) r: MatrixBuilder,
    /// Columns of `q` left zero because no independent direction was found.
    pub(crate) unresolved: Vec<usize>,
}

/// Modified Gram-Schmidt over the columns of `a` (`n x m`).
///
/// When `m <= n` column `c` owns slot `c` of `Q`, which behaves as if `a`
/// were padded with zero columns to `n x n`: a column whose residual norm is
/// at most `tolerance` leaves its slot zero and is reported unresolved.
/// Wider inputs fill the slots in order of the first independent columns.
pub(crate) fn gram_schmidt(a: &Matrix, tolerance: f64) -> Orthonormalized {
    let (n, m) = a.dim();
    let positional = m <= n;
    let source = a.as_array();
    let mut q = MatrixBuilder::zeros(n, n);
    let mut r = MatrixBuilder::zeros(n, m);
    let mut filled = vec![false; n];
    let mut next_slot = 0;

    for c in 0..m {
        let mut v: Vec<Complex64> = (0..n).map(|k| source[[k, c]]).collect();
        for j in (0..n).filter(|&j| filled[j]) {
            let projection: Complex64 = (0..n).map(|k| q.get(k, j).conj() * v[k]).sum();
            r.set(j, c, projection);
            for (k, x) in v.iter_mut().enumerate() {
                *x -= projection * q.get(k, j);
            }
        }
        let norm = v.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
        let slot = if positional { c } else { next_slot };
        if slot >= n {
            continue;
        }
        if norm <= tolerance {
            if positional {
                r.set(slot, c, Complex64::new(norm, 0.0));
            }
            continue;
        }
        r.set(slot, c, Complex64::new(norm, 0.0));
        for (k, x) in v.iter().enumerate() {
            q.set(k, slot, *x / norm);
        }
        filled[slot] = true;
        next_slot += 1;
    }

    let unresolved = (0..n).filter(|&j| !filled[j]).collect();
    Orthonormalized { q, r, unresolved }
}

/// Orthonormal rows spanning the complement of the row space of `vectors`.
///
/// Dependent rows are dropped first. The kept rows, as columns, are padded
/// with Gaussian columns and orthonormalized; up to
/// `config.orthogonalization_attempts` draws are tried. Returns `None` when
/// the rows already span the whole space.
pub fn orthogonal_complement(
    vectors: &Matrix,
    config: &KernelConfig,
    source: &mut dyn GaussianSource,
) -> Result<Option<Matrix>> {
    let n = vectors.cols();
    let dependent = linear_dependent_rows(vectors, config.tolerance);
    if dependent.len() == vectors.rows() {
        // nothing independent to be orthogonal to
        return Ok(Some(Matrix::identity(n, n)));
    }
    let mut kept = MatrixBuilder::from_matrix(vectors);
    for &row in dependent.iter().rev() {
        kept.delete_row(row)?;
    }
    let kept = kept.build();
    if kept.rows() >= n {
        return Ok(None);
    }
    let missing = n - kept.rows();
    let basis = kept.transpose();

    for attempt in 0..config.orthogonalization_attempts {
        let mut system = MatrixBuilder::from_matrix(&basis);
        let noise = Matrix::filled(n, missing, |_| Complex64::new(source.next_gaussian(), 0.0));
        system.concat_right(&noise)?;
        let pass = gram_schmidt(&system.build(), config.tolerance);
        if pass.unresolved.is_empty() {
            trace!("orthogonal_complement: {} vectors after {} attempt(s)", missing, attempt + 1);
            let offset = n - missing;
            return Ok(Some(Matrix::filled(missing, n, |(row, col)| {
                pass.q.get(col, offset + row)
            })));
        }
        trace!(
            "orthogonal_complement: attempt {} left {} column(s) unresolved",
            attempt + 1,
            pass.unresolved.len()
        );
    }
    warn!(
        "orthogonal_complement: no completion after {} attempts",
        config.orthogonalization_attempts
    );
    Err(MatrixError::OrthogonalizationFailure {
        op: "orthogonal_complement",
        attempts: config.orthogonalization_attempts,
    })
}

/// Fills the unresolved columns of `q` with an orthonormal completion of
/// the resolved ones.
fn complete_columns(
    q: &mut MatrixBuilder,
    unresolved: &[usize],
    config: &KernelConfig,
    source: &mut dyn GaussianSource,
) -> Result<()> {
    let n = q.rows();
    if unresolved.len() == n {
        for (i, &col) in unresolved.iter().enumerate() {
            q.set(i, col, ONE);
        }
        return Ok(());
    }
    let mut resolved = q.clone();
    for &col in unresolved.iter().rev() {
        resolved.delete_column(col)?;
    }
    let rows = resolved.build().transpose();
    let failure = MatrixError::OrthogonalizationFailure {
        op: "qr",
        attempts: config.orthogonalization_attempts,
    };
    let complement = orthogonal_complement(&rows, config, source)
        .map_err(|_| failure.clone())?
        .ok_or_else(|| failure.clone())?;
    if complement.rows() != unresolved.len() {
        return Err(failure);
    }
    let c = complement.as_array();
    for (i, &col) in unresolved.iter().enumerate() {
        for row in 0..n {
            q.set(row, col, c[[i, row]]);
        }
    }
    Ok(())
}

/// QR decomposition with the default configuration.
pub fn qr(a: &Matrix) -> Result<QrResult> {
    qr_with(a, &KernelConfig::default())
}

/// QR decomposition drawing completion vectors from a seeded
/// [`ChaChaGaussian`].
pub fn qr_with(a: &Matrix, config: &KernelConfig) -> Result<QrResult> {
    let mut source = ChaChaGaussian::new(config.orthogonalization_seed);
    qr_with_source(a, config, &mut source)
}

/// QR decomposition drawing completion vectors from `source`.
pub fn qr_with_source(
    a: &Matrix,
    config: &KernelConfig,
    source: &mut dyn GaussianSource,
) -> Result<QrResult> {
    config.validate()?;
    debug!("qr: {}x{}", a.rows(), a.cols());
    let Orthonormalized {
        mut q,
        mut r,
        unresolved,
    } = gram_schmidt(a, config.tolerance);
    if !unresolved.is_empty() {
        if a.rows() <= a.cols() || unresolved.iter().any(|&c| c < a.cols()) {
            warn!("qr: completing {} rank deficient column(s)", unresolved.len());
        }
        complete_columns(&mut q, &unresolved, config, source)?;
        // the diagonal of a completed slot carries at most the tolerance
        for &slot in &unresolved {
            if slot < r.cols() {
                r.set(slot, slot, ZERO);
            }
        }
    }
    Ok(QrResult {
        q: q.build(),
        r: r.build(),
    })
}

impl Matrix {
    /// See [`qr`].
    pub fn qr(&self) -> Result<QrResult> {
        qr(self)
    }

    pub fn qr_with(&self, config: &KernelConfig) -> Result<QrResult> {
        qr_with(self, config)
    }

    /// Orthonormal rows orthogonal to every row of `self`, or `None` when
    /// the rows already span the space. See [`orthogonal_complement`].
    pub fn orthogonal_complement(&self, epsilon: Option<f64>) -> Result<Option<Matrix>> {
        let config = KernelConfig {
            tolerance: crate::scalar::tolerance_or_default(epsilon),
            ..KernelConfig::default()
        };
        let mut source = ChaChaGaussian::new(config.orthogonalization_seed);
        orthogonal_complement(self, &config, &mut source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScaledGaussian;

    fn check(a: &Matrix) -> QrResult {
        let f = a.qr().unwrap();
        assert_eq!(f.q.dim(), (a.rows(), a.rows()));
        assert_eq!(f.r.dim(), a.dim());
        assert!(f.q.mul(&f.r).unwrap().equals(a, Some(1e-9)), "Q·R != A for {:?}", a);
        assert!(f.q.ctranspose().mul(&f.q).unwrap().is_identity(Some(1e-9)));
        let r = f.r.as_array();
        for ((row, col), z) in r.indexed_iter() {
            if row > col {
                assert!(z.norm() < 1e-12);
            }
        }
        f
    }

    #[test]
    fn full_rank_square() {
        check(&Matrix::create([[12.0, -51.0, 4.0], [6.0, 167.0, -68.0], [-4.0, 24.0, -41.0]]).unwrap());
    }

    #[test]
    fn rank_deficient_square_is_completed() {
        let a = Matrix::create([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [1.0, 0.0, 1.0]]).unwrap();
        check(&a);
        check(&Matrix::zeros(3, 3).unwrap());
    }

    #[test]
    fn tall_and_wide() {
        check(&Matrix::create([[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).unwrap());
        check(&Matrix::create([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap());
        check(&Matrix::create([[0.0, 1.0]]).unwrap());
        check(&Matrix::create([[0.0, 0.0, 1.0], [0.0, 0.0, 2.0]]).unwrap());
    }

    #[test]
    fn complex_input() {
        let a = Matrix::create(vec![
            vec![Complex64::new(1.0, 1.0), Complex64::new(2.0, 0.0)],
            vec![Complex64::new(0.0, -1.0), Complex64::new(1.0, 3.0)],
        ])
        .unwrap();
        check(&a);
    }

    #[test]
    fn complement_is_orthogonal() {
        let rows = Matrix::create([[1.0, 0.0, 0.0], [1.0, 0.0, 0.0]]).unwrap();
        let c = rows.orthogonal_complement(None).unwrap().unwrap();
        assert_eq!(c.dim(), (2, 3));
        let gram = c.mul(&c.ctranspose()).unwrap();
        assert!(gram.is_identity(Some(1e-9)));
        assert!(c.as_array().column(0).iter().all(|z| z.norm() < 1e-9));

        let full = Matrix::eye(2, 2).unwrap();
        assert!(full.orthogonal_complement(None).unwrap().is_none());
    }

    #[test]
    fn parallel_columns_stay_unresolved() {
        let system = Matrix::create([[1.0, 1.0], [0.0, 0.0]]).unwrap();
        let pass = gram_schmidt(&system, 1e-10);
        assert_eq!(pass.unresolved, vec![1]);
    }

    #[test]
    fn degenerate_source_exhausts_attempts() {
        let config = KernelConfig {
            orthogonalization_attempts: 3,
            ..KernelConfig::default()
        };
        // a zero-variance source always draws [1, 1], parallel to the kept row
        let mut source = ScaledGaussian::new(0, 1.0, 0.0).unwrap();
        let rows = Matrix::create([[1.0, 1.0]]).unwrap();
        let err = orthogonal_complement(&rows, &config, &mut source).unwrap_err();
        assert!(matches!(err, MatrixError::OrthogonalizationFailure { attempts: 3, .. }));

        let mut source = ScaledGaussian::new(0, 1.0, 0.0).unwrap();
        let rows = Matrix::create([[1.0, 0.0], [0.0, 0.0]]).unwrap();
        let c = orthogonal_complement(&rows, &config, &mut source).unwrap().unwrap();
        assert_eq!(c.dim(), (1, 2));
        assert!(c.get(0, 0).unwrap().norm() < 1e-12);
    }
}
