// Elementwise arithmetic, predicates, transforms, reductions and norms on Matrix.

use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use crate::scalar::{tolerance_or_default, ComplexScalar, ONE, ZERO};
use ndarray::Axis;
use num_complex::Complex64;
use std::cmp::Ordering;

/// Which axis [`Matrix::inner`] contracts over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InnerDimension {
    /// One dot product per column, giving a row vector.
    Columns,
    /// One dot product per row, giving a column vector.
    Rows,
}

impl TryFrom<usize> for InnerDimension {
    type Error = MatrixError;

    fn try_from(dim: usize) -> Result<Self> {
        match dim {
            1 => Ok(InnerDimension::Columns),
            2 => Ok(InnerDimension::Rows),
            _ => Err(MatrixError::InvalidArgument {
                op: "inner",
                message: format!("dimension must be 1 or 2, got {}", dim),
            }),
        }
    }
}

/// Selects an entry of a [`Matrix::norm`] family member.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NormKind {
    One,
    Two,
    Infinity,
    NegativeInfinity,
    /// General `p`, defined for vectors only.
    P(f64),
}

impl From<f64> for NormKind {
    fn from(p: f64) -> Self {
        if p == 1.0 {
            NormKind::One
        } else if p == 2.0 {
            NormKind::Two
        } else if p == f64::INFINITY {
            NormKind::Infinity
        } else if p == f64::NEG_INFINITY {
            NormKind::NegativeInfinity
        } else {
            NormKind::P(p)
        }
    }
}

#[inline]
fn indicator(flag: bool) -> Complex64 {
    if flag {
        ONE
    } else {
        ZERO
    }
}

/// First entry that no later entry beats in direction `wins`.
fn extremum(values: &[Complex64], wins: Ordering, epsilon: f64) -> Complex64 {
    values
        .iter()
        .copied()
        .reduce(|best, z| if z.compare_to(best, epsilon) == wins { z } else { best })
        .unwrap_or(ZERO)
}

fn ordering_value(ordering: Ordering) -> Complex64 {
    match ordering {
        Ordering::Less => Complex64::new(-1.0, 0.0),
        Ordering::Equal => ZERO,
        Ordering::Greater => ONE,
    }
}

impl Matrix {
    // --- Broadcasting arithmetic ---

    /// Combines two matrices entry by entry. The result takes the larger
    /// extent on each axis and each operand is indexed modulo its own extent.
    /// Shapes that differ on both axes are rejected unless one side is a scalar.
    fn broadcast<F>(&self, other: &Matrix, op: &'static str, f: F) -> Result<Matrix>
    where
        F: Fn(Complex64, Complex64) -> Complex64,
    {
        let (ar, ac) = self.dim();
        let (br, bc) = other.dim();
        if ar != br && ac != bc && !self.is_scalar() && !other.is_scalar() {
            return Err(MatrixError::DimensionMismatch {
                op,
                left: self.dim(),
                right: other.dim(),
            });
        }
        let a = self.as_array();
        let b = other.as_array();
        Ok(Matrix::filled(ar.max(br), ac.max(bc), |(r, c)| {
            f(a[[r % ar, c % ac]], b[[r % br, c % bc]])
        }))
    }

    /// Elementwise sum with modulo broadcasting.
    ///
    /// ```
    /// use complex_linalg::Matrix;
    ///
    /// let a = Matrix::create([[1.0, 2.0], [3.0, 4.0]]).unwrap();
    /// let b = Matrix::create([[10.0, 20.0]]).unwrap();
    /// let sum = a.add(&b).unwrap();
    /// assert_eq!(sum.to_real_rows(), vec![vec![11.0, 22.0], vec![13.0, 24.0]]);
    /// ```
    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.broadcast(other, "add", |x, y| x + y)
    }

    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.broadcast(other, "sub", |x, y| x - y)
    }

    /// Elementwise (Hadamard) product with modulo broadcasting.
    pub fn nmul(&self, other: &Matrix) -> Result<Matrix> {
        self.broadcast(other, "nmul", |x, y| x * y)
    }

    /// Elementwise quotient with modulo broadcasting; every entry of `other`
    /// divides at least one entry, so a single zero is rejected.
    pub fn ndiv(&self, other: &Matrix) -> Result<Matrix> {
        let quotient = self.broadcast(other, "ndiv", |x, y| x / y)?;
        if other.as_array().iter().any(|z| z.is_zero_eps(0.0)) {
            return Err(MatrixError::SingularOrRankDeficient { op: "ndiv" });
        }
        Ok(quotient)
    }

    /// Matrix product; a scalar on either side scales the other operand.
    pub fn mul(&self, other: &Matrix) -> Result<Matrix> {
        if self.is_scalar() {
            let s = self.scalar();
            return Ok(other.map(|z| s * z));
        }
        if other.is_scalar() {
            let s = other.scalar();
            return Ok(self.map(|z| z * s));
        }
        if self.cols() != other.rows() {
            return Err(MatrixError::DimensionMismatch {
                op: "mul",
                left: self.dim(),
                right: other.dim(),
            });
        }
        Ok(Matrix::from_array_unchecked(self.as_array().dot(other.as_array())))
    }

    /// Division: elementwise by a scalar, otherwise `self * inv(other)` for
    /// a square divisor.
    pub fn div(&self, other: &Matrix) -> Result<Matrix> {
        if other.is_scalar() {
            let s = other.scalar();
            if s.is_zero_eps(0.0) {
                return Err(MatrixError::SingularOrRankDeficient { op: "div" });
            }
            return Ok(self.map(|z| z / s));
        }
        if !other.is_square() {
            return Err(MatrixError::DimensionMismatch {
                op: "div",
                left: self.dim(),
                right: other.dim(),
            });
        }
        let inverse = other.inv().map_err(|e| match e {
            MatrixError::SingularOrRankDeficient { .. } => {
                MatrixError::SingularOrRankDeficient { op: "div" }
            }
            other => other,
        })?;
        self.mul(&inverse).map_err(|_| MatrixError::DimensionMismatch {
            op: "div",
            left: self.dim(),
            right: other.dim(),
        })
    }

    // --- Maps ---

    /// Applies `f` to every entry.
    pub fn map<F>(&self, f: F) -> Matrix
    where
        F: Fn(Complex64) -> Complex64,
    {
        Matrix::from_array_unchecked(self.as_array().mapv(f))
    }

    pub fn real(&self) -> Matrix {
        self.map(|z| Complex64::new(z.re, 0.0))
    }

    pub fn imag(&self) -> Matrix {
        self.map(|z| Complex64::new(z.im, 0.0))
    }

    /// Argument of each entry.
    pub fn angle(&self) -> Matrix {
        self.map(|z| Complex64::new(z.arg(), 0.0))
    }

    /// `z / |z|`, zero for zero entries.
    pub fn sign(&self) -> Matrix {
        self.map(ComplexScalar::signum_value)
    }

    pub fn abs(&self) -> Matrix {
        self.map(|z| Complex64::new(z.norm(), 0.0))
    }

    pub fn conj(&self) -> Matrix {
        self.map(|z| z.conj())
    }

    pub fn negate(&self) -> Matrix {
        self.map(|z| -z)
    }

    pub fn sqrt(&self) -> Matrix {
        self.map(|z| z.sqrt())
    }

    /// Raises each entry to a scalar power.
    pub fn pow(&self, exponent: &Matrix) -> Result<Matrix> {
        if !exponent.is_scalar() {
            return Err(MatrixError::NotScalar { op: "pow" });
        }
        let p = exponent.scalar();
        Ok(self.map(|z| {
            if p.im == 0.0 && p.re.fract() == 0.0 && p.re.abs() <= i32::MAX as f64 && z.im == 0.0 {
                Complex64::new(z.re.powi(p.re as i32), 0.0)
            } else {
                z.powc(p)
            }
        }))
    }

    /// Natural logarithm.
    pub fn log(&self) -> Matrix {
        self.map(|z| z.ln())
    }

    pub fn exp(&self) -> Matrix {
        self.map(|z| z.exp())
    }

    pub fn sin(&self) -> Matrix {
        self.map(|z| z.sin())
    }

    pub fn cos(&self) -> Matrix {
        self.map(|z| z.cos())
    }

    pub fn tan(&self) -> Matrix {
        self.map(|z| z.tan())
    }

    pub fn atan(&self) -> Matrix {
        self.map(|z| z.atan())
    }

    /// Four-quadrant arctangent of each real part against a scalar.
    pub fn atan2(&self, other: &Matrix) -> Result<Matrix> {
        if !other.is_scalar() {
            return Err(MatrixError::NotScalar { op: "atan2" });
        }
        let x = other.scalar();
        Ok(self.map(|y| y.atan2_value(x)))
    }

    pub fn floor(&self) -> Matrix {
        self.map(ComplexScalar::floor)
    }

    pub fn ceil(&self) -> Matrix {
        self.map(ComplexScalar::ceil)
    }

    pub fn round(&self) -> Matrix {
        self.map(ComplexScalar::round)
    }

    /// Rounds toward zero.
    pub fn fix(&self) -> Matrix {
        self.map(ComplexScalar::fix)
    }

    pub fn fract(&self) -> Matrix {
        self.map(ComplexScalar::fract)
    }

    // --- Indicator maps ---

    fn indicate<F>(&self, f: F) -> Matrix
    where
        F: Fn(Complex64) -> bool,
    {
        self.map(|z| indicator(f(z)))
    }

    pub fn test_integer(&self, epsilon: Option<f64>) -> Matrix {
        let eps = tolerance_or_default(epsilon);
        self.indicate(|z| z.is_integer_eps(eps))
    }

    pub fn test_complex_integer(&self, epsilon: Option<f64>) -> Matrix {
        let eps = tolerance_or_default(epsilon);
        self.indicate(|z| z.is_complex_integer_eps(eps))
    }

    pub fn test_zero(&self, epsilon: Option<f64>) -> Matrix {
        let eps = tolerance_or_default(epsilon);
        self.indicate(|z| z.is_zero_eps(eps))
    }

    pub fn test_one(&self, epsilon: Option<f64>) -> Matrix {
        let eps = tolerance_or_default(epsilon);
        self.indicate(|z| z.is_one_eps(eps))
    }

    pub fn test_complex(&self, epsilon: Option<f64>) -> Matrix {
        let eps = tolerance_or_default(epsilon);
        self.indicate(|z| z.is_complex_eps(eps))
    }

    pub fn test_real(&self, epsilon: Option<f64>) -> Matrix {
        let eps = tolerance_or_default(epsilon);
        self.indicate(|z| z.is_real_eps(eps))
    }

    pub fn test_nan(&self) -> Matrix {
        self.indicate(ComplexScalar::is_nan_value)
    }

    /// Real and strictly positive.
    pub fn test_positive(&self) -> Matrix {
        self.indicate(|z| z.im == 0.0 && z.re > 0.0)
    }

    /// Real and strictly negative.
    pub fn test_negative(&self) -> Matrix {
        self.indicate(|z| z.im == 0.0 && z.re < 0.0)
    }

    pub fn test_not_negative(&self) -> Matrix {
        self.indicate(|z| z.im == 0.0 && z.re >= 0.0)
    }

    pub fn test_infinite(&self) -> Matrix {
        self.indicate(ComplexScalar::is_infinite_value)
    }

    pub fn test_finite(&self) -> Matrix {
        self.indicate(ComplexScalar::is_finite_value)
    }

    // --- Predicates ---

    /// Same shape and every entry within `epsilon`.
    pub fn equals(&self, other: &Matrix, epsilon: Option<f64>) -> bool {
        let eps = tolerance_or_default(epsilon);
        self.dim() == other.dim()
            && self
                .as_array()
                .iter()
                .zip(other.as_array().iter())
                .all(|(a, b)| a.equals_eps(*b, eps))
    }

    fn all_entries<F>(&self, f: F) -> bool
    where
        F: Fn((usize, usize), Complex64) -> bool,
    {
        self.as_array().indexed_iter().all(|(idx, z)| f(idx, *z))
    }

    pub fn is_zeros(&self, epsilon: Option<f64>) -> bool {
        let eps = tolerance_or_default(epsilon);
        self.all_entries(|_, z| z.is_zero_eps(eps))
    }

    pub fn is_identity(&self, epsilon: Option<f64>) -> bool {
        let eps = tolerance_or_default(epsilon);
        self.is_square()
            && self.all_entries(|(r, c), z| {
                if r == c {
                    z.is_one_eps(eps)
                } else {
                    z.is_zero_eps(eps)
                }
            })
    }

    pub fn is_diagonal(&self, epsilon: Option<f64>) -> bool {
        let eps = tolerance_or_default(epsilon);
        self.is_square() && self.all_entries(|(r, c), z| r == c || z.is_zero_eps(eps))
    }

    pub fn is_tridiagonal(&self, epsilon: Option<f64>) -> bool {
        let eps = tolerance_or_default(epsilon);
        self.is_square() && self.all_entries(|(r, c), z| r.abs_diff(c) <= 1 || z.is_zero_eps(eps))
    }

    pub fn is_symmetric(&self, epsilon: Option<f64>) -> bool {
        let eps = tolerance_or_default(epsilon);
        let a = self.as_array();
        self.is_square() && self.all_entries(|(r, c), z| c <= r || z.equals_eps(a[[c, r]], eps))
    }

    /// `A = Aᴴ`.
    pub fn is_hermitian(&self, epsilon: Option<f64>) -> bool {
        let eps = tolerance_or_default(epsilon);
        let a = self.as_array();
        self.is_square()
            && self.all_entries(|(r, c), z| c < r || z.equals_eps(a[[c, r]].conj(), eps))
    }

    /// `A·Aᵀ = I`.
    pub fn is_orthogonal(&self, epsilon: Option<f64>) -> bool {
        self.is_square()
            && self
                .mul(&self.transpose())
                .map(|p| p.is_identity(epsilon))
                .unwrap_or(false)
    }

    /// `A·Aᴴ = I`.
    pub fn is_unitary(&self, epsilon: Option<f64>) -> bool {
        self.is_square()
            && self
                .mul(&self.ctranspose())
                .map(|p| p.is_identity(epsilon))
                .unwrap_or(false)
    }

    /// Full row rank.
    pub fn is_regular(&self, epsilon: Option<f64>) -> bool {
        self.is_square() && self.rank(epsilon) == self.rows()
    }

    /// No entry has an imaginary part.
    pub fn is_real(&self, epsilon: Option<f64>) -> bool {
        let eps = tolerance_or_default(epsilon);
        self.all_entries(|_, z| z.is_real_eps(eps))
    }

    /// Every entry has an imaginary part.
    pub fn is_complex(&self, epsilon: Option<f64>) -> bool {
        let eps = tolerance_or_default(epsilon);
        self.all_entries(|_, z| z.is_complex_eps(eps))
    }

    // --- Structure ---

    pub fn transpose(&self) -> Matrix {
        Matrix::from_array_unchecked(self.as_array().t().to_owned())
    }

    /// Conjugate transpose.
    pub fn ctranspose(&self) -> Matrix {
        Matrix::from_array_unchecked(self.as_array().t().mapv(|z| z.conj()))
    }

    /// Alias of [`Matrix::ctranspose`].
    pub fn t(&self) -> Matrix {
        self.ctranspose()
    }

    /// A vector becomes a diagonal matrix; a matrix yields its diagonal as a column.
    pub fn diag(&self) -> Matrix {
        if self.is_vector() {
            let n = self.length();
            Matrix::filled(n, n, |(r, c)| if r == c { self.vector_entry(r) } else { ZERO })
        } else {
            let n = self.rows().min(self.cols());
            let a = self.as_array();
            Matrix::filled(n, 1, |(i, _)| a[[i, i]])
        }
    }

    /// Dot products `Σ conj(a)·b`.
    ///
    /// Two vectors of equal length give a scalar. Two matrices of equal shape
    /// give one product per column (`dim = 1`) or per row (`dim = 2`).
    pub fn inner(&self, other: &Matrix, dim: usize) -> Result<Matrix> {
        let mismatch = || MatrixError::DimensionMismatch {
            op: "inner",
            left: self.dim(),
            right: other.dim(),
        };
        if self.is_vector() && other.is_vector() {
            if self.length() != other.length() {
                return Err(mismatch());
            }
            let sum = (0..self.length())
                .map(|i| self.vector_entry(i).conj() * other.vector_entry(i))
                .sum::<Complex64>();
            return Ok(Matrix::scalar_value(sum));
        }
        if self.dim() != other.dim() {
            return Err(mismatch());
        }
        let products = self.as_array().mapv(|z| z.conj()) * other.as_array();
        let result = match InnerDimension::try_from(dim)? {
            InnerDimension::Columns => products.sum_axis(Axis(0)).insert_axis(Axis(0)),
            InnerDimension::Rows => products.sum_axis(Axis(1)).insert_axis(Axis(1)),
        };
        Ok(Matrix::from_array_unchecked(result))
    }

    // --- Comparison and reductions ---

    /// Elementwise comparison giving `-1`, `0` or `1` with modulo broadcasting.
    pub fn compare_to(&self, other: &Matrix, epsilon: Option<f64>) -> Result<Matrix> {
        let eps = tolerance_or_default(epsilon);
        self.broadcast(other, "compare_to", |a, b| ordering_value(a.compare_to(b, eps)))
    }

    /// Applies a vector reduction to a row vector, or to each column of a matrix.
    fn reduce_columns<F>(&self, f: F) -> Matrix
    where
        F: Fn(&[Complex64]) -> Complex64,
    {
        if self.is_row() {
            let row: Vec<Complex64> = self.as_array().iter().copied().collect();
            return Matrix::scalar_value(f(&row));
        }
        let values: Vec<Complex64> = self
            .as_array()
            .axis_iter(Axis(1))
            .map(|col| f(&col.to_vec()))
            .collect();
        Matrix::filled(1, values.len(), |(_, c)| values[c])
    }

    /// Largest entry of a row vector, or of each column of a matrix.
    pub fn max(&self, epsilon: Option<f64>) -> Matrix {
        let eps = tolerance_or_default(epsilon);
        self.reduce_columns(|values| extremum(values, Ordering::Greater, eps))
    }

    /// Smallest entry of a row vector, or of each column of a matrix.
    pub fn min(&self, epsilon: Option<f64>) -> Matrix {
        let eps = tolerance_or_default(epsilon);
        self.reduce_columns(|values| extremum(values, Ordering::Less, eps))
    }

    // --- Norms ---

    /// Vector: sum of magnitudes. Matrix: largest column sum.
    pub fn norm1(&self) -> f64 {
        let a = self.as_array();
        if self.is_vector() {
            return a.iter().map(|z| z.norm()).sum();
        }
        a.axis_iter(Axis(1))
            .map(|col| col.iter().map(|z| z.norm()).sum::<f64>())
            .fold(0.0, f64::max)
    }

    /// Vector: Euclidean length. Matrix: largest singular value.
    pub fn norm2(&self) -> Result<f64> {
        if self.is_vector() {
            return Ok(self.frobenius_norm());
        }
        let svd = self.svd()?;
        let s = svd.s.as_array();
        Ok((0..s.nrows().min(s.ncols()))
            .map(|i| s[[i, i]].re)
            .fold(0.0, f64::max))
    }

    /// Vector: largest magnitude. Matrix: largest row sum.
    pub fn norm_inf(&self) -> f64 {
        let a = self.as_array();
        if self.is_vector() {
            return a.iter().map(|z| z.norm()).fold(0.0, f64::max);
        }
        a.axis_iter(Axis(0))
            .map(|row| row.iter().map(|z| z.norm()).sum::<f64>())
            .fold(0.0, f64::max)
    }

    /// Vector: smallest magnitude. Matrix: smallest row sum.
    pub fn norm_neg_inf(&self) -> f64 {
        let a = self.as_array();
        if self.is_vector() {
            return a.iter().map(|z| z.norm()).fold(f64::INFINITY, f64::min);
        }
        a.axis_iter(Axis(0))
            .map(|row| row.iter().map(|z| z.norm()).sum::<f64>())
            .fold(f64::INFINITY, f64::min)
    }

    /// Square root of the sum of squared magnitudes.
    pub fn frobenius_norm(&self) -> f64 {
        self.as_array().iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt()
    }

    /// Dispatches to the norm selected by `p`; a general `p` needs a vector.
    pub fn norm(&self, p: impl Into<NormKind>) -> Result<f64> {
        match p.into() {
            NormKind::One => Ok(self.norm1()),
            NormKind::Two => self.norm2(),
            NormKind::Infinity => Ok(self.norm_inf()),
            NormKind::NegativeInfinity => Ok(self.norm_neg_inf()),
            NormKind::P(p) => {
                if !self.is_vector() {
                    return Err(MatrixError::InvalidArgument {
                        op: "norm",
                        message: format!("matrix {}-norm is not defined here", p),
                    });
                }
                if p == 0.0 || !p.is_finite() {
                    return Err(MatrixError::InvalidArgument {
                        op: "norm",
                        message: format!("p must be finite and non-zero, got {}", p),
                    });
                }
                let sum: f64 = self.as_array().iter().map(|z| z.norm().powf(p)).sum();
                Ok(sum.powf(1.0 / p))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn m(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::create(rows).unwrap()
    }

    #[test]
    fn broadcasting_tiles_smaller_operand() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = m(vec![vec![10.0, 20.0]]);
        assert_eq!(a.add(&b).unwrap().to_real_rows(), vec![vec![11.0, 22.0], vec![13.0, 24.0]]);

        let big = Matrix::ones(3, 3).unwrap();
        let two_rows = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let sum = big.add(&two_rows).unwrap();
        assert_eq!(
            sum.to_real_rows(),
            vec![vec![2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0], vec![2.0, 3.0, 4.0]]
        );

        let err = Matrix::ones(2, 2).unwrap().add(&Matrix::ones(3, 3).unwrap()).unwrap_err();
        assert!(matches!(err, MatrixError::DimensionMismatch { op: "add", .. }));
    }

    #[test]
    fn scalar_operands() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let two = Matrix::from(2.0);
        assert_eq!(a.mul(&two).unwrap().to_real_rows(), vec![vec![2.0, 4.0], vec![6.0, 8.0]]);
        assert_eq!(a.sub(&two).unwrap().to_real_rows(), vec![vec![-1.0, 0.0], vec![1.0, 2.0]]);
        assert_eq!(a.div(&two).unwrap().to_real_rows(), vec![vec![0.5, 1.0], vec![1.5, 2.0]]);
    }

    #[test]
    fn matrix_product_and_division() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = m(vec![vec![5.0], vec![6.0]]);
        assert_eq!(a.mul(&b).unwrap().to_real_rows(), vec![vec![17.0], vec![39.0]]);
        assert!(b.mul(&b).is_err());

        let q = a.div(&a).unwrap();
        assert!(q.is_identity(Some(1e-9)));
        let singular = m(vec![vec![1.0, 2.0], vec![2.0, 4.0]]);
        assert!(matches!(
            a.div(&singular),
            Err(MatrixError::SingularOrRankDeficient { op: "div" })
        ));
        assert!(a.div(&b).is_err());
    }

    #[test]
    fn predicates() {
        let sym = m(vec![vec![2.0, 1.0], vec![1.0, 3.0]]);
        assert!(sym.is_symmetric(None));
        assert!(!sym.is_diagonal(None));
        assert!(sym.is_tridiagonal(None));
        assert!(Matrix::eye(3, 3).unwrap().is_identity(None));
        assert!(!Matrix::eye(2, 3).unwrap().is_identity(None));
        assert!(Matrix::zeros(2, 4).unwrap().is_zeros(None));
        assert!(!m(vec![vec![1.0, 2.0, 3.0]]).is_symmetric(None));

        let h = Matrix::create(vec![
            vec![Complex64::new(1.0, 0.0), Complex64::new(2.0, 1.0)],
            vec![Complex64::new(2.0, -1.0), Complex64::new(3.0, 0.0)],
        ])
        .unwrap();
        assert!(h.is_hermitian(None));
        assert!(!h.is_symmetric(None));
        assert!(!h.is_real(None));
        assert!(!h.is_complex(None));

        let theta: f64 = 0.3;
        let rot = m(vec![vec![theta.cos(), -theta.sin()], vec![theta.sin(), theta.cos()]]);
        assert!(rot.is_orthogonal(None));
        assert!(rot.is_unitary(None));
        assert!(rot.is_regular(None));
        assert!(!m(vec![vec![1.0, 2.0], vec![2.0, 4.0]]).is_regular(None));
    }

    #[test]
    fn maps_and_indicators() {
        let a = m(vec![vec![-1.5, 2.0], vec![0.0, 4.0]]);
        assert_eq!(a.abs().to_real_rows(), vec![vec![1.5, 2.0], vec![0.0, 4.0]]);
        assert_eq!(a.fix().to_real_rows(), vec![vec![-1.0, 2.0], vec![0.0, 4.0]]);
        assert_eq!(a.floor().to_real_rows(), vec![vec![-2.0, 2.0], vec![0.0, 4.0]]);
        assert_eq!(a.test_integer(None).to_real_rows(), vec![vec![0.0, 1.0], vec![1.0, 1.0]]);
        assert_eq!(a.test_negative().to_real_rows(), vec![vec![1.0, 0.0], vec![0.0, 0.0]]);
        assert_eq!(a.test_zero(None).to_real_rows(), vec![vec![0.0, 0.0], vec![1.0, 0.0]]);

        let squared = a.pow(&Matrix::from(2.0)).unwrap();
        assert_eq!(squared.to_real_rows(), vec![vec![2.25, 4.0], vec![0.0, 16.0]]);
        assert!(matches!(a.pow(&a), Err(MatrixError::NotScalar { op: "pow" })));

        let e = Matrix::from(1.0).exp().log();
        assert_abs_diff_eq!(e.scalar().re, 1.0, epsilon = 1e-12);
        let s = Matrix::from(-4.0).sqrt();
        assert_abs_diff_eq!(s.scalar().im, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn elementwise_division_rejects_zero_divisors() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let halves = a.ndiv(&m(vec![vec![2.0, 4.0]])).unwrap();
        assert_eq!(halves.to_real_rows(), vec![vec![0.5, 0.5], vec![1.5, 1.0]]);

        let err = a.ndiv(&m(vec![vec![1.0, 0.0]])).unwrap_err();
        assert!(matches!(err, MatrixError::SingularOrRankDeficient { op: "ndiv" }));
        let err = a.ndiv(&Matrix::from(0.0)).unwrap_err();
        assert!(matches!(err, MatrixError::SingularOrRankDeficient { op: "ndiv" }));
        // shape errors win over zero divisors
        let err = a.ndiv(&Matrix::zeros(3, 3).unwrap()).unwrap_err();
        assert!(matches!(err, MatrixError::DimensionMismatch { op: "ndiv", .. }));
    }

    #[test]
    fn huge_integer_exponents_do_not_saturate() {
        let base = Matrix::from(1.0000001);
        let got = base.pow(&Matrix::from(3e9)).unwrap().scalar();
        let want = 1.0000001f64.powf(3e9);
        assert!(want > 1e130);
        assert!(((got.re - want) / want).abs() < 1e-9, "{} vs {}", got.re, want);
        assert_eq!(got.im, 0.0);

        let tiny = base.pow(&Matrix::from(-3e9)).unwrap().scalar();
        assert!(((tiny.re * want) - 1.0).abs() < 1e-9);

        let cube = Matrix::from(-2.0).pow(&Matrix::from(3.0)).unwrap();
        assert_eq!(cube.scalar(), Complex64::new(-8.0, 0.0));
    }

    #[test]
    fn structure_helpers() {
        let v = m(vec![vec![1.0, 2.0, 3.0]]);
        let d = v.diag();
        assert_eq!(d.dim(), (3, 3));
        assert_eq!(d.diag().to_real_rows(), vec![vec![1.0], vec![2.0], vec![3.0]]);

        let c = Matrix::create(vec![vec![Complex64::new(1.0, 2.0), Complex64::new(3.0, 0.0)]]).unwrap();
        let ct = c.ctranspose();
        assert_eq!(ct.dim(), (2, 1));
        assert_eq!(ct.get(0, 0), Some(Complex64::new(1.0, -2.0)));
        assert_eq!(c.transpose().get(0, 0), Some(Complex64::new(1.0, 2.0)));
    }

    #[test]
    fn inner_products() {
        let a = m(vec![vec![1.0, 2.0, 3.0]]);
        let b = m(vec![vec![4.0], vec![5.0], vec![6.0]]);
        assert_eq!(a.inner(&b, 1).unwrap().scalar(), Complex64::new(32.0, 0.0));

        let x = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(x.inner(&x, 1).unwrap().to_real_rows(), vec![vec![10.0, 20.0]]);
        assert_eq!(x.inner(&x, 2).unwrap().to_real_rows(), vec![vec![5.0], vec![25.0]]);
        assert!(matches!(x.inner(&x, 3), Err(MatrixError::InvalidArgument { .. })));
        assert!(x.inner(&Matrix::ones(3, 3).unwrap(), 1).is_err());
    }

    #[test]
    fn comparison_and_extrema() {
        let a = m(vec![vec![1.0, 5.0], vec![7.0, 2.0]]);
        let cmp = a.compare_to(&Matrix::from(2.0), None).unwrap();
        assert_eq!(cmp.to_real_rows(), vec![vec![-1.0, 1.0], vec![1.0, 0.0]]);
        assert_eq!(a.max(None).to_real_rows(), vec![vec![7.0, 5.0]]);
        assert_eq!(a.min(None).to_real_rows(), vec![vec![1.0, 2.0]]);
        let row = m(vec![vec![3.0, -1.0, 8.0]]);
        assert_eq!(row.max(None).scalar().re, 8.0);
        assert_eq!(row.min(None).scalar().re, -1.0);
    }

    #[test]
    fn norms() {
        let a = m(vec![vec![1.0, -2.0], vec![-3.0, 4.0]]);
        assert_abs_diff_eq!(a.norm1(), 6.0);
        assert_abs_diff_eq!(a.norm_inf(), 7.0);
        assert_abs_diff_eq!(a.norm_neg_inf(), 3.0);
        assert_abs_diff_eq!(a.frobenius_norm(), 30f64.sqrt(), epsilon = 1e-12);

        let v = m(vec![vec![3.0, 4.0]]);
        assert_abs_diff_eq!(v.norm(2.0).unwrap(), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.norm(1.0).unwrap(), 7.0);
        assert_abs_diff_eq!(v.norm(3.0).unwrap(), 91f64.powf(1.0 / 3.0), epsilon = 1e-12);
        assert!(a.norm(3.0).is_err());

        let d = m(vec![vec![3.0, 0.0], vec![0.0, -5.0]]);
        assert_abs_diff_eq!(d.norm2().unwrap(), 5.0, epsilon = 1e-8);
    }
}
