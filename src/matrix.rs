// The immutable matrix value, its construction inputs and the staging builder.

use crate::error::{MatrixError, Result};
use crate::literal::{DefaultLiteralParser, MatrixLiteralParser};
use crate::scalar::{decimal_places, ComplexScalar, DEFAULT_TOLERANCE, ONE, ZERO};
use ndarray::{Array2, Axis};
use num_complex::Complex64;
use once_cell::unsync::OnceCell;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use std::fmt;

/// Above this magnitude entries are rendered in exponent form.
const EXPONENT_THRESHOLD: f64 = 1.0e9;
/// Digits after the point when any entry is fractional.
const RENDER_DECIMALS: usize = 4;

/// Everything a [`Matrix`] can be built from.
#[derive(Clone, Debug)]
pub enum MatrixInput {
    /// A single entry, producing a 1x1 matrix.
    Scalar(Complex64),
    /// A flat sequence, producing a row vector.
    Row(Vec<Complex64>),
    /// Row-major nested rows.
    Nested(Vec<Vec<Complex64>>),
    /// A matrix literal, handed to [`DefaultLiteralParser`].
    Text(String),
    /// An existing value, deep-copied.
    Value(Matrix),
}

impl From<f64> for MatrixInput {
    fn from(value: f64) -> Self {
        MatrixInput::Scalar(Complex64::new(value, 0.0))
    }
}

impl From<Complex64> for MatrixInput {
    fn from(value: Complex64) -> Self {
        MatrixInput::Scalar(value)
    }
}

impl From<Vec<f64>> for MatrixInput {
    fn from(values: Vec<f64>) -> Self {
        MatrixInput::Row(values.into_iter().map(|x| Complex64::new(x, 0.0)).collect())
    }
}

impl From<Vec<Complex64>> for MatrixInput {
    fn from(values: Vec<Complex64>) -> Self {
        MatrixInput::Row(values)
    }
}

impl From<Vec<Vec<f64>>> for MatrixInput {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        MatrixInput::Nested(
            rows.into_iter()
                .map(|row| row.into_iter().map(|x| Complex64::new(x, 0.0)).collect())
                .collect(),
        )
    }
}

impl From<Vec<Vec<Complex64>>> for MatrixInput {
    fn from(rows: Vec<Vec<Complex64>>) -> Self {
        MatrixInput::Nested(rows)
    }
}

impl<const N: usize> From<[f64; N]> for MatrixInput {
    fn from(values: [f64; N]) -> Self {
        MatrixInput::from(values.to_vec())
    }
}

impl<const R: usize, const C: usize> From<[[f64; C]; R]> for MatrixInput {
    fn from(rows: [[f64; C]; R]) -> Self {
        MatrixInput::from(rows.iter().map(|row| row.to_vec()).collect::<Vec<_>>())
    }
}

impl From<&str> for MatrixInput {
    fn from(text: &str) -> Self {
        MatrixInput::Text(text.to_string())
    }
}

impl From<String> for MatrixInput {
    fn from(text: String) -> Self {
        MatrixInput::Text(text)
    }
}

impl From<Matrix> for MatrixInput {
    fn from(value: Matrix) -> Self {
        MatrixInput::Value(value)
    }
}

impl From<&Matrix> for MatrixInput {
    fn from(value: &Matrix) -> Self {
        MatrixInput::Value(value.clone())
    }
}

/// Dense complex matrix with at least one row and one column.
///
/// Values are never modified after construction. Every operation returns a
/// fresh matrix; intermediate states live in a [`MatrixBuilder`] owned by the
/// operation. The text rendering is computed on first use and kept.
#[derive(Clone)]
pub struct Matrix {
    data: Array2<Complex64>,
    rendered: OnceCell<String>,
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("rows", &self.rows())
            .field("cols", &self.cols())
            .field("data", &self.data)
            .finish()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_text())
    }
}

impl From<f64> for Matrix {
    fn from(value: f64) -> Self {
        Matrix::scalar_value(Complex64::new(value, 0.0))
    }
}

impl From<Complex64> for Matrix {
    fn from(value: Complex64) -> Self {
        Matrix::scalar_value(value)
    }
}

impl Matrix {
    // --- Construction ---

    /// Builds a matrix from any [`MatrixInput`].
    ///
    /// ```
    /// use complex_linalg::Matrix;
    ///
    /// let a = Matrix::create([[1.0, 2.0], [3.0, 4.0]]).unwrap();
    /// let b = Matrix::create("[1 2; 3 4]").unwrap();
    /// assert_eq!(a, b);
    /// ```
    pub fn create(input: impl Into<MatrixInput>) -> Result<Matrix> {
        match input.into() {
            MatrixInput::Scalar(value) => Ok(Matrix::scalar_value(value)),
            MatrixInput::Row(values) => Matrix::from_rows(vec![values]),
            MatrixInput::Nested(rows) => Matrix::from_rows(rows),
            MatrixInput::Text(text) => Matrix::parse_with(&text, &DefaultLiteralParser),
            MatrixInput::Value(value) => Ok(Matrix::from_array_unchecked(value.data)),
        }
    }

    /// Parses a matrix literal with a caller supplied parser.
    pub fn parse_with<P: MatrixLiteralParser + ?Sized>(text: &str, parser: &P) -> Result<Matrix> {
        let rows = parser.parse(text)?;
        Matrix::from_rows(rows)
    }

    /// Builds a matrix from row-major rows; rows must share one non-zero length.
    pub fn from_rows(rows: Vec<Vec<Complex64>>) -> Result<Matrix> {
        let n_rows = rows.len();
        if n_rows == 0 {
            return Err(MatrixError::EmptyMatrix { op: "create" });
        }
        let n_cols = rows[0].len();
        if n_cols == 0 {
            return Err(MatrixError::EmptyMatrix { op: "create" });
        }
        let mut flat = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(MatrixError::RaggedRows {
                    op: "create",
                    row: i,
                    expected: n_cols,
                    found: row.len(),
                });
            }
            flat.extend(row);
        }
        Array2::from_shape_vec((n_rows, n_cols), flat)
            .map(Matrix::from_array_unchecked)
            .map_err(|e| MatrixError::InvalidArgument {
                op: "create",
                message: e.to_string(),
            })
    }

    /// Wraps an ndarray; fails on an empty array.
    pub fn from_array(data: Array2<Complex64>) -> Result<Matrix> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(MatrixError::EmptyMatrix { op: "from_array" });
        }
        Ok(Matrix::from_array_unchecked(data))
    }

    /// Wraps a real ndarray.
    pub fn from_real_array(data: &Array2<f64>) -> Result<Matrix> {
        Matrix::from_array(data.mapv(|x| Complex64::new(x, 0.0)))
    }

    /// Fills a `rows x cols` matrix from `f(row, col)`.
    pub fn from_fn<F>(rows: usize, cols: usize, f: F) -> Result<Matrix>
    where
        F: FnMut((usize, usize)) -> Complex64,
    {
        check_shape("from_fn", rows, cols)?;
        Ok(Matrix::filled(rows, cols, f))
    }

    pub(crate) fn from_array_unchecked(data: Array2<Complex64>) -> Matrix {
        debug_assert!(data.nrows() > 0 && data.ncols() > 0);
        Matrix {
            data,
            rendered: OnceCell::new(),
        }
    }

    /// Shape must already be known to be non-empty.
    pub(crate) fn filled<F>(rows: usize, cols: usize, f: F) -> Matrix
    where
        F: FnMut((usize, usize)) -> Complex64,
    {
        Matrix::from_array_unchecked(Array2::from_shape_fn((rows, cols), f))
    }

    pub(crate) fn scalar_value(value: Complex64) -> Matrix {
        Matrix::filled(1, 1, |_| value)
    }

    // --- Factories ---

    /// Identity-like matrix: ones on the main diagonal.
    pub fn eye(rows: usize, cols: usize) -> Result<Matrix> {
        check_shape("eye", rows, cols)?;
        Ok(Matrix::identity(rows, cols))
    }

    pub fn zeros(rows: usize, cols: usize) -> Result<Matrix> {
        check_shape("zeros", rows, cols)?;
        Ok(Matrix::filled(rows, cols, |_| ZERO))
    }

    pub fn ones(rows: usize, cols: usize) -> Result<Matrix> {
        check_shape("ones", rows, cols)?;
        Ok(Matrix::filled(rows, cols, |_| ONE))
    }

    /// Fills a `rows x cols` matrix with `value`, tiling a non-scalar value
    /// with modulo indexing.
    pub fn memset(value: &Matrix, rows: usize, cols: usize) -> Result<Matrix> {
        check_shape("memset", rows, cols)?;
        let (vr, vc) = (value.rows(), value.cols());
        Ok(Matrix::filled(rows, cols, |(r, c)| value.data[[r % vr, c % vc]]))
    }

    /// Uniform `[0, 1)` real entries from a seeded generator.
    pub fn rand(rows: usize, cols: usize, seed: u64) -> Result<Matrix> {
        check_shape("rand", rows, cols)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Ok(Matrix::filled(rows, cols, |_| Complex64::new(rng.gen::<f64>(), 0.0)))
    }

    /// Standard normal real entries from a seeded generator.
    pub fn randn(rows: usize, cols: usize, seed: u64) -> Result<Matrix> {
        check_shape("randn", rows, cols)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Ok(Matrix::filled(rows, cols, |_| {
            Complex64::new(rng.sample::<f64, _>(StandardNormal), 0.0)
        }))
    }

    pub(crate) fn identity(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, |(r, c)| if r == c { ONE } else { ZERO })
    }

    // --- Shape and access ---

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// `(rows, cols)`.
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Row vector `[rows, cols]`.
    pub fn size(&self) -> Matrix {
        let (r, c) = self.dim();
        Matrix::filled(1, 2, |(_, i)| {
            Complex64::new(if i == 0 { r as f64 } else { c as f64 }, 0.0)
        })
    }

    /// Larger of the two dimensions.
    pub fn length(&self) -> usize {
        self.rows().max(self.cols())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Complex64> {
        self.data.get((row, col)).copied()
    }

    /// Entry `i` of a vector, counted along its long axis.
    pub(crate) fn vector_entry(&self, i: usize) -> Complex64 {
        if self.is_row() {
            self.data[[0, i]]
        } else {
            self.data[[i, 0]]
        }
    }

    /// The first entry.
    pub fn scalar(&self) -> Complex64 {
        self.data[[0, 0]]
    }

    pub fn is_scalar(&self) -> bool {
        self.rows() == 1 && self.cols() == 1
    }

    pub fn is_row(&self) -> bool {
        self.rows() == 1
    }

    pub fn is_column(&self) -> bool {
        self.cols() == 1
    }

    pub fn is_vector(&self) -> bool {
        self.is_row() || self.is_column()
    }

    pub fn is_square(&self) -> bool {
        self.rows() == self.cols()
    }

    pub fn as_array(&self) -> &Array2<Complex64> {
        &self.data
    }

    pub fn into_array(self) -> Array2<Complex64> {
        self.data
    }

    /// Real parts as nested rows.
    pub fn to_real_rows(&self) -> Vec<Vec<f64>> {
        self.data
            .axis_iter(Axis(0))
            .map(|row| row.iter().map(|z| z.re).collect())
            .collect()
    }

    /// Real parts as an ndarray.
    pub fn to_real_array(&self) -> Array2<f64> {
        self.data.mapv(|z| z.re)
    }

    /// Stacks `other` to the right of `self`; row counts must match.
    pub fn concat_right(&self, other: &Matrix) -> Result<Matrix> {
        let mut builder = MatrixBuilder::from_matrix(self);
        builder.concat_right(other)?;
        Ok(builder.build())
    }

    /// Stacks `other` below `self`; column counts must match.
    pub fn concat_bottom(&self, other: &Matrix) -> Result<Matrix> {
        let mut builder = MatrixBuilder::from_matrix(self);
        builder.concat_bottom(other)?;
        Ok(builder.build())
    }

    // --- Rendering ---

    /// Text form, computed once per value.
    pub fn to_text(&self) -> &str {
        self.rendered.get_or_init(|| render(&self.data))
    }
}

fn check_shape(op: &'static str, rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(MatrixError::EmptyMatrix { op });
    }
    Ok(())
}

fn render(data: &Array2<Complex64>) -> String {
    let mut draw_imag = false;
    let mut draw_exp = false;
    let mut decimals = 0;
    for z in data.iter() {
        if !z.is_real_eps(DEFAULT_TOLERANCE) {
            draw_imag = true;
        }
        if z.re.abs() >= EXPONENT_THRESHOLD || z.im.abs() >= EXPONENT_THRESHOLD {
            draw_exp = true;
        }
        decimals = decimals.max(decimal_places(z.re)).max(decimal_places(z.im));
    }
    if decimals > 0 {
        decimals = RENDER_DECIMALS;
    }
    let format_part = |x: f64| -> String {
        if !draw_exp {
            return format!("{:.*}", decimals, x);
        }
        let text = format!("{:.*e}", RENDER_DECIMALS, x);
        match text.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(d) => ('-', d),
                    None => ('+', exponent),
                };
                format!("{}e{}{:0>3}", mantissa, sign, digits)
            }
            None => text,
        }
    };

    struct Cell {
        re: String,
        im: Option<(char, String)>,
    }
    let mut width = 0;
    let mut cells = Vec::with_capacity(data.len());
    for z in data.iter() {
        let re_sign = if z.re < 0.0 { "-" } else { " " };
        let re = format!("{}{}", re_sign, format_part(z.re.abs()));
        width = width.max(re.len());
        let im = if draw_imag {
            let im_sign = if z.im < 0.0 { '-' } else { '+' };
            let text = format_part(z.im.abs());
            width = width.max(text.len() + 1);
            Some((im_sign, text))
        } else {
            None
        };
        cells.push(Cell { re, im });
    }

    let cols = data.ncols();
    let mut out = String::new();
    for (i, cell) in cells.iter().enumerate() {
        out.push_str(&format!("{:>width$}", cell.re, width = width));
        if let Some((sign, text)) = &cell.im {
            out.push_str(&format!(" {}{:>width$}i", sign, text, width = width));
        }
        out.push(if i % cols < cols - 1 { ' ' } else { '\n' });
    }
    out
}

/// Mutable staging buffer used inside a single operation.
///
/// A builder never carries a rendering cache; [`MatrixBuilder::build`]
/// freezes it into a value whose rendering is computed afresh.
#[derive(Clone, Debug)]
pub(crate) struct MatrixBuilder {
    data: Array2<Complex64>,
}

impl MatrixBuilder {
    pub(crate) fn from_matrix(matrix: &Matrix) -> Self {
        MatrixBuilder {
            data: matrix.data.clone(),
        }
    }

    pub(crate) fn from_owned(matrix: Matrix) -> Self {
        MatrixBuilder { data: matrix.data }
    }

    pub(crate) fn zeros(rows: usize, cols: usize) -> Self {
        MatrixBuilder {
            data: Array2::from_elem((rows, cols), ZERO),
        }
    }

    pub(crate) fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub(crate) fn cols(&self) -> usize {
        self.data.ncols()
    }

    #[inline]
    pub(crate) fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[[row, col]]
    }

    #[inline]
    pub(crate) fn set(&mut self, row: usize, col: usize, value: Complex64) {
        self.data[[row, col]] = value;
    }

    /// Grows with zeros or crops to `rows x cols`.
    pub(crate) fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
        check_shape("resize", rows, cols)?;
        if (rows, cols) == self.data.dim() {
            return Ok(());
        }
        let old = &self.data;
        let (old_rows, old_cols) = old.dim();
        let resized = Array2::from_shape_fn((rows, cols), |(r, c)| {
            if r < old_rows && c < old_cols {
                old[[r, c]]
            } else {
                ZERO
            }
        });
        self.data = resized;
        Ok(())
    }

    pub(crate) fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.cols() {
            self.data.swap([a, c], [b, c]);
        }
    }

    pub(crate) fn swap_columns(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for r in 0..self.rows() {
            self.data.swap([r, a], [r, b]);
        }
    }

    pub(crate) fn delete_row(&mut self, index: usize) -> Result<()> {
        if self.rows() == 1 || index >= self.rows() {
            return Err(MatrixError::InvalidArgument {
                op: "delete_row",
                message: format!("cannot delete row {} of {}", index, self.rows()),
            });
        }
        let keep: Vec<usize> = (0..self.rows()).filter(|&r| r != index).collect();
        self.data = self.data.select(Axis(0), &keep);
        Ok(())
    }

    pub(crate) fn delete_column(&mut self, index: usize) -> Result<()> {
        if self.cols() == 1 || index >= self.cols() {
            return Err(MatrixError::InvalidArgument {
                op: "delete_column",
                message: format!("cannot delete column {} of {}", index, self.cols()),
            });
        }
        let keep: Vec<usize> = (0..self.cols()).filter(|&c| c != index).collect();
        self.data = self.data.select(Axis(1), &keep);
        Ok(())
    }

    pub(crate) fn concat_right(&mut self, other: &Matrix) -> Result<()> {
        if other.rows() != self.rows() {
            return Err(MatrixError::DimensionMismatch {
                op: "concat_right",
                left: self.data.dim(),
                right: other.dim(),
            });
        }
        self.data = ndarray::concatenate(Axis(1), &[self.data.view(), other.data.view()])
            .map_err(|e| MatrixError::InvalidArgument {
                op: "concat_right",
                message: e.to_string(),
            })?;
        Ok(())
    }

    pub(crate) fn concat_bottom(&mut self, other: &Matrix) -> Result<()> {
        if other.cols() != self.cols() {
            return Err(MatrixError::DimensionMismatch {
                op: "concat_bottom",
                left: self.data.dim(),
                right: other.dim(),
            });
        }
        self.data = ndarray::concatenate(Axis(0), &[self.data.view(), other.data.view()])
            .map_err(|e| MatrixError::InvalidArgument {
                op: "concat_bottom",
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Row index in `from..rows` holding the largest entry norm of `column`,
    /// with that norm. Ties keep the first row; an all-zero range reports `from`.
    pub(crate) fn max_row_number(&self, column: usize, from: usize) -> (usize, f64) {
        let mut index = from;
        let mut max = 0.0;
        for r in from..self.rows() {
            let norm = self.data[[r, column]].norm_value();
            if norm > max {
                max = norm;
                index = r;
            }
        }
        (index, max)
    }

    pub(crate) fn build(self) -> Matrix {
        Matrix::from_array_unchecked(self.data)
    }
}
