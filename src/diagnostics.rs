// Accuracy reports comparing each factorization with the input it came from.

use crate::error::Result;
use crate::eigen::EigResult;
use crate::lup::LupResult;
use crate::matrix::Matrix;
use crate::qr::QrResult;
use crate::svd::SvdResult;
use crate::tridiagonal::TridiagResult;
use serde::{Deserialize, Serialize};

/// Accuracy report for one factorization of one input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecompositionDiagnostics {
    pub decomposition: String,                    // e.g., "lup", "qr", "svd"
    pub input_dims: Option<(usize, usize)>,       // (rows, cols)
    pub input_fro_norm: Option<f64>,

    // --- Reconstruction of the input from its factors ---
    pub reconstruction_error_abs: Option<f64>,    // ||A - product of factors||_F
    pub reconstruction_error_rel: Option<f64>,    // same, divided by ||A||_F

    // --- Orthogonality of the unitary factor(s) ---
    pub orthogonality_error: Option<f64>,         // ||I - Q^H Q||_F, worst factor

    // --- Spectrum, for eig and svd ---
    pub condition_number: Option<f64>,            // sigma_max / sigma_min (non-zero)
    pub spectrum_sample: Option<Vec<f64>>,

    pub notes: String,
}

/// `||a - b||_F`.
pub fn frobenius_distance(a: &Matrix, b: &Matrix) -> Result<f64> {
    Ok(a.sub(b)?.frobenius_norm())
}

/// `||I - QᴴQ||_F`.
pub fn orthogonality_error(q: &Matrix) -> Option<f64> {
    let gram = q.ctranspose().mul(q).ok()?;
    let identity = Matrix::identity(gram.rows(), gram.cols());
    frobenius_distance(&identity, &gram).ok()
}

/// `sigma_max / sigma_min` over the values above `floor`; infinite when none
/// qualifies.
pub fn condition_number(values: &[f64], floor: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let max = values.iter().map(|x| x.abs()).fold(f64::NEG_INFINITY, f64::max);
    let min_non_zero = values
        .iter()
        .map(|x| x.abs())
        .filter(|&x| x > floor)
        .fold(f64::INFINITY, f64::min);
    if min_non_zero == f64::INFINITY {
        return Some(f64::INFINITY);
    }
    Some(max / min_non_zero)
}

/// Up to `count` values evenly spaced over `values`, first and last included.
pub fn sample_spectrum(values: &[f64], count: usize) -> Vec<f64> {
    let len = values.len();
    if count == 0 || len == 0 {
        return Vec::new();
    }
    if count >= len {
        return values.to_vec();
    }
    let mut sampled = Vec::with_capacity(count);
    sampled.push(values[0]);
    if count > 1 {
        for i in 1..count - 1 {
            let idx = (i as f64 * (len - 1) as f64 / (count - 1) as f64).round() as usize;
            sampled.push(values[idx.min(len - 1)]);
        }
        sampled.push(values[len - 1]);
    }
    sampled.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    sampled
}

const SPECTRUM_SAMPLE: usize = 5;

fn report(name: &str, input: &Matrix, rebuilt: &Matrix) -> Result<DecompositionDiagnostics> {
    let norm = input.frobenius_norm();
    let abs = frobenius_distance(input, rebuilt)?;
    let rel = if norm > 0.0 { Some(abs / norm) } else { None };
    Ok(DecompositionDiagnostics {
        decomposition: name.to_string(),
        input_dims: Some(input.dim()),
        input_fro_norm: Some(norm),
        reconstruction_error_abs: Some(abs),
        reconstruction_error_rel: rel,
        ..DecompositionDiagnostics::default()
    })
}

fn worst(errors: &[Option<f64>]) -> Option<f64> {
    errors.iter().flatten().copied().reduce(f64::max)
}

/// Checks `Pᵗ·L·U` against `a`.
pub fn diagnose_lup(a: &Matrix, f: &LupResult) -> Result<DecompositionDiagnostics> {
    let rebuilt = f.p.transpose().mul(&f.l)?.mul(&f.u)?;
    let mut d = report("lup", a, &rebuilt)?;
    d.orthogonality_error = orthogonality_error(&f.p);
    Ok(d)
}

/// Checks `Q·R` against `a`.
pub fn diagnose_qr(a: &Matrix, f: &QrResult) -> Result<DecompositionDiagnostics> {
    let rebuilt = f.q.mul(&f.r)?;
    let mut d = report("qr", a, &rebuilt)?;
    d.orthogonality_error = orthogonality_error(&f.q);
    Ok(d)
}

/// Checks `P·H·Pᵗ` against `a`.
pub fn diagnose_tridiag(a: &Matrix, f: &TridiagResult) -> Result<DecompositionDiagnostics> {
    let rebuilt = f.p.mul(&f.h)?.mul(&f.p.transpose())?;
    let mut d = report("tridiagonalize", a, &rebuilt)?;
    d.orthogonality_error = orthogonality_error(&f.p);
    if !f.h.is_tridiagonal(None) {
        d.notes = "H has entries outside the three central diagonals".to_string();
    }
    Ok(d)
}

/// Checks `V·D·Vᵗ` against `a`.
pub fn diagnose_eig(a: &Matrix, f: &EigResult) -> Result<DecompositionDiagnostics> {
    let rebuilt = f.v.mul(&f.d)?.mul(&f.v.transpose())?;
    let mut d = report("eig", a, &rebuilt)?;
    let values = f.eigenvalues();
    d.orthogonality_error = orthogonality_error(&f.v);
    d.condition_number = condition_number(&values, 1e-12);
    d.spectrum_sample = Some(sample_spectrum(&values, SPECTRUM_SAMPLE));
    Ok(d)
}

/// Checks `U·S·Vᵗ` against `a`.
pub fn diagnose_svd(a: &Matrix, f: &SvdResult) -> Result<DecompositionDiagnostics> {
    let rebuilt = f.u.mul(&f.s)?.mul(&f.v.transpose())?;
    let mut d = report("svd", a, &rebuilt)?;
    let values = f.singular_values();
    d.orthogonality_error = worst(&[orthogonality_error(&f.u), orthogonality_error(&f.v)]);
    d.condition_number = condition_number(&values, 1e-12);
    d.spectrum_sample = Some(sample_spectrum(&values, SPECTRUM_SAMPLE));
    if values.iter().any(|&s| s == 0.0) {
        d.notes = format!(
            "rank deficient: {} of {} singular values are zero",
            values.iter().filter(|&&s| s == 0.0).count(),
            values.len()
        );
    }
    Ok(d)
}
