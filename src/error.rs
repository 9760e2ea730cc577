// Error type shared by every matrix operation.

use thiserror::Error;

/// Coarse classification of a [`MatrixError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Operand shapes cannot be combined.
    DimensionMismatch,
    /// The matrix does not have the required structure (square, symmetric, vector, scalar).
    ShapeError,
    /// A real-only algorithm received complex entries.
    UnsupportedOperand,
    /// A pivot vanished while inverting or solving.
    SingularOrRankDeficient,
    /// The eigenvalue iteration hit its cap.
    ConvergenceFailure,
    /// The orthogonal complement could not be completed.
    OrthogonalizationFailure,
    /// Malformed construction input or argument.
    InvalidInput,
}

/// Errors raised by matrix construction, arithmetic and decompositions.
///
/// Every variant records the name of the operation that rejected its input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    #[error("{op}: dimension mismatch between {left:?} and {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("{op}: matrix must be square, got {rows}x{cols}")]
    NotSquare {
        op: &'static str,
        rows: usize,
        cols: usize,
    },

    #[error("{op}: matrix must be symmetric")]
    NotSymmetric { op: &'static str },

    #[error("{op}: argument must be a vector")]
    NotVector { op: &'static str },

    #[error("{op}: argument must be a scalar")]
    NotScalar { op: &'static str },

    #[error("{op}: complex entries are not supported, the algorithm is real-only")]
    ComplexUnsupported { op: &'static str },

    #[error("{op}: matrix is singular or rank deficient")]
    SingularOrRankDeficient { op: &'static str },

    #[error("{op}: QR iteration did not converge at boundary {boundary} after {iterations} iterations")]
    ConvergenceFailure {
        op: &'static str,
        boundary: usize,
        iterations: usize,
    },

    #[error("{op}: orthogonal complement not found after {attempts} attempts")]
    OrthogonalizationFailure { op: &'static str, attempts: usize },

    #[error("{op}: a matrix needs at least one row and one column")]
    EmptyMatrix { op: &'static str },

    #[error("{op}: row {row} has {found} entries, expected {expected}")]
    RaggedRows {
        op: &'static str,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{op}: cannot parse matrix literal: {message}")]
    Parse { op: &'static str, message: String },

    #[error("{op}: {message}")]
    InvalidArgument { op: &'static str, message: String },
}

impl MatrixError {
    /// Returns the taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MatrixError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            MatrixError::NotSquare { .. }
            | MatrixError::NotSymmetric { .. }
            | MatrixError::NotVector { .. }
            | MatrixError::NotScalar { .. } => ErrorKind::ShapeError,
            MatrixError::ComplexUnsupported { .. } => ErrorKind::UnsupportedOperand,
            MatrixError::SingularOrRankDeficient { .. } => ErrorKind::SingularOrRankDeficient,
            MatrixError::ConvergenceFailure { .. } => ErrorKind::ConvergenceFailure,
            MatrixError::OrthogonalizationFailure { .. } => ErrorKind::OrthogonalizationFailure,
            MatrixError::EmptyMatrix { .. }
            | MatrixError::RaggedRows { .. }
            | MatrixError::Parse { .. }
            | MatrixError::InvalidArgument { .. } => ErrorKind::InvalidInput,
        }
    }

    /// Name of the operation that raised the error.
    pub fn operation(&self) -> &'static str {
        match self {
            MatrixError::DimensionMismatch { op, .. }
            | MatrixError::NotSquare { op, .. }
            | MatrixError::NotSymmetric { op }
            | MatrixError::NotVector { op }
            | MatrixError::NotScalar { op }
            | MatrixError::ComplexUnsupported { op }
            | MatrixError::SingularOrRankDeficient { op }
            | MatrixError::ConvergenceFailure { op, .. }
            | MatrixError::OrthogonalizationFailure { op, .. }
            | MatrixError::EmptyMatrix { op }
            | MatrixError::RaggedRows { op, .. }
            | MatrixError::Parse { op, .. }
            | MatrixError::InvalidArgument { op, .. } => *op,
        }
    }
}

pub type Result<T> = std::result::Result<T, MatrixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_group_shape_errors() {
        let e = MatrixError::NotSymmetric { op: "eig" };
        assert_eq!(e.kind(), ErrorKind::ShapeError);
        assert_eq!(e.operation(), "eig");

        let e = MatrixError::ConvergenceFailure {
            op: "eig",
            boundary: 3,
            iterations: 100,
        };
        assert_eq!(e.kind(), ErrorKind::ConvergenceFailure);
        assert!(e.to_string().contains("boundary 3"));
    }
}
