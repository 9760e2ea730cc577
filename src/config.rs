use crate::error::{MatrixError, Result};
use crate::scalar::DEFAULT_TOLERANCE;
use serde::{Deserialize, Serialize};

/// Numerical parameters shared by the decompositions.
///
/// Every operation that has a `*_with` variant reads its tolerance and
/// iteration caps from here; the plain variants use [`KernelConfig::default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Threshold below which pivots, norms and off-diagonal entries count as zero.
    pub tolerance: f64,
    /// Maximum QR sweeps per deflation boundary in the symmetric eigensolver.
    pub eig_max_iterations: usize,
    /// Number of random completions tried when building an orthogonal complement.
    pub orthogonalization_attempts: usize,
    /// Seed of the Gaussian source used by the orthogonal complement.
    pub orthogonalization_seed: u64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            tolerance: DEFAULT_TOLERANCE,
            eig_max_iterations: 100,
            orthogonalization_attempts: 100,
            orthogonalization_seed: 0,
        }
    }
}

impl KernelConfig {
    /// Checks that the tolerance is a positive finite number and the caps are non-zero.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(MatrixError::InvalidArgument {
                op: "config",
                message: format!("tolerance must be positive and finite, got {}", self.tolerance),
            });
        }
        if self.eig_max_iterations == 0 {
            return Err(MatrixError::InvalidArgument {
                op: "config",
                message: "eig_max_iterations must be greater than 0".to_string(),
            });
        }
        if self.orthogonalization_attempts == 0 {
            return Err(MatrixError::InvalidArgument {
                op: "config",
                message: "orthogonalization_attempts must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}
