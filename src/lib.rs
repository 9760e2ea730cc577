// Dense complex matrix algebra

#![doc = include_str!("../README.md")]

pub mod config;
pub mod diagnostics;
pub mod eigen;
pub mod elementwise;
pub mod error;
pub mod gauss;
pub mod literal;
pub mod lup;
pub mod matrix;
pub mod qr;
pub mod random;
pub mod scalar;
pub mod svd;
pub mod tridiagonal;


pub use config::KernelConfig;
pub use eigen::{eig, eig_with, EigResult};
pub use elementwise::{InnerDimension, NormKind};
pub use error::{ErrorKind, MatrixError, Result};
pub use gauss::linear_dependent_rows;
pub use literal::{DefaultLiteralParser, MatrixLiteralParser};
pub use lup::{lup, LupResult};
pub use matrix::{Matrix, MatrixInput};
pub use qr::{orthogonal_complement, qr, qr_with, qr_with_source, QrResult};
pub use random::{ChaChaGaussian, GaussianSource};
pub use scalar::{ComplexScalar, DEFAULT_TOLERANCE};
pub use svd::{pinv, pinv_with, svd, svd_with, SvdResult};
pub use tridiagonal::{tridiagonalize, tridiagonalize_with, TridiagResult};
