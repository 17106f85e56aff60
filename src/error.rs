//! Error types for nlfem operations.

use thiserror::Error;

/// Result type alias using the nlfem [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or solving a problem.
///
/// Every variant carries a human-readable message; configuration errors
/// name the offending field. The core never recovers from any of these,
/// they are surfaced to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid run configuration (missing field, wrong radius dimension,
    /// unknown kernel, weight out of range).
    #[error("configuration error: {0}")]
    Config(String),

    /// Inconsistent mesh data (unknown element kind, bad incidence,
    /// node index out of bounds).
    #[error("mesh error: {0}")]
    Mesh(String),

    /// A physical parameter the current pipeline cannot handle.
    #[error("parameter error: {0}")]
    Parameter(String),

    /// Numerical failure during geometry-cache construction, e.g. a
    /// non-positive Jacobian determinant.
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Linear solver failures.
    #[error("solver error: {0}")]
    Solver(String),

    /// Matrix singularity or conditioning issues.
    #[error("singular matrix: {0}")]
    SingularMatrix(String),

    /// I/O errors from the result sinks.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
