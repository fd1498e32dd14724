use thiserror::Error;

/// Failure modes of the multi-view decompositions.
///
/// Every operation fails fast: nothing is retried and no partial result is
/// returned alongside an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("input contains NaN or infinite values")]
    NonFinite,
    #[error("singular value decomposition did not converge")]
    SvdFailed,
    #[error("QR decomposition hit a rank-deficient matrix")]
    QrFailed,
    #[error("{0} is not invertible")]
    Singular(&'static str),
    #[error("need at least {expected} points, got {got}")]
    NotEnoughPoints { expected: usize, got: usize },
    #[error("matrix is not positive definite")]
    NotPositiveDefinite,
    #[error("degenerate configuration: {0}")]
    Degenerate(&'static str),
}

pub type Result<T> = std::result::Result<T, GeometryError>;
