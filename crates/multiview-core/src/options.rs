use serde::{Deserialize, Serialize};

/// Convergence settings for the SVD used by the decomposers.
///
/// # Example
///
/// ```
/// use multiview_core::SvdOptions;
///
/// let opts = SvdOptions {
///     max_iterations: 200,
///     ..Default::default()
/// };
/// assert!(opts.eps > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvdOptions {
    /// Off-diagonal tolerance of the bidiagonal iteration.
    pub eps: f64,
    /// Upper bound on iterations. `0` means unbounded.
    pub max_iterations: usize,
}

impl Default for SvdOptions {
    fn default() -> Self {
        Self {
            eps: 5.0 * f64::EPSILON,
            max_iterations: 1000,
        }
    }
}
