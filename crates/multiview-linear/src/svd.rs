//! Sorted 3x3 SVD and singular value "massaging".
//!
//! Several constraints in multi-view geometry are expressed on singular
//! values: a fundamental matrix has rank 2, an essential matrix has two equal
//! non-zero singular values. [`MassageSingularValues`] decomposes a matrix,
//! lets a caller edit the singular values and writes the recomposed matrix
//! back.

use log::trace;
use multiview_core::{GeometryError, Mat3, Result, SvdOptions, Vec3, is_finite_slice};

/// SVD `M = U * diag(s) * V^T` with `s` sorted in descending order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortedSvd3 {
    pub u: Mat3,
    pub singular_values: Vec3,
    pub v_t: Mat3,
}

impl SortedSvd3 {
    pub fn v(&self) -> Mat3 {
        self.v_t.transpose()
    }

    pub fn recompose(&self) -> Mat3 {
        self.u * Mat3::from_diagonal(&self.singular_values) * self.v_t
    }
}

/// Full SVD of a 3x3 matrix with singular values sorted descending.
///
/// # Errors
/// - [`GeometryError::NonFinite`] for NaN or infinite input,
/// - [`GeometryError::SvdFailed`] if the iteration does not converge.
pub fn svd_descending(m: &Mat3, opts: &SvdOptions) -> Result<SortedSvd3> {
    if !is_finite_slice(m.as_slice()) {
        return Err(GeometryError::NonFinite);
    }
    let svd = (*m)
        .try_svd_unordered(true, true, opts.eps, opts.max_iterations)
        .ok_or(GeometryError::SvdFailed)?;
    let u = svd.u.ok_or(GeometryError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(GeometryError::SvdFailed)?;
    let s = svd.singular_values;

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| s[b].total_cmp(&s[a]));

    let mut sorted = SortedSvd3 {
        u: Mat3::zeros(),
        singular_values: Vec3::zeros(),
        v_t: Mat3::zeros(),
    };
    for (dst, &src) in order.iter().enumerate() {
        sorted.singular_values[dst] = s[src];
        sorted.u.set_column(dst, &u.column(src));
        sorted.v_t.set_row(dst, &v_t.row(src));
    }
    trace!("singular values {:?}", sorted.singular_values.as_slice());
    Ok(sorted)
}

fn keep_singular_values(_: &mut Vec3) {}

/// Decompose, edit singular values, recompose.
///
/// The edit function receives the diagonal of `S` in descending order and
/// may change it in place.
///
/// # Example
///
/// ```
/// use multiview_core::Mat3;
/// use multiview_linear::svd::{MassageSingularValues, massage};
///
/// let mut f = Mat3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0);
/// MassageSingularValues::new(massage::rank2).process(&mut f).unwrap();
/// assert!(f.determinant().abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MassageSingularValues<F> {
    massage: F,
    options: SvdOptions,
}

impl Default for MassageSingularValues<fn(&mut Vec3)> {
    fn default() -> Self {
        Self::identity()
    }
}

impl MassageSingularValues<fn(&mut Vec3)> {
    /// Leaves the singular values untouched; `process` only re-orthogonalizes.
    pub fn identity() -> Self {
        Self::new(keep_singular_values as fn(&mut Vec3))
    }
}

impl<F: FnMut(&mut Vec3)> MassageSingularValues<F> {
    pub fn new(massage: F) -> Self {
        Self {
            massage,
            options: SvdOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SvdOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace `m` with `U * f(S) * V^T`.
    ///
    /// On error `m` is left unmodified.
    pub fn process(&mut self, m: &mut Mat3) -> Result<()> {
        let mut svd = svd_descending(m, &self.options)?;
        (self.massage)(&mut svd.singular_values);
        *m = svd.recompose();
        Ok(())
    }
}

/// One-shot form of [`MassageSingularValues::process`].
pub fn massage_singular_values<F: FnMut(&mut Vec3)>(m: &mut Mat3, massage: F) -> Result<()> {
    MassageSingularValues::new(massage).process(m)
}

/// Common singular value edits.
pub mod massage {
    use multiview_core::Vec3;

    /// Zero the smallest singular value.
    pub fn rank2(s: &mut Vec3) {
        s[2] = 0.0;
    }

    /// Two equal singular values (their mean) and a zero.
    pub fn essential(s: &mut Vec3) {
        let mean = (s[0] + s[1]) * 0.5;
        *s = Vec3::new(mean, mean, 0.0);
    }

    /// Exactly `(1, 1, 0)`.
    pub fn essential_unit(s: &mut Vec3) {
        *s = Vec3::new(1.0, 1.0, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Mat3 {
        Mat3::new(2.0, -1.0, 0.5, 0.3, 4.0, 1.0, -2.0, 0.1, 3.0)
    }

    #[test]
    fn sorted_svd_reconstructs_input() {
        let m = sample();
        let svd = svd_descending(&m, &SvdOptions::default()).unwrap();
        let s = svd.singular_values;
        assert!(s[0] >= s[1] && s[1] >= s[2]);
        assert!((svd.recompose() - m).norm() < 1e-12);
        assert!((svd.u.transpose() * svd.u - Mat3::identity()).norm() < 1e-12);
    }

    #[test]
    fn identity_massage_is_a_no_op() {
        let mut m = sample();
        MassageSingularValues::identity().process(&mut m).unwrap();
        assert!((m - sample()).norm() < 1e-12);
    }

    #[test]
    fn essential_massage_gives_equal_pair() {
        let mut m = sample();
        massage_singular_values(&mut m, massage::essential).unwrap();
        let s = svd_descending(&m, &SvdOptions::default())
            .unwrap()
            .singular_values;
        assert!((s[0] - s[1]).abs() < 1e-9);
        assert!(s[2].abs() < 1e-9);
    }

    #[test]
    fn custom_options_reach_the_decomposition() {
        let opts = SvdOptions {
            eps: 1e-12,
            max_iterations: 0,
        };
        let mut massager = MassageSingularValues::new(massage::rank2).with_options(opts);
        assert_eq!(massager.options, opts);

        let mut m = sample();
        massager.process(&mut m).unwrap();
        assert!(m.determinant().abs() < 1e-9);

        let mut reference = sample();
        massage_singular_values(&mut reference, massage::rank2).unwrap();
        assert!((m - reference).norm() < 1e-9);
    }

    #[test]
    fn closure_sees_sorted_values() {
        let mut m = sample();
        let mut seen = Vec3::zeros();
        massage_singular_values(&mut m, |s| seen = *s).unwrap();
        assert!(seen[0] >= seen[1] && seen[1] >= seen[2]);
    }

    #[test]
    fn nan_input_fails_and_leaves_matrix() {
        let mut m = sample();
        m[(1, 1)] = f64::NAN;
        let err = MassageSingularValues::new(massage::rank2)
            .process(&mut m)
            .unwrap_err();
        assert_eq!(err, GeometryError::NonFinite);
        assert!(m[(1, 1)].is_nan());
    }
}
