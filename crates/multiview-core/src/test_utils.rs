//! Shared assertions for multi-view tests.
//!
//! This module is public to allow use across workspace test suites,
//! but is not intended for production use.

use crate::{Mat3, Real, Vec3};

/// Rotation angle (radians) of `a^T * b`.
///
/// Uses `atan2` of the skew and trace parts so that angles near zero keep
/// full precision.
pub fn rotation_angle_between(a: &Mat3, b: &Mat3) -> Real {
    let r = a.transpose() * b;
    let skew = r - r.transpose();
    let sin_theta = 0.5 * Vec3::new(skew[(2, 1)], skew[(0, 2)], skew[(1, 0)]).norm();
    let cos_theta = (r.trace() - 1.0) * 0.5;
    sin_theta.atan2(cos_theta)
}

/// `true` if `r` is orthonormal with determinant +1 within `tol`.
pub fn is_rotation(r: &Mat3, tol: Real) -> bool {
    (r * r.transpose() - Mat3::identity()).norm() < tol && (r.determinant() - 1.0).abs() < tol
}

/// Frobenius distance between `a` and `b` after rescaling `a` to the least
/// squares scale of `b`.
pub fn scaled_distance(a: &[Real], b: &[Real]) -> Real {
    let s = crate::find_scale(a, b).unwrap_or(1.0);
    a.iter()
        .zip(b)
        .map(|(x, y)| (s * x - y).powi(2))
        .sum::<Real>()
        .sqrt()
}
