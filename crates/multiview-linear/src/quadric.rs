//! Absolute dual quadric utilities for self-calibration.
//!
//! In a projective reconstruction whose first camera is `[I | 0]`, the
//! absolute dual quadric has the form
//!
//! ```text
//! Q = H diag(1, 1, 1, 0) H^T,   H = [ K      0 ]
//!                                   [ -p^T K 1 ]
//! ```
//!
//! where `K` is the calibration of the first view and `p` locates the plane
//! at infinity. `H` is the rectifying homography that upgrades the
//! reconstruction to metric. `Q` is only defined up to a non-zero scale of
//! either sign.

use log::debug;
use multiview_core::{FxFyCxCySkew, GeometryError, Mat3, Mat34, Mat4, Real, Result, Vec3};
use nalgebra::{Cholesky, Matrix4x3};

/// Decomposition of an absolute dual quadric into the first view's
/// calibration and the plane at infinity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteDualQuadric {
    /// Upper-triangular, `K[2,2] = 1`.
    pub k: Mat3,
    /// Plane at infinity is `(p^T, 1)`.
    pub p: Vec3,
}

impl AbsoluteDualQuadric {
    /// Decompose `Q` (any non-zero scale) into `K` and `p`.
    ///
    /// # Errors
    /// - [`GeometryError::Degenerate`] if `Q[2,2]` vanishes,
    /// - [`GeometryError::NotPositiveDefinite`] if the upper-left block does
    ///   not describe a valid image of the absolute conic.
    pub fn decompose(q: &Mat4) -> Result<Self> {
        let (w, p) = decompose_abs_dual_quadratic(q)?;
        let w_inv = w
            .try_inverse()
            .ok_or(GeometryError::Singular("dual image of the absolute conic"))?;
        let chol = Cholesky::new(w_inv).ok_or_else(|| {
            debug!("absolute dual quadric rejected: omega is not positive definite");
            GeometryError::NotPositiveDefinite
        })?;
        // w^-1 = K^-T K^-1 = L L^T, so K = (L^-1)^T.
        let l_inv = chol
            .l()
            .try_inverse()
            .ok_or(GeometryError::Singular("Cholesky factor"))?;
        let k = l_inv.transpose();
        Ok(Self {
            k: k / k[(2, 2)],
            p,
        })
    }

    /// `Q = [w, -w p; -p^T w, p^T w p]` with `w = K K^T`.
    pub fn to_quadric(&self) -> Mat4 {
        let w = self.k * self.k.transpose();
        let wp = w * self.p;
        let mut q = Mat4::zeros();
        q.fixed_view_mut::<3, 3>(0, 0).copy_from(&w);
        q.fixed_view_mut::<3, 1>(0, 3).copy_from(&-wp);
        q.fixed_view_mut::<1, 3>(3, 0).copy_from(&-wp.transpose());
        q[(3, 3)] = self.p.dot(&wp);
        q
    }

    /// The rectifying homography `[K 0; -p^T K 1]`.
    pub fn rectifying_homography(&self) -> Mat4 {
        canonical_rectifying_homography(&self.k, &self.p)
    }
}

/// Split a quadric into the dual image of the absolute conic `w = K K^T`
/// (scaled so that `w[2,2] = 1`) and the plane at infinity `p`.
pub fn decompose_abs_dual_quadratic(q: &Mat4) -> Result<(Mat3, Vec3)> {
    let scale = q[(2, 2)];
    if !scale.is_finite() || scale.abs() <= Real::EPSILON * q.amax() {
        return Err(GeometryError::Degenerate("absolute dual quadric has Q[2,2] = 0"));
    }
    let q = q / scale;
    let w = q.fixed_view::<3, 3>(0, 0).into_owned();
    let w_inv = w
        .try_inverse()
        .ok_or(GeometryError::Singular("dual image of the absolute conic"))?;
    let p = -(w_inv * q.fixed_view::<3, 1>(0, 3));
    Ok((w, p))
}

/// `[K 0; -p^T K 1]`.
pub fn canonical_rectifying_homography(k: &Mat3, p: &Vec3) -> Mat4 {
    let mut h = Mat4::identity();
    h.fixed_view_mut::<3, 3>(0, 0).copy_from(k);
    h.fixed_view_mut::<1, 3>(3, 0).copy_from(&-(p.transpose() * k));
    h
}

/// Project the quadric onto one with a zeroed principal point and/or skew.
///
/// `Q` is decomposed into `(K, p)`, `K` is edited and `Q` is recomposed in
/// place at unit scale (`Q[2,2] = 1`). On error `Q` is left untouched.
pub fn enforce_absolute_quadratic_constraints(q: &mut Mat4, zero_center: bool, zero_skew: bool) -> Result<()> {
    let mut adq = AbsoluteDualQuadric::decompose(q)?;
    if zero_center {
        adq.k[(0, 2)] = 0.0;
        adq.k[(1, 2)] = 0.0;
    }
    if zero_skew {
        adq.k[(0, 1)] = 0.0;
    }
    *q = adq.to_quadric();
    Ok(())
}

/// Rectifying homography encoded by an absolute dual quadric.
pub fn absolute_quadratic_to_h(q: &Mat4) -> Result<Mat4> {
    Ok(AbsoluteDualQuadric::decompose(q)?.rectifying_homography())
}

/// Inverse of [`absolute_quadratic_to_h`]: `Q = H[:, 0:3] H[:, 0:3]^T`.
pub fn rectify_h_to_absolute_quadratic(h: &Mat4) -> Mat4 {
    let a: Matrix4x3<Real> = h.fixed_view::<4, 3>(0, 0).into_owned();
    a * a.transpose()
}

/// Intrinsics of the camera `P` implied by `Q`: decomposes `w = P Q P^T`.
pub fn intrinsic_from_absolute_quadratic(q: &Mat4, p: &Mat34) -> Result<FxFyCxCySkew<Real>> {
    decompose_diac(&(p * q * p.transpose()))
}

/// Closed-form intrinsics from a dual image of the absolute conic `w = K K^T`
/// (any non-zero scale).
pub fn decompose_diac(w: &Mat3) -> Result<FxFyCxCySkew<Real>> {
    let s = w[(2, 2)];
    if !s.is_finite() || s.abs() <= Real::EPSILON * w.amax() {
        return Err(GeometryError::Degenerate("dual image of the absolute conic has w[2,2] = 0"));
    }
    let w = w / s;
    let cx = w[(0, 2)];
    let cy = w[(1, 2)];
    let fy_sq = w[(1, 1)] - cy * cy;
    if fy_sq <= 0.0 {
        return Err(GeometryError::NotPositiveDefinite);
    }
    let fy = fy_sq.sqrt();
    let skew = (w[(0, 1)] - cx * cy) / fy;
    let fx_sq = w[(0, 0)] - cx * cx - skew * skew;
    if fx_sq <= 0.0 {
        return Err(GeometryError::NotPositiveDefinite);
    }
    Ok(FxFyCxCySkew {
        fx: fx_sq.sqrt(),
        fy,
        cx,
        cy,
        skew,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k_fixture() -> Mat3 {
        Mat3::new(300.0, 1.0, 50.0, 0.0, 310.0, 60.0, 0.0, 0.0, 1.0)
    }

    fn quadric(k: &Mat3, p: &Vec3) -> Mat4 {
        rectify_h_to_absolute_quadratic(&canonical_rectifying_homography(k, p))
    }

    #[test]
    fn decompose_recovers_k_and_plane() {
        let k = k_fixture();
        let p = Vec3::new(0.5, 0.2, 0.1);
        let q = quadric(&k, &p) * 0.0394;

        let (w, p_est) = decompose_abs_dual_quadratic(&q).unwrap();
        assert!((w - k * k.transpose()).norm() < 1e-8);
        assert!((p_est - p).norm() < 1e-10);

        let adq = AbsoluteDualQuadric::decompose(&q).unwrap();
        assert!((adq.k - k).norm() < 1e-8);
    }

    #[test]
    fn enforce_handles_negative_scale() {
        let k = k_fixture();
        let p = Vec3::new(0.5, 0.2, 0.1);
        let expected = quadric(&k, &p);
        let mut q = expected * -0.045;

        enforce_absolute_quadratic_constraints(&mut q, false, false).unwrap();
        assert!((q - expected).norm() / expected.norm() < 1e-10);
    }

    #[test]
    fn enforce_zeroes_center_and_skew() {
        let k = k_fixture();
        let p = Vec3::new(-0.3, 0.1, 0.2);
        let mut q = quadric(&k, &p) * 2.0;
        enforce_absolute_quadratic_constraints(&mut q, true, true).unwrap();

        let k_expected = Mat3::new(300.0, 0.0, 0.0, 0.0, 310.0, 0.0, 0.0, 0.0, 1.0);
        let expected = quadric(&k_expected, &p);
        assert!((q - expected).norm() / expected.norm() < 1e-8);
    }

    #[test]
    fn h_and_quadric_roundtrip() {
        let h = canonical_rectifying_homography(&k_fixture(), &Vec3::new(0.2, -0.4, 0.9));
        let q = rectify_h_to_absolute_quadratic(&h);
        let h_back = absolute_quadratic_to_h(&q).unwrap();
        assert!((h_back - h).norm() / h.norm() < 1e-10);
    }

    #[test]
    fn diac_closed_form() {
        let k = k_fixture();
        let intr = decompose_diac(&(k * k.transpose() * -3.0)).unwrap();
        assert!((intr.k_matrix() - k).norm() < 1e-8);
    }

    #[test]
    fn indefinite_quadric_is_rejected() {
        let mut q = Mat4::from_diagonal(&nalgebra::Vector4::new(1.0, -1.0, 1.0, 0.0));
        let before = q;
        assert_eq!(
            enforce_absolute_quadratic_constraints(&mut q, true, true).unwrap_err(),
            GeometryError::NotPositiveDefinite
        );
        assert_eq!(q, before);
    }
}
