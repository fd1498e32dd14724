//! Camera matrix decomposition and projective-to-metric upgrade.
//!
//! A metric camera matrix factors as `P = K [R | T]` with `K` upper-triangular.
//! [`ProjectiveToMetric`] recovers `K`, `R` and `T` from such a matrix, or from
//! a projective camera together with the 4x4 rectifying homography `H` that
//! maps the projective reconstruction to a metric one (`P_metric = P H`).

use crate::svd::svd_descending;
use log::debug;
use multiview_core::{
    GeometryError, Mat3, Mat34, Mat4, Real, Result, Se3, SvdOptions, Vec3, Vec4, hstack_3x4,
    is_finite_slice,
};
use nalgebra::Matrix4x3;
use serde::{Deserialize, Serialize};

/// Calibration and pose recovered from a camera matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricCamera {
    /// Upper-triangular, positive diagonal, `K[2,2] = 1`.
    pub k: Mat3,
    /// World to camera motion, `det(R) = +1`.
    pub world_to_view: Se3,
}

/// Pose recovered with a known calibration matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KnownKPose {
    pub world_to_view: Se3,
    /// `sum_i |s_i - mean(s)|` over the singular values of the rotation block
    /// before orthogonalization. Zero for a perfect scaled rotation.
    pub singular_error: Real,
}

/// RQ decomposition of a 3x3 matrix through a QR of the flipped transpose.
///
/// Returns `(K, R)` with `M = K R`, `K` upper-triangular with a positive
/// diagonal and `R` orthonormal (its determinant may be -1 when `det(M) < 0`).
///
/// # Errors
/// [`GeometryError::QrFailed`] if `M` is rank-deficient or not finite.
pub fn rq_decompose(m: &Mat3) -> Result<(Mat3, Mat3)> {
    if !is_finite_slice(m.as_slice()) {
        return Err(GeometryError::NonFinite);
    }
    let j = Mat3::new(0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0);

    let qr = (j * m).transpose().qr();
    let q = qr.q();
    let r_factor = qr.r();

    let tol = Real::EPSILON * 16.0 * m.amax().max(Real::MIN_POSITIVE);
    if (0..3).any(|i| !(r_factor[(i, i)].abs() > tol)) {
        return Err(GeometryError::QrFailed);
    }

    let mut k = j * r_factor.transpose() * j;
    let mut r = j * q.transpose();

    // Positive focal lengths: K D D R with D = diag(+-1).
    for i in 0..3 {
        if k[(i, i)] < 0.0 {
            k.column_mut(i).neg_mut();
            r.row_mut(i).neg_mut();
        }
    }
    Ok((k, r))
}

/// Stateless projective-to-metric decomposer; carries only SVD settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectiveToMetric {
    pub options: SvdOptions,
}

impl ProjectiveToMetric {
    pub fn new(options: SvdOptions) -> Self {
        Self { options }
    }

    /// Decompose `P = s K [R | T]` for an unknown non-zero scale `s`.
    ///
    /// `K` is normalized so that `K[2,2] = 1` and `T` is expressed at that
    /// scale. The sign of `s` is absorbed so that `det(R) = +1`.
    pub fn decompose_metric_camera(&self, p: &Mat34) -> Result<MetricCamera> {
        let a = p.fixed_view::<3, 3>(0, 0).into_owned();
        let mut t_raw: Vec3 = p.column(3).into_owned();

        let (mut k, mut r) = rq_decompose(&a)?;
        if r.determinant() < 0.0 {
            debug!("metric camera: negating R and T for a proper rotation");
            r = -r;
            t_raw = -t_raw;
        }

        let scale = k[(2, 2)];
        k /= scale;
        let k_inv = k
            .try_inverse()
            .ok_or(GeometryError::Singular("calibration matrix"))?;
        let t = k_inv * t_raw / scale;

        Ok(MetricCamera {
            k,
            world_to_view: Se3::new(r, t),
        })
    }

    /// Upgrade a projective camera with a rectifying homography: decompose `P H`.
    pub fn projective_to_metric(&self, p: &Mat34, h: &Mat4) -> Result<MetricCamera> {
        self.decompose_metric_camera(&(p * h))
    }

    /// Upgrade a projective camera when `K` is already known.
    ///
    /// `K^{-1} P H` is only approximately `s [R | T]`; the rotation block is
    /// projected onto the closest orthogonal matrix and the discrepancy is
    /// reported as [`KnownKPose::singular_error`]. No threshold is applied.
    pub fn projective_to_metric_known_k(&self, p: &Mat34, h: &Mat4, k: &Mat3) -> Result<KnownKPose> {
        let k_inv = k
            .try_inverse()
            .ok_or(GeometryError::Singular("calibration matrix"))?;
        let m = k_inv * (p * h);

        let r_raw = m.fixed_view::<3, 3>(0, 0).into_owned();
        let mut t: Vec3 = m.column(3).into_owned();

        let svd = svd_descending(&r_raw, &self.options)?;
        let mut r = svd.u * svd.v_t;
        if r.determinant() < 0.0 {
            r = -r;
            t = -t;
        }

        let sv = svd.singular_values;
        let scale = sv.sum() / 3.0;
        if scale <= Real::EPSILON {
            return Err(GeometryError::Degenerate("rotation block is zero"));
        }
        t /= scale;
        let singular_error = sv.iter().map(|s| (s - scale).abs()).sum::<Real>();
        debug!("known-K upgrade: singular error {singular_error:.3e}");

        Ok(KnownKPose {
            world_to_view: Se3::new(r, t),
            singular_error,
        })
    }
}

/// [`ProjectiveToMetric::decompose_metric_camera`] with default options.
pub fn decompose_metric_camera(p: &Mat34) -> Result<MetricCamera> {
    ProjectiveToMetric::default().decompose_metric_camera(p)
}

/// `P = K [R | T]`.
pub fn create_camera_matrix(r: &Mat3, t: &Vec3, k: &Mat3) -> Mat34 {
    k * hstack_3x4(r, t)
}

/// Pseudo-inverse of a full row rank camera matrix, `P^T (P P^T)^{-1}`.
pub fn camera_pseudo_inverse(p: &Mat34) -> Result<Matrix4x3<Real>> {
    let ppt_inv = (p * p.transpose())
        .try_inverse()
        .ok_or(GeometryError::Singular("camera matrix"))?;
    Ok(p.transpose() * ppt_inv)
}

/// Homogeneous camera centre `C` with `P C = 0`, unit norm.
pub fn camera_center(p: &Mat34) -> Result<Vec4> {
    if !is_finite_slice(p.as_slice()) {
        return Err(GeometryError::NonFinite);
    }
    // Pad to square so the SVD exposes the full right null space.
    let mut padded = Mat4::zeros();
    padded.fixed_view_mut::<3, 4>(0, 0).copy_from(p);
    let opts = SvdOptions::default();
    let svd = padded
        .try_svd(false, true, opts.eps, opts.max_iterations)
        .ok_or(GeometryError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(GeometryError::SvdFailed)?;
    Ok(v_t.row(3).transpose())
}

/// 4x4 homography `H` with `P H = [I | 0]`.
///
/// Columns are the pseudo-inverse of `P` followed by its camera centre.
pub fn projective_to_identity_h(p: &Mat34) -> Result<Mat4> {
    let p_pinv = camera_pseudo_inverse(p)?;
    let center = camera_center(p)?;
    let mut h = Mat4::zeros();
    h.fixed_view_mut::<4, 3>(0, 0).copy_from(&p_pinv);
    h.set_column(3, &center);
    Ok(h)
}
