//! Single entry point mirroring the free functions of this crate.

use crate::{
    AbsoluteDualQuadric, EssentialDecomposer, HomographyDecomposer, HomographySolution,
    KnownKPose, MetricCamera, NormalizationPoint2D, ProjectiveToMetric, TrifocalTensor,
    camera_matrix, epipolar, homography, quadric, svd,
};
use multiview_core::{FxFyCxCySkew, Mat3, Mat34, Mat4, Pt2, Real, Result, Se3, Vec3};

/// Stateless facade over the multi-view operations.
///
/// Every method is a pass-through to the module-level function of the same
/// name; the facade exists so callers can reach the whole toolbox through one
/// import.
pub struct MultiViewOps;

impl MultiViewOps {
    /// Four `(R, T)` candidates of an essential matrix.
    pub fn decompose_essential(e: &Mat3) -> Result<[Se3; 4]> {
        Ok(EssentialDecomposer::default().decompose(e)?.solutions)
    }

    /// Four `(R, T/d, N)` candidates of a calibrated homography.
    pub fn decompose_homography(h: &Mat3) -> Result<[HomographySolution; 4]> {
        HomographyDecomposer::default().decompose(h)
    }

    pub fn decompose_metric_camera(p: &Mat34) -> Result<MetricCamera> {
        ProjectiveToMetric::default().decompose_metric_camera(p)
    }

    pub fn projective_to_metric(p: &Mat34, h: &Mat4) -> Result<MetricCamera> {
        ProjectiveToMetric::default().projective_to_metric(p, h)
    }

    pub fn projective_to_metric_known_k(p: &Mat34, h: &Mat4, k: &Mat3) -> Result<KnownKPose> {
        ProjectiveToMetric::default().projective_to_metric_known_k(p, h, k)
    }

    pub fn normalize_points(points: &[Pt2]) -> Result<NormalizationPoint2D> {
        NormalizationPoint2D::compute(points)
    }

    pub fn massage_singular_values<F: FnMut(&mut Vec3)>(m: &mut Mat3, f: F) -> Result<()> {
        svd::massage_singular_values(m, f)
    }

    pub fn fundamental_to_essential(f: &Mat3, k1: &Mat3, k2: &Mat3) -> Result<Mat3> {
        epipolar::fundamental_to_essential(f, k1, k2)
    }

    pub fn create_essential(r: &Mat3, t: &Vec3) -> Mat3 {
        epipolar::create_essential(r, t)
    }

    pub fn create_fundamental(e: &Mat3, k: &Mat3) -> Result<Mat3> {
        epipolar::create_fundamental(e, k)
    }

    pub fn create_fundamental_two(e: &Mat3, k1: &Mat3, k2: &Mat3) -> Result<Mat3> {
        epipolar::create_fundamental_two(e, k1, k2)
    }

    pub fn create_fundamental_from_motion(r: &Mat3, t: &Vec3, k1: &Mat3, k2: &Mat3) -> Result<Mat3> {
        epipolar::create_fundamental_from_motion(r, t, k1, k2)
    }

    pub fn create_homography(r: &Mat3, t: &Vec3, d: Real, n: &Vec3) -> Mat3 {
        homography::create_homography(r, t, d, n)
    }

    pub fn create_homography_calibrated(r: &Mat3, t: &Vec3, d: Real, n: &Vec3, k: &Mat3) -> Result<Mat3> {
        homography::create_homography_calibrated(r, t, d, n, k)
    }

    pub fn extract_epipoles(f: &Mat3) -> Result<(Vec3, Vec3)> {
        epipolar::extract_epipoles(f)
    }

    pub fn fundamental_to_projective(f: &Mat3, e2: &Vec3, v: &Vec3, lambda: Real) -> Mat34 {
        epipolar::fundamental_to_projective(f, e2, v, lambda)
    }

    pub fn fundamental_to_projective_canonical(f: &Mat3) -> Result<Mat34> {
        epipolar::fundamental_to_projective_canonical(f)
    }

    pub fn projective_to_fundamental(p1: &Mat34, p2: &Mat34) -> Result<Mat3> {
        epipolar::projective_to_fundamental(p1, p2)
    }

    pub fn projective_to_fundamental_canonical(p2: &Mat34) -> Mat3 {
        epipolar::projective_to_fundamental_canonical(p2)
    }

    pub fn projective_to_identity_h(p: &Mat34) -> Result<Mat4> {
        camera_matrix::projective_to_identity_h(p)
    }

    pub fn epipolar_constraint(f: &Mat3, p1: &Pt2, p2: &Pt2) -> Real {
        epipolar::epipolar_constraint(f, p1, p2)
    }

    pub fn homography_constraint(h: &Mat3, p1: &Pt2) -> Option<Pt2> {
        homography::homography_transfer(h, p1)
    }

    pub fn errors_homography_symm(pairs: &[(Pt2, Pt2)], h: &Mat3) -> Result<Vec<Real>> {
        homography::errors_homography_symm(pairs, h)
    }

    pub fn homography_stereo_3pts(f: &Mat3, pairs: &[(Pt2, Pt2); 3]) -> Result<Mat3> {
        homography::homography_stereo_3pts(f, pairs)
    }

    pub fn homography_stereo_line_pt(f: &Mat3, line: &(Vec3, Vec3), point: &(Pt2, Pt2)) -> Result<Mat3> {
        homography::homography_stereo_line_pt(f, line, point)
    }

    pub fn homography_stereo_2lines(f: &Mat3, line0: &(Vec3, Vec3), line1: &(Vec3, Vec3)) -> Result<Mat3> {
        homography::homography_stereo_2lines(f, line0, line1)
    }

    pub fn fundamental_compatible3(f21: &Mat3, f31: &Mat3, f32: &Mat3, tol: Real) -> Result<bool> {
        epipolar::fundamental_compatible3(f21, f31, f32, tol)
    }

    pub fn enforce_absolute_quadratic_constraints(q: &mut Mat4, zero_center: bool, zero_skew: bool) -> Result<()> {
        quadric::enforce_absolute_quadratic_constraints(q, zero_center, zero_skew)
    }

    pub fn decompose_abs_dual_quadratic(q: &Mat4) -> Result<AbsoluteDualQuadric> {
        AbsoluteDualQuadric::decompose(q)
    }

    pub fn absolute_quadratic_to_h(q: &Mat4) -> Result<Mat4> {
        quadric::absolute_quadratic_to_h(q)
    }

    pub fn rectify_h_to_absolute_quadratic(h: &Mat4) -> Mat4 {
        quadric::rectify_h_to_absolute_quadratic(h)
    }

    pub fn intrinsic_from_absolute_quadratic(q: &Mat4, p: &Mat34) -> Result<FxFyCxCySkew<Real>> {
        quadric::intrinsic_from_absolute_quadratic(q, p)
    }

    pub fn create_trifocal(p2: &Mat34, p3: &Mat34) -> TrifocalTensor {
        TrifocalTensor::from_cameras(p2, p3)
    }

    pub fn create_trifocal_from_motions(m2: &Se3, m3: &Se3) -> TrifocalTensor {
        TrifocalTensor::from_motions(m2, m3)
    }
}
