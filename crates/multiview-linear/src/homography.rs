//! Plane-induced homographies: construction, decomposition and transfer.
//!
//! A calibrated homography between two views of the plane `N^T X = d`
//! (expressed in the first camera frame) is `H = R + T N^T / d`. The
//! decomposition follows Ma, Soatto, Kosecka and Sastry, "An Invitation to
//! 3-D Vision", section 5.3, and yields four `(R, T/d, N)` candidates.

use crate::svd::svd_descending;
use log::debug;
use multiview_core::{GeometryError, Mat3, Pt2, Real, Result, Se3, SvdOptions, Vec3, to_homogeneous};
use serde::{Deserialize, Serialize};

/// One homography decomposition candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomographySolution {
    /// Rotation and the translation scaled by the inverse plane distance, `T / d`.
    pub motion: Se3,
    /// Unit plane normal in the first camera frame.
    pub normal: Vec3,
}

impl HomographySolution {
    fn mirrored(&self) -> Self {
        Self {
            motion: Se3::new(self.motion.r, -self.motion.t),
            normal: -self.normal,
        }
    }
}

/// Stateless homography decomposer; carries only SVD settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomographyDecomposer {
    pub options: SvdOptions,
}

impl HomographyDecomposer {
    pub fn new(options: SvdOptions) -> Self {
        Self { options }
    }

    /// Decompose a calibrated homography into four candidates.
    ///
    /// Output order is `[p1, p2, mirror(p1), mirror(p2)]`, where a mirror
    /// negates both `T/d` and `N`. The scale of `H` is fixed by dividing by its
    /// middle singular value. A negative overall scale is detected from
    /// `det(H)` and undone first, since a plane seen by both cameras always
    /// gives `det(R + T N^T / d) > 0`.
    ///
    /// # Errors
    /// - [`GeometryError::Degenerate`] when the middle singular value vanishes,
    ///   or when the two outer normalized singular values coincide (no
    ///   translation, the plane is unobservable).
    /// - SVD failures from [`svd_descending`].
    pub fn decompose(&self, h: &Mat3) -> Result<[HomographySolution; 4]> {
        let mut h = *h;
        if h.determinant() < 0.0 {
            debug!("homography has negative scale, flipping sign");
            h = -h;
        }
        let svd = svd_descending(&h, &self.options)?;
        let sv = svd.singular_values;
        if sv[1] <= Real::EPSILON * sv[0].max(1.0) {
            return Err(GeometryError::Degenerate("homography has rank below 2"));
        }
        let h = h / sv[1];
        let s0 = (sv[0] / sv[1]).powi(2);
        let s2 = (sv[2] / sv[1]).powi(2);

        let spread = s0 - s2;
        if spread <= 1e-12 {
            debug!("homography singular values {:?} carry no plane", sv.as_slice());
            return Err(GeometryError::Degenerate("homography is a pure rotation"));
        }

        let v = svd.v();
        let v1 = v.column(0).into_owned();
        let v2 = v.column(1).into_owned();
        let v3 = v.column(2).into_owned();

        let a = (1.0 - s2).max(0.0).sqrt();
        let b = (s0 - 1.0).max(0.0).sqrt();
        let div = spread.sqrt();
        let u1 = (v1 * a + v3 * b) / div;
        let u2 = (v1 * a - v3 * b) / div;

        let basis = |x: Vec3, y: Vec3| Mat3::from_columns(&[x, y, x.cross(&y)]);
        let hv2 = h * v2;
        let primary = |u: Vec3| {
            let u_basis = basis(v2, u);
            let w_basis = basis(hv2, h * u);
            let r = w_basis * u_basis.transpose();
            let normal = v2.cross(&u);
            let t = (h - r) * normal;
            HomographySolution {
                motion: Se3::new(r, t),
                normal,
            }
        };

        let p1 = primary(u1);
        let p2 = primary(u2);
        Ok([p1, p2, p1.mirrored(), p2.mirrored()])
    }
}

/// Decompose a calibrated homography with default options.
pub fn decompose_homography(h: &Mat3) -> Result<[HomographySolution; 4]> {
    HomographyDecomposer::default().decompose(h)
}

/// `H = R + T N^T / d` for the plane `N^T X = d` in the first camera frame.
pub fn create_homography(r: &Mat3, t: &Vec3, d: Real, n: &Vec3) -> Mat3 {
    r + t * n.transpose() / d
}

/// Pixel homography `K H K^{-1}` of [`create_homography`].
pub fn create_homography_calibrated(r: &Mat3, t: &Vec3, d: Real, n: &Vec3, k: &Mat3) -> Result<Mat3> {
    let k_inv = k
        .try_inverse()
        .ok_or(GeometryError::Singular("calibration matrix"))?;
    Ok(k * create_homography(r, t, d, n) * k_inv)
}

/// Map `p1` through `H`. Returns `None` if the image lands at infinity.
pub fn homography_transfer(h: &Mat3, p1: &Pt2) -> Option<Pt2> {
    let x = h * Vec3::new(p1.x, p1.y, 1.0);
    (x.z.abs() > Real::EPSILON).then(|| Pt2::new(x.x / x.z, x.y / x.z))
}

/// Symmetric transfer error of each correspondence:
/// `|p2 - H p1|^2 + |p1 - H^{-1} p2|^2`.
///
/// Pairs that transfer to infinity in either direction are skipped.
pub fn errors_homography_symm(pairs: &[(Pt2, Pt2)], h: &Mat3) -> Result<Vec<Real>> {
    let h_inv = h
        .try_inverse()
        .ok_or(GeometryError::Singular("homography"))?;
    Ok(pairs
        .iter()
        .filter_map(|(p1, p2)| {
            let fwd = homography_transfer(h, p1)?;
            let bwd = homography_transfer(&h_inv, p2)?;
            Some((fwd - p2).norm_squared() + (bwd - p1).norm_squared())
        })
        .collect())
}

/// Homography induced by a world plane, from `F` and three correspondences on
/// that plane (Hartley and Zisserman, result 13.6).
///
/// `F` follows `x2^T F x1 = 0`. The three points in view 1 must not be collinear.
pub fn homography_stereo_3pts(f: &Mat3, pairs: &[(Pt2, Pt2); 3]) -> Result<Mat3> {
    let e2 = left_epipole(f)?;
    let a = e2.cross_matrix() * f;

    let mut m = Mat3::zeros();
    let mut b = Vec3::zeros();
    for (i, (p1, p2)) in pairs.iter().enumerate() {
        let x1 = Vec3::new(p1.x, p1.y, 1.0);
        let x2 = Vec3::new(p2.x, p2.y, 1.0);
        let x2_e2 = x2.cross(&e2);
        let denom = x2_e2.norm_squared();
        if denom <= Real::EPSILON {
            return Err(GeometryError::Degenerate("point coincides with the epipole"));
        }
        b[i] = x2.cross(&(a * x1)).dot(&x2_e2) / denom;
        m.set_row(i, &x1.transpose());
    }
    let m_inv = m
        .try_inverse()
        .ok_or(GeometryError::Degenerate("plane points are collinear"))?;
    Ok(a - e2 * (m_inv * b).transpose())
}

/// Homography induced by a world plane, from `F`, one line on the plane and
/// one point on the plane off that line (Hartley and Zisserman, result 13.7).
///
/// `line` is `(l1, l2)`, the homogeneous line `a x + b y + c = 0` in view 1
/// and view 2. `F` follows `x2^T F x1 = 0`.
///
/// # Errors
/// [`GeometryError::Degenerate`] when the point lies on the line, the point
/// coincides with the epipole, or the line in view 2 passes through the
/// epipole.
pub fn homography_stereo_line_pt(f: &Mat3, line: &(Vec3, Vec3), point: &(Pt2, Pt2)) -> Result<Mat3> {
    let e2 = left_epipole(f)?;
    let (p1, p2) = point;
    line_point_homography(f, &e2, line, &to_homogeneous(p1), &to_homogeneous(p2))
}

/// Homography induced by a world plane, from `F` and two lines on the plane.
///
/// A point of `line1` away from `line0` is transferred to view 2 along its
/// epipolar line, which reduces the problem to
/// [`homography_stereo_line_pt`] with `line0`.
///
/// # Errors
/// [`GeometryError::Degenerate`] when the lines coincide in view 1 or one of
/// them is an epipolar line in view 2.
pub fn homography_stereo_2lines(f: &Mat3, line0: &(Vec3, Vec3), line1: &(Vec3, Vec3)) -> Result<Mat3> {
    let e2 = left_epipole(f)?;
    let (l0, _) = line0;
    let (m1, m2) = line1;

    // Point at infinity and foot of the perpendicular from the origin.
    let candidates = [
        Vec3::new(m1.y, -m1.x, 0.0),
        Vec3::new(-m1.x * m1.z, -m1.y * m1.z, m1.x * m1.x + m1.y * m1.y),
    ];
    let off_line = |p: &Vec3| {
        let scale = p.norm() * l0.norm();
        if scale > 0.0 { l0.dot(p).abs() / scale } else { 0.0 }
    };
    let x1 = candidates
        .iter()
        .copied()
        .max_by(|a, b| off_line(a).total_cmp(&off_line(b)))
        .filter(|p| off_line(p) > DEGENERATE_TOL)
        .ok_or(GeometryError::Degenerate("lines coincide in view 1"))?;

    let x2 = m2.cross(&(f * x1));
    if x2.norm() <= DEGENERATE_TOL * m2.norm() * (f * x1).norm() {
        return Err(GeometryError::Degenerate("line is an epipolar line in view 2"));
    }
    line_point_homography(f, &e2, line0, &x1, &x2)
}

const DEGENERATE_TOL: Real = 1e-12;

/// Left null vector of `F`: the epipole in view 2.
fn left_epipole(f: &Mat3) -> Result<Vec3> {
    let svd = svd_descending(f, &SvdOptions::default())?;
    Ok(svd.u.column(2).into_owned())
}

/// Solves `x2 x ([l2]x F + mu e2 l1^T) x1 = 0` for `mu` in homogeneous points.
fn line_point_homography(f: &Mat3, e2: &Vec3, line: &(Vec3, Vec3), x1: &Vec3, x2: &Vec3) -> Result<Mat3> {
    let (l1, l2) = line;
    if l2.dot(e2).abs() <= DEGENERATE_TOL * l2.norm() {
        return Err(GeometryError::Degenerate("line passes through the epipole"));
    }
    let along = l1.dot(x1);
    if along.abs() <= DEGENERATE_TOL * l1.norm() * x1.norm() {
        return Err(GeometryError::Degenerate("point lies on the line"));
    }
    let x2_e2 = x2.cross(e2);
    if x2_e2.norm() <= DEGENERATE_TOL * x2.norm() {
        return Err(GeometryError::Degenerate("point coincides with the epipole"));
    }

    let a = l2.cross_matrix() * f;
    let mu = -x2.cross(&(a * x1)).dot(&x2_e2) / (along * x2_e2.norm_squared());
    Ok(a + e2 * l1.transpose() * mu)
}
