//! Trifocal tensor: construction, incidence constraints, induced homographies,
//! geometry extraction and point transfer.
//!
//! View 1 is the canonical camera `[I | 0]`; views 2 and 3 are `P2 = [A | a4]`
//! and `P3 = [B | b4]`. The tensor is stored as three 3x3 slices
//! `T_i = a_i b4^T - a4 b_i^T` (Hartley and Zisserman, chapter 15).

use crate::svd::svd_descending;
use multiview_core::{GeometryError, Mat3, Mat34, Pt2, Real, Result, Se3, SvdOptions, Vec3, hstack_3x4};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrifocalTensor {
    pub t: [Mat3; 3],
}

impl Default for TrifocalTensor {
    fn default() -> Self {
        Self {
            t: [Mat3::zeros(); 3],
        }
    }
}

fn homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

/// Unit left and right null vectors of a rank-2 3x3 matrix.
fn null_vectors(m: &Mat3) -> Result<(Vec3, Vec3)> {
    let svd = svd_descending(m, &SvdOptions::default())?;
    Ok((svd.u.column(2).into_owned(), svd.v_t.row(2).transpose()))
}

/// Left null vector of the matrix whose columns are `cols`.
fn left_null(cols: [Vec3; 3]) -> Result<Vec3> {
    Ok(null_vectors(&Mat3::from_columns(&cols))?.0)
}

impl TrifocalTensor {
    pub fn new(t1: Mat3, t2: Mat3, t3: Mat3) -> Self {
        Self { t: [t1, t2, t3] }
    }

    /// Tensor of the cameras `[I | 0]`, `P2`, `P3`.
    pub fn from_cameras(p2: &Mat34, p3: &Mat34) -> Self {
        let mut out = Self::default();
        let a4 = p2.column(3);
        let b4 = p3.column(3);
        for (i, slice) in out.t.iter_mut().enumerate() {
            *slice = p2.column(i) * b4.transpose() - a4 * p3.column(i).transpose();
        }
        out
    }

    /// Tensor of calibrated views, with view 1 at the origin and `m2`, `m3`
    /// the motions from view 1 to views 2 and 3.
    pub fn from_motions(m2: &Se3, m3: &Se3) -> Self {
        Self::from_cameras(&m2.to_matrix34(), &m3.to_matrix34())
    }

    /// Scale so that the 27 entries have unit Euclidean norm.
    pub fn normalize_scale(&mut self) {
        let norm = self.t.iter().map(|s| s.norm_squared()).sum::<Real>().sqrt();
        if norm > 0.0 {
            for s in &mut self.t {
                *s /= norm;
            }
        }
    }

    /// `sum_i x_i T_i` for the homogeneous point `(x, y, 1)`.
    fn contract_point(&self, p1: &Pt2) -> Mat3 {
        self.t[0] * p1.x + self.t[1] * p1.y + self.t[2]
    }

    /// Line-line-line incidence: `(l2^T T_i l3)_i x l1`. Zero vector when the
    /// three lines are images of one 3D line.
    pub fn constraint_lll(&self, l1: &Vec3, l2: &Vec3, l3: &Vec3) -> Vec3 {
        let v = Vec3::from_fn(|i, _| l2.dot(&(self.t[i] * l3)));
        v.cross(l1)
    }

    /// Point-line-line incidence: `l2^T (sum_i x_i T_i) l3`.
    pub fn constraint_pll(&self, p1: &Pt2, l2: &Vec3, l3: &Vec3) -> Real {
        l2.dot(&(self.contract_point(p1) * l3))
    }

    /// Point-line-point incidence: `((sum_i x_i T_i)^T l2) x x3`.
    pub fn constraint_plp(&self, p1: &Pt2, l2: &Vec3, p3: &Pt2) -> Vec3 {
        (self.contract_point(p1).transpose() * l2).cross(&homogeneous(p3))
    }

    /// Point-point-line incidence: `[x2]x (sum_i x_i T_i) l3`.
    pub fn constraint_ppl(&self, p1: &Pt2, p2: &Pt2, l3: &Vec3) -> Vec3 {
        homogeneous(p2).cross(&(self.contract_point(p1) * l3))
    }

    /// Point-point-point incidence: `[x2]x (sum_i x_i T_i) [x3]x`.
    pub fn constraint_ppp(&self, p1: &Pt2, p2: &Pt2, p3: &Pt2) -> Mat3 {
        homogeneous(p2).cross_matrix() * self.contract_point(p1) * homogeneous(p3).cross_matrix()
    }

    /// Homography from view 1 to view 3 induced by the plane back-projected
    /// from line `l2` of view 2. Column `i` is `T_i^T l2`.
    pub fn induced_homography13(&self, l2: &Vec3) -> Mat3 {
        Mat3::from_columns(&[
            self.t[0].transpose() * l2,
            self.t[1].transpose() * l2,
            self.t[2].transpose() * l2,
        ])
    }

    /// Homography from view 1 to view 2 induced by the plane back-projected
    /// from line `l3` of view 3. Column `i` is `T_i l3`.
    pub fn induced_homography12(&self, l3: &Vec3) -> Mat3 {
        Mat3::from_columns(&[self.t[0] * l3, self.t[1] * l3, self.t[2] * l3])
    }

    /// Unit epipoles `(e2, e3)`: images of the first camera centre in views 2
    /// and 3.
    pub fn extract_epipoles(&self) -> Result<(Vec3, Vec3)> {
        let mut left = [Vec3::zeros(); 3];
        let mut right = [Vec3::zeros(); 3];
        for (i, slice) in self.t.iter().enumerate() {
            let (u, v) = null_vectors(slice)?;
            left[i] = u;
            right[i] = v;
        }
        Ok((left_null(left)?, left_null(right)?))
    }

    /// `(F21, F31)` with `x2^T F21 x1 = 0` and `x3^T F31 x1 = 0`.
    pub fn extract_fundamental(&self) -> Result<(Mat3, Mat3)> {
        let (e2, e3) = self.extract_epipoles()?;
        let f21 = e2.cross_matrix() * Mat3::from_fn(|r, c| (self.t[c] * e3)[r]);
        let f31 = e3.cross_matrix() * Mat3::from_fn(|r, c| (self.t[c].transpose() * e2)[r]);
        Ok((f21, f31))
    }

    /// Camera matrices `(P2, P3)` consistent with the tensor, view 1 being `[I | 0]`.
    ///
    /// The result is one member of the projective family of camera triplets
    /// with this tensor.
    pub fn extract_camera_matrices(&self) -> Result<(Mat34, Mat34)> {
        let (e2, e3) = self.extract_epipoles()?;
        let a = Mat3::from_fn(|r, c| (self.t[c] * e3)[r]);
        let b_raw = Mat3::from_fn(|r, c| (self.t[c].transpose() * e2)[r]);
        let b = (e3 * e3.transpose() - Mat3::identity()) * b_raw;
        Ok((hstack_3x4(&a, &e2), hstack_3x4(&b, &e3)))
    }

    /// Transfer `x1` to view 3 through the plane of line `l2`. Homogeneous result.
    pub fn transfer13_line(&self, p1: &Pt2, l2: &Vec3) -> Vec3 {
        self.contract_point(p1).transpose() * l2
    }

    /// Transfer `x1` to view 2 through the plane of line `l3`. Homogeneous result.
    pub fn transfer12_line(&self, p1: &Pt2, l3: &Vec3) -> Vec3 {
        self.contract_point(p1) * l3
    }

    /// Transfer the correspondence `(x1, x2)` to view 3.
    ///
    /// Uses the line through `x2` perpendicular to the epipolar line of `x1`,
    /// which keeps the transfer well conditioned for noisy `x2`.
    pub fn transfer13(&self, p1: &Pt2, p2: &Pt2) -> Result<Vec3> {
        let (f21, _) = self.extract_fundamental()?;
        let l2 = perpendicular_through(&(f21 * homogeneous(p1)), p2)?;
        Ok(self.transfer13_line(p1, &l2))
    }

    /// Transfer the correspondence `(x1, x3)` to view 2.
    pub fn transfer12(&self, p1: &Pt2, p3: &Pt2) -> Result<Vec3> {
        let (_, f31) = self.extract_fundamental()?;
        let l3 = perpendicular_through(&(f31 * homogeneous(p1)), p3)?;
        Ok(self.transfer12_line(p1, &l3))
    }
}

/// Line through `p` perpendicular to `line`.
fn perpendicular_through(line: &Vec3, p: &Pt2) -> Result<Vec3> {
    if line.x.abs() + line.y.abs() <= Real::EPSILON {
        return Err(GeometryError::Degenerate("epipolar line at infinity"));
    }
    Ok(Vec3::new(line.y, -line.x, -p.x * line.y + p.y * line.x))
}

/// Tensor from two camera matrices; view 1 is `[I | 0]`.
pub fn create_trifocal(p2: &Mat34, p3: &Mat34) -> TrifocalTensor {
    TrifocalTensor::from_cameras(p2, p3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiview_core::{Pt3, find_scale};

    struct Scene {
        k: Mat3,
        m2: Se3,
        m3: Se3,
        tensor: TrifocalTensor,
    }

    fn scene() -> Scene {
        let k = Mat3::new(60.0, 0.01, 200.0, 0.0, 80.0, 150.0, 0.0, 0.0, 1.0);
        let m2 = Se3::from_euler(0.2, 0.001, -0.02, Vec3::new(0.3, 0.0, 0.05));
        let m3 = Se3::from_euler(0.8, -0.02, 0.003, Vec3::new(0.6, 0.2, -0.02));
        let p2 = k * m2.to_matrix34();
        let p3 = k * m3.to_matrix34();
        // View 1 is [I | 0], so K only enters views 2 and 3.
        let mut tensor = TrifocalTensor::from_cameras(&p2, &p3);
        tensor.normalize_scale();
        Scene { k, m2, m3, tensor }
    }

    fn project(p: &Mat34, x: &Pt3) -> Pt2 {
        let v = p * x.to_homogeneous();
        Pt2::new(v.x / v.z, v.y / v.z)
    }

    fn views(s: &Scene, x: &Pt3) -> (Pt2, Pt2, Pt2) {
        let p1 = hstack_3x4(&Mat3::identity(), &Vec3::zeros());
        (
            project(&p1, x),
            project(&(s.k * s.m2.to_matrix34()), x),
            project(&(s.k * s.m3.to_matrix34()), x),
        )
    }

    fn line_through(p: &Pt2, angle: Real) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3::new(s, -c, -p.x * s + p.y * c)
    }

    #[test]
    fn point_constraints_vanish() {
        let s = scene();
        let x = Pt3::new(0.1, -0.2, 2.0);
        let (x1, x2, x3) = views(&s, &x);
        let l2 = line_through(&x2, 0.3);
        let l3 = line_through(&x3, 1.1);

        assert!(s.tensor.constraint_pll(&x1, &l2, &l3).abs() < 1e-9);
        assert!(s.tensor.constraint_plp(&x1, &l2, &x3).norm() < 1e-9);
        assert!(s.tensor.constraint_ppl(&x1, &x2, &l3).norm() < 1e-9);
        assert!(s.tensor.constraint_ppp(&x1, &x2, &x3).norm() < 1e-9);
    }

    #[test]
    fn line_constraint_vanishes_for_a_3d_line() {
        let s = scene();
        let a = Pt3::new(0.1, -0.2, 2.0);
        let b = Pt3::new(-0.3, 0.25, 2.6);
        let (a1, a2, a3) = views(&s, &a);
        let (b1, b2, b3) = views(&s, &b);
        let l1 = homogeneous(&a1).cross(&homogeneous(&b1));
        let l2 = homogeneous(&a2).cross(&homogeneous(&b2));
        let l3 = homogeneous(&a3).cross(&homogeneous(&b3));
        let r = s.tensor.constraint_lll(&l1, &l2, &l3);
        assert!(r.norm() < 1e-9 * l1.norm() * l2.norm() * l3.norm());
    }

    #[test]
    fn induced_homographies_map_points() {
        let s = scene();
        let x = Pt3::new(0.4, 0.1, 3.0);
        let (x1, x2, x3) = views(&s, &x);

        let h13 = s.tensor.induced_homography13(&line_through(&x2, 0.7));
        let y3 = h13 * homogeneous(&x1);
        assert!((Pt2::new(y3.x / y3.z, y3.y / y3.z) - x3).norm() < 1e-8);

        let h12 = s.tensor.induced_homography12(&line_through(&x3, -0.4));
        let y2 = h12 * homogeneous(&x1);
        assert!((Pt2::new(y2.x / y2.z, y2.y / y2.z) - x2).norm() < 1e-8);
    }

    #[test]
    fn extracted_epipoles_are_camera_centre_images() {
        let s = scene();
        let (e2, e3) = s.tensor.extract_epipoles().unwrap();
        let c1 = Pt3::origin();
        let expect2 = s.k * s.m2.transform_point(&c1).coords;
        let expect3 = s.k * s.m3.transform_point(&c1).coords;
        assert!(e2.cross(&expect2.normalize()).norm() < 1e-9);
        assert!(e3.cross(&expect3.normalize()).norm() < 1e-9);
    }

    #[test]
    fn extracted_fundamentals_satisfy_epipolar_constraint() {
        let s = scene();
        let (f21, f31) = s.tensor.extract_fundamental().unwrap();
        for x in [Pt3::new(0.1, 0.2, 2.0), Pt3::new(-0.3, 0.1, 3.5), Pt3::new(0.5, -0.6, 4.0)] {
            let (x1, x2, x3) = views(&s, &x);
            let r21 = homogeneous(&x2).dot(&(f21 * homogeneous(&x1)));
            let r31 = homogeneous(&x3).dot(&(f31 * homogeneous(&x1)));
            assert!(r21.abs() < 1e-6 * f21.norm(), "F21 residual {r21}");
            assert!(r31.abs() < 1e-6 * f31.norm(), "F31 residual {r31}");
        }
    }

    #[test]
    fn extracted_cameras_reproduce_tensor() {
        let s = scene();
        let (p2, p3) = s.tensor.extract_camera_matrices().unwrap();
        let rebuilt = TrifocalTensor::from_cameras(&p2, &p3);

        let a: Vec<Real> = rebuilt.t.iter().flat_map(|m| m.iter().copied()).collect();
        let b: Vec<Real> = s.tensor.t.iter().flat_map(|m| m.iter().copied()).collect();
        let scale = find_scale(&a, &b).unwrap();
        let err: Real = a.iter().zip(&b).map(|(x, y)| (x * scale - y).powi(2)).sum::<Real>().sqrt();
        let norm: Real = b.iter().map(|v| v * v).sum::<Real>().sqrt();
        assert!(err / norm < 1e-9);
    }

    #[test]
    fn point_transfer_recovers_third_view() {
        let s = scene();
        let x = Pt3::new(-0.2, 0.3, 2.5);
        let (x1, x2, x3) = views(&s, &x);

        let y3 = s.tensor.transfer13(&x1, &x2).unwrap();
        assert!((Pt2::new(y3.x / y3.z, y3.y / y3.z) - x3).norm() < 1e-7);

        let y2 = s.tensor.transfer12(&x1, &x3).unwrap();
        assert!((Pt2::new(y2.x / y2.z, y2.y / y2.z) - x2).norm() < 1e-7);
    }

    #[test]
    fn normalize_scale_gives_unit_norm() {
        let mut t = scene().tensor;
        t.normalize_scale();
        let n: Real = t.t.iter().map(|m| m.norm_squared()).sum();
        assert!((n - 1.0).abs() < 1e-12);
    }

    #[test]
    fn motions_and_cameras_agree() {
        let s = scene();
        let a = TrifocalTensor::from_motions(&s.m2, &s.m3);
        let b = create_trifocal(&s.m2.to_matrix34(), &s.m3.to_matrix34());
        assert_eq!(a, b);
    }
}
