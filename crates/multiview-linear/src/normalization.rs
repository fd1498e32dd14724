//! Per-axis normalization of 2D image points.
//!
//! Linear estimators (DLT, eight-point, trifocal linear) are badly conditioned
//! on raw pixel coordinates. [`NormalizationPoint2D`] subtracts the per-axis
//! mean and divides by the per-axis standard deviation, and can move points,
//! homogeneous vectors and conics in and out of the normalized frame.
//!
//! # Example
//!
//! ```
//! use multiview_core::Pt2;
//! use multiview_linear::NormalizationPoint2D;
//!
//! let pts = vec![Pt2::new(100.0, 200.0), Pt2::new(150.0, 260.0), Pt2::new(120.0, 220.0)];
//! let n = NormalizationPoint2D::compute(&pts).unwrap();
//! let p = n.apply(&pts[1]);
//! let back = n.remove(&p);
//! assert!((back - pts[1]).norm() < 1e-9);
//! ```

use log::debug;
use multiview_core::{GeometryError, Mat3, Pt2, Real, Result, Vec3};
use nalgebra::Matrix3xX;
use serde::{Deserialize, Serialize};

/// Affine normalization `x' = (x - mean_x) / std_x`, `y' = (y - mean_y) / std_y`.
///
/// The default value is the identity transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationPoint2D {
    pub mean_x: Real,
    pub std_x: Real,
    pub mean_y: Real,
    pub std_y: Real,
}

impl Default for NormalizationPoint2D {
    fn default() -> Self {
        Self {
            mean_x: 0.0,
            std_x: 1.0,
            mean_y: 0.0,
            std_y: 1.0,
        }
    }
}

fn usable_spread(std: Real, axis: &str) -> Real {
    if std.is_finite() && std > Real::EPSILON {
        std
    } else {
        debug!("zero spread along {axis}, normalization keeps unit scale");
        1.0
    }
}

impl NormalizationPoint2D {
    pub fn new(mean_x: Real, std_x: Real, mean_y: Real, std_y: Real) -> Self {
        Self {
            mean_x,
            std_x,
            mean_y,
            std_y,
        }
    }

    /// Overwrite all four parameters.
    pub fn set(&mut self, mean_x: Real, std_x: Real, mean_y: Real, std_y: Real) {
        *self = Self::new(mean_x, std_x, mean_y, std_y);
    }

    /// Estimate the normalization of a point set.
    ///
    /// # Arguments
    ///
    /// * `points` - Points to be normalized
    ///
    /// # Returns
    ///
    /// Per-axis mean and population standard deviation of `points`. An axis
    /// without spread (a single point, or points sharing one coordinate) keeps
    /// a scale of 1 so the transform stays invertible.
    ///
    /// # Errors
    ///
    /// [`GeometryError::NotEnoughPoints`] for an empty slice.
    pub fn compute(points: &[Pt2]) -> Result<Self> {
        if points.is_empty() {
            return Err(GeometryError::NotEnoughPoints {
                expected: 1,
                got: 0,
            });
        }
        let n = points.len() as Real;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(ax, ay), p| (ax + p.x, ay + p.y));
        let mean_x = sx / n;
        let mean_y = sy / n;

        let (vx, vy) = points.iter().fold((0.0, 0.0), |(ax, ay), p| {
            (ax + (p.x - mean_x).powi(2), ay + (p.y - mean_y).powi(2))
        });
        Ok(Self {
            mean_x,
            std_x: usable_spread((vx / n).sqrt(), "x"),
            mean_y,
            std_y: usable_spread((vy / n).sqrt(), "y"),
        })
    }

    /// Independent normalizations for the two views of a correspondence set.
    pub fn compute_pair(pairs: &[(Pt2, Pt2)]) -> Result<(Self, Self)> {
        let (a, b): (Vec<Pt2>, Vec<Pt2>) = pairs.iter().copied().unzip();
        Ok((Self::compute(&a)?, Self::compute(&b)?))
    }

    pub fn apply(&self, p: &Pt2) -> Pt2 {
        Pt2::new((p.x - self.mean_x) / self.std_x, (p.y - self.mean_y) / self.std_y)
    }

    pub fn remove(&self, p: &Pt2) -> Pt2 {
        Pt2::new(p.x * self.std_x + self.mean_x, p.y * self.std_y + self.mean_y)
    }

    pub fn apply_all(&self, points: &[Pt2]) -> Vec<Pt2> {
        points.iter().map(|p| self.apply(p)).collect()
    }

    /// Normalize a homogeneous point; works for any `w`, including points at infinity.
    pub fn apply_homogeneous(&self, v: &Vec3) -> Vec3 {
        self.matrix() * v
    }

    pub fn remove_homogeneous(&self, v: &Vec3) -> Vec3 {
        self.matrix_inv() * v
    }

    /// Normalize every column of a `3 x N` matrix of homogeneous points.
    pub fn apply_columns(&self, m: &Matrix3xX<Real>) -> Matrix3xX<Real> {
        self.matrix() * m
    }

    pub fn remove_columns(&self, m: &Matrix3xX<Real>) -> Matrix3xX<Real> {
        self.matrix_inv() * m
    }

    /// Transform a conic `C` (with `x^T C x = 0`) into the normalized frame.
    ///
    /// Points transform as `x' = N x`, so conics transform as `N^{-T} C N^{-1}`.
    pub fn apply_conic(&self, c: &Mat3) -> Mat3 {
        let n_inv = self.matrix_inv();
        n_inv.transpose() * c * n_inv
    }

    pub fn remove_conic(&self, c: &Mat3) -> Mat3 {
        let n = self.matrix();
        n.transpose() * c * n
    }

    /// 3x3 matrix `N` with `[x', y', 1]^T = N [x, y, 1]^T`.
    pub fn matrix(&self) -> Mat3 {
        Mat3::new(
            1.0 / self.std_x,
            0.0,
            -self.mean_x / self.std_x,
            0.0,
            1.0 / self.std_y,
            -self.mean_y / self.std_y,
            0.0,
            0.0,
            1.0,
        )
    }

    /// Closed-form inverse of [`Self::matrix`].
    pub fn matrix_inv(&self) -> Mat3 {
        Mat3::new(
            self.std_x,
            0.0,
            self.mean_x,
            0.0,
            self.std_y,
            self.mean_y,
            0.0,
            0.0,
            1.0,
        )
    }

    pub fn is_identity(&self) -> bool {
        self.mean_x == 0.0 && self.mean_y == 0.0 && self.std_x == 1.0 && self.std_y == 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloud() -> Vec<Pt2> {
        vec![
            Pt2::new(10.0, -4.0),
            Pt2::new(250.0, 30.0),
            Pt2::new(-35.0, 400.0),
            Pt2::new(120.5, 77.0),
            Pt2::new(64.0, 12.0),
        ]
    }

    #[test]
    fn normalized_cloud_has_zero_mean_unit_std() {
        let pts = cloud();
        let n = NormalizationPoint2D::compute(&pts).unwrap();
        let out = n.apply_all(&pts);
        let m = out.len() as Real;
        let mx = out.iter().map(|p| p.x).sum::<Real>() / m;
        let my = out.iter().map(|p| p.y).sum::<Real>() / m;
        let vx = out.iter().map(|p| (p.x - mx).powi(2)).sum::<Real>() / m;
        let vy = out.iter().map(|p| (p.y - my).powi(2)).sum::<Real>() / m;
        assert!(mx.abs() < 1e-12 && my.abs() < 1e-12);
        assert!((vx.sqrt() - 1.0).abs() < 1e-12);
        assert!((vy.sqrt() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn matrix_agrees_with_apply() {
        let n = NormalizationPoint2D::compute(&cloud()).unwrap();
        for p in cloud() {
            let h = n.apply_homogeneous(&Vec3::new(p.x, p.y, 1.0));
            let q = n.apply(&p);
            assert!((h.x - q.x).abs() < 1e-12 && (h.y - q.y).abs() < 1e-12);
            assert!((h.z - 1.0).abs() < 1e-15);
        }
        assert!((n.matrix() * n.matrix_inv() - Mat3::identity()).norm() < 1e-12);
    }

    #[test]
    fn conic_transform_preserves_incidence() {
        // Circle of radius 5 around (3, -2).
        let c = Mat3::new(1.0, 0.0, -3.0, 0.0, 1.0, 2.0, -3.0, 2.0, 9.0 + 4.0 - 25.0);
        let n = NormalizationPoint2D::compute(&cloud()).unwrap();
        let on_circle = Vec3::new(3.0 + 5.0 * 0.6, -2.0 + 5.0 * 0.8, 1.0);
        assert!(on_circle.dot(&(c * on_circle)).abs() < 1e-9);

        let c_n = n.apply_conic(&c);
        let x_n = n.apply_homogeneous(&on_circle);
        assert!(x_n.dot(&(c_n * x_n)).abs() < 1e-9);
        assert!((n.remove_conic(&c_n) - c).norm() < 1e-9);
    }

    #[test]
    fn columns_roundtrip() {
        let n = NormalizationPoint2D::new(5.0, 2.0, -1.0, 0.5);
        let m = Matrix3xX::from_columns(&[Vec3::new(1.0, 2.0, 1.0), Vec3::new(3.0, -4.0, 0.0)]);
        assert!((n.remove_columns(&n.apply_columns(&m)) - m).norm() < 1e-12);
    }

    #[test]
    fn single_point_normalizes_to_origin() {
        let p = Pt2::new(7.0, -3.0);
        let n = NormalizationPoint2D::compute(&[p]).unwrap();
        assert_eq!(n.std_x, 1.0);
        assert_eq!(n.std_y, 1.0);
        assert!(n.apply(&p).coords.norm() < 1e-12);
    }

    #[test]
    fn empty_set_is_rejected() {
        let err = NormalizationPoint2D::compute(&[]).unwrap_err();
        assert_eq!(err, GeometryError::NotEnoughPoints { expected: 1, got: 0 });
    }

    #[test]
    fn default_is_identity() {
        let n = NormalizationPoint2D::default();
        assert!(n.is_identity());
        assert_eq!(n.matrix(), Mat3::identity());
    }
}
