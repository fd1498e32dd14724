use crate::{Iso3, Mat3, Mat34, Pt3, Real, Vec3, hstack_3x4};
use nalgebra::{Rotation3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// Rigid body motion `X_b = R * X_a + T`.
///
/// Decomposers return `Se3` values as plain matrices rather than
/// [`Iso3`] because intermediate solutions are not guaranteed to be exactly
/// orthonormal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Se3 {
    /// Rotation part.
    pub r: Mat3,
    /// Translation part.
    pub t: Vec3,
}

impl Default for Se3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Se3 {
    pub fn new(r: Mat3, t: Vec3) -> Self {
        Self { r, t }
    }

    pub fn identity() -> Self {
        Self {
            r: Mat3::identity(),
            t: Vec3::zeros(),
        }
    }

    /// Build from XYZ Euler angles (roll, pitch, yaw) and a translation.
    pub fn from_euler(roll: Real, pitch: Real, yaw: Real, t: Vec3) -> Self {
        Self {
            r: *Rotation3::from_euler_angles(roll, pitch, yaw).matrix(),
            t,
        }
    }

    pub fn transform_point(&self, p: &Pt3) -> Pt3 {
        Pt3::from(self.r * p.coords + self.t)
    }

    /// Inverse motion, assuming `r` is orthonormal.
    pub fn inverse(&self) -> Self {
        let r_t = self.r.transpose();
        Self {
            r: r_t,
            t: -(r_t * self.t),
        }
    }

    /// Apply `self` first and then `next`.
    pub fn then(&self, next: &Se3) -> Self {
        Self {
            r: next.r * self.r,
            t: next.r * self.t + next.t,
        }
    }

    /// `[R | T]` as a 3x4 matrix.
    pub fn to_matrix34(&self) -> Mat34 {
        hstack_3x4(&self.r, &self.t)
    }

    pub fn to_iso(&self) -> Iso3 {
        let rot = Rotation3::from_matrix_unchecked(self.r);
        Iso3::from_parts(
            Translation3::from(self.t),
            UnitQuaternion::from_rotation_matrix(&rot),
        )
    }

    pub fn from_iso(iso: &Iso3) -> Self {
        Self {
            r: *iso.rotation.to_rotation_matrix().matrix(),
            t: iso.translation.vector,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_undoes_motion() {
        let m = Se3::from_euler(0.1, -0.3, 0.7, Vec3::new(1.0, -2.0, 0.5));
        let p = Pt3::new(0.2, 0.4, 3.0);
        let back = m.inverse().transform_point(&m.transform_point(&p));
        assert!((back - p).norm() < 1e-12);
    }

    #[test]
    fn then_matches_sequential_application() {
        let a = Se3::from_euler(0.05, 0.2, -0.1, Vec3::new(0.1, 0.0, 1.0));
        let b = Se3::from_euler(-0.4, 0.1, 0.3, Vec3::new(-1.0, 0.5, 0.0));
        let p = Pt3::new(1.0, 2.0, 3.0);
        let direct = b.transform_point(&a.transform_point(&p));
        assert!((a.then(&b).transform_point(&p) - direct).norm() < 1e-12);
    }

    #[test]
    fn iso_conversion_roundtrip() {
        let m = Se3::from_euler(0.3, 0.2, 0.1, Vec3::new(4.0, 5.0, 6.0));
        let back = Se3::from_iso(&m.to_iso());
        assert!((back.r - m.r).norm() < 1e-12);
        assert!((back.t - m.t).norm() < 1e-12);
    }
}
