//! Pinhole camera helpers: calibration matrices, pixel conversion and rendering.

use multiview_core::{FxFyCxCySkew, Mat3, Mat34, Pt2, Pt3, Real, Result, Se3, to_homogeneous_3d};

pub use crate::camera_matrix::create_camera_matrix;
pub use multiview_core::{normalized_to_pixel as convert_norm_to_pixel, pixel_to_normalized as convert_pixel_to_norm};

/// Upper-triangular calibration matrix.
pub fn calibration_matrix(fx: Real, fy: Real, skew: Real, cx: Real, cy: Real) -> Mat3 {
    FxFyCxCySkew { fx, fy, cx, cy, skew }.k_matrix()
}

/// Inverse of [`calibration_matrix`]; `K` may carry any non-zero scale.
pub fn matrix_to_intrinsics(k: &Mat3) -> Result<FxFyCxCySkew<Real>> {
    FxFyCxCySkew::from_k_matrix(k)
}

/// Render a world point into a camera.
///
/// With `k = None` the result is in normalized image coordinates. Points on
/// or behind the camera plane yield `None`.
pub fn render_pixel(world_to_camera: &Se3, k: Option<&Mat3>, x: &Pt3) -> Option<Pt2> {
    let pc = world_to_camera.transform_point(x);
    if pc.z <= 0.0 {
        return None;
    }
    let norm = Pt2::new(pc.x / pc.z, pc.y / pc.z);
    Some(match k {
        Some(k) => convert_norm_to_pixel(&norm, k),
        None => norm,
    })
}

/// Render a world point through a 3x4 camera matrix. `None` at infinity.
pub fn render_pixel_camera(p: &Mat34, x: &Pt3) -> Option<Pt2> {
    let v = p * to_homogeneous_3d(x);
    (v.z.abs() > Real::EPSILON).then(|| Pt2::new(v.x / v.z, v.y / v.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiview_core::Vec3;

    #[test]
    fn both_render_paths_agree() {
        let k = calibration_matrix(500.0, 520.0, 0.3, 320.0, 240.0);
        let pose = Se3::from_euler(0.1, -0.2, 0.05, Vec3::new(0.2, 0.1, 1.0));
        let p = create_camera_matrix(&pose.r, &pose.t, &k);
        let x = Pt3::new(0.3, -0.1, 2.0);

        let a = render_pixel(&pose, Some(&k), &x).unwrap();
        let b = render_pixel_camera(&p, &x).unwrap();
        assert!((a - b).norm() < 1e-9);

        let n = render_pixel(&pose, None, &x).unwrap();
        assert!((convert_pixel_to_norm(&a, &k).unwrap() - n).norm() < 1e-12);
    }

    #[test]
    fn behind_camera_is_not_rendered() {
        assert!(render_pixel(&Se3::identity(), None, &Pt3::new(0.0, 0.0, -2.0)).is_none());
    }

    #[test]
    fn intrinsics_roundtrip() {
        let k = calibration_matrix(500.0, 520.0, 0.3, 320.0, 240.0);
        let intr = matrix_to_intrinsics(&(k * 4.0)).unwrap();
        assert!((intr.k_matrix() - k).norm() < 1e-12);
    }
}
