//! Conversions between pixel coordinates and normalized image coordinates.
//!
//! Normalized coordinates live on the `Z = 1` plane of the camera frame:
//! `pixel ~ K * [x, y, 1]^T`.

use crate::{GeometryError, Mat3, Pt2, Result, Vec3};

/// Convert pixel coordinates to normalized coordinates using intrinsics.
///
/// Applies `K^{-1}` to the homogeneous pixel and dehomogenizes.
///
/// # Errors
/// [`GeometryError::Singular`] if `K` cannot be inverted.
///
/// # Example
/// ```
/// use multiview_core::{Mat3, Pt2, pixel_to_normalized};
///
/// let k = Mat3::new(800.0, 0.0, 640.0, 0.0, 800.0, 480.0, 0.0, 0.0, 1.0);
/// let n = pixel_to_normalized(&Pt2::new(640.0, 480.0), &k).unwrap();
/// assert!(n.coords.norm() < 1e-12);
/// ```
pub fn pixel_to_normalized(pixel: &Pt2, intrinsics: &Mat3) -> Result<Pt2> {
    let k_inv = intrinsics
        .try_inverse()
        .ok_or(GeometryError::Singular("intrinsics matrix"))?;
    let v = k_inv * Vec3::new(pixel.x, pixel.y, 1.0);
    Ok(Pt2::new(v.x / v.z, v.y / v.z))
}

/// Convert normalized coordinates to pixel coordinates using intrinsics.
pub fn normalized_to_pixel(normalized: &Pt2, intrinsics: &Mat3) -> Pt2 {
    let v = intrinsics * Vec3::new(normalized.x, normalized.y, 1.0);
    Pt2::new(v.x / v.z, v.y / v.z)
}
