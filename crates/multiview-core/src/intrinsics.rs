use crate::{GeometryError, Result};
use nalgebra::{Matrix3, RealField, Vector2};
use serde::{Deserialize, Serialize};

/// Standard pinhole intrinsics with optional skew.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FxFyCxCySkew<S: RealField + Copy> {
    /// Focal length in pixels along X.
    pub fx: S,
    /// Focal length in pixels along Y.
    pub fy: S,
    /// Principal point X coordinate in pixels.
    pub cx: S,
    /// Principal point Y coordinate in pixels.
    pub cy: S,
    /// Skew term (typically 0).
    pub skew: S,
}

impl<S: RealField + Copy> FxFyCxCySkew<S> {
    /// Return the 3x3 camera intrinsics matrix K.
    pub fn k_matrix(&self) -> Matrix3<S> {
        Matrix3::new(
            self.fx,
            self.skew,
            self.cx,
            S::zero(),
            self.fy,
            self.cy,
            S::zero(),
            S::zero(),
            S::one(),
        )
    }

    /// Read the parameters out of an upper-triangular `K`.
    ///
    /// `K` is divided by `K[2,2]` first, so any non-zero scale is accepted.
    pub fn from_k_matrix(k: &Matrix3<S>) -> Result<Self> {
        let w = k[(2, 2)];
        if w == S::zero() {
            return Err(GeometryError::Degenerate("K[2,2] is zero"));
        }
        Ok(Self {
            fx: k[(0, 0)] / w,
            fy: k[(1, 1)] / w,
            cx: k[(0, 2)] / w,
            cy: k[(1, 2)] / w,
            skew: k[(0, 1)] / w,
        })
    }

    /// Normalized image coordinates to pixels.
    pub fn norm_to_pixel(&self, norm: &Vector2<S>) -> Vector2<S> {
        let u = self.fx * norm.x + self.skew * norm.y + self.cx;
        let v = self.fy * norm.y + self.cy;
        Vector2::new(u, v)
    }

    /// Pixels to normalized image coordinates.
    pub fn pixel_to_norm(&self, pixel: &Vector2<S>) -> Vector2<S> {
        let sy = (pixel.y - self.cy) / self.fy;
        let sx = (pixel.x - self.cx - self.skew * sy) / self.fx;
        Vector2::new(sx, sy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn k_matrix_roundtrip_with_scale() {
        let intr = FxFyCxCySkew {
            fx: 300.0,
            fy: 310.0,
            cx: 50.0,
            cy: 60.0,
            skew: 1.0,
        };
        let k = intr.k_matrix() * -2.5;
        let back = FxFyCxCySkew::<f64>::from_k_matrix(&k).unwrap();
        assert!((back.fx - 300.0).abs() < 1e-12);
        assert!((back.skew - 1.0).abs() < 1e-12);
        assert!((back.cy - 60.0).abs() < 1e-12);
    }

    #[test]
    fn pixel_norm_inverse() {
        let intr = FxFyCxCySkew {
            fx: 800.0,
            fy: 780.0,
            cx: 640.0,
            cy: 360.0,
            skew: 0.5,
        };
        let n = Vector2::new(0.12, -0.3);
        let back = intr.pixel_to_norm(&intr.norm_to_pixel(&n));
        assert!((back - n).norm() < 1e-12);
    }

    #[test]
    fn serde_roundtrip() {
        let intr = FxFyCxCySkew {
            fx: 1.0,
            fy: 2.0,
            cx: 3.0,
            cy: 4.0,
            skew: 0.0,
        };
        let json = serde_json::to_string(&intr).unwrap();
        let back: FxFyCxCySkew<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, intr);
    }
}
