use nalgebra::{
    Isometry3, Matrix3, Matrix3x4, Matrix4, Point2, Point3, Vector2, Vector3, Vector4,
};

pub mod coordinate_utils;

pub use coordinate_utils::*;

pub type Real = f64;

pub type Vec2 = Vector2<Real>;
pub type Vec3 = Vector3<Real>;
pub type Vec4 = Vector4<Real>;
pub type Pt2 = Point2<Real>;
pub type Pt3 = Point3<Real>;
pub type Mat3 = Matrix3<Real>;
pub type Mat4 = Matrix4<Real>;
/// 3x4 camera projection matrix.
pub type Mat34 = Matrix3x4<Real>;
pub type Iso3 = Isometry3<Real>;

pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

pub fn from_homogeneous(v: &Vec3) -> Pt2 {
    Pt2::new(v.x / v.z, v.y / v.z)
}

pub fn to_homogeneous_3d(p: &Pt3) -> Vec4 {
    Vec4::new(p.x, p.y, p.z, 1.0)
}

/// Cross-product matrix `[v]x` so that `[v]x * u == v x u`.
pub fn skew(v: &Vec3) -> Mat3 {
    v.cross_matrix()
}

/// Build `[M | t]`.
pub fn hstack_3x4(m: &Mat3, t: &Vec3) -> Mat34 {
    let mut out = Mat34::zeros();
    out.fixed_view_mut::<3, 3>(0, 0).copy_from(m);
    out.set_column(3, t);
    out
}

/// Least-squares scale `s` minimizing `|s * a - b|` over all entries.
///
/// Returns `None` when `a` is all zeros.
pub fn find_scale(a: &[Real], b: &[Real]) -> Option<Real> {
    let dot: Real = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let denom: Real = a.iter().map(|x| x * x).sum();
    (denom > Real::EPSILON).then(|| dot / denom)
}

pub fn is_finite_slice(values: &[Real]) -> bool {
    values.iter().all(|v| v.is_finite())
}
