//! Two-view epipolar geometry: construction and conversion of essential and
//! fundamental matrices, epipoles, and canonical projective cameras.
//!
//! Convention: `x2^T F x1 = 0` for corresponding pixels `x1` (view 1) and
//! `x2` (view 2), and `E = [T]x R` for the motion from view 1 to view 2.

use crate::camera_matrix::{camera_center, camera_pseudo_inverse};
use crate::svd::{MassageSingularValues, massage, svd_descending};
use multiview_core::{GeometryError, Mat3, Mat34, Pt2, Real, Result, SvdOptions, Vec3, hstack_3x4};

fn inverse(m: &Mat3, what: &'static str) -> Result<Mat3> {
    m.try_inverse().ok_or(GeometryError::Singular(what))
}

/// `E = [T]x R`.
pub fn create_essential(r: &Mat3, t: &Vec3) -> Mat3 {
    t.cross_matrix() * r
}

/// `F = K^{-T} E K^{-1}` for two views sharing one calibration.
pub fn create_fundamental(e: &Mat3, k: &Mat3) -> Result<Mat3> {
    create_fundamental_two(e, k, k)
}

/// `F = K2^{-T} E K1^{-1}`.
pub fn create_fundamental_two(e: &Mat3, k1: &Mat3, k2: &Mat3) -> Result<Mat3> {
    let k1_inv = inverse(k1, "calibration matrix of view 1")?;
    let k2_inv = inverse(k2, "calibration matrix of view 2")?;
    Ok(k2_inv.transpose() * e * k1_inv)
}

/// Fundamental matrix of the motion `(R, T)` between two calibrated views.
pub fn create_fundamental_from_motion(r: &Mat3, t: &Vec3, k1: &Mat3, k2: &Mat3) -> Result<Mat3> {
    create_fundamental_two(&create_essential(r, t), k1, k2)
}

/// `E = K2^T F K1`, projected so that its singular values are exactly `(1, 1, 0)`.
pub fn fundamental_to_essential(f: &Mat3, k1: &Mat3, k2: &Mat3) -> Result<Mat3> {
    let mut e = k2.transpose() * f * k1;
    MassageSingularValues::new(massage::essential_unit).process(&mut e)?;
    Ok(e)
}

/// Epipoles of `F` as unit vectors: `e1` in view 1 (`F e1 = 0`) and `e2` in
/// view 2 (`F^T e2 = 0`).
pub fn extract_epipoles(f: &Mat3) -> Result<(Vec3, Vec3)> {
    let svd = svd_descending(f, &SvdOptions::default())?;
    let e1 = svd.v_t.row(2).transpose();
    let e2 = svd.u.column(2).into_owned();
    Ok((e1, e2))
}

/// Projective camera for view 2 compatible with `F` when view 1 is `[I | 0]`:
/// `P2 = [[e2]x F + e2 v^T | lambda e2]`.
///
/// Any `v` and non-zero `lambda` give a valid camera; they parametrize the
/// projective ambiguity.
pub fn fundamental_to_projective(f: &Mat3, e2: &Vec3, v: &Vec3, lambda: Real) -> Mat34 {
    let m = e2.cross_matrix() * f + e2 * v.transpose();
    hstack_3x4(&m, &(e2 * lambda))
}

/// [`fundamental_to_projective`] with `v = 0` and `lambda = 1`.
pub fn fundamental_to_projective_canonical(f: &Mat3) -> Result<Mat34> {
    let (_, e2) = extract_epipoles(f)?;
    Ok(fundamental_to_projective(f, &e2, &Vec3::zeros(), 1.0))
}

/// Fundamental matrix of two projective cameras:
/// `F = [e2]x P2 P1^+` with `e2 = P2 C1`.
pub fn projective_to_fundamental(p1: &Mat34, p2: &Mat34) -> Result<Mat3> {
    let c1 = camera_center(p1)?;
    let e2 = p2 * c1;
    Ok(e2.cross_matrix() * p2 * camera_pseudo_inverse(p1)?)
}

/// Fundamental matrix for `P1 = [I | 0]` and `P2 = [M | e2]`: `F = [e2]x M`.
pub fn projective_to_fundamental_canonical(p2: &Mat34) -> Mat3 {
    let m = p2.fixed_view::<3, 3>(0, 0).into_owned();
    let e2: Vec3 = p2.column(3).into_owned();
    e2.cross_matrix() * m
}

/// Algebraic epipolar residual `x2^T F x1`.
pub fn epipolar_constraint(f: &Mat3, p1: &Pt2, p2: &Pt2) -> Real {
    Vec3::new(p2.x, p2.y, 1.0).dot(&(f * Vec3::new(p1.x, p1.y, 1.0)))
}

fn unit_frobenius(m: &Mat3) -> Mat3 {
    m / m.norm()
}

/// Test whether three fundamental matrices come from one set of three cameras
/// (Hartley and Zisserman, section 15.4).
///
/// `Fij` maps view `j` to view `i` (`xi^T Fij xj = 0`). Matrices and epipoles
/// are normalized before the three incidence residuals are compared to `tol`.
pub fn fundamental_compatible3(f21: &Mat3, f31: &Mat3, f32: &Mat3, tol: Real) -> Result<bool> {
    let (e12, e21) = extract_epipoles(f21)?;
    let (e13, e31) = extract_epipoles(f31)?;
    let (e23, e32) = extract_epipoles(f32)?;

    let f21 = unit_frobenius(f21);
    let f31 = unit_frobenius(f31);
    let f32 = unit_frobenius(f32);

    let residuals = [
        e23.dot(&(f21 * e13)),
        e31.dot(&(f32 * e21)),
        e32.dot(&(f31 * e12)),
    ];
    Ok(residuals.iter().all(|r| r.abs() <= tol))
}
