//! Points on a plane, for homography scenarios.
//!
//! A plane is described in the frame of the first camera by a unit normal `n`
//! and a distance `d`, so that every point `X` on it satisfies `n^T X = d`.

use crate::{Pt3, Real, Vec3};
use anyhow::{Result, ensure};

/// Regular `nx * ny` grid on the plane `n^T X = d`, centred on the foot of
/// the perpendicular from the origin.
///
/// Points are ordered deterministically in row-major order.
pub fn grid_on_plane(normal: &Vec3, distance: Real, nx: usize, ny: usize, spacing: Real) -> Result<Vec<Pt3>> {
    let n_len = normal.norm();
    ensure!(n_len > 1e-12, "plane normal must be non-zero");
    let n = normal / n_len;

    // Any vector not parallel to n seeds the in-plane basis.
    let seed = if n.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    let e1 = n.cross(&seed).normalize();
    let e2 = n.cross(&e1);
    let origin = n * distance;

    let half_x = (nx.saturating_sub(1)) as Real * 0.5;
    let half_y = (ny.saturating_sub(1)) as Real * 0.5;
    let mut pts = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let u = (i as Real - half_x) * spacing;
            let v = (j as Real - half_y) * spacing;
            pts.push(Pt3::from(origin + e1 * u + e2 * v));
        }
    }
    Ok(pts)
}
