//! Decompose the essential matrix of a synthetic stereo pair and keep the
//! candidate that puts every point in front of both cameras.

use anyhow::{Result, ensure};
use multiview::prelude::*;
use multiview::synthetic::scene;

fn depths(motion: &Se3, x1: &Pt2, x2: &Pt2) -> (Real, Real) {
    let d1 = Vec3::new(x1.x, x1.y, 1.0);
    let d2 = motion.r.transpose() * Vec3::new(x2.x, x2.y, 1.0);
    let c2 = -(motion.r.transpose() * motion.t);
    let a = nalgebra::Matrix3x2::from_columns(&[d1, -d2]);
    let sol = (a.transpose() * a)
        .try_inverse()
        .map(|m| m * a.transpose() * c2)
        .unwrap_or_else(nalgebra::Vector2::zeros);
    (sol[0], sol[1])
}

fn main() -> Result<()> {
    let mut rng = scene::seeded_rng(2024);
    let k = scene::random_intrinsics(&mut rng).k_matrix();
    let truth = scene::random_motion(&mut rng, 0.2, 1.0);
    let points = scene::points_in_front(&mut rng, 25, 6.0, 1.5);

    let px1 = scene::project_all(&k, &Se3::identity(), &points);
    let px2 = scene::project_all(&k, &truth, &points);
    ensure!(px1.len() == px2.len(), "some points left the view");

    let f = MultiViewOps::create_fundamental_from_motion(&truth.r, &truth.t, &k, &k)?;
    let e = MultiViewOps::fundamental_to_essential(&f, &k, &k)?;

    let n1: Vec<Pt2> = px1
        .iter()
        .map(|p| multiview::core::pixel_to_normalized(p, &k))
        .collect::<std::result::Result<_, _>>()?;
    let n2: Vec<Pt2> = px2
        .iter()
        .map(|p| multiview::core::pixel_to_normalized(p, &k))
        .collect::<std::result::Result<_, _>>()?;

    for (i, cand) in MultiViewOps::decompose_essential(&e)?.iter().enumerate() {
        let in_front = n1
            .iter()
            .zip(&n2)
            .filter(|(a, b)| {
                let (z1, z2) = depths(cand, a, b);
                z1 > 0.0 && z2 > 0.0
            })
            .count();
        println!("candidate {i}: {in_front}/{} points in front", n1.len());
        if in_front == n1.len() {
            let ang = multiview::core::test_utils::rotation_angle_between(&cand.r, &truth.r);
            println!("  rotation error {ang:.2e} rad, translation {:?}", cand.t.as_slice());
        }
    }
    Ok(())
}
