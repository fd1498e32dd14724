use crate::{FxFyCxCySkew, Mat3, Pt2, Pt3, Real, Se3, Vec3};
use nalgebra::Rotation3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Rotation with each Euler angle drawn uniformly from `[-max_angle, max_angle]`.
pub fn random_rotation<R: Rng>(rng: &mut R, max_angle: Real) -> Mat3 {
    let roll = rng.random_range(-max_angle..=max_angle);
    let pitch = rng.random_range(-max_angle..=max_angle);
    let yaw = rng.random_range(-max_angle..=max_angle);
    *Rotation3::from_euler_angles(roll, pitch, yaw).matrix()
}

/// Random motion with bounded rotation angles and a translation of norm `baseline`.
pub fn random_motion<R: Rng>(rng: &mut R, max_angle: Real, baseline: Real) -> Se3 {
    let dir = loop {
        let v = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        );
        let n = v.norm();
        if n > 1e-3 {
            break v / n;
        }
    };
    Se3::new(random_rotation(rng, max_angle), dir * baseline)
}

/// Plausible pinhole intrinsics with a small skew.
pub fn random_intrinsics<R: Rng>(rng: &mut R) -> FxFyCxCySkew<Real> {
    FxFyCxCySkew {
        fx: rng.random_range(300.0..=900.0),
        fy: rng.random_range(300.0..=900.0),
        cx: rng.random_range(200.0..=400.0),
        cy: rng.random_range(150.0..=300.0),
        skew: rng.random_range(-1.0..=1.0),
    }
}

/// Points scattered in a cube of half-width `spread` centred at `(0, 0, depth)`.
pub fn points_in_front<R: Rng>(rng: &mut R, count: usize, depth: Real, spread: Real) -> Vec<Pt3> {
    (0..count)
        .map(|_| {
            Pt3::new(
                rng.random_range(-spread..=spread),
                rng.random_range(-spread..=spread),
                depth + rng.random_range(-spread..=spread),
            )
        })
        .collect()
}

/// Pinhole projection `K (R X + T)` with homogeneous division.
///
/// Returns `None` for points on or behind the image plane.
pub fn project(k: &Mat3, world_to_cam: &Se3, point: &Pt3) -> Option<Pt2> {
    let pc = world_to_cam.transform_point(point);
    if pc.z <= 0.0 {
        return None;
    }
    let x = k * pc.coords;
    Some(Pt2::new(x.x / x.z, x.y / x.z))
}

/// Project every point; points behind the camera are dropped.
pub fn project_all(k: &Mat3, world_to_cam: &Se3, points: &[Pt3]) -> Vec<Pt2> {
    points
        .iter()
        .filter_map(|p| project(k, world_to_cam, p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_scene() {
        let a = points_in_front(&mut seeded_rng(11), 5, 3.0, 0.5);
        let b = points_in_front(&mut seeded_rng(11), 5, 3.0, 0.5);
        assert_eq!(a, b);
    }

    #[test]
    fn random_motion_has_requested_baseline() {
        let mut rng = seeded_rng(3);
        for _ in 0..10 {
            let m = random_motion(&mut rng, 0.5, 2.0);
            assert!((m.t.norm() - 2.0).abs() < 1e-12);
            assert!((m.r * m.r.transpose() - Mat3::identity()).norm() < 1e-12);
        }
    }

    #[test]
    fn project_rejects_points_behind_camera() {
        let k = Mat3::identity();
        assert!(project(&k, &Se3::identity(), &Pt3::new(0.0, 0.0, -1.0)).is_none());
        let p = project(&k, &Se3::identity(), &Pt3::new(1.0, 2.0, 2.0)).unwrap();
        assert!((p - Pt2::new(0.5, 1.0)).norm() < 1e-12);
    }
}
