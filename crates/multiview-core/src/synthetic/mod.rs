//! Deterministic synthetic data generation helpers.
//!
//! Small building blocks for constructing multi-view test problems:
//! - seeded random rotations, motions and intrinsics,
//! - point clouds in front of a camera and on a plane,
//! - pinhole projection through `K [R | T]`.
//!
//! All randomness flows through an explicit [`rand::rngs::StdRng`] seed, so
//! the same seed always reproduces the same scene.
//!
//! # Example
//!
//! ```
//! use multiview_core::synthetic::scene;
//!
//! let mut rng = scene::seeded_rng(7);
//! let motion = scene::random_motion(&mut rng, 0.3, 1.0);
//! let points = scene::points_in_front(&mut rng, 20, 4.0, 1.0);
//! assert_eq!(points.len(), 20);
//! assert!((motion.r.determinant() - 1.0).abs() < 1e-12);
//! ```

pub mod planar;
pub mod scene;
