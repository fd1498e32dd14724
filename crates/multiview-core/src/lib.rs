//! Core math and geometry primitives for the `multiview` toolbox.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Mat34`, ...),
//! - the [`Se3`] rigid motion used by every decomposer,
//! - pinhole intrinsics ([`FxFyCxCySkew`]) and pixel/normalized conversions,
//! - the shared [`GeometryError`] and [`SvdOptions`].
//!
//! Conventions: matrices are row-major in notation (`m[(row, col)]`), image
//! points are homogeneous with `w = 1` unless stated otherwise, and a camera
//! matrix maps world to image as `x ~ P X`.

/// Error type shared by all decompositions.
pub mod error;
/// Pinhole intrinsics.
pub mod intrinsics;
/// Linear algebra type aliases and helpers.
pub mod math;
/// Numerical options.
pub mod options;
/// Rigid body motion.
pub mod pose;
/// Seeded synthetic scenes for tests and examples.
pub mod synthetic;
pub mod test_utils;

pub use error::*;
pub use intrinsics::*;
pub use math::*;
pub use options::*;
pub use pose::*;
