//! High-level entry crate for the `multiview` geometry toolbox.
//!
//! This crate re-exports the closed-form decompositions used to go from
//! two- and three-view geometry back to cameras:
//! - essential matrix to four `(R, T)` candidates,
//! - calibrated homography to four `(R, T/d, N)` candidates,
//! - camera matrix (optionally projective, with a rectifying homography) to `K`, `R`, `T`,
//! - absolute dual quadric to the rectifying homography,
//! - trifocal tensor construction, constraints and transfer.
//!
//! # Quick Start
//!
//! ```
//! # fn main() -> anyhow::Result<()> {
//! use multiview::prelude::*;
//!
//! let motion = Se3::from_euler(0.1, -0.2, 0.05, Vec3::new(1.0, 0.0, 0.0));
//! let e = MultiViewOps::create_essential(&motion.r, &motion.t);
//!
//! // Four candidates; picking the physical one is up to the caller.
//! let candidates = MultiViewOps::decompose_essential(&e)?;
//! assert_eq!(candidates.len(), 4);
//! # Ok(())
//! # }
//! ```

/// Core math types, rigid motions, intrinsics and the error type.
///
/// Re-exports everything from `multiview_core`.
pub mod core {
    pub use multiview_core::*;
}

/// Closed-form decompositions and the [`MultiViewOps`] facade.
///
/// Re-exports everything from `multiview_linear`.
pub mod linear {
    pub use multiview_linear::*;
}

/// Deterministic synthetic scenes for testing.
pub mod synthetic {
    pub use multiview_core::synthetic::*;
}

pub use multiview_core::{GeometryError, Result, Se3, SvdOptions};
pub use multiview_linear::MultiViewOps;

pub mod prelude {
    // Core types
    pub use crate::core::{
        FxFyCxCySkew, GeometryError, Mat3, Mat34, Mat4, Pt2, Pt3, Real, Se3, SvdOptions, Vec3,
    };

    // Decomposers and results
    pub use crate::linear::{
        AbsoluteDualQuadric, EssentialDecomposer, HomographyDecomposer, HomographySolution,
        KnownKPose, MetricCamera, NormalizationPoint2D, ProjectiveToMetric, TrifocalTensor,
    };

    // Facade
    pub use crate::MultiViewOps;
}
