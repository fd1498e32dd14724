//! Closed-form multi-view geometry decompositions.
//!
//! - [`NormalizationPoint2D`]: per-axis conditioning of image points,
//! - [`svd`]: descending SVD and singular value massaging,
//! - [`EssentialDecomposer`]: `E -> 4 x (R, T)`,
//! - [`HomographyDecomposer`]: `H -> 4 x (R, T/d, N)`,
//! - [`ProjectiveToMetric`]: `P -> (K, R, T)`, optionally through a rectifying homography,
//! - [`quadric`]: absolute dual quadric decomposition for self-calibration,
//! - [`TrifocalTensor`]: three-view constraints and transfer,
//! - [`MultiViewOps`]: facade over all of the above.
//!
//! Every decomposer is a small `Copy` value holding options only; each call
//! returns freshly owned results. Ambiguous solution sets are returned as
//! fixed-size arrays in a documented order and are never disambiguated here.

pub mod camera_matrix;
pub mod epipolar;
pub mod essential;
pub mod homography;
pub mod multiview;
pub mod normalization;
pub mod perspective;
pub mod quadric;
pub mod svd;
pub mod trifocal;

pub use camera_matrix::*;
pub use epipolar::*;
pub use essential::*;
pub use homography::*;
pub use multiview::*;
pub use normalization::*;
pub use quadric::*;
pub use trifocal::*;
