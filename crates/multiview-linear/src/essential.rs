//! Essential matrix decomposition into rotation and translation.
//!
//! An essential matrix `E = [T]x R` determines the relative motion between
//! two calibrated views up to the scale of `T` and a fourfold ambiguity. The
//! correct candidate has to be picked afterwards by a cheirality check
//! (triangulated points in front of both cameras).

use crate::svd::svd_descending;
use log::debug;
use multiview_core::{Mat3, Real, Result, Se3, SvdOptions};

/// The four motion hypotheses of an essential matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EssentialDecomposition {
    /// Candidates in the fixed order `(R_a, -T)`, `(R_a, T)`, `(R_b, T)`,
    /// `(R_b, -T)` with `R_a = U W^T V^T`, `R_b = U W V^T` and `T = U[:, 2]`.
    /// Translations are unit length.
    pub solutions: [Se3; 4],
    /// Scale of the translation implied by `E`: the mean of its two largest
    /// singular values.
    pub translation_length: Real,
}

/// Stateless decomposer; carries only SVD settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct EssentialDecomposer {
    pub options: SvdOptions,
}

impl EssentialDecomposer {
    pub fn new(options: SvdOptions) -> Self {
        Self { options }
    }

    /// Decompose `E` into its four `(R, T)` candidates.
    ///
    /// `E` does not have to satisfy the essential constraints exactly; the
    /// third singular value is ignored.
    pub fn decompose(&self, e: &Mat3) -> Result<EssentialDecomposition> {
        let svd = svd_descending(e, &self.options)?;
        let s = svd.singular_values;
        let translation_length = (s[0] + s[1]).abs() * 0.5;

        let mut u = svd.u;
        let mut v = svd.v();
        if u.determinant() < 0.0 {
            debug!("essential decomposition: flipping U to a proper rotation");
            u = -u;
        }
        if v.determinant() < 0.0 {
            debug!("essential decomposition: flipping V to a proper rotation");
            v = -v;
        }

        let w = Mat3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let t = u.column(2).into_owned();
        let candidate = |transposed_w: bool, negate_t: bool| {
            let r = if transposed_w {
                u * w.transpose() * v.transpose()
            } else {
                u * w * v.transpose()
            };
            Se3::new(r, if negate_t { -t } else { t })
        };

        Ok(EssentialDecomposition {
            solutions: [
                candidate(true, true),
                candidate(true, false),
                candidate(false, false),
                candidate(false, true),
            ],
            translation_length,
        })
    }
}

/// Decompose an essential matrix with default options.
pub fn decompose_essential(e: &Mat3) -> Result<[Se3; 4]> {
    Ok(EssentialDecomposer::default().decompose(e)?.solutions)
}
