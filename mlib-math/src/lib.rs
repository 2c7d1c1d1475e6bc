//! Math utils for the mlib engine.
//!
//! Fixed-size vectors and matrices are `nalgebra` types used directly, the
//! same way the rest of the engine uses them. This crate adds the
//! engine-specific layer on top: rigid transforms with a cached affine
//! matrix, Rodrigues rotation integration, tait-bryan conversions, and the
//! piecewise-linear `Interp` helper used by the penalty collision resolver.

pub mod interp;
pub mod rigid_transform;
pub mod rodrigues;
pub mod tait_bryan;

pub use interp::{Interp, OutOfRangeBehavior};
pub use rigid_transform::RigidTransform3;
pub use rodrigues::{reorthonormalize, rodrigues};
pub use tait_bryan::{matrix_to_tait_bryan, tait_bryan_to_matrix, TaitBryanOrder};

use std::fmt;

/// Errors raised by primitive math constructors.
///
/// Mirrors the `DomainError` entry of the error taxonomy: these are thrown
/// only when a caller hands in data that violates an invariant the rest of
/// the engine depends on (non-orthonormal rotation matrices, NaN poses).
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    NonOrthonormalRotation { max_column_error: f32 },
    NonFiniteValue { what: &'static str },
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NonOrthonormalRotation { max_column_error } => write!(
                f,
                "rotation matrix is not orthonormal to tolerance 1e-6 (max column error {max_column_error})"
            ),
            DomainError::NonFiniteValue { what } => write!(f, "non-finite value in {what}"),
        }
    }
}

impl std::error::Error for DomainError {}

/// Tolerance used when checking that the columns of a rotation matrix are
/// orthonormal (spec 3, Data Model / Vector-Matrix invariant).
pub const ORTHONORMAL_TOLERANCE: f32 = 1e-6;

/// Checks that a 3x3 matrix's columns are pairwise orthogonal unit vectors,
/// returning the largest observed deviation from that invariant.
pub fn check_orthonormal(m: &nalgebra::Matrix3<f32>) -> Result<(), DomainError> {
    let c0 = m.column(0);
    let c1 = m.column(1);
    let c2 = m.column(2);
    let errors = [
        (c0.norm() - 1.0).abs(),
        (c1.norm() - 1.0).abs(),
        (c2.norm() - 1.0).abs(),
        c0.dot(&c1).abs(),
        c0.dot(&c2).abs(),
        c1.dot(&c2).abs(),
    ];
    let max_column_error = errors.iter().cloned().fold(0.0f32, f32::max);
    if max_column_error > ORTHONORMAL_TOLERANCE {
        return Err(DomainError::NonOrthonormalRotation { max_column_error });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;

    #[test]
    fn identity_is_orthonormal() {
        assert!(check_orthonormal(&Matrix3::identity()).is_ok());
    }

    #[test]
    fn skewed_matrix_is_rejected() {
        let m = Matrix3::new(1.0, 0.1, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        assert!(check_orthonormal(&m).is_err());
    }
}
