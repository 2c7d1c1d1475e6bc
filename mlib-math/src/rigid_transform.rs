//! Rigid (rotation + translation) transforms with a cached affine matrix.
//!
//! Mirrors the way `fyrox-math`'s `Ray`/`Plane` wrap `nalgebra` primitives:
//! the heavy lifting (`Matrix4`, `Matrix3`) is `nalgebra`'s, this type adds
//! the engine-specific invariant (rotation columns orthonormal to
//! [`crate::ORTHONORMAL_TOLERANCE`]) and keeps an up-to-date 4x4 affine
//! matrix so hot paths (vertex skinning, draw-call MVP) don't recompute it.

use crate::{check_orthonormal, DomainError};
use nalgebra::{Matrix3, Matrix4, Vector3};

/// A rotation + translation pair, with a cached homogeneous matrix.
///
/// Invariant (spec 3): `rotation`'s columns are orthonormal to
/// [`crate::ORTHONORMAL_TOLERANCE`]; the cached `affine` is always
/// `compose(rotation, translation)` and is recomputed whenever either part
/// changes, never mutated directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform3 {
    rotation: Matrix3<f32>,
    translation: Vector3<f32>,
    affine: Matrix4<f32>,
}

impl Default for RigidTransform3 {
    fn default() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros()).expect("identity is orthonormal")
    }
}

impl RigidTransform3 {
    pub fn new(rotation: Matrix3<f32>, translation: Vector3<f32>) -> Result<Self, DomainError> {
        check_orthonormal(&rotation)?;
        if !translation.iter().all(|c| c.is_finite()) {
            return Err(DomainError::NonFiniteValue {
                what: "RigidTransform3::translation",
            });
        }
        Ok(Self {
            rotation,
            translation,
            affine: Self::build_affine(&rotation, &translation),
        })
    }

    fn build_affine(rotation: &Matrix3<f32>, translation: &Vector3<f32>) -> Matrix4<f32> {
        let mut affine = Matrix4::identity();
        affine.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
        affine.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
        affine
    }

    #[inline]
    pub fn rotation(&self) -> &Matrix3<f32> {
        &self.rotation
    }

    #[inline]
    pub fn translation(&self) -> Vector3<f32> {
        self.translation
    }

    #[inline]
    pub fn affine(&self) -> &Matrix4<f32> {
        &self.affine
    }

    pub fn set_rotation(&mut self, rotation: Matrix3<f32>) -> Result<(), DomainError> {
        check_orthonormal(&rotation)?;
        self.rotation = rotation;
        self.affine = Self::build_affine(&self.rotation, &self.translation);
        Ok(())
    }

    pub fn set_translation(&mut self, translation: Vector3<f32>) {
        self.translation = translation;
        self.affine = Self::build_affine(&self.rotation, &self.translation);
    }

    /// Composes `self * other`, i.e. "other in self's frame".
    pub fn compose(&self, other: &RigidTransform3) -> RigidTransform3 {
        let rotation = self.rotation * other.rotation;
        let translation = self.rotation * other.translation + self.translation;
        // Composition of two orthonormal rotations stays orthonormal modulo
        // float error; re-check defensively rather than silently drifting.
        RigidTransform3::new(rotation, translation).unwrap_or(RigidTransform3 {
            rotation,
            translation,
            affine: Self::build_affine(&rotation, &translation),
        })
    }

    /// Inverse of a rigid transform: transpose the rotation, negate the
    /// rotated-back translation (spec 4.A).
    pub fn inverse(&self) -> RigidTransform3 {
        let rotation = self.rotation.transpose();
        let translation = -(rotation * self.translation);
        RigidTransform3 {
            rotation,
            translation,
            affine: Self::build_affine(&rotation, &translation),
        }
    }

    #[inline]
    pub fn transform_point(&self, p: Vector3<f32>) -> Vector3<f32> {
        self.rotation * p + self.translation
    }

    #[inline]
    pub fn transform_direction(&self, d: Vector3<f32>) -> Vector3<f32> {
        self.rotation * d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;

    fn sample() -> RigidTransform3 {
        let rotation = crate::rodrigues(Vector3::new(0.2, 0.4, -0.1));
        RigidTransform3::new(rotation, Vector3::new(1.0, -2.0, 3.5)).unwrap()
    }

    #[test]
    fn invert_composed_with_self_is_identity() {
        let t = sample();
        let identity = t.inverse().compose(&t);
        assert!((identity.affine() - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn transform_point_roundtrips_through_inverse() {
        let t = sample();
        let p = Vector3::new(3.0, -1.0, 2.0);
        let back = t.inverse().transform_point(t.transform_point(p));
        assert!((back - p).norm() < 1e-5);
    }

    #[test]
    fn rejects_non_orthonormal_rotation() {
        let bad = Matrix3::new(2.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        assert!(RigidTransform3::new(bad, Vector3::zeros()).is_err());
    }
}
