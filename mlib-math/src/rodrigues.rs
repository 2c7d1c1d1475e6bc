//! Rodrigues' rotation formula: integrates an angular-velocity-times-time
//! vector into an incremental rotation matrix, used by
//! [`crate::rigid_transform::RigidTransform3`] and the rigid-body integrator
//! to advance orientation from `omega * dt`.

use nalgebra::{Matrix3, Vector3};

/// Re-orthonormalizes a rotation matrix via Gram-Schmidt, used after
/// repeated Rodrigues integration steps to keep the column-orthonormal
/// invariant (spec 3) from drifting past [`crate::ORTHONORMAL_TOLERANCE`]
/// under accumulated float error.
pub fn reorthonormalize(m: Matrix3<f32>) -> Matrix3<f32> {
    let mut x = m.column(0).into_owned();
    if x.try_normalize_mut(f32::EPSILON).is_none() {
        return Matrix3::identity();
    }
    let mut y = m.column(1).into_owned();
    y -= x * x.dot(&y);
    if y.try_normalize_mut(f32::EPSILON).is_none() {
        return Matrix3::identity();
    }
    let z = x.cross(&y);
    Matrix3::from_columns(&[x, y, z])
}

/// Builds the rotation matrix corresponding to rotating by `angle = |axis|`
/// radians around `axis / |axis|`. Returns the identity for a
/// (near-)zero vector, matching the small-angle limit.
pub fn rodrigues(axis_angle: Vector3<f32>) -> Matrix3<f32> {
    let theta = axis_angle.norm();
    if theta < 1e-8 {
        return Matrix3::identity();
    }
    let axis = axis_angle / theta;
    let k = Matrix3::new(
        0.0, -axis.z, axis.y, axis.z, 0.0, -axis.x, -axis.y, axis.x, 0.0,
    );
    Matrix3::identity() + k * theta.sin() + k * k * (1.0 - theta.cos())
}
