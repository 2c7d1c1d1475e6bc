//! Tait-Bryan (yaw/pitch/roll) <-> rotation matrix conversion.
//!
//! The file loaders (OBJ/BVH, out of scope here) disagree on axis order, so
//! the order is a parameter rather than hardcoded - spec 4.A calls out
//! `(Y, X, Z)` as the default, "configurable per loader".

use nalgebra::Matrix3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaitBryanOrder {
    /// Yaw (Y) * Pitch (X) * Roll (Z); the engine default.
    Yxz,
    Xyz,
    Zyx,
}

fn rot_x(a: f32) -> Matrix3<f32> {
    let (s, c) = a.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c)
}

fn rot_y(a: f32) -> Matrix3<f32> {
    let (s, c) = a.sin_cos();
    Matrix3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c)
}

fn rot_z(a: f32) -> Matrix3<f32> {
    let (s, c) = a.sin_cos();
    Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

/// `angles` is `(x, y, z)` in radians regardless of `order`; `order`
/// determines in which sequence the elemental rotations are multiplied.
pub fn tait_bryan_to_matrix(angles: Vector3Like, order: TaitBryanOrder) -> Matrix3<f32> {
    let (x, y, z) = (angles.0, angles.1, angles.2);
    match order {
        TaitBryanOrder::Yxz => rot_y(y) * rot_x(x) * rot_z(z),
        TaitBryanOrder::Xyz => rot_x(x) * rot_y(y) * rot_z(z),
        TaitBryanOrder::Zyx => rot_z(z) * rot_y(y) * rot_x(x),
    }
}

/// Minimal (x, y, z) tuple so callers don't need to depend on `nalgebra`
/// vector construction boilerplate just to pass three angles.
pub type Vector3Like = (f32, f32, f32);

/// Recovers `(x, y, z)` Tait-Bryan angles from a rotation matrix built with
/// [`tait_bryan_to_matrix`] under the same `order`. Only `Yxz` (the default
/// used throughout the engine) is implemented; other orders are rare enough
/// in practice that they're written out only when a loader needs them.
pub fn matrix_to_tait_bryan(m: &Matrix3<f32>, order: TaitBryanOrder) -> Vector3Like {
    assert_eq!(
        order,
        TaitBryanOrder::Yxz,
        "matrix_to_tait_bryan only implements the engine-default Yxz order"
    );
    let x = (-m[(1, 2)]).asin();
    let (y, z) = if x.cos().abs() > 1e-6 {
        (m[(0, 2)].atan2(m[(2, 2)]), m[(1, 0)].atan2(m[(1, 1)]))
    } else {
        (m[(2, 0)].atan2(m[(0, 0)]), 0.0)
    };
    (x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_yxz() {
        let angles = (0.3, -0.6, 0.15);
        let m = tait_bryan_to_matrix(angles, TaitBryanOrder::Yxz);
        let back = matrix_to_tait_bryan(&m, TaitBryanOrder::Yxz);
        assert!((angles.0 - back.0).abs() < 1e-4);
        assert!((angles.1 - back.1).abs() < 1e-4);
        assert!((angles.2 - back.2).abs() < 1e-4);
    }

    #[test]
    fn result_is_orthonormal() {
        let m = tait_bryan_to_matrix((0.1, 0.2, 0.3), TaitBryanOrder::Yxz);
        assert!(crate::check_orthonormal(&m).is_ok());
    }
}
