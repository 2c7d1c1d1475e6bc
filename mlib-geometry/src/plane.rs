//! A 3D plane in `normal . x + d = 0` form, matching `fyrox-math`'s
//! `Plane` (see `fyrox-math/src/plane.rs`) closely enough that code reading
//! one reads the other, but keyed to this crate's `GeometryError` instead of
//! `Option` for the degenerate case.

use crate::GeometryError;
use nalgebra::Vector3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f32>,
    pub d: f32,
}

impl Plane {
    pub fn from_normal_and_point(
        normal: Vector3<f32>,
        point: Vector3<f32>,
    ) -> Result<Self, GeometryError> {
        let normal = normal
            .try_normalize(f32::EPSILON)
            .ok_or(GeometryError::DegenerateTriangle)?;
        Ok(Self {
            normal,
            d: -point.dot(&normal),
        })
    }

    pub fn from_triangle(
        a: Vector3<f32>,
        b: Vector3<f32>,
        c: Vector3<f32>,
    ) -> Result<Self, GeometryError> {
        let normal = (b - a).cross(&(c - a));
        Self::from_normal_and_point(normal, a)
    }

    #[inline]
    pub fn signed_distance(&self, p: &Vector3<f32>) -> f32 {
        self.normal.dot(p) + self.d
    }

    pub fn flipped(&self) -> Plane {
        Plane {
            normal: -self.normal,
            d: -self.d,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_distance_zero_on_plane() {
        let p = Plane::from_normal_and_point(Vector3::new(0.0, 1.0, 0.0), Vector3::zeros())
            .unwrap();
        assert!((p.signed_distance(&Vector3::new(5.0, 0.0, -5.0))).abs() < 1e-6);
    }

    #[test]
    fn from_triangle_normal_points_via_winding() {
        let p = Plane::from_triangle(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        assert!((p.normal - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn degenerate_triangle_errors() {
        let err = Plane::from_triangle(
            Vector3::zeros(),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
        );
        assert_eq!(err.unwrap_err(), GeometryError::DegenerateTriangle);
    }
}
