//! Bounding sphere union/overlap/plane tests, ported from
//! `Mlib/Geometry/Intersection/Bounding_Sphere.hpp`'s incremental-mean
//! construction into the `fyrox-math` `nalgebra`-backed style.

use crate::{plane::Plane, GeometryError};
use nalgebra::Vector3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    center: Vector3<f32>,
    radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vector3<f32>, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Builds the smallest sphere (centered at the point mean) enclosing all
    /// of `points`. Mirrors the original's two-pass mean-then-radius loop.
    pub fn from_points(points: &[Vector3<f32>]) -> Result<Self, GeometryError> {
        if points.is_empty() {
            return Err(GeometryError::EmptyBoundingInput);
        }
        let center = points.iter().sum::<Vector3<f32>>() / points.len() as f32;
        let radius = points
            .iter()
            .map(|p| (p - center).norm_squared())
            .fold(0.0f32, f32::max)
            .sqrt();
        Ok(Self { center, radius })
    }

    pub fn union(&self, other: &BoundingSphere) -> BoundingSphere {
        let d = other.center - self.center;
        let dist = d.norm();
        if dist + other.radius <= self.radius {
            return *self;
        }
        if dist + self.radius <= other.radius {
            return *other;
        }
        let new_radius = (dist + self.radius + other.radius) * 0.5;
        let center = if dist > f32::EPSILON {
            self.center + d * ((new_radius - self.radius) / dist)
        } else {
            self.center
        };
        BoundingSphere::new(center, new_radius)
    }

    #[inline]
    pub fn intersects_sphere(&self, other: &BoundingSphere) -> bool {
        (other.center - self.center).norm_squared() <= (other.radius + self.radius).powi(2)
    }

    /// Signed-distance test against a plane: true if the sphere straddles or
    /// touches it.
    #[inline]
    pub fn intersects_plane(&self, plane: &Plane) -> bool {
        plane.signed_distance(&self.center).abs() <= self.radius
    }

    #[inline]
    pub fn center(&self) -> Vector3<f32> {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_covers_all_inputs() {
        let pts = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(0.0, 2.0, 0.0),
        ];
        let sphere = BoundingSphere::from_points(&pts).unwrap();
        for p in &pts {
            assert!((p - sphere.center()).norm() <= sphere.radius() + 1e-5);
        }
    }

    #[test]
    fn empty_input_errors() {
        assert_eq!(
            BoundingSphere::from_points(&[]).unwrap_err(),
            GeometryError::EmptyBoundingInput
        );
    }

    #[test]
    fn disjoint_spheres_do_not_intersect() {
        let a = BoundingSphere::new(Vector3::zeros(), 1.0);
        let b = BoundingSphere::new(Vector3::new(10.0, 0.0, 0.0), 1.0);
        assert!(!a.intersects_sphere(&b));
    }

    #[test]
    fn overlapping_spheres_intersect() {
        let a = BoundingSphere::new(Vector3::zeros(), 1.0);
        let b = BoundingSphere::new(Vector3::new(1.5, 0.0, 0.0), 1.0);
        assert!(a.intersects_sphere(&b));
    }
}
