//! Axis-aligned bounding box, analogous to `fyrox-math`'s
//! `AxisAlignedBoundingBox` but templated down to just the operations the
//! draw-distance trimming window (spec 4.F) and BVH broad phase (4.D) need.

use crate::BoundingSphere;
use nalgebra::Vector3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: Vector3<f32>,
    max: Vector3<f32>,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }
}

impl BoundingBox {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    pub fn from_point(point: Vector3<f32>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    pub fn from_points(points: &[Vector3<f32>]) -> Self {
        let mut bb = Self::default();
        for p in points {
            bb.extend_point(*p);
        }
        bb
    }

    pub fn extend_point(&mut self, p: Vector3<f32>) {
        self.min = self.min.inf(&p);
        self.max = self.max.sup(&p);
    }

    pub fn extend(&mut self, other: &BoundingBox) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    pub fn intersects_box(&self, other: &BoundingBox) -> bool {
        (self.max.x >= other.min.x && self.min.x <= other.max.x)
            && (self.max.y >= other.min.y && self.min.y <= other.max.y)
            && (self.max.z >= other.min.z && self.min.z <= other.max.z)
    }

    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        let c = sphere.center();
        let r = sphere.radius();
        c.x >= self.min.x - r
            && c.x <= self.max.x + r
            && c.y >= self.min.y - r
            && c.y <= self.max.y + r
            && c.z >= self.min.z - r
            && c.z <= self.max.z + r
    }

    /// Used by the broad-phase point-in-AABB query (spec 4.D "Broad phase").
    pub fn contains_point(&self, p: Vector3<f32>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    #[inline]
    pub fn min(&self) -> Vector3<f32> {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Vector3<f32> {
        self.max
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_contains_every_point() {
        let pts = [
            Vector3::new(-1.0, 2.0, 0.0),
            Vector3::new(3.0, -2.0, 5.0),
        ];
        let bb = BoundingBox::from_points(&pts);
        for p in &pts {
            assert!(bb.contains_point(*p));
        }
    }

    #[test]
    fn disjoint_boxes_do_not_intersect() {
        let a = BoundingBox::new(Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0));
        let b = BoundingBox::new(Vector3::new(2.0, 2.0, 2.0), Vector3::new(3.0, 3.0, 3.0));
        assert!(!a.intersects_box(&b));
    }

    #[test]
    fn sphere_touching_box_intersects() {
        let bb = BoundingBox::new(Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0));
        let sphere = BoundingSphere::new(Vector3::new(2.0, 0.5, 0.5), 1.0);
        assert!(bb.intersects_sphere(&sphere));
    }
}
