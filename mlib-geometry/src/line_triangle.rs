//! Line segment vs triangle intersection, used by the narrow-phase
//! collision pipeline (spec 4.D step 3) to find where a hitbox/tire edge
//! pierces a mesh triangle. Grounded on
//! `Handle_Line_Triangle_Intersection.cpp`'s use of a ray-triangle test
//! restricted to `t in [0, 1]`, combined with `fyrox-math`'s barycentric
//! inside-triangle test style.

use nalgebra::Vector3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineTriangleIntersection {
    pub point: Vector3<f32>,
    /// Parametric position along the segment `a + t * (b - a)`, in `[0, 1]`.
    pub t: f32,
}

/// Barycentric inside-triangle test, ported from `fyrox-math`'s
/// `is_point_inside_triangle`.
fn is_point_inside_triangle(p: Vector3<f32>, vertices: &[Vector3<f32>; 3]) -> bool {
    let ba = vertices[1] - vertices[0];
    let ca = vertices[2] - vertices[0];
    let vp = p - vertices[0];

    let ba_dot_ba = ba.dot(&ba);
    let ca_dot_ba = ca.dot(&ba);
    let ca_dot_ca = ca.dot(&ca);

    let dot02 = ca.dot(&vp);
    let dot12 = ba.dot(&vp);

    let denom = ca_dot_ca * ba_dot_ba - ca_dot_ba.powi(2);
    if denom.abs() < f32::EPSILON {
        return false;
    }
    let inv_denom = 1.0 / denom;

    let u = (ba_dot_ba * dot02 - ca_dot_ba * dot12) * inv_denom;
    let v = (ca_dot_ca * dot12 - ca_dot_ba * dot02) * inv_denom;

    (u >= 0.0) && (v >= 0.0) && (u + v < 1.0)
}

/// Parametric line/triangle intersection restricted to the segment
/// `[a, b]`. Returns `None` when the segment is parallel to the triangle's
/// plane or the intersection point falls outside either the segment or the
/// triangle.
pub fn line_intersects_triangle(
    a: Vector3<f32>,
    b: Vector3<f32>,
    triangle: &[Vector3<f32>; 3],
) -> Option<LineTriangleIntersection> {
    let edge1 = triangle[1] - triangle[0];
    let edge2 = triangle[2] - triangle[0];
    let normal = edge1.cross(&edge2);
    let normal = normal.try_normalize(f32::EPSILON)?;

    let dir = b - a;
    let denom = normal.dot(&dir);
    if denom.abs() < f32::EPSILON {
        // Segment runs parallel to the triangle's plane.
        return None;
    }

    let t = normal.dot(&(triangle[0] - a)) / denom;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    let point = a + dir * t;
    if !is_point_inside_triangle(point, triangle) {
        return None;
    }

    Some(LineTriangleIntersection { point, t })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> [Vector3<f32>; 3] {
        [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn segment_through_triangle_center_hits() {
        let tri = unit_triangle();
        let a = Vector3::new(0.2, 0.2, 1.0);
        let b = Vector3::new(0.2, 0.2, -1.0);
        let hit = line_intersects_triangle(a, b, &tri).unwrap();
        assert!((hit.point - Vector3::new(0.2, 0.2, 0.0)).norm() < 1e-5);
        assert!((hit.t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn segment_missing_triangle_misses() {
        let tri = unit_triangle();
        let a = Vector3::new(5.0, 5.0, 1.0);
        let b = Vector3::new(5.0, 5.0, -1.0);
        assert!(line_intersects_triangle(a, b, &tri).is_none());
    }

    #[test]
    fn segment_too_short_misses() {
        let tri = unit_triangle();
        let a = Vector3::new(0.2, 0.2, 1.0);
        let b = Vector3::new(0.2, 0.2, 0.5);
        assert!(line_intersects_triangle(a, b, &tri).is_none());
    }

    #[test]
    fn parallel_segment_misses() {
        let tri = unit_triangle();
        let a = Vector3::new(0.2, 0.2, 0.5);
        let b = Vector3::new(0.4, 0.4, 0.5);
        assert!(line_intersects_triangle(a, b, &tri).is_none());
    }
}
