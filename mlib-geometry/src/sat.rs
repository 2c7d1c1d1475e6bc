//! Separating-axis-theorem overlap test and the per-frame memoization cache
//! described in spec 4.B "SAT tracker", grounded on `Sat_Normals.hpp`'s
//! `SatTracker::get_collision_plane`, which keys a cache of
//! `(body0, body1, mesh0, mesh1) -> (min_overlap, plane)` by the nested-map
//! structure the original builds from `shared_ptr` identity. Here the keys
//! are plain `u64` ids (assigned by the rigid-body/mesh owners) so the cache
//! doesn't need to know about `RigidBody`/`TransformedMesh` types.

use crate::Plane;
use fxhash::FxHashMap;
use nalgebra::Vector3;

/// A convex hull expressed as face normals (already outward-facing) paired
/// with one point on each face, which is all the SAT axis projection needs.
#[derive(Debug, Clone)]
pub struct ConvexMesh {
    pub vertices: Vec<Vector3<f32>>,
    /// `(normal, point_on_face)` pairs, one per candidate separating axis.
    pub faces: Vec<(Vector3<f32>, Vector3<f32>)>,
}

impl ConvexMesh {
    fn project(&self, axis: Vector3<f32>) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for v in &self.vertices {
            let d = v.dot(&axis);
            min = min.min(d);
            max = max.max(d);
        }
        (min, max)
    }
}

/// Runs SAT over the face normals of both hulls (edge-edge cross-product
/// axes are intentionally omitted - see DESIGN.md) and returns the
/// axis/overlap with the smallest positive overlap, i.e. the "best"
/// separating-turned-penetrating plane. Returns `None` if any axis
/// separates the hulls (no collision).
pub fn sat_overlap(mesh0: &ConvexMesh, mesh1: &ConvexMesh) -> Option<(f32, Plane)> {
    let mut best_overlap = f32::MAX;
    let mut best_plane = None;

    let candidate_axes = mesh0.faces.iter().chain(mesh1.faces.iter());
    for (normal, point_on_face) in candidate_axes {
        let axis = normal.try_normalize(f32::EPSILON)?;
        let (min0, max0) = mesh0.project(axis);
        let (min1, max1) = mesh1.project(axis);
        let overlap = (max0.min(max1)) - (min0.max(min1));
        if overlap < 0.0 {
            // Separating axis found: hulls do not intersect.
            return None;
        }
        if overlap < best_overlap {
            best_overlap = overlap;
            best_plane = Some(Plane {
                normal: axis,
                d: -axis.dot(point_on_face),
            });
        }
    }

    best_plane.map(|plane| (best_overlap, plane))
}

/// Memoizes [`sat_overlap`] per ordered `(body0, body1, mesh0, mesh1)` key
/// for the duration of one physics tick; [`SatTracker::clear_frame`] must be
/// called once per tick before the next round of queries.
#[derive(Debug, Default)]
pub struct SatTracker {
    cache: FxHashMap<(u64, u64, u64, u64), (f32, Plane)>,
}

impl SatTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up (or computes and caches) the collision plane for the given
    /// body/mesh identity tuple.
    pub fn get_collision_plane(
        &mut self,
        body0: u64,
        body1: u64,
        mesh0_id: u64,
        mesh1_id: u64,
        mesh0: &ConvexMesh,
        mesh1: &ConvexMesh,
    ) -> Option<(f32, Plane)> {
        let key = (body0, body1, mesh0_id, mesh1_id);
        if let Some(cached) = self.cache.get(&key) {
            return Some(*cached);
        }
        let result = sat_overlap(mesh0, mesh1)?;
        self.cache.insert(key, result);
        Some(result)
    }

    pub fn clear_frame(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube_at(center: Vector3<f32>) -> ConvexMesh {
        let half = 0.5;
        let vertices: Vec<Vector3<f32>> = (0..8)
            .map(|i| {
                center
                    + Vector3::new(
                        if i & 1 == 0 { -half } else { half },
                        if i & 2 == 0 { -half } else { half },
                        if i & 4 == 0 { -half } else { half },
                    )
            })
            .collect();
        let faces = vec![
            (Vector3::new(1.0, 0.0, 0.0), center + Vector3::new(half, 0.0, 0.0)),
            (Vector3::new(-1.0, 0.0, 0.0), center + Vector3::new(-half, 0.0, 0.0)),
            (Vector3::new(0.0, 1.0, 0.0), center + Vector3::new(0.0, half, 0.0)),
            (Vector3::new(0.0, -1.0, 0.0), center + Vector3::new(0.0, -half, 0.0)),
            (Vector3::new(0.0, 0.0, 1.0), center + Vector3::new(0.0, 0.0, half)),
            (Vector3::new(0.0, 0.0, -1.0), center + Vector3::new(0.0, 0.0, -half)),
        ];
        ConvexMesh { vertices, faces }
    }

    #[test]
    fn disjoint_cubes_report_no_overlap() {
        let a = unit_cube_at(Vector3::zeros());
        let b = unit_cube_at(Vector3::new(5.0, 0.0, 0.0));
        assert!(sat_overlap(&a, &b).is_none());
    }

    #[test]
    fn overlapping_cubes_report_nonnegative_overlap() {
        let a = unit_cube_at(Vector3::zeros());
        let b = unit_cube_at(Vector3::new(0.8, 0.0, 0.0));
        let (overlap, _plane) = sat_overlap(&a, &b).unwrap();
        assert!(overlap >= 0.0);
        assert!((overlap - 0.2).abs() < 1e-4);
    }

    #[test]
    fn tracker_memoizes_until_cleared() {
        let mut tracker = SatTracker::new();
        let a = unit_cube_at(Vector3::zeros());
        let b = unit_cube_at(Vector3::new(0.8, 0.0, 0.0));
        let first = tracker.get_collision_plane(1, 2, 10, 20, &a, &b).unwrap();
        // Mutate the input meshes conceptually by querying with different
        // geometry under the same key; the cached result must still win.
        let c = unit_cube_at(Vector3::new(100.0, 0.0, 0.0));
        let second = tracker.get_collision_plane(1, 2, 10, 20, &a, &c).unwrap();
        assert_eq!(first.0, second.0);
        tracker.clear_frame();
        assert!(tracker.get_collision_plane(1, 2, 10, 20, &a, &c).is_none());
    }
}
