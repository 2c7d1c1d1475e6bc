//! Broad-phase BVH: per-static-triangle bounding spheres grouped by
//! `static_radius`, plus per-movable mesh bounding spheres refreshed each
//! tick (spec 4.D "Broad phase"). `rayon` drives the grouped-sphere query in
//! parallel, matching the teacher's use of `rayon` for internal
//! parallel iteration (`fyrox`'s root `Cargo.toml`).

use mlib_geometry::BoundingBox;
use mlib_geometry::BoundingSphere;
use rayon::prelude::*;

/// One static triangle's bounding sphere, grouped into a cell sized by
/// `static_radius` so a query only has to scan spatially-nearby cells.
#[derive(Debug, Clone, Copy)]
pub struct StaticEntry {
    pub triangle_index: u32,
    pub sphere: BoundingSphere,
}

/// Groups static geometry into fixed-size cells (`static_radius`) and keeps
/// a refreshed bounding sphere per movable body, mirroring spec 4.D's
/// description of the BVH holding "(a) per-static-triangle bounding spheres
/// grouped by `static_radius`, and (b) per-movable mesh bounding spheres
/// refreshed each tick".
pub struct Bvh {
    cell_size: f32,
    cells: fxhash::FxHashMap<(i32, i32, i32), Vec<StaticEntry>>,
    movable_spheres: Vec<(u64, BoundingSphere)>,
}

impl Bvh {
    pub fn new(static_radius: f32) -> Self {
        Self {
            cell_size: static_radius,
            cells: Default::default(),
            movable_spheres: Vec::new(),
        }
    }

    fn cell_of(&self, center: nalgebra::Vector3<f32>) -> (i32, i32, i32) {
        let inv = 1.0 / self.cell_size;
        (
            (center.x * inv).floor() as i32,
            (center.y * inv).floor() as i32,
            (center.z * inv).floor() as i32,
        )
    }

    pub fn insert_static(&mut self, entry: StaticEntry) {
        let cell = self.cell_of(entry.sphere.center());
        self.cells.entry(cell).or_default().push(entry);
    }

    /// Replaces the refreshed movable-mesh bounding spheres for this tick.
    pub fn set_movable_spheres(&mut self, spheres: Vec<(u64, BoundingSphere)>) {
        self.movable_spheres = spheres;
    }

    /// Static triangles whose bounding sphere overlaps `query`, scanning the
    /// 3x3x3 neighborhood of cells around `query`'s center in parallel.
    pub fn query_static_overlaps(&self, query: &BoundingSphere) -> Vec<StaticEntry> {
        let center_cell = self.cell_of(query.center());
        let neighborhood: Vec<(i32, i32, i32)> = (-1..=1)
            .flat_map(|dx| {
                (-1..=1).flat_map(move |dy| (-1..=1).map(move |dz| (dx, dy, dz)))
            })
            .map(|(dx, dy, dz)| (center_cell.0 + dx, center_cell.1 + dy, center_cell.2 + dz))
            .collect();

        neighborhood
            .par_iter()
            .filter_map(|cell| self.cells.get(cell))
            .flat_map(|entries| {
                entries
                    .par_iter()
                    .filter(|e| e.sphere.intersects_sphere(query))
                    .cloned()
            })
            .collect()
    }

    /// Movable-body ids whose refreshed sphere overlaps `query`, excluding
    /// `skip`.
    pub fn query_movable_overlaps(&self, query: &BoundingSphere, skip: u64) -> Vec<u64> {
        self.movable_spheres
            .iter()
            .filter(|(id, sphere)| *id != skip && sphere.intersects_sphere(query))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn point_in_any_aabb(&self, boxes: &[BoundingBox], point: nalgebra::Vector3<f32>) -> bool {
        boxes.iter().any(|b| b.contains_point(point))
    }

    pub fn clear_static(&mut self) {
        self.cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn nearby_static_triangle_is_found() {
        let mut bvh = Bvh::new(50.0);
        bvh.insert_static(StaticEntry {
            triangle_index: 0,
            sphere: BoundingSphere::new(Vector3::new(1.0, 0.0, 0.0), 1.0),
        });
        let hits = bvh.query_static_overlaps(&BoundingSphere::new(Vector3::zeros(), 1.0));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn far_static_triangle_is_not_found() {
        let mut bvh = Bvh::new(50.0);
        bvh.insert_static(StaticEntry {
            triangle_index: 0,
            sphere: BoundingSphere::new(Vector3::new(1000.0, 0.0, 0.0), 1.0),
        });
        let hits = bvh.query_static_overlaps(&BoundingSphere::new(Vector3::zeros(), 1.0));
        assert!(hits.is_empty());
    }

    #[test]
    fn movable_query_skips_self() {
        let mut bvh = Bvh::new(50.0);
        bvh.set_movable_spheres(vec![
            (1, BoundingSphere::new(Vector3::zeros(), 1.0)),
            (2, BoundingSphere::new(Vector3::new(0.5, 0.0, 0.0), 1.0)),
        ]);
        let hits = bvh.query_movable_overlaps(&BoundingSphere::new(Vector3::zeros(), 1.0), 1);
        assert_eq!(hits, vec![2]);
    }
}
