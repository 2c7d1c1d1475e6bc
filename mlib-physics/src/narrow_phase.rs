//! Narrow-phase triangle<->triangle and line<->triangle collision detection
//! (spec 4.D steps 1-4), grounded on
//! `Handle_Line_Triangle_Intersection.cpp`/`Handle_Tire_Triangle_Intersection.cpp`:
//! mesh-sphere prefilter, per-triangle-pair edge intersection with shared
//! edges deduplicated by lexicographic vertex order, and the normal-line vs
//! tire-line classification.

use mlib_geometry::{line_intersects_triangle, BoundingSphere, LineTriangleIntersection};
use nalgebra::Vector3;
use std::cmp::Ordering;

/// A triangle soup with a single enclosing sphere for the mesh-level
/// prefilter (spec 4.D step 1).
#[derive(Debug, Clone)]
pub struct TransformedMesh {
    pub triangles: Vec<[Vector3<f32>; 3]>,
    pub sphere: BoundingSphere,
}

/// Identifies which edge of a hitbox an intersection came from; edges
/// carrying a tire index are "tire lines" per spec 4.D step 4, everything
/// else is a "normal line" (hitbox line).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Normal,
    Tire(usize),
}

#[derive(Debug, Clone, Copy)]
pub struct RawContact {
    pub intersection: LineTriangleIntersection,
    pub triangle0: usize,
    pub triangle1: usize,
    pub line_kind: LineKind,
}

fn lexicographic_key(v: &Vector3<f32>) -> (i64, i64, i64) {
    // Quantize so float noise doesn't break a total order; adequate for
    // dedup purposes since we only need a stable ordering, not exact
    // equality.
    let q = |f: f32| (f * 1_000_000.0).round() as i64;
    (q(v.x), q(v.y), q(v.z))
}

fn edge_key(a: Vector3<f32>, b: Vector3<f32>) -> ((i64, i64, i64), (i64, i64, i64)) {
    let (ka, kb) = (lexicographic_key(&a), lexicographic_key(&b));
    if ka <= kb {
        (ka, kb)
    } else {
        (kb, ka)
    }
}

/// Per-triangle edges, ordered canonically so a shared edge between two
/// adjacent triangles of the same mesh is only tested once.
fn ordered_edges(triangle: &[Vector3<f32>; 3]) -> [(Vector3<f32>, Vector3<f32>); 3] {
    let raw = [
        (triangle[0], triangle[1]),
        (triangle[1], triangle[2]),
        (triangle[2], triangle[0]),
    ];
    let mut out = raw;
    for edge in out.iter_mut() {
        if edge_key(edge.0, edge.1).0 != lexicographic_key(&edge.0) {
            std::mem::swap(&mut edge.0, &mut edge.1);
        }
    }
    out
}

/// Runs the mesh-sphere prefilter then, for each triangle pair that
/// survives it, tests `mesh1`'s (deduplicated) edges against `mesh0`'s
/// triangles. `tire_for_edge` classifies an edge of `mesh1` as a tire line
/// (spec 4.D step 4); pass a closure returning `LineKind::Normal` when
/// `mesh1` carries no tires.
pub fn find_contacts(
    mesh0: &TransformedMesh,
    mesh1: &TransformedMesh,
    tire_for_edge: impl Fn(usize, usize) -> LineKind,
) -> Vec<RawContact> {
    let mut contacts = Vec::new();
    if !mesh0.sphere.intersects_sphere(&mesh1.sphere) {
        return contacts;
    }

    let mut seen_edges = std::collections::HashSet::new();

    for (t1_idx, t1) in mesh1.triangles.iter().enumerate() {
        let edges = ordered_edges(t1);
        for (edge_idx, (a, b)) in edges.iter().enumerate() {
            let key = edge_key(*a, *b);
            if !seen_edges.insert(key) {
                continue;
            }
            for (t0_idx, t0) in mesh0.triangles.iter().enumerate() {
                if let Some(intersection) = line_intersects_triangle(*a, *b, t0) {
                    contacts.push(RawContact {
                        intersection,
                        triangle0: t0_idx,
                        triangle1: t1_idx,
                        line_kind: tire_for_edge(t1_idx, edge_idx),
                    });
                }
            }
        }
    }
    contacts
}

/// Total ordering helper used by callers that want deterministic contact
/// ordering within one tick (spec 5 "Ordering guarantees").
pub fn sort_deterministic(contacts: &mut [RawContact]) {
    contacts.sort_by(|a, b| {
        a.triangle1
            .cmp(&b.triangle1)
            .then(a.triangle0.cmp(&b.triangle0))
            .then(
                a.intersection
                    .t
                    .partial_cmp(&b.intersection.t)
                    .unwrap_or(Ordering::Equal),
            )
    });
}
