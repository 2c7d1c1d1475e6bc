//! Turns a loaded [`Mesh`] into the collision geometry
//! [`mlib_physics::PhysicsEngine`] needs (spec 4.D): a triangle-soup
//! [`TransformedMesh`] for the narrow phase and a coarse bounding-box
//! [`ConvexMesh`] for the SAT tracker. A full convex-hull computation is out
//! of scope for this CLI glue (see DESIGN.md) - the bounding box is a
//! conservative stand-in good enough to demonstrate the pipeline end to end.

use crate::error::AppError;
use crate::obj::Mesh;
use mlib_geometry::sat::ConvexMesh;
use mlib_geometry::BoundingSphere;
use mlib_math::RigidTransform3;
use mlib_physics::narrow_phase::TransformedMesh;
use mlib_physics::{BodyGeometry, RigidBodyIntegrator, RigidBodyPulses, IMMOVABLE_MASS};
use nalgebra::{Matrix3, Vector3};

/// Builds the narrow-phase triangle soup directly from the mesh's faces.
pub fn transformed_mesh(mesh: &Mesh) -> Result<TransformedMesh, AppError> {
    let triangles: Vec<[Vector3<f32>; 3]> = mesh
        .faces
        .iter()
        .map(|face| {
            [
                mesh.positions[face.vertices[0].position as usize],
                mesh.positions[face.vertices[1].position as usize],
                mesh.positions[face.vertices[2].position as usize],
            ]
        })
        .collect();
    let points: Vec<Vector3<f32>> = triangles.iter().flatten().cloned().collect();
    let sphere = BoundingSphere::from_points(&points)?;
    Ok(TransformedMesh { triangles, sphere })
}

/// Axis-aligned bounding box of `mesh`'s vertices, expressed as a
/// [`ConvexMesh`] (8 corners, 6 outward face normals).
pub fn aabb_convex_hull(mesh: &Mesh) -> ConvexMesh {
    if mesh.positions.is_empty() {
        return ConvexMesh { vertices: vec![Vector3::zeros()], faces: Vec::new() };
    }
    let mut min = mesh.positions[0];
    let mut max = mesh.positions[0];
    for p in &mesh.positions {
        min = min.inf(p);
        max = max.sup(p);
    }
    let corner = |x: f32, y: f32, z: f32| Vector3::new(x, y, z);
    let vertices = vec![
        corner(min.x, min.y, min.z),
        corner(max.x, min.y, min.z),
        corner(max.x, max.y, min.z),
        corner(min.x, max.y, min.z),
        corner(min.x, min.y, max.z),
        corner(max.x, min.y, max.z),
        corner(max.x, max.y, max.z),
        corner(min.x, max.y, max.z),
    ];
    let faces = vec![
        (Vector3::new(1.0, 0.0, 0.0), corner(max.x, max.y, max.z)),
        (Vector3::new(-1.0, 0.0, 0.0), corner(min.x, min.y, min.z)),
        (Vector3::new(0.0, 1.0, 0.0), corner(max.x, max.y, max.z)),
        (Vector3::new(0.0, -1.0, 0.0), corner(min.x, min.y, min.z)),
        (Vector3::new(0.0, 0.0, 1.0), corner(max.x, max.y, max.z)),
        (Vector3::new(0.0, 0.0, -1.0), corner(min.x, min.y, min.z)),
    ];
    ConvexMesh { vertices, faces }
}

/// Solid-box inertia tensor from full extents, about the box's own center.
fn box_inertia(mass: f32, extents: Vector3<f32>) -> Matrix3<f32> {
    let (w, h, d) = (extents.x, extents.y, extents.z);
    let ix = mass / 12.0 * (h * h + d * d);
    let iy = mass / 12.0 * (w * w + d * d);
    let iz = mass / 12.0 * (w * w + h * h);
    Matrix3::from_diagonal(&Vector3::new(ix.max(1e-6), iy.max(1e-6), iz.max(1e-6)))
}

/// Builds a movable rigid body plus its collision geometry for a mesh placed
/// at `position` with initial `velocity` (spec 6 `.scn` body description).
pub fn body_from_mesh(
    id: u64,
    mesh: &Mesh,
    mass: f32,
    position: Vector3<f32>,
    velocity: Vector3<f32>,
) -> Result<(RigidBodyIntegrator, BodyGeometry), AppError> {
    let mut min = mesh.positions.first().cloned().unwrap_or_else(Vector3::zeros);
    let mut max = min;
    for p in &mesh.positions {
        min = min.inf(p);
        max = max.sup(p);
    }
    let extents = (max - min).map(|c| c.abs()).add_scalar(1e-3);
    let inertia = if mass.is_infinite() {
        Matrix3::identity()
    } else {
        box_inertia(mass, extents)
    };
    let rbp = RigidBodyPulses::new(
        mass,
        inertia,
        Vector3::zeros(),
        velocity,
        Vector3::zeros(),
        Matrix3::identity(),
        position,
    );
    let pose = RigidTransform3::new(Matrix3::identity(), position)?;
    let world_mesh = pose_mesh(mesh, &pose);
    let transformed = transformed_mesh(&world_mesh)?;
    let convex = aabb_convex_hull(&world_mesh);
    Ok((
        RigidBodyIntegrator::new(id, rbp),
        BodyGeometry::new(transformed, convex),
    ))
}

/// Returns a copy of `mesh` with every vertex position/normal carried
/// through `pose`, for rendering a body at its current simulated transform.
pub fn pose_mesh(mesh: &Mesh, pose: &RigidTransform3) -> Mesh {
    let mut out = mesh.clone();
    for p in &mut out.positions {
        *p = pose.transform_point(*p);
    }
    for n in &mut out.normals {
        *n = pose.transform_direction(*n);
    }
    out
}

/// Builds the immovable static collision geometry directly from a ground
/// mesh's triangles (spec 4.D "Broad phase" static triangle list).
pub fn static_triangles(mesh: &Mesh) -> Vec<[Vector3<f32>; 3]> {
    mesh.faces
        .iter()
        .map(|face| {
            [
                mesh.positions[face.vertices[0].position as usize],
                mesh.positions[face.vertices[1].position as usize],
                mesh.positions[face.vertices[2].position as usize],
            ]
        })
        .collect()
}

/// An immovable placeholder mass, re-exported for callers building static
/// scenery without going through [`mlib_physics::PhysicsEngine::set_static_geometry`].
pub const STATIC_MASS: f32 = IMMOVABLE_MASS;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::{Face, FaceVertex};

    fn unit_cube() -> Mesh {
        let v = |x: f32, y: f32, z: f32| Vector3::new(x, y, z);
        Mesh {
            positions: vec![
                v(-1.0, -1.0, -1.0),
                v(1.0, -1.0, -1.0),
                v(1.0, 1.0, -1.0),
                v(-1.0, 1.0, -1.0),
                v(-1.0, -1.0, 1.0),
                v(1.0, -1.0, 1.0),
                v(1.0, 1.0, 1.0),
                v(-1.0, 1.0, 1.0),
            ],
            normals: vec![],
            uvs: vec![],
            faces: vec![
                Face { vertices: [FaceVertex { position: 0, normal: None, uv: None }, FaceVertex { position: 1, normal: None, uv: None }, FaceVertex { position: 2, normal: None, uv: None }], material: None },
                Face { vertices: [FaceVertex { position: 4, normal: None, uv: None }, FaceVertex { position: 5, normal: None, uv: None }, FaceVertex { position: 6, normal: None, uv: None }], material: None },
            ],
            materials: vec![],
        }
    }

    #[test]
    fn aabb_hull_spans_the_mesh_extent() {
        let hull = aabb_convex_hull(&unit_cube());
        assert_eq!(hull.vertices.len(), 8);
        assert_eq!(hull.faces.len(), 6);
    }

    #[test]
    fn body_from_mesh_places_geometry_at_the_requested_position() {
        let mesh = unit_cube();
        let (body, geometry) =
            body_from_mesh(1, &mesh, 1.0, Vector3::new(0.0, 10.0, 0.0), Vector3::zeros()).unwrap();
        assert_eq!(body.rbp.position(), Vector3::new(0.0, 10.0, 0.0));
        assert!(geometry.mesh.sphere.center().y > 5.0);
    }

    #[test]
    fn box_inertia_is_positive_and_diagonal() {
        let i = box_inertia(2.0, Vector3::new(1.0, 2.0, 3.0));
        assert!(i[(0, 0)] > 0.0);
        assert_eq!(i[(0, 1)], 0.0);
    }
}
