//! Top-level physics loop orchestration (spec 4.D/4.H): owns the rigid
//! bodies, their collision geometry, the broad-phase BVH and SAT tracker,
//! and wires them through `collide()` / `move_rigid_bodies()` /
//! `move_advance_times()` the way the dedicated physics thread calls them
//! each iteration.

use crate::broad_phase::{Bvh, StaticEntry};
use crate::config::{MagicFormulaMode, PhysicsEngineConfig, ResolveCollisionType};
use crate::constraints::{solve_contacts, BiasKind, ContactInfo};
use crate::error::PhysicsError;
use crate::magic_formula::CombinedMagicFormula;
use crate::narrow_phase::{find_contacts, sort_deterministic, LineKind, TransformedMesh};
use crate::penalty::{resolve_penalty_contact, PenaltyContact};
use crate::rigid_body::RigidBodyIntegrator;
use crate::tire::{ShockAbsorberState, Tire};
use mlib_geometry::sat::ConvexMesh;
use mlib_geometry::{BoundingSphere, Plane, SatTracker};
use nalgebra::Vector3;

/// Per-body collision geometry: the triangle soup used by the narrow phase
/// and a convex-hull approximation used by the SAT tracker for penetration
/// depth. `tire_edges` maps `(triangle_index, edge_index)` to an index into
/// `tires`/`shock_absorbers`, classifying that edge as a tire line (spec
/// 4.D step 4).
pub struct BodyGeometry {
    pub mesh: TransformedMesh,
    pub convex: ConvexMesh,
    pub tires: Vec<Tire>,
    pub shock_absorbers: Vec<ShockAbsorberState>,
    pub tire_edges: fxhash::FxHashMap<(usize, usize), usize>,
}

impl BodyGeometry {
    pub fn new(mesh: TransformedMesh, convex: ConvexMesh) -> Self {
        Self {
            mesh,
            convex,
            tires: Vec::new(),
            shock_absorbers: Vec::new(),
            tire_edges: Default::default(),
        }
    }

    fn tire_for_edge(&self, triangle: usize, edge: usize) -> LineKind {
        match self.tire_edges.get(&(triangle, edge)) {
            Some(idx) => LineKind::Tire(*idx),
            None => LineKind::Normal,
        }
    }
}

/// An arbitrary orthonormal basis perpendicular to `normal`, used to give
/// friction/tire constraints a tangent direction to act along (spec 4.D
/// "Friction/tire").
fn tangent_basis(normal: Vector3<f32>) -> (Vector3<f32>, Vector3<f32>) {
    let helper = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let t1 = normal.cross(&helper).normalize();
    let t2 = normal.cross(&t1).normalize();
    (t1, t2)
}

fn two_mut<T>(v: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j);
    if i < j {
        let (left, right) = v.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = v.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// Owns every rigid body the simulation tracks plus its collision geometry,
/// and runs one physics tick end to end (spec 4.H).
pub struct PhysicsEngine {
    pub config: PhysicsEngineConfig,
    pub gravity: Vector3<f32>,
    bodies: Vec<RigidBodyIntegrator>,
    geometry: Vec<BodyGeometry>,
    static_triangles: Vec<[Vector3<f32>; 3]>,
    bvh: Bvh,
    sat: SatTracker,
    tire_friction_curve: CombinedMagicFormula,
}

impl PhysicsEngine {
    pub fn new(config: PhysicsEngineConfig) -> Self {
        let bvh = Bvh::new(config.static_radius);
        let tire_friction_curve = CombinedMagicFormula::new(config.magic_formula);
        Self {
            config,
            gravity: Vector3::new(0.0, -9.8, 0.0),
            bodies: Vec::new(),
            geometry: Vec::new(),
            static_triangles: Vec::new(),
            bvh,
            sat: SatTracker::new(),
            tire_friction_curve,
        }
    }

    /// Registers a movable rigid body along with its collision geometry;
    /// returns the index used to address it in every other method.
    pub fn add_body(&mut self, body: RigidBodyIntegrator, geometry: BodyGeometry) -> usize {
        self.bodies.push(body);
        self.geometry.push(geometry);
        self.bodies.len() - 1
    }

    pub fn body(&self, index: usize) -> &RigidBodyIntegrator {
        &self.bodies[index]
    }

    pub fn body_mut(&mut self, index: usize) -> &mut RigidBodyIntegrator {
        &mut self.bodies[index]
    }

    pub fn bodies(&self) -> &[RigidBodyIntegrator] {
        &self.bodies
    }

    /// Replaces the static (immovable) collision mesh, re-populating the BVH
    /// with one bounding-sphere entry per triangle (spec 4.D "Broad phase").
    pub fn set_static_geometry(&mut self, triangles: Vec<[Vector3<f32>; 3]>) {
        self.bvh.clear_static();
        for (index, tri) in triangles.iter().enumerate() {
            let sphere = BoundingSphere::from_points(tri)
                .expect("a triangle always yields a non-empty point set");
            self.bvh.insert_static(StaticEntry {
                triangle_index: index as u32,
                sphere,
            });
        }
        self.static_triangles = triangles;
    }

    fn refresh_movable_spheres(&mut self) {
        let spheres: Vec<(u64, BoundingSphere)> = self
            .bodies
            .iter()
            .zip(self.geometry.iter())
            .map(|(b, g)| (b.id, g.mesh.sphere))
            .collect();
        self.bvh.set_movable_spheres(spheres);
    }

    /// Runs broad phase + narrow phase + (SAT or direct penalty resolution)
    /// for one sub-step of length `dt` (spec 4.D). Returns the `ContactInfo`
    /// list the caller should feed into [`solve_contacts`] when
    /// `resolve_collision_type` is `SequentialPulses` - one normal contact
    /// per intersection plus a Coulomb-cone friction contact, and (on a
    /// tire edge) a tire contact whose target speed comes from
    /// [`Tire::consume_engine_power`] and whose stiction-cone bound is
    /// `stiction_coefficient` scaled by the tire friction curve's value at
    /// the tire's current slip (spec 4.D "Friction/tire"); for `Penalty` the
    /// contacts are already resolved in place and the returned vector is
    /// always empty.
    pub fn collide(&mut self, dt: f32) -> Result<Vec<ContactInfo>, PhysicsError> {
        self.sat.clear_frame();
        self.refresh_movable_spheres();

        let mut pending = Vec::new();

        for i in 0..self.bodies.len() {
            if self.bodies[i].rbp.is_immovable() {
                continue;
            }

            self.collide_against_static(i, &mut pending, dt)?;

            for j in (i + 1)..self.bodies.len() {
                if self.bodies[i].rbp.is_immovable() && self.bodies[j].rbp.is_immovable() {
                    continue;
                }
                self.collide_pair(i, j, &mut pending)?;
            }
        }

        Ok(pending)
    }

    fn collide_against_static(
        &mut self,
        movable: usize,
        pending: &mut Vec<ContactInfo>,
        dt: f32,
    ) -> Result<(), PhysicsError> {
        if self.static_triangles.is_empty() {
            return Ok(());
        }
        let hits = self
            .bvh
            .query_static_overlaps(&self.geometry[movable].mesh.sphere);
        if hits.is_empty() {
            return Ok(());
        }
        let static_tris: Vec<[Vector3<f32>; 3]> = hits
            .iter()
            .map(|e| self.static_triangles[e.triangle_index as usize])
            .collect();
        let static_points: Vec<Vector3<f32>> = static_tris.iter().flatten().cloned().collect();
        let static_mesh = TransformedMesh {
            sphere: BoundingSphere::from_points(&static_points)
                .map_err(|_| PhysicsError::OverlapInconsistency {
                    detail: "empty static-triangle prefilter result",
                })?,
            triangles: static_tris,
        };

        let movable_geometry = &self.geometry[movable];
        let mut raw = find_contacts(&static_mesh, &movable_geometry.mesh, |tri, edge| {
            movable_geometry.tire_for_edge(tri, edge)
        });
        sort_deterministic(&mut raw);

        for contact in &raw {
            let tri = static_mesh.triangles[contact.triangle0];
            let plane =
                Plane::from_triangle(tri[0], tri[1], tri[2]).map_err(PhysicsError::from)?;
            let inside_point = contact.intersection.point;
            let depth = -plane.signed_distance(&inside_point);
            if depth <= 0.0 {
                continue;
            }

            match self.config.resolve_collision_type {
                ResolveCollisionType::Penalty => {
                    let tire_idx = match contact.line_kind {
                        LineKind::Tire(idx) => Some(idx),
                        LineKind::Normal => None,
                    };
                    let penalty = PenaltyContact {
                        point: contact.intersection.point,
                        normal: plane.normal,
                        depth,
                        tire_shock_absorber: tire_idx,
                    };
                    resolve_static_penalty(
                        &penalty,
                        &mut self.bodies[movable],
                        &mut self.geometry[movable].shock_absorbers,
                        &self.config,
                    );
                }
                ResolveCollisionType::SequentialPulses => {
                    let normal_ref = pending.len();
                    pending.push(ContactInfo::normal(
                        movable,
                        None,
                        contact.intersection.point,
                        plane.normal,
                        depth,
                        BiasKind::Inequality {
                            beta: self.config.contact_beta2,
                            slop: 0.01,
                        },
                        self.config.lambda_min,
                    ));

                    let (t1, t2) = tangent_basis(plane.normal);
                    pending.push(ContactInfo::friction(
                        movable,
                        None,
                        contact.intersection.point,
                        t1,
                        normal_ref,
                        self.config.friction_coefficient,
                    ));

                    if let LineKind::Tire(idx) = contact.line_kind {
                        let effective_mass = self.bodies[movable].rbp.effective_mass(
                            &crate::rigid_body::VectorAtPosition {
                                vector: t2,
                                position: contact.intersection.point,
                            },
                        );
                        let target_speed = self.geometry[movable].tires[idx]
                            .consume_engine_power(effective_mass, dt);

                        // Longitudinal slip between the tire's present
                        // surface speed and the speed its engine power is
                        // asking for; the magic formula's curve value at
                        // that slip scales the stiction-cone bound, so a
                        // near-zero slip (already at target) yields a small
                        // mu while a large slip saturates toward
                        // `stiction_coefficient` (spec 4.D "Friction/tire").
                        let v_actual = self.bodies[movable]
                            .rbp
                            .velocity_at_position(contact.intersection.point)
                            .dot(&t2);
                        let (mu_x, _) = self
                            .tire_friction_curve
                            .eval((target_speed - v_actual, 0.0), MagicFormulaMode::Standard);
                        let mu = self.config.stiction_coefficient * mu_x.abs();

                        pending.push(ContactInfo::tire(
                            movable,
                            None,
                            contact.intersection.point,
                            t2,
                            normal_ref,
                            target_speed,
                            mu,
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn collide_pair(
        &mut self,
        i: usize,
        j: usize,
        pending: &mut Vec<ContactInfo>,
    ) -> Result<(), PhysicsError> {
        if !self.geometry[i]
            .mesh
            .sphere
            .intersects_sphere(&self.geometry[j].mesh.sphere)
        {
            return Ok(());
        }

        let overlap_plane = if self.config.sat {
            self.sat.get_collision_plane(
                self.bodies[i].id,
                self.bodies[j].id,
                self.bodies[i].id,
                self.bodies[j].id,
                &self.geometry[i].convex,
                &self.geometry[j].convex,
            )
        } else {
            None
        };
        let Some((overlap, plane)) = overlap_plane else {
            return Ok(());
        };

        let point = self.geometry[i].convex.vertices.first().cloned().unwrap_or_else(Vector3::zeros);

        match self.config.resolve_collision_type {
            ResolveCollisionType::Penalty => {
                let penalty = PenaltyContact {
                    point,
                    normal: plane.normal,
                    depth: overlap,
                    tire_shock_absorber: None,
                };
                let (a, b) = two_mut(&mut self.bodies, i, j);
                resolve_penalty_contact(&penalty, a, b, &mut [], &self.config);
            }
            ResolveCollisionType::SequentialPulses => {
                let normal_ref = pending.len();
                pending.push(ContactInfo::normal(
                    i,
                    Some(j),
                    point,
                    plane.normal,
                    overlap,
                    BiasKind::Inequality {
                        beta: self.config.contact_beta2,
                        slop: 0.01,
                    },
                    self.config.lambda_min,
                ));
                let (t1, _t2) = tangent_basis(plane.normal);
                pending.push(ContactInfo::friction(
                    i,
                    Some(j),
                    point,
                    t1,
                    normal_ref,
                    self.config.friction_coefficient,
                ));
            }
        }
        Ok(())
    }

    /// Integrates every movable body forward by `dt`, applying gravity
    /// first (spec 4.C).
    pub fn move_rigid_bodies(&mut self, dt: f32) -> Result<(), PhysicsError> {
        for body in &mut self.bodies {
            body.reset_forces();
            body.integrate_gravity(self.gravity);
            body.advance_time(
                dt,
                self.config.min_acceleration,
                self.config.min_velocity,
                self.config.min_angular_velocity,
            )?;
        }
        Ok(())
    }

    /// Advances every tire's spin angle (spec 4.H step 3).
    pub fn move_advance_times(&mut self, dt: f32) {
        for geometry in &mut self.geometry {
            for tire in &mut geometry.tires {
                tire.advance_time(dt);
            }
        }
    }

    /// Runs one full tick per spec 4.H: `oversampling` collide/solve/move
    /// sub-steps at `dt/oversampling`, then the tire spin advance.
    pub fn step(&mut self) -> Result<(), PhysicsError> {
        let sub_dt = self.config.dt / self.config.oversampling as f32;
        for _ in 0..self.config.oversampling {
            let mut contacts = self.collide(sub_dt)?;
            if self.config.resolve_collision_type == ResolveCollisionType::SequentialPulses {
                solve_contacts(&mut contacts, &mut self.bodies, sub_dt);
            }
            self.move_rigid_bodies(sub_dt)?;
        }
        self.move_advance_times(self.config.dt);
        Ok(())
    }
}

/// Resolves a penalty contact against static (untracked) geometry: only one
/// side of [`resolve_penalty_contact`]'s two-body API applies, so an
/// immovable placeholder plays body0.
fn resolve_static_penalty(
    contact: &PenaltyContact,
    movable: &mut RigidBodyIntegrator,
    shock_absorbers: &mut [ShockAbsorberState],
    cfg: &PhysicsEngineConfig,
) {
    use crate::rigid_body::{RigidBodyPulses, IMMOVABLE_MASS};
    use nalgebra::Matrix3;

    let mut placeholder = RigidBodyIntegrator::new(
        u64::MAX,
        RigidBodyPulses::new(
            IMMOVABLE_MASS,
            Matrix3::identity(),
            Vector3::zeros(),
            Vector3::zeros(),
            Vector3::zeros(),
            Matrix3::identity(),
            Vector3::zeros(),
        ),
    );
    resolve_penalty_contact(contact, &mut placeholder, movable, shock_absorbers, cfg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rigid_body::{RigidBodyPulses, IMMOVABLE_MASS};
    use mlib_geometry::BoundingSphere;
    use nalgebra::Matrix3;

    fn cube_mesh(center: Vector3<f32>, half: f32) -> (TransformedMesh, ConvexMesh) {
        let v = |dx: f32, dy: f32, dz: f32| center + Vector3::new(dx * half, dy * half, dz * half);
        let corners = [
            v(-1.0, -1.0, -1.0),
            v(1.0, -1.0, -1.0),
            v(1.0, 1.0, -1.0),
            v(-1.0, 1.0, -1.0),
            v(-1.0, -1.0, 1.0),
            v(1.0, -1.0, 1.0),
            v(1.0, 1.0, 1.0),
            v(-1.0, 1.0, 1.0),
        ];
        let triangles = vec![
            [corners[0], corners[1], corners[2]],
            [corners[0], corners[2], corners[3]],
        ];
        let sphere = BoundingSphere::new(center, half * 1.8);
        let mesh = TransformedMesh { triangles, sphere };
        let faces = vec![
            (Vector3::new(1.0, 0.0, 0.0), v(1.0, 0.0, 0.0)),
            (Vector3::new(-1.0, 0.0, 0.0), v(-1.0, 0.0, 0.0)),
            (Vector3::new(0.0, 1.0, 0.0), v(0.0, 1.0, 0.0)),
            (Vector3::new(0.0, -1.0, 0.0), v(0.0, -1.0, 0.0)),
            (Vector3::new(0.0, 0.0, 1.0), v(0.0, 0.0, 1.0)),
            (Vector3::new(0.0, 0.0, -1.0), v(0.0, 0.0, -1.0)),
        ];
        let convex = ConvexMesh {
            vertices: corners.to_vec(),
            faces,
        };
        (mesh, convex)
    }

    fn cube_body(id: u64, mass: f32, center: Vector3<f32>, v: Vector3<f32>) -> RigidBodyIntegrator {
        let i = if mass.is_finite() { mass / 6.0 } else { 1.0 };
        let rbp = RigidBodyPulses::new(
            mass,
            Matrix3::from_diagonal(&Vector3::new(i, i, i)),
            Vector3::zeros(),
            v,
            Vector3::zeros(),
            Matrix3::identity(),
            center,
        );
        RigidBodyIntegrator::new(id, rbp)
    }

    #[test]
    fn falling_cube_settles_on_floor() {
        let mut cfg = PhysicsEngineConfig::default();
        cfg.resolve_collision_type = ResolveCollisionType::Penalty;
        cfg.oversampling = 4;
        let mut engine = PhysicsEngine::new(cfg);
        engine.set_static_geometry(vec![
            [
                Vector3::new(-50.0, 0.0, -50.0),
                Vector3::new(50.0, 0.0, -50.0),
                Vector3::new(0.0, 0.0, 50.0),
            ],
            [
                Vector3::new(-50.0, 0.0, -50.0),
                Vector3::new(0.0, 0.0, 50.0),
                Vector3::new(-50.0, 0.0, 50.0),
            ],
        ]);
        let (mesh, convex) = cube_mesh(Vector3::new(0.0, 2.0, 0.0), 0.5);
        let body = cube_body(1, 1.0, Vector3::new(0.0, 2.0, 0.0), Vector3::zeros());
        let idx = engine.add_body(body, BodyGeometry::new(mesh, convex));

        for _ in 0..120 {
            engine.step().unwrap();
        }
        assert!(engine.body(idx).rbp.position().y > 0.0);
        assert!(engine.body(idx).rbp.position().y < 2.0);
    }

    #[test]
    fn two_equal_cubes_pushed_apart_conserve_total_momentum_sign() {
        let mut cfg = PhysicsEngineConfig::default();
        cfg.resolve_collision_type = ResolveCollisionType::SequentialPulses;
        cfg.oversampling = 1;
        let mut engine = PhysicsEngine::new(cfg);
        let (mesh_a, convex_a) = cube_mesh(Vector3::new(-0.6, 0.0, 0.0), 0.5);
        let (mesh_b, convex_b) = cube_mesh(Vector3::new(0.6, 0.0, 0.0), 0.5);
        let a = cube_body(1, 1.0, Vector3::new(-0.6, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let b = cube_body(2, 1.0, Vector3::new(0.6, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0));
        engine.gravity = Vector3::zeros();
        engine.add_body(a, BodyGeometry::new(mesh_a, convex_a));
        engine.add_body(b, BodyGeometry::new(mesh_b, convex_b));

        let before = engine.body(0).rbp.v + engine.body(1).rbp.v;
        engine.step().unwrap();
        let after = engine.body(0).rbp.v + engine.body(1).rbp.v;
        assert!((before - after).norm() < 1e-3);
    }

    #[test]
    fn tire_edge_emits_a_reachable_tire_contact() {
        use crate::constraints::ContactKind;

        let mut cfg = PhysicsEngineConfig::default();
        cfg.resolve_collision_type = ResolveCollisionType::SequentialPulses;
        let mut engine = PhysicsEngine::new(cfg);
        engine.set_static_geometry(vec![
            [
                Vector3::new(-50.0, 0.0, -50.0),
                Vector3::new(50.0, 0.0, -50.0),
                Vector3::new(0.0, 0.0, 50.0),
            ],
            [
                Vector3::new(-50.0, 0.0, -50.0),
                Vector3::new(0.0, 0.0, 50.0),
                Vector3::new(-50.0, 0.0, 50.0),
            ],
        ]);

        let center = Vector3::new(0.0, 0.3, 0.0);
        let (mesh, convex) = cube_mesh(center, 0.5);
        let body = cube_body(1, 1.0, center, Vector3::zeros());
        let mut geometry = BodyGeometry::new(mesh, convex);
        geometry.tires.push(Tire::new("engine", 0.3, Vector3::zeros(), 1e4, 1e3));
        geometry.tires[0].engine_power = 51484.9;
        geometry.shock_absorbers.push(ShockAbsorberState::new(1e4, 1e3));
        geometry.tire_edges.insert((0, 1), 0);
        engine.add_body(body, geometry);

        let contacts = engine.collide(0.1).unwrap();
        assert!(contacts
            .iter()
            .any(|c| matches!(c.kind, ContactKind::Tire { .. })));
        assert!(contacts
            .iter()
            .any(|c| matches!(c.kind, ContactKind::Friction { .. })));
    }

    #[test]
    fn immovable_pair_is_skipped_without_panic() {
        let cfg = PhysicsEngineConfig::default();
        let mut engine = PhysicsEngine::new(cfg);
        let (mesh_a, convex_a) = cube_mesh(Vector3::zeros(), 0.5);
        let (mesh_b, convex_b) = cube_mesh(Vector3::new(0.2, 0.0, 0.0), 0.5);
        let a = cube_body(1, IMMOVABLE_MASS, Vector3::zeros(), Vector3::zeros());
        let b = cube_body(2, IMMOVABLE_MASS, Vector3::new(0.2, 0.0, 0.0), Vector3::zeros());
        engine.add_body(a, BodyGeometry::new(mesh_a, convex_a));
        engine.add_body(b, BodyGeometry::new(mesh_b, convex_b));
        engine.step().unwrap();
    }
}
