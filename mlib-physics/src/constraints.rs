//! Sequential-pulses (Gauss-Seidel) constraint solver and the `ContactInfo`
//! hierarchy from spec 3/4.D, grounded on `Constraints.hpp`:
//! `PlaneEqualityConstraint`/`PlaneInequalityConstraint` (kept distinct per
//! the Open Question in spec 9 rather than unified), `BoundedConstraint1D`'s
//! clamped accumulated impulse, and `solve_contacts`'s fixed-iteration
//! Gauss-Seidel loop.
//!
//! Bodies are referenced by index into the caller's rigid-body slice rather
//! than by `&mut` reference, so one contact list can be solved against a
//! `&mut [RigidBodyIntegrator]` without fighting the borrow checker over
//! two-body constraints; an immovable body (mass = +inf) zeroes out its own
//! `effective_mass` contribution, so "NormalContact (one or two bodies)"
//! from spec 3 falls out of the same code path rather than needing two
//! concrete types the way the original's `NormalContactInfo1`/`2` do.

use crate::rigid_body::{RigidBodyIntegrator, VectorAtPosition};
use nalgebra::Vector3;

/// Distinguishes the two Baumgarte bias flavors the original keeps
/// separate (`beta=0.5` always-active vs `beta=0.02` slop-gated) per spec
/// 9's Open Question - not unified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BiasKind {
    /// `PlaneEqualityConstraint`: always active, `beta` applied to the raw
    /// constraint value with no slop.
    Equality { beta: f32 },
    /// `PlaneInequalityConstraint`: active only while penetrating, `beta`
    /// applied to `max(0, overlap - slop)`.
    Inequality { beta: f32, slop: f32 },
}

impl BiasKind {
    fn bias(&self, overlap: f32) -> f32 {
        match *self {
            BiasKind::Equality { beta } => beta * overlap,
            BiasKind::Inequality { beta, slop } => beta * (overlap - slop).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ContactKind {
    Normal,
    /// Coulomb-cone friction: accumulated impulse clamped to `±mu *
    /// |lambda_normal|` of the contact referenced by `normal_ref`.
    Friction { normal_ref: usize, mu: f32 },
    /// Composes friction with an engine-power target velocity along the
    /// tangent (spec 3 "TireContact"), clamped to the same `mu`-scaled
    /// stiction cone as plain friction.
    Tire {
        normal_ref: usize,
        target_speed: f32,
        mu: f32,
    },
}

/// One constraint row: direction to push along, the two bodies it couples
/// (`body_b = None` for a contact against untracked static geometry),
/// accumulated impulse bounds, and the Baumgarte bias term.
#[derive(Debug, Clone)]
pub struct ContactInfo {
    pub body_a: usize,
    pub body_b: Option<usize>,
    pub point: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub overlap_or_target: f32,
    pub bias_kind: BiasKind,
    pub lambda_total: f32,
    pub lambda_min: f32,
    pub lambda_max: f32,
    pub kind: ContactKind,
}

impl ContactInfo {
    pub fn normal(
        body_a: usize,
        body_b: Option<usize>,
        point: Vector3<f32>,
        normal: Vector3<f32>,
        overlap: f32,
        bias_kind: BiasKind,
        lambda_min: f32,
    ) -> Self {
        Self {
            body_a,
            body_b,
            point,
            direction: normal,
            overlap_or_target: overlap,
            bias_kind,
            lambda_total: 0.0,
            lambda_min,
            lambda_max: f32::INFINITY,
            kind: ContactKind::Normal,
        }
    }

    pub fn friction(
        body_a: usize,
        body_b: Option<usize>,
        point: Vector3<f32>,
        tangent: Vector3<f32>,
        normal_ref: usize,
        mu: f32,
    ) -> Self {
        Self {
            body_a,
            body_b,
            point,
            direction: tangent,
            overlap_or_target: 0.0,
            bias_kind: BiasKind::Equality { beta: 0.0 },
            lambda_total: 0.0,
            lambda_min: 0.0,
            lambda_max: 0.0,
            kind: ContactKind::Friction { normal_ref, mu },
        }
    }

    pub fn tire(
        body_a: usize,
        body_b: Option<usize>,
        point: Vector3<f32>,
        tangent: Vector3<f32>,
        normal_ref: usize,
        target_speed: f32,
        mu: f32,
    ) -> Self {
        Self {
            body_a,
            body_b,
            point,
            direction: tangent,
            overlap_or_target: 0.0,
            bias_kind: BiasKind::Equality { beta: 0.0 },
            lambda_total: 0.0,
            lambda_min: 0.0,
            lambda_max: 0.0,
            kind: ContactKind::Tire {
                normal_ref,
                target_speed,
                mu,
            },
        }
    }

    fn effective_mass(&self, bodies: &[RigidBodyIntegrator]) -> f32 {
        let vp_a = VectorAtPosition {
            vector: self.direction,
            position: self.point,
        };
        let inv_a = 1.0 / bodies[self.body_a].rbp.effective_mass(&vp_a);
        let inv_b = self.body_b.map_or(0.0, |b| {
            1.0 / bodies[b].rbp.effective_mass(&vp_a)
        });
        let denom = inv_a + inv_b;
        if denom <= 0.0 {
            f32::INFINITY
        } else {
            1.0 / denom
        }
    }

    fn relative_velocity(&self, bodies: &[RigidBodyIntegrator]) -> f32 {
        let v_a = bodies[self.body_a].rbp.velocity_at_position(self.point);
        let v_b = self
            .body_b
            .map_or(Vector3::zeros(), |b| bodies[b].rbp.velocity_at_position(self.point));
        (v_b - v_a).dot(&self.direction)
    }

    fn apply_impulse(&self, bodies: &mut [RigidBodyIntegrator], delta: f32) {
        let impulse = self.direction * delta;
        bodies[self.body_a].integrate_impulse(
            VectorAtPosition {
                vector: -impulse,
                position: self.point,
            },
            0.0,
        );
        if let Some(b) = self.body_b {
            bodies[b].integrate_impulse(
                VectorAtPosition {
                    vector: impulse,
                    position: self.point,
                },
                0.0,
            );
        }
    }

    /// One Gauss-Seidel sub-step: compute the unclamped impulse correction,
    /// clamp the running total to `[lambda_min, lambda_max]`, apply the
    /// delta. `relaxation` scales the correction (1.0 for a full step).
    fn solve(&mut self, bodies: &mut [RigidBodyIntegrator], dt: f32, relaxation: f32, normal_lambda: f32) {
        let k = self.effective_mass(bodies);
        if !k.is_finite() {
            return;
        }
        let target_v = match self.kind {
            ContactKind::Normal => -self.bias_kind.bias(self.overlap_or_target) / dt,
            ContactKind::Friction { .. } => 0.0,
            ContactKind::Tire { target_speed, .. } => target_speed,
        };
        let cdot = self.relative_velocity(bodies);
        let raw_lambda = -(cdot - target_v) * k * relaxation;

        let (lambda_min, lambda_max) = match self.kind {
            ContactKind::Normal => (self.lambda_min, self.lambda_max),
            ContactKind::Friction { mu, .. } | ContactKind::Tire { mu, .. } => {
                (-mu * normal_lambda, mu * normal_lambda)
            }
        };

        let new_total = (self.lambda_total + raw_lambda).clamp(lambda_min, lambda_max);
        let delta = new_total - self.lambda_total;
        self.lambda_total = new_total;
        self.apply_impulse(bodies, delta);
    }
}

/// Fixed-iteration Gauss-Seidel solve (spec 4.D "SEQUENTIAL_PULSES"), 10
/// iterations by default as in the original. `lambda_total` on every
/// contact persists across these iterations but the caller is expected to
/// build a fresh `Vec<ContactInfo>` each physics step (spec 4.D "State
/// machine per contact").
pub fn solve_contacts(contacts: &mut [ContactInfo], bodies: &mut [RigidBodyIntegrator], dt: f32) {
    const ITERATIONS: usize = 10;
    for _ in 0..ITERATIONS {
        for i in 0..contacts.len() {
            let normal_lambda = match contacts[i].kind {
                ContactKind::Friction { normal_ref, .. } | ContactKind::Tire { normal_ref, .. } => {
                    contacts[normal_ref].lambda_total.abs()
                }
                ContactKind::Normal => 0.0,
            };
            contacts[i].solve(bodies, dt, 1.0, normal_lambda);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rigid_body::RigidBodyPulses;
    use nalgebra::Matrix3;

    fn cube_rbi(id: u64, mass: f32, v: Vector3<f32>) -> RigidBodyIntegrator {
        let i = mass / 6.0;
        let rbp = RigidBodyPulses::new(
            mass,
            Matrix3::from_diagonal(&Vector3::new(i, i, i)),
            Vector3::zeros(),
            v,
            Vector3::zeros(),
            Matrix3::identity(),
            Vector3::zeros(),
        );
        RigidBodyIntegrator::new(id, rbp)
    }

    #[test]
    fn head_on_collision_conserves_momentum() {
        let mut bodies = vec![
            cube_rbi(1, 1.0, Vector3::new(1.0, 0.0, 0.0)),
            cube_rbi(2, 1.0, Vector3::new(-1.0, 0.0, 0.0)),
        ];
        let mut contacts = vec![ContactInfo::normal(
            0,
            Some(1),
            Vector3::zeros(),
            Vector3::new(1.0, 0.0, 0.0),
            0.01,
            BiasKind::Inequality {
                beta: 0.02,
                slop: 0.0,
            },
            0.0,
        )];
        solve_contacts(&mut contacts, &mut bodies, 1.0 / 60.0);
        let total_v = bodies[0].rbp.v + bodies[1].rbp.v;
        assert!(total_v.norm() < 1e-3);
        assert!(bodies[0].rbp.v.y.abs() < 1e-6);
        assert!(bodies[0].rbp.v.z.abs() < 1e-6);
    }

    #[test]
    fn immovable_body_in_contact_does_not_move() {
        let mut bodies = vec![
            cube_rbi(1, crate::rigid_body::IMMOVABLE_MASS, Vector3::zeros()),
            cube_rbi(2, 1.0, Vector3::new(0.0, -5.0, 0.0)),
        ];
        let mut contacts = vec![ContactInfo::normal(
            0,
            Some(1),
            Vector3::zeros(),
            Vector3::new(0.0, 1.0, 0.0),
            0.0,
            BiasKind::Inequality {
                beta: 0.02,
                slop: 0.0,
            },
            0.0,
        )];
        solve_contacts(&mut contacts, &mut bodies, 1.0 / 60.0);
        assert_eq!(bodies[0].rbp.v, Vector3::zeros());
    }
}
