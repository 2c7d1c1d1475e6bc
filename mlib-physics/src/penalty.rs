//! PENALTY collision resolution (spec 4.D): on intersection, push the two
//! bodies apart along the contact-plane normal with a force derived from
//! penetration depth and outward velocity, optionally feeding a tire's
//! shock absorber. Grounded on
//! `Handle_Line_Triangle_Intersection.cpp`'s `handle()` REFLECT branch.

use crate::config::PhysicsEngineConfig;
use crate::rigid_body::{RigidBodyIntegrator, VectorAtPosition};
use crate::tire::ShockAbsorberState;
use nalgebra::Vector3;

/// One penetration event ready to be resolved: the plane normal (pointing
/// from body0 toward body1), the contact point, and the penetration depth
/// along that normal.
#[derive(Debug, Clone, Copy)]
pub struct PenaltyContact {
    pub point: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub depth: f32,
    /// `Some(absorber_fed_force)` when this contact is a tire line (spec
    /// 4.D step 4) - the shock absorber consumes the normal-force on
    /// body1's side.
    pub tire_shock_absorber: Option<usize>,
}

/// Applies the PENALTY force for one contact between `body0` and `body1`
/// (index `None` on either side means "immovable world", matching spec
/// 3's `mass = +inf` short-circuit). `shock_absorbers` is indexed the same
/// way `PenaltyContact::tire_shock_absorber` refers to it.
pub fn resolve_penalty_contact(
    contact: &PenaltyContact,
    body0: &mut RigidBodyIntegrator,
    body1: &mut RigidBodyIntegrator,
    shock_absorbers: &mut [ShockAbsorberState],
    cfg: &PhysicsEngineConfig,
) {
    let dist = contact.depth.max(0.0);

    let m0 = body0.rbp.mass;
    let m1 = body1.rbp.mass;
    let (frac0, frac1) = if m0.is_infinite() {
        (0.0, 1.0)
    } else if m1.is_infinite() {
        (1.0, 0.0)
    } else {
        let f0 = m1 / (m0 + m1);
        (f0, 1.0 - f0)
    };

    // Outward velocity along the normal, sampled on body1's side as the
    // original does via a scratch-copy `advance_time`.
    let v_at = body1.rbp.velocity_at_position(contact.point);
    let outness = contact.normal.dot(&v_at);

    let fac = cfg.outness_fac_interp.eval(outness) * dist.min(0.25).powi(2);

    let force_n0 = if frac0 != 0.0 {
        Some(fac * frac0 * m0)
    } else {
        None
    };
    let force_n1 = if frac1 != 0.0 {
        let f = fac * frac1 * m1;
        if let Some(idx) = contact.tire_shock_absorber {
            if let Some(sa) = shock_absorbers.get_mut(idx) {
                sa.advance_time(cfg.dt, f, m1.min(1000.0));
            }
        }
        Some(f)
    } else {
        None
    };

    // Tangential (friction) component is left at zero here; the
    // Coulomb-cone friction/tire contacts the SEQUENTIAL_PULSES path emits
    // (see `PhysicsEngine::collide_against_static`) have no PENALTY
    // counterpart. This path's own tangential damping is
    // `integrate_force`'s `damping`/`friction` parameters (see
    // `integrate_force_with_damping`).
    if let Some(force_n0) = force_n0 {
        body0.integrate_force_with_damping(
            VectorAtPosition {
                vector: -contact.normal * force_n0,
                position: contact.point,
            },
            contact.normal,
            cfg.damping,
            cfg.friction,
        );
    }
    if let Some(force_n1) = force_n1 {
        let (damping, friction) = if contact.tire_shock_absorber.is_some() {
            (0.0, 0.0)
        } else {
            (cfg.damping, cfg.friction)
        };
        body1.integrate_force_with_damping(
            VectorAtPosition {
                vector: contact.normal * force_n1,
                position: contact.point,
            },
            contact.normal,
            damping,
            friction,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rigid_body::RigidBodyPulses;
    use nalgebra::Matrix3;

    fn body(id: u64, mass: f32) -> RigidBodyIntegrator {
        let i = if mass.is_finite() { mass / 6.0 } else { 1.0 };
        let rbp = RigidBodyPulses::new(
            mass,
            Matrix3::from_diagonal(&Vector3::new(i, i, i)),
            Vector3::zeros(),
            Vector3::zeros(),
            Vector3::zeros(),
            Matrix3::identity(),
            Vector3::new(0.0, if mass.is_infinite() { -2.0 } else { 0.0 }, 0.0),
        );
        RigidBodyIntegrator::new(id, rbp)
    }

    #[test]
    fn plane_vs_cuboid_pushes_cuboid_upward() {
        let cfg = PhysicsEngineConfig::default();
        let mut plane = body(1, crate::rigid_body::IMMOVABLE_MASS);
        let mut cuboid = body(2, 3.0);
        cuboid.rbp.v = Vector3::new(0.0, -1.0, 0.0);
        let contact = PenaltyContact {
            point: Vector3::zeros(),
            normal: Vector3::new(0.0, 1.0, 0.0),
            depth: 0.1,
            tire_shock_absorber: None,
        };
        cuboid.reset_forces();
        resolve_penalty_contact(&contact, &mut plane, &mut cuboid, &mut [], &cfg);
        cuboid.advance_time(cfg.dt, 0.0, 0.0, 0.0).unwrap();
        assert!(cuboid.rbp.v.y > -1.0);
    }
}
