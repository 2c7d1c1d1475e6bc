//! `PhysicsEngineConfig` carries the tunable constants the rest of this
//! crate reads by reference. Defaults are taken verbatim from
//! `Physics_Engine_Config.hpp` (see SPEC_FULL.md section 2) since spec.md
//! itself does not spell them out.

use mlib_math::{Interp, OutOfRangeBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsType {
    Version1,
    TrackingSprings,
    Builtin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveCollisionType {
    Penalty,
    SequentialPulses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicFormulaMode {
    Standard,
    NoSlip,
}

/// Default magic-formula parameters from spec 4.D: `B=41, C=1.4, D=1,
/// E=-0.2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagicFormulaParams {
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
}

impl Default for MagicFormulaParams {
    fn default() -> Self {
        Self {
            b: 41.0,
            c: 1.4,
            d: 1.0,
            e: -0.2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhysicsEngineConfig {
    pub dt: f32,
    pub max_residual_time: f32,
    pub print_residual_time: bool,
    pub sat: bool,
    pub collide_only_normals: bool,
    pub min_acceleration: f32,
    pub min_velocity: f32,
    pub min_angular_velocity: f32,
    pub damping: f32,
    pub friction: f32,
    pub overlap_tolerance: f32,
    pub hand_break_velocity: f32,
    pub stiction_coefficient: f32,
    pub friction_coefficient: f32,
    pub alpha0: f32,
    pub avoid_burnout: bool,
    pub wheel_penetration_depth: f32,
    pub static_radius: f32,
    pub outness_fac_interp: Interp,
    pub physics_type: PhysicsType,
    pub resolve_collision_type: ResolveCollisionType,
    pub lambda_min: f32,
    /// Baumgarte bias for `PlaneEqualityConstraint`-style contacts.
    pub contact_beta: f32,
    /// Baumgarte bias for `PlaneInequalityConstraint`-style contacts; kept
    /// distinct from `contact_beta` per spec 9's Open Question rather than
    /// unified.
    pub contact_beta2: f32,
    pub bvh: bool,
    pub oversampling: usize,
    pub magic_formula: MagicFormulaParams,
}

impl Default for PhysicsEngineConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            max_residual_time: 0.5,
            print_residual_time: false,
            sat: true,
            collide_only_normals: false,
            min_acceleration: 2.0,
            min_velocity: 1e-1,
            min_angular_velocity: 1e-2,
            damping: 0.0,
            friction: 0.0,
            overlap_tolerance: 1.2,
            hand_break_velocity: 0.5,
            stiction_coefficient: 2.0,
            friction_coefficient: 1.6,
            alpha0: 0.1,
            avoid_burnout: true,
            wheel_penetration_depth: 0.25,
            static_radius: 200.0,
            outness_fac_interp: Interp::new(
                vec![(-0.5, 1.0), (2000.0, 0.0)],
                OutOfRangeBehavior::Clamp,
            ),
            physics_type: PhysicsType::Version1,
            resolve_collision_type: ResolveCollisionType::Penalty,
            lambda_min: -10.0,
            contact_beta: 0.5,
            contact_beta2: 0.2,
            bvh: true,
            oversampling: 20,
            magic_formula: MagicFormulaParams::default(),
        }
    }
}
