//! Rigid-body dynamics and collision resolution for the mlib engine (spec
//! Components C/D): broad-phase BVH, narrow-phase line/triangle
//! intersection, a SAT-backed penetration-depth tracker, and both
//! resolution policies (PENALTY and SEQUENTIAL_PULSES) sitting on top of a
//! semi-implicit rigid-body integrator. Grounded throughout on
//! `examples/original_source/Mlib/Physics`.

pub mod broad_phase;
pub mod config;
pub mod constraints;
pub mod engine;
pub mod error;
pub mod magic_formula;
pub mod narrow_phase;
pub mod penalty;
pub mod rigid_body;
pub mod tire;

pub use config::{
    MagicFormulaMode, MagicFormulaParams, PhysicsEngineConfig, PhysicsType, ResolveCollisionType,
};
pub use constraints::{BiasKind, ContactInfo, ContactKind, solve_contacts};
pub use engine::{BodyGeometry, PhysicsEngine};
pub use error::PhysicsError;
pub use magic_formula::{magic_formula, CombinedMagicFormula, MagicFormulaArgmax};
pub use rigid_body::{RigidBodyIntegrator, RigidBodyPulses, VectorAtPosition, IMMOVABLE_MASS};
pub use tire::{ShockAbsorberState, Tire};
