//! Tire state and shock-absorber spring/damper integration, per spec 3
//! "Tire" and 4.C "Tire helpers". Grounded on `Tire.hpp`/`Tire.cpp` and the
//! `ShockAbsorberConstraint` fields in `Constraints.hpp`.

use mlib_math::rodrigues;
use nalgebra::{Matrix3, Vector3};
use std::f32::consts::TAU;

/// Spring/damper pair backing a tire's vertical travel (spec 3 "shock
/// absorber state"), integrated as a critically-damped-ish 1-D oscillator:
/// `force = -Ks * x - Ka * dx/dt`.
#[derive(Debug, Clone, Copy)]
pub struct ShockAbsorberState {
    pub position: f32,
    pub velocity: f32,
    pub k_spring: f32,
    pub k_absorber: f32,
}

impl ShockAbsorberState {
    pub fn new(k_spring: f32, k_absorber: f32) -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            k_spring,
            k_absorber,
        }
    }

    /// Integrates one step given the external (ground-reaction) force
    /// `f_ext` acting against the spring, with the absorber's own effective
    /// mass `m`.
    pub fn advance_time(&mut self, dt: f32, f_ext: f32, m: f32) {
        let force = f_ext - self.k_spring * self.position - self.k_absorber * self.velocity;
        let a = force / m;
        self.velocity += a * dt;
        self.position += self.velocity * dt;
    }
}

/// Per-tire state (spec 3 "Tire"): engine name, brake force, shock
/// absorber, tracking-wheel bookkeeping and the wheel's own spin state.
#[derive(Debug, Clone)]
pub struct Tire {
    pub engine_name: String,
    pub break_force: f32,
    pub shock_absorber: ShockAbsorberState,
    /// Accumulated spin angle; wrapped to `[0, 2*pi)` in VERSION1 mode
    /// (spec 3 "Tire" invariant).
    pub angle_x: f32,
    pub angle_y: f32,
    pub angular_velocity: f32,
    pub radius: f32,
    pub position_local: Vector3<f32>,
    /// Power (W) this tire's engine is currently delivering to the ground
    /// contact; consumed by [`Self::consume_engine_power`] each tick.
    pub engine_power: f32,
    surface_energy: f32,
}

impl Tire {
    pub fn new(
        engine_name: impl Into<String>,
        radius: f32,
        position_local: Vector3<f32>,
        k_spring: f32,
        k_absorber: f32,
    ) -> Self {
        assert!(radius > 0.0, "tire radius must be > 0");
        Self {
            engine_name: engine_name.into(),
            break_force: 0.0,
            shock_absorber: ShockAbsorberState::new(k_spring, k_absorber),
            angle_x: 0.0,
            angle_y: 0.0,
            angular_velocity: 0.0,
            radius,
            position_local,
            engine_power: 0.0,
            surface_energy: 0.0,
        }
    }

    /// Integrates this tick's `engine_power` into kinetic energy along the
    /// contact tangent and returns the implied target surface speed (spec
    /// 4.C "consumed surface power per engine" / "integrates engine power
    /// against effective mass to produce a target wheel angular velocity"):
    /// `dE = P * dt`, `v_target = sign(E) * sqrt(2|E| / effective_mass)`.
    /// The stiction-cone bound itself is applied downstream, by the
    /// sequential-pulses solver clamping this contact's accumulated impulse
    /// to `mu_s * lambda_normal` (spec 4.D), not here.
    pub fn consume_engine_power(&mut self, effective_mass: f32, dt: f32) -> f32 {
        self.surface_energy += self.engine_power * dt;
        if effective_mass <= 0.0 {
            return 0.0;
        }
        self.surface_energy.signum() * (2.0 * self.surface_energy.abs() / effective_mass).sqrt()
    }

    /// Wraps `angle_x` into `[0, 2*pi)`, as VERSION1 mode requires.
    pub fn wrap_angle_x(&mut self) {
        self.angle_x = self.angle_x.rem_euclid(TAU);
    }

    pub fn advance_time(&mut self, dt: f32) {
        self.angle_x += self.angular_velocity * dt;
        self.wrap_angle_x();
    }

    /// Rotation of the wheel about its local spin axis, used to compose the
    /// absolute tire rotation (spec 4.C "tire helpers").
    pub fn spin_rotation(&self) -> Matrix3<f32> {
        rodrigues(Vector3::new(self.angle_x, 0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_wraps_into_range() {
        let mut t = Tire::new("engine", 0.3, Vector3::zeros(), 1e4, 1e3);
        t.angular_velocity = 100.0;
        for _ in 0..1000 {
            t.advance_time(0.1);
        }
        assert!(t.angle_x >= 0.0 && t.angle_x < TAU);
    }

    #[test]
    #[should_panic(expected = "radius must be > 0")]
    fn zero_radius_panics() {
        Tire::new("engine", 0.0, Vector3::zeros(), 1.0, 1.0);
    }

    #[test]
    fn consume_engine_power_matches_energy_integration() {
        let mut t = Tire::new("engine", 0.3, Vector3::zeros(), 1e4, 1e3);
        t.engine_power = 51484.9;
        let mut target = 0.0;
        for _ in 0..100 {
            target = t.consume_engine_power(1000.0, 0.1);
        }
        assert!((target - 32.089).abs() < 1e-1);
    }

    #[test]
    fn shock_absorber_settles_under_constant_load() {
        let mut sa = ShockAbsorberState::new(1e4, 5e2);
        for _ in 0..2000 {
            sa.advance_time(1.0 / 200.0, 500.0, 10.0);
        }
        // Settled displacement should be close to f/k.
        assert!((sa.position - 500.0 / 1e4).abs() < 1e-2);
    }
}
