//! Pacejka-style "magic formula" tire friction curve, ported from
//! `Magic_Formula.hpp`'s `MagicFormula`/`MagicFormulaArgmax`/
//! `CombinedMagicFormula` templates.

use crate::config::{MagicFormulaMode, MagicFormulaParams};

/// `mu(s) = D * sin(C * atan(B*s - E*(B*s - atan(B*s))))` (spec 4.D).
pub fn magic_formula(x: f32, p: MagicFormulaParams) -> f32 {
    let bx = p.b * x;
    p.d * (p.c * (bx - p.e * (bx - bx.atan())).atan()).sin()
}

/// Locates the first local maximum of `magic_formula` for `x > 0` via
/// bisection on the sign of its numerical derivative - the Rust analogue of
/// `MagicFormulaArgmax`'s `find_right_boundary_of_maximum` + `newton_1d`
/// pair, without depending on the original's generic Newton solver.
fn find_argmax(p: MagicFormulaParams) -> f32 {
    let f = |x: f32| magic_formula(x, p);
    let h = 1e-3;
    let df = |x: f32| (f(x + h) - f(x - h)) / (2.0 * h);

    // Expand outward until the derivative turns negative (past the peak).
    let mut hi = 1e-2f32;
    while df(hi) > 0.0 && hi < 1e4 {
        hi *= 2.0;
    }
    let mut lo = hi / 2.0;
    // Bisection on the derivative's sign.
    for _ in 0..64 {
        let mid = 0.5 * (lo + hi);
        if df(mid) > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// A single-axis magic formula with its numerically located maximum
/// argument cached, so [`MagicFormulaMode::NoSlip`] can clamp beyond it.
#[derive(Debug, Clone, Copy)]
pub struct MagicFormulaArgmax {
    params: MagicFormulaParams,
    pub argmax: f32,
}

impl MagicFormulaArgmax {
    pub fn new(params: MagicFormulaParams) -> Self {
        Self {
            params,
            argmax: find_argmax(params),
        }
    }

    pub fn eval(&self, x: f32, mode: MagicFormulaMode) -> f32 {
        match mode {
            MagicFormulaMode::Standard => magic_formula(x, self.params),
            MagicFormulaMode::NoSlip => {
                if x.abs() >= self.argmax {
                    x.signum() * self.params.d
                } else {
                    magic_formula(x, self.params)
                }
            }
        }
    }
}

/// Two-axis (longitudinal, lateral) combined-slip formula from
/// "Brian Beckman, The Physics Of Racing Series, Part 25": each axis is
/// normalized by its own argmax, combined radially, and the result is
/// re-scaled back into each axis' units.
#[derive(Debug, Clone, Copy)]
pub struct CombinedMagicFormula {
    pub longitudinal: MagicFormulaArgmax,
    pub lateral: MagicFormulaArgmax,
}

impl CombinedMagicFormula {
    pub fn new(params: MagicFormulaParams) -> Self {
        Self {
            longitudinal: MagicFormulaArgmax::new(params),
            lateral: MagicFormulaArgmax::new(params),
        }
    }

    /// `x = (s_longitudinal, s_lateral)`. Returns `(mu_longitudinal,
    /// mu_lateral)`.
    pub fn eval(&self, x: (f32, f32), mode: MagicFormulaMode) -> (f32, f32) {
        let s = (
            x.0 / self.longitudinal.argmax,
            x.1 / self.lateral.argmax,
        );
        let p = (s.0 * s.0 + s.1 * s.1).sqrt();
        if p < f32::EPSILON {
            return (0.0, 0.0);
        }
        (
            s.0 / p * self.longitudinal.eval(p * self.longitudinal.argmax, mode),
            s.1 / p * self.lateral.eval(p * self.lateral.argmax, mode),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mu_zero_at_zero_slip() {
        let p = MagicFormulaParams::default();
        assert!(magic_formula(0.0, p).abs() < 1e-6);
    }

    #[test]
    fn mu_is_odd() {
        let p = MagicFormulaParams::default();
        for &x in &[0.01, 0.05, 0.2, 1.0, 5.0] {
            assert!((magic_formula(x, p) + magic_formula(-x, p)).abs() < 1e-4);
        }
    }

    #[test]
    fn mu_bounded_by_d() {
        let p = MagicFormulaParams::default();
        for i in 0..200 {
            let x = (i as f32 - 100.0) * 0.2;
            assert!(magic_formula(x, p).abs() <= p.d + 1e-4);
        }
    }

    #[test]
    fn combined_formula_bounded_and_aligned() {
        let combined = CombinedMagicFormula::new(MagicFormulaParams::default());
        let (mu_x, mu_y) = combined.eval((0.1, 0.05), MagicFormulaMode::Standard);
        let mag = (mu_x * mu_x + mu_y * mu_y).sqrt();
        assert!(mag <= MagicFormulaParams::default().d + 1e-3);
        // direction should be parallel to (s_x / argmax_x, s_y / argmax_y)
        let s = (
            0.1 / combined.longitudinal.argmax,
            0.05 / combined.lateral.argmax,
        );
        let cross = mu_x * s.1 - mu_y * s.0;
        assert!(cross.abs() < 1e-3);
    }

    #[test]
    fn no_slip_mode_clamps_beyond_argmax() {
        let argmax = MagicFormulaArgmax::new(MagicFormulaParams::default());
        let far = argmax.argmax * 10.0;
        assert!((argmax.eval(far, MagicFormulaMode::NoSlip) - MagicFormulaParams::default().d).abs() < 1e-5);
    }
}
