use crate::GlError;

/// Floating point type used throughout system
pub type Real = f64;

/// Smallest difference treated as a real change between two samples.
pub const EPSILON: Real = 1e-9;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, GlError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(GlError::NonFinite { what, value: v })
    }
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
pub fn lerp(from: Real, to: Real, t: Real) -> Real {
    let t = t.clamp(0.0, 1.0);
    from + (to - from) * t
}

/// Step `current` toward `target` by at most `max_step`.
pub fn move_towards(current: Real, target: Real, max_step: Real) -> Real {
    let delta = target - current;
    if delta.abs() <= max_step {
        target
    } else {
        current + max_step.copysign(delta)
    }
}

/// True when `a` and `b` differ by more than [`EPSILON`].
pub fn changed(a: Real, b: Real) -> bool {
    (a - b).abs() > EPSILON
}
