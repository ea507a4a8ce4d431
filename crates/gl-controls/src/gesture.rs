//! Gesture delta tracking.
//!
//! A tracked handle (a hand, a controller, a drag surface) reports its world
//! Y every frame. The tracker turns consecutive samples into deltas and
//! forwards them to the piston while the gesture surface is active.

use crate::actuator::{CommandOutcome, Piston};
use gl_core::EPSILON;

#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    last_world_y: Option<f64>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last handle position observed, if any.
    pub fn last_world_y(&self) -> Option<f64> {
        self.last_world_y
    }

    /// Observe the handle at `world_y` and forward the frame delta.
    ///
    /// While the gesture surface is inactive the position is still recorded,
    /// so re-activating the surface does not produce a jump.
    pub fn observe(&mut self, piston: &mut Piston, world_y: f64) -> CommandOutcome {
        if !world_y.is_finite() {
            return CommandOutcome::Rejected;
        }
        let previous = self.last_world_y.replace(world_y);
        let Some(previous) = previous else {
            return CommandOutcome::Rejected;
        };
        if !piston.arbiter().gesture_surface_active() {
            return CommandOutcome::Rejected;
        }
        let delta = world_y - previous;
        if delta.abs() <= EPSILON {
            return CommandOutcome::Rejected;
        }
        piston.apply_delta(delta)
    }

    /// Forget the last sample, e.g. when the handle is released.
    pub fn release(&mut self) {
        self.last_world_y = None;
    }
}
