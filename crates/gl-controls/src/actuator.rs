//! The piston: single-degree-of-freedom volume actuator.
//!
//! The piston keeps three positions, all in local Y:
//! - `actual`: the physical body. It only ever moves toward `target` at a
//!   bounded rate, so a physics-driven body is never teleported.
//! - `target`: where manual and programmatic commands want the body to be.
//! - `virtual`: the gesture channel's position. Hand tracking moves this one
//!   directly, independent of the physical body.
//!
//! Volume is computed once per [`Piston::tick`] from the virtual position in
//! gesture mode and from the physical position otherwise.

use crate::arbiter::{ControlMode, InputArbiter};
use crate::error::{ControlError, ControlResult};
use crate::geometry::{PistonGeometry, TravelLimits};
use gl_core::{ProcessType, changed, move_towards};
use serde::{Deserialize, Serialize};

/// Fraction of the jog speed applied while a jog key is held.
const JOG_SCALE: f64 = 0.3;

/// Motion parameters for the physical piston.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PistonMotion {
    /// Starting local Y (clamped to the travel limits).
    pub initial_local_y: f64,
    /// Maximum physical speed toward the target (local units per second).
    pub max_speed: f64,
    /// Keyboard jog speed (local units per second before scaling).
    pub jog_speed: f64,
}

impl Default for PistonMotion {
    fn default() -> Self {
        Self {
            initial_local_y: 0.45,
            max_speed: 1.0,
            jog_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JogDirection {
    Up,
    Down,
}

/// Whether a piston command passed the input guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum CommandOutcome {
    Accepted,
    Rejected,
}

impl CommandOutcome {
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

#[derive(Debug, Clone)]
pub struct Piston {
    geometry: PistonGeometry,
    limits: TravelLimits,
    motion: PistonMotion,
    arbiter: InputArbiter,
    actual_local_y: f64,
    target_local_y: f64,
    virtual_local_y: f64,
    last_calc_local_y: f64,
    volume_cm3: f64,
}

impl Piston {
    /// Create a piston resting at `motion.initial_local_y`.
    ///
    /// # Errors
    ///
    /// Returns error if the geometry, limits or motion parameters are invalid.
    pub fn new(
        geometry: PistonGeometry,
        limits: TravelLimits,
        motion: PistonMotion,
        mode: ControlMode,
    ) -> ControlResult<Self> {
        geometry.validate()?;
        let limits = TravelLimits::new(limits.min_local_y, limits.max_local_y)?;
        if !motion.initial_local_y.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "initial_local_y must be finite",
            });
        }
        if !(motion.max_speed > 0.0 && motion.max_speed.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "max_speed must be positive",
            });
        }
        if !(motion.jog_speed >= 0.0 && motion.jog_speed.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "jog_speed must be non-negative",
            });
        }

        let start = limits.clamp(motion.initial_local_y);
        let volume_cm3 = geometry.volume_at_local_y(start);
        Ok(Self {
            geometry,
            limits,
            motion,
            arbiter: InputArbiter::new(mode),
            actual_local_y: start,
            target_local_y: start,
            virtual_local_y: start,
            last_calc_local_y: start,
            volume_cm3,
        })
    }

    pub fn geometry(&self) -> &PistonGeometry {
        &self.geometry
    }

    pub fn limits(&self) -> TravelLimits {
        self.limits
    }

    pub fn arbiter(&self) -> &InputArbiter {
        &self.arbiter
    }

    pub fn control_mode(&self) -> ControlMode {
        self.arbiter.mode()
    }

    pub fn min_local_y(&self) -> f64 {
        self.limits.min_local_y
    }

    pub fn max_local_y(&self) -> f64 {
        self.limits.max_local_y
    }

    /// Local Y that drives the volume: the gesture position in gesture mode,
    /// the physical body otherwise.
    pub fn local_y(&self) -> f64 {
        match self.arbiter.mode() {
            ControlMode::GestureDelta => self.virtual_local_y,
            ControlMode::Manual | ControlMode::ExternalHardware => self.actual_local_y,
        }
    }

    /// Local Y of the physical body.
    pub fn actual_local_y(&self) -> f64 {
        self.actual_local_y
    }

    /// Local Y the physical body is moving toward.
    pub fn target_local_y(&self) -> f64 {
        self.target_local_y
    }

    /// Local Y of the gesture channel.
    pub fn virtual_local_y(&self) -> f64 {
        self.virtual_local_y
    }

    /// Volume [cm^3] as of the last tick.
    pub fn current_volume(&self) -> f64 {
        self.volume_cm3
    }

    /// Volume [cm^3] enclosed by the physical body right now.
    pub fn physical_volume(&self) -> f64 {
        self.geometry.volume_at_local_y(self.actual_local_y)
    }

    /// Switch the active input channel.
    ///
    /// Entering gesture mode starts the virtual position from the physical
    /// body; leaving it sends the body toward the last virtual position.
    pub fn set_control_mode(&mut self, mode: ControlMode) {
        let previous = self.arbiter.mode();
        self.arbiter.set_control_mode(mode);
        if previous == mode {
            return;
        }
        if mode == ControlMode::GestureDelta {
            self.virtual_local_y = self.actual_local_y;
        } else if previous == ControlMode::GestureDelta {
            self.target_local_y = self.virtual_local_y;
        }
    }

    /// See [`InputArbiter::set_control_mode_index`].
    pub fn set_control_mode_index(&mut self, index: usize) -> bool {
        match ControlMode::from_index(index) {
            Some(mode) => {
                self.set_control_mode(mode);
                true
            }
            None => self.arbiter.set_control_mode_index(index),
        }
    }

    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.arbiter.set_input_enabled(enabled);
    }

    /// Move the gesture channel by a world-space delta.
    ///
    /// Honoured only in gesture mode with input enabled.
    pub fn apply_delta(&mut self, world_delta: f64) -> CommandOutcome {
        if !self.arbiter.permits(ControlMode::GestureDelta) || !world_delta.is_finite() {
            return CommandOutcome::Rejected;
        }
        // no rotation or scale between the piston frame and the world
        self.virtual_local_y = self.limits.clamp(self.virtual_local_y + world_delta);
        CommandOutcome::Accepted
    }

    /// Set the manual movement target.
    ///
    /// Honoured only in manual mode with input enabled. The body reaches the
    /// target over subsequent ticks.
    pub fn move_manual(&mut self, target_local_y: f64) -> CommandOutcome {
        if !self.arbiter.permits(ControlMode::Manual) || !target_local_y.is_finite() {
            return CommandOutcome::Rejected;
        }
        self.target_local_y = self.limits.clamp(target_local_y);
        CommandOutcome::Accepted
    }

    /// Keyboard hold: nudge the manual target for one tick of length `dt`.
    pub fn jog(&mut self, direction: JogDirection, dt: f64) -> CommandOutcome {
        let step = self.motion.jog_speed * dt.max(0.0) * JOG_SCALE;
        let target = match direction {
            JogDirection::Up => self.actual_local_y + step,
            JogDirection::Down => self.actual_local_y - step,
        };
        self.move_manual(target)
    }

    /// Programmatic positioning used by the hardware channel and by the
    /// experiment.
    ///
    /// Isochoric and isobaric processes may position the piston whatever the
    /// control mode or input flag; otherwise only the hardware channel with
    /// input enabled may.
    pub fn set_local_position(&mut self, local_y: f64, process: ProcessType) -> CommandOutcome {
        let experiment_control = process.overrides_actuator_guard();
        if !self.arbiter.input_enabled() && !experiment_control {
            return CommandOutcome::Rejected;
        }
        if self.arbiter.mode() != ControlMode::ExternalHardware && !experiment_control {
            return CommandOutcome::Rejected;
        }
        if !local_y.is_finite() {
            return CommandOutcome::Rejected;
        }

        let clamped = self.limits.clamp(local_y);
        self.target_local_y = clamped;
        self.virtual_local_y = clamped;
        CommandOutcome::Accepted
    }

    /// Command the piston to enclose `volume_cm3`, under the same guard as
    /// [`Piston::set_local_position`].
    pub fn set_absolute_volume(&mut self, volume_cm3: f64, process: ProcessType) -> CommandOutcome {
        let target_local_y = self.geometry.local_y_for_volume(volume_cm3);
        let outcome = self.set_local_position(target_local_y, process);
        tracing::debug!(
            volume_cm3,
            target_local_y,
            accepted = outcome.is_accepted(),
            "absolute volume command"
        );
        outcome
    }

    /// Advance the piston by `dt` seconds.
    ///
    /// Returns the new volume when it changed during this tick.
    pub fn tick(&mut self, dt: f64) -> Option<f64> {
        let used = match self.arbiter.mode() {
            ControlMode::GestureDelta => self.virtual_local_y,
            ControlMode::Manual | ControlMode::ExternalHardware => {
                if changed(self.target_local_y, self.actual_local_y) {
                    let max_step = self.motion.max_speed * dt.max(0.0);
                    self.actual_local_y =
                        move_towards(self.actual_local_y, self.target_local_y, max_step);
                }
                self.actual_local_y
            }
        };

        let mut emitted = None;
        if changed(used, self.last_calc_local_y) {
            let volume = self.geometry.volume_at_local_y(used);
            if changed(volume, self.volume_cm3) {
                self.volume_cm3 = volume;
                emitted = Some(volume);
            }
        }
        self.last_calc_local_y = used;
        emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piston(mode: ControlMode) -> Piston {
        Piston::new(
            PistonGeometry::default(),
            TravelLimits::default(),
            PistonMotion::default(),
            mode,
        )
        .unwrap()
    }

    #[test]
    fn initial_volume_from_geometry() {
        let p = piston(ControlMode::Manual);
        let expected = PistonGeometry::default().volume_at_local_y(0.45);
        assert!((p.current_volume() - expected).abs() < 1e-9);
        assert_eq!(p.current_volume(), p.physical_volume());
    }

    #[test]
    fn apply_delta_ignored_outside_gesture_mode() {
        for mode in [ControlMode::Manual, ControlMode::ExternalHardware] {
            let mut p = piston(mode);
            let before = p.virtual_local_y();
            assert_eq!(p.apply_delta(-0.05), CommandOutcome::Rejected);
            assert_eq!(p.virtual_local_y(), before);
            assert_eq!(p.tick(0.02), None);
        }
    }

    #[test]
    fn apply_delta_ignored_when_input_disabled() {
        let mut p = piston(ControlMode::GestureDelta);
        p.set_input_enabled(false);
        assert_eq!(p.apply_delta(-0.05), CommandOutcome::Rejected);
    }

    #[test]
    fn apply_delta_moves_virtual_position_and_clamps() {
        let mut p = piston(ControlMode::GestureDelta);
        assert!(p.apply_delta(-0.05).is_accepted());
        assert!((p.virtual_local_y() - 0.40).abs() < 1e-12);
        // physical body is untouched
        assert_eq!(p.actual_local_y(), 0.45);

        let v = p.tick(0.02).expect("volume should change");
        assert!(v < p.physical_volume());

        assert!(p.apply_delta(-10.0).is_accepted());
        assert_eq!(p.virtual_local_y(), p.min_local_y());
    }

    #[test]
    fn move_manual_approaches_without_teleporting() {
        let mut p = piston(ControlMode::Manual);
        assert!(p.move_manual(0.35).is_accepted());
        p.tick(0.02);
        // max_speed 1.0 per second -> 0.02 per tick
        assert!((p.actual_local_y() - 0.43).abs() < 1e-12);
        for _ in 0..10 {
            p.tick(0.02);
        }
        assert_eq!(p.actual_local_y(), 0.35);
    }

    #[test]
    fn move_manual_rejected_in_other_modes() {
        let mut p = piston(ControlMode::GestureDelta);
        assert_eq!(p.move_manual(0.4), CommandOutcome::Rejected);
        let mut p = piston(ControlMode::Manual);
        p.set_input_enabled(false);
        assert_eq!(p.move_manual(0.4), CommandOutcome::Rejected);
    }

    #[test]
    fn jog_moves_target_from_actual_position() {
        let mut p = piston(ControlMode::Manual);
        assert!(p.jog(JogDirection::Down, 0.1).is_accepted());
        assert!((p.target_local_y() - (0.45 - 0.03)).abs() < 1e-12);
    }

    #[test]
    fn set_absolute_volume_guard() {
        // isochoric overrides the guard in any control mode, even disabled
        for mode in [
            ControlMode::Manual,
            ControlMode::GestureDelta,
            ControlMode::ExternalHardware,
        ] {
            let mut p = piston(mode);
            p.set_input_enabled(false);
            assert!(
                p.set_absolute_volume(8_000.0, ProcessType::Isochoric)
                    .is_accepted()
            );
        }

        let mut p = piston(ControlMode::Manual);
        assert_eq!(
            p.set_absolute_volume(8_000.0, ProcessType::None),
            CommandOutcome::Rejected
        );
        assert_eq!(
            p.set_absolute_volume(8_000.0, ProcessType::Isothermal),
            CommandOutcome::Rejected
        );

        let mut p = piston(ControlMode::ExternalHardware);
        assert!(
            p.set_absolute_volume(8_000.0, ProcessType::Isothermal)
                .is_accepted()
        );
        p.set_input_enabled(false);
        assert_eq!(
            p.set_absolute_volume(8_000.0, ProcessType::Isothermal),
            CommandOutcome::Rejected
        );
    }

    #[test]
    fn absolute_volume_is_reached_over_ticks() {
        let mut p = piston(ControlMode::ExternalHardware);
        let target = p.geometry().volume_at_local_y(0.40);
        assert!(p.set_absolute_volume(target, ProcessType::None).is_accepted());
        let first = p.tick(0.02).unwrap();
        assert!(first > target);
        for _ in 0..10 {
            p.tick(0.02);
        }
        assert!((p.current_volume() - target).abs() < 1e-6);
    }

    #[test]
    fn volume_change_emitted_once() {
        let mut p = piston(ControlMode::Manual);
        assert!(p.tick(0.02).is_none());
        assert!(p.move_manual(0.40).is_accepted());
        assert!(p.tick(0.02).is_some());
        for _ in 0..5 {
            p.tick(0.02);
        }
        assert!(p.tick(0.02).is_none());
    }

    #[test]
    fn leaving_gesture_mode_sends_body_to_virtual_position() {
        let mut p = piston(ControlMode::GestureDelta);
        assert!(p.apply_delta(-0.05).is_accepted());
        p.set_control_mode(ControlMode::Manual);
        assert!((p.target_local_y() - 0.40).abs() < 1e-12);

        p.set_control_mode(ControlMode::GestureDelta);
        assert_eq!(p.virtual_local_y(), p.actual_local_y());
    }

    #[test]
    fn invalid_motion_rejected() {
        let motion = PistonMotion {
            max_speed: 0.0,
            ..Default::default()
        };
        assert!(
            Piston::new(
                PistonGeometry::default(),
                TravelLimits::default(),
                motion,
                ControlMode::Manual
            )
            .is_err()
        );
    }
}
