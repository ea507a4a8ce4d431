//! Per-tick consumption of hardware press readings.

use crate::error::{HardwareError, HardwareResult};
use crate::protocol::parse_press_line;
use crate::slot::LatestSlot;
use gl_controls::{ControlMode, Piston};
use gl_core::{ProcessType, lerp};
use gl_experiment::InputWarning;
use std::sync::Arc;

/// Below this distance the piston is considered on target.
const MOTION_DEADBAND: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardwareSettings {
    /// Readings above this count as a press.
    pub press_threshold: f64,
    /// Smoothing rate toward the press target (per second).
    pub move_speed: f64,
    /// How long a raised warning suppresses the same warning [s].
    pub warning_hold: f64,
}

impl Default for HardwareSettings {
    fn default() -> Self {
        Self {
            press_threshold: 0.01,
            move_speed: 15.0,
            warning_hold: 2.0,
        }
    }
}

impl HardwareSettings {
    pub fn validate(&self) -> HardwareResult<()> {
        if !self.press_threshold.is_finite() {
            return Err(HardwareError::InvalidConfig {
                what: "press threshold must be finite".into(),
            });
        }
        if !(self.move_speed > 0.0 && self.move_speed.is_finite()) {
            return Err(HardwareError::InvalidConfig {
                what: "move speed must be positive".into(),
            });
        }
        if !(self.warning_hold >= 0.0 && self.warning_hold.is_finite()) {
            return Err(HardwareError::InvalidConfig {
                what: "warning hold must be non-negative".into(),
            });
        }
        Ok(())
    }
}

/// Debounces warning cues: while a warning is still "playing", raising the
/// same warning again is suppressed. A different warning interrupts it.
#[derive(Debug, Clone, PartialEq)]
pub struct WarningGate {
    hold: f64,
    playing: Option<(InputWarning, f64)>,
}

impl WarningGate {
    pub fn new(hold: f64) -> Self {
        Self {
            hold,
            playing: None,
        }
    }

    pub fn playing(&self) -> Option<InputWarning> {
        self.playing.map(|(w, _)| w)
    }

    /// Returns true when the warning should be emitted.
    pub fn raise(&mut self, warning: InputWarning) -> bool {
        if self.playing() == Some(warning) {
            return false;
        }
        self.playing = (self.hold > 0.0).then_some((warning, self.hold));
        true
    }

    pub fn tick(&mut self, dt: f64) {
        if let Some((_, remaining)) = self.playing.as_mut() {
            *remaining -= dt.max(0.0);
            if *remaining <= 0.0 {
                self.playing = None;
            }
        }
    }
}

/// Turns the newest press reading into piston motion.
#[derive(Debug)]
pub struct HardwareInput {
    settings: HardwareSettings,
    slot: Arc<LatestSlot<String>>,
    target_local_y: f64,
    last_press: Option<f64>,
    gate: WarningGate,
}

impl HardwareInput {
    /// # Errors
    ///
    /// Returns error if the settings are invalid.
    pub fn new(
        settings: HardwareSettings,
        slot: Arc<LatestSlot<String>>,
        piston: &Piston,
    ) -> HardwareResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            slot,
            target_local_y: piston.local_y(),
            last_press: None,
            gate: WarningGate::new(settings.warning_hold),
        })
    }

    pub fn settings(&self) -> &HardwareSettings {
        &self.settings
    }

    /// The slot the reader thread writes into.
    pub fn slot(&self) -> &Arc<LatestSlot<String>> {
        &self.slot
    }

    pub fn target_local_y(&self) -> f64 {
        self.target_local_y
    }

    /// Most recent well-formed reading.
    pub fn last_press(&self) -> Option<f64> {
        self.last_press
    }

    /// Consume the newest reading and move the piston for one tick.
    ///
    /// The piston only follows presses while the hardware channel is the
    /// selected control mode. Returns a warning cue when a press arrived under
    /// a process that does not accept hardware input and the same cue is not
    /// already playing.
    pub fn tick(
        &mut self,
        piston: &mut Piston,
        process: ProcessType,
        dt: f64,
    ) -> Option<InputWarning> {
        self.gate.tick(dt);
        let allowed = process.permits_hardware_input();
        let selected = piston.control_mode() == ControlMode::ExternalHardware;
        let mut warning = None;

        if let Some(line) = self.slot.take() {
            match parse_press_line(&line) {
                Some(press) => {
                    self.last_press = Some(press);
                    if press > self.settings.press_threshold {
                        if allowed && selected {
                            // full press drives the piston to the bottom of its travel
                            self.target_local_y =
                                lerp(piston.max_local_y(), piston.min_local_y(), press);
                        } else if !allowed {
                            if let Some(w) = InputWarning::for_process(process) {
                                if self.gate.raise(w) {
                                    tracing::warn!(?w, %process, "hardware press refused");
                                    warning = Some(w);
                                }
                            }
                        }
                    }
                }
                None => tracing::trace!(line = line.trim_end(), "dropping malformed record"),
            }
        }

        if !(allowed && selected) {
            self.target_local_y = piston.actual_local_y();
            return warning;
        }

        let current = piston.actual_local_y();
        if (current - self.target_local_y).abs() > MOTION_DEADBAND {
            let next = lerp(current, self.target_local_y, dt * self.settings.move_speed);
            if !piston.set_local_position(next, process).is_accepted() {
                tracing::debug!(next, %process, "hardware move rejected");
            }
        }
        warning
    }
}
