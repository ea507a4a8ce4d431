//! Input arbitration between the piston's control channels.
//!
//! Two independent axes gate every input:
//! - the active [`ControlMode`], chosen by the user, and
//! - the `input_enabled` flag, driven by the experiment (off while the volume
//!   is locked).
//!
//! An input channel has an effect only when both agree. The gesture
//! interaction surface is tracked separately because it follows the mode
//! even when input is enabled again after a lock.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which input channel is authorized to move the piston.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// Keyboard / programmatic manual movement. Index 0.
    #[default]
    Manual,
    /// Deltas from a tracked hand or handle. Index 1.
    GestureDelta,
    /// Absolute positions from the serial device. Index 2.
    ExternalHardware,
}

impl ControlMode {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Manual),
            1 => Some(Self::GestureDelta),
            2 => Some(Self::ExternalHardware),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Manual => 0,
            Self::GestureDelta => 1,
            Self::ExternalHardware => 2,
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Manual => "manual",
            Self::GestureDelta => "gesture",
            Self::ExternalHardware => "hardware",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputArbiter {
    mode: ControlMode,
    input_enabled: bool,
    gesture_surface_active: bool,
}

impl Default for InputArbiter {
    fn default() -> Self {
        Self::new(ControlMode::default())
    }
}

impl InputArbiter {
    pub fn new(mode: ControlMode) -> Self {
        Self {
            mode,
            input_enabled: true,
            gesture_surface_active: mode == ControlMode::GestureDelta,
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Whether the gesture interaction surface currently accepts input.
    pub fn gesture_surface_active(&self) -> bool {
        self.gesture_surface_active
    }

    /// Switch the active channel.
    ///
    /// The gesture surface follows the new mode immediately, regardless of
    /// `input_enabled`.
    pub fn set_control_mode(&mut self, mode: ControlMode) {
        if mode != self.mode {
            tracing::info!(from = %self.mode, to = %mode, "control mode changed");
        }
        self.mode = mode;
        self.gesture_surface_active = mode == ControlMode::GestureDelta;
    }

    /// Switch the active channel by UI index (0 manual, 1 gesture, 2 hardware).
    ///
    /// Returns `false` and leaves the mode unchanged for unknown indices.
    pub fn set_control_mode_index(&mut self, index: usize) -> bool {
        match ControlMode::from_index(index) {
            Some(mode) => {
                self.set_control_mode(mode);
                true
            }
            None => {
                tracing::warn!(index, "ignoring invalid control mode index");
                false
            }
        }
    }

    /// Enable or disable user input as a whole.
    ///
    /// Disabling forces the gesture surface off whatever the mode; enabling
    /// restores it according to the current mode.
    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        self.gesture_surface_active = enabled && self.mode == ControlMode::GestureDelta;
    }

    /// True when `channel` is the active mode and input is enabled.
    pub fn permits(&self, channel: ControlMode) -> bool {
        self.input_enabled && self.mode == channel
    }
}
