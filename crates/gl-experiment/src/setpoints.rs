//! Target setpoints and their adjustment rules.

use crate::error::{ExperimentError, ExperimentResult};
use serde::{Deserialize, Serialize};

/// The held value for each process type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSetpoints {
    pub temperature_k: f64,
    pub pressure_atm: f64,
    pub volume_cm3: f64,
}

impl Default for TargetSetpoints {
    fn default() -> Self {
        Self {
            temperature_k: 293.15,
            pressure_atm: 1.0,
            volume_cm3: 15_000.0,
        }
    }
}

impl TargetSetpoints {
    pub fn validate(&self) -> ExperimentResult<()> {
        if !(self.temperature_k.is_finite() && self.temperature_k >= 0.0) {
            return Err(ExperimentError::config(
                "default temperature must be finite and non-negative",
            ));
        }
        if !(self.pressure_atm.is_finite() && self.pressure_atm >= 0.0) {
            return Err(ExperimentError::config(
                "default pressure must be finite and non-negative",
            ));
        }
        if !(self.volume_cm3.is_finite() && self.volume_cm3 >= 0.0) {
            return Err(ExperimentError::config(
                "default volume must be finite and non-negative",
            ));
        }
        Ok(())
    }

    /// Shift the temperature setpoint, clamped to `limits` in both directions.
    pub fn adjust_temperature(&mut self, delta_k: f64, limits: &SetpointLimits) {
        if !delta_k.is_finite() {
            return;
        }
        self.temperature_k = limits.clamp_temperature(self.temperature_k + delta_k);
    }

    /// Shift the pressure setpoint; it never goes below zero.
    pub fn adjust_pressure(&mut self, delta_atm: f64) {
        if !delta_atm.is_finite() {
            return;
        }
        self.pressure_atm = (self.pressure_atm + delta_atm).max(0.0);
    }
}

/// Bounds for user adjustment of the temperature setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetpointLimits {
    pub min_temperature_k: f64,
    pub max_temperature_k: f64,
}

impl Default for SetpointLimits {
    fn default() -> Self {
        Self {
            min_temperature_k: 200.0,
            max_temperature_k: 350.0,
        }
    }
}

impl SetpointLimits {
    pub fn validate(&self) -> ExperimentResult<()> {
        if !(self.min_temperature_k.is_finite() && self.max_temperature_k.is_finite()) {
            return Err(ExperimentError::config("temperature limits must be finite"));
        }
        if self.min_temperature_k > self.max_temperature_k {
            return Err(ExperimentError::config(format!(
                "temperature limits inverted: {} > {}",
                self.min_temperature_k, self.max_temperature_k
            )));
        }
        Ok(())
    }

    pub fn clamp_temperature(&self, temperature_k: f64) -> f64 {
        temperature_k.clamp(self.min_temperature_k, self.max_temperature_k)
    }
}

/// Step sizes for one press of an adjustment control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustSteps {
    pub temperature_k: f64,
    pub pressure_atm: f64,
}

impl Default for AdjustSteps {
    fn default() -> Self {
        Self {
            temperature_k: 10.0,
            pressure_atm: 0.1,
        }
    }
}

impl AdjustSteps {
    pub fn validate(&self) -> ExperimentResult<()> {
        if !(self.temperature_k > 0.0 && self.temperature_k.is_finite()) {
            return Err(ExperimentError::config("temperature step must be positive"));
        }
        if !(self.pressure_atm > 0.0 && self.pressure_atm.is_finite()) {
            return Err(ExperimentError::config("pressure step must be positive"));
        }
        Ok(())
    }

    pub fn temperature_delta(&self, up: bool) -> f64 {
        if up { self.temperature_k } else { -self.temperature_k }
    }

    pub fn pressure_delta(&self, up: bool) -> f64 {
        if up { self.pressure_atm } else { -self.pressure_atm }
    }
}
