//! Error types for piston and control-loop configuration.

use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while configuring the actuator or control loop.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Piston geometry cannot map height to volume.
    #[error("Invalid geometry: {what}")]
    Geometry { what: &'static str },

    /// Travel limits are inconsistent.
    #[error("Invalid travel limits: min {min} > max {max}")]
    Limits { min: f64, max: f64 },
}
