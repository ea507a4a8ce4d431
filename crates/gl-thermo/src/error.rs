//! Thermodynamic calculation errors.

use gl_core::GlError;
use thiserror::Error;

/// Result type for thermodynamic operations.
pub type ThermoResult<T> = Result<T, ThermoError>;

/// Errors raised while configuring a calculator.
///
/// The solvers themselves never fail; invalid physical input maps to a
/// documented sentinel instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThermoError {
    /// Non-physical configuration value (zero or negative gas constant, ...).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },
}

impl From<GlError> for ThermoError {
    fn from(err: GlError) -> Self {
        let GlError::NonFinite { what, .. } = err;
        ThermoError::NonPhysical { what }
    }
}
