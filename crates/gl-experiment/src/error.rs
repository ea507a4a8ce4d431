//! Experiment configuration errors.

use gl_controls::ControlError;
use gl_core::GlError;
use gl_thermo::ThermoError;
use thiserror::Error;

pub type ExperimentResult<T> = Result<T, ExperimentError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExperimentError {
    #[error("Invalid experiment configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Thermodynamics error: {0}")]
    Thermo(#[from] ThermoError),

    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    #[error("Core error: {0}")]
    Core(#[from] GlError),
}

impl ExperimentError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        Self::InvalidConfig { what: what.into() }
    }
}
