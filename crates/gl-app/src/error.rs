//! Error types for the gl-app layer.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] gl_config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] gl_config::ValidationError),

    #[error("Experiment setup failed: {0}")]
    Experiment(#[from] gl_experiment::ExperimentError),

    #[error("Piston setup failed: {0}")]
    Control(#[from] gl_controls::ControlError),

    #[error("Hardware error: {0}")]
    Hardware(#[from] gl_hardware::HardwareError),

    #[error("Failed to read script file: {path}")]
    ScriptRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid script: {0}")]
    Script(#[from] serde_yaml::Error),
}

pub type AppResult<T> = Result<T, AppError>;
