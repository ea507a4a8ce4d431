//! Hardware link errors.
//!
//! Only setup can fail. Read errors inside the worker are logged, never
//! returned.

use thiserror::Error;

pub type HardwareResult<T> = Result<T, HardwareError>;

#[derive(Error, Debug)]
pub enum HardwareError {
    #[error("Invalid hardware configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Failed to spawn reader thread: {0}")]
    Spawn(#[from] std::io::Error),
}
