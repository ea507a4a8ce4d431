//! gl-core: stable foundation for gaslab.
//!
//! Contains:
//! - units (uom SI types, display-unit conversions, gas constant)
//! - numeric (Real + tolerances + float helpers)
//! - process (the experiment process type shared by every layer)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod process;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{GlError, GlResult};
pub use numeric::*;
pub use process::ProcessType;
pub use units::*;
