//! gl-thermo: ideal-gas property calculations for gaslab.
//!
//! Provides:
//! - `IdealGas`, a stateless PV = nRT solver working in display units
//!   (cm^3, atm, K) with SI conversion at the boundary
//! - `GasState`, the canonical pressure/volume/temperature/particle snapshot
//!
//! # Example
//!
//! ```
//! use gl_thermo::IdealGas;
//!
//! let gas = IdealGas::new();
//! let p_atm = gas.pressure(1.0, 1000.0, 300.0);
//! assert!((p_atm - 24.6158).abs() < 1e-3);
//! ```

pub mod error;
pub mod ideal_gas;
pub mod state;

pub use error::{ThermoError, ThermoResult};
pub use ideal_gas::IdealGas;
pub use state::{GasSnapshot, GasState, PARTICLES_PER_MOLE};
