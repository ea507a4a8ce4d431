//! Ideal-gas law solver.
//!
//! All three directions of `P V = n R T`, taking and returning display units
//! (cm^3, atm, K). Values are converted to SI with `uom` before solving.
//!
//! Non-physical inputs never raise: each solver returns a sentinel (`0.0` or
//! `f64::INFINITY`) as documented per method.

use crate::error::{ThermoError, ThermoResult};
use gl_core::units::constants::GAS_CONSTANT_J_PER_MOL_K;
use gl_core::units::convert::{atm_to_pa, cm3_to_m3, m3_to_cm3, pa_to_atm};

/// Guard used for "effectively zero" denominators.
const GUARD: f64 = f64::EPSILON;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdealGas {
    /// Molar gas constant R [J/(mol K)].
    r: f64,
}

impl Default for IdealGas {
    fn default() -> Self {
        Self::new()
    }
}

impl IdealGas {
    /// Calculator with R = 8.314 J/(mol K).
    pub const fn new() -> Self {
        Self {
            r: GAS_CONSTANT_J_PER_MOL_K,
        }
    }

    /// Calculator with a custom gas constant.
    ///
    /// # Errors
    ///
    /// Returns error if `r` is not finite and positive.
    pub fn with_gas_constant(r: f64) -> ThermoResult<Self> {
        let r = gl_core::ensure_finite(r, "gas constant")?;
        if r <= GUARD {
            return Err(ThermoError::NonPhysical {
                what: "gas constant must be positive",
            });
        }
        Ok(Self { r })
    }

    pub fn gas_constant(&self) -> f64 {
        self.r
    }

    /// Pressure [atm] from moles, volume [cm^3] and temperature [K].
    ///
    /// Returns `0.0` when the volume is effectively zero or when `n` or `T`
    /// are not positive.
    pub fn pressure(&self, moles: f64, volume_cm3: f64, temperature_k: f64) -> f64 {
        if volume_cm3 <= GUARD {
            return 0.0;
        }
        if moles <= 0.0 || temperature_k <= 0.0 {
            return 0.0;
        }

        let volume_m3 = cm3_to_m3(volume_cm3);
        let pressure_pa = moles * self.r * temperature_k / volume_m3;
        pa_to_atm(pressure_pa)
    }

    /// Volume [cm^3] from moles, temperature [K] and pressure [atm].
    ///
    /// Returns `f64::INFINITY` when the pressure is effectively zero, and
    /// `0.0` when `n` or `T` are not positive.
    pub fn volume(&self, moles: f64, temperature_k: f64, pressure_atm: f64) -> f64 {
        if pressure_atm <= GUARD {
            return f64::INFINITY;
        }
        if moles <= 0.0 || temperature_k <= 0.0 {
            return 0.0;
        }

        let pressure_pa = atm_to_pa(pressure_atm);
        let volume_m3 = moles * self.r * temperature_k / pressure_pa;
        m3_to_cm3(volume_m3)
    }

    /// Temperature [K] from moles, volume [cm^3] and pressure [atm].
    ///
    /// Returns `0.0` when `n` is effectively zero. Negative volume or
    /// pressure is treated as invalid input and also yields `0.0`.
    pub fn temperature(&self, moles: f64, volume_cm3: f64, pressure_atm: f64) -> f64 {
        if moles <= GUARD {
            return 0.0;
        }
        if volume_cm3 < 0.0 || pressure_atm < 0.0 {
            return 0.0;
        }

        let pressure_pa = atm_to_pa(pressure_atm);
        let volume_m3 = cm3_to_m3(volume_cm3);
        pressure_pa * volume_m3 / (moles * self.r)
    }
}
