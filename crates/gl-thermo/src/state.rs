//! Canonical gas state.

use crate::IdealGas;
use gl_core::{Tolerances, nearly_equal};

/// Visual particles per mole of gas. Ten particles make one mole.
pub const PARTICLES_PER_MOLE: f64 = 10.0;

/// Pressure, volume, temperature and particle count of the enclosed gas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GasState {
    pub pressure_atm: f64,
    pub volume_cm3: f64,
    pub temperature_k: f64,
    pub particles: u32,
}

impl GasState {
    /// Amount of substance derived from the particle count.
    pub fn moles(&self) -> f64 {
        f64::from(self.particles) / PARTICLES_PER_MOLE
    }

    pub fn snapshot(&self) -> GasSnapshot {
        GasSnapshot {
            pressure_atm: self.pressure_atm,
            volume_cm3: self.volume_cm3,
            temperature_k: self.temperature_k,
        }
    }

    /// Check `P V = n R T` within `tol`.
    ///
    /// An empty container is consistent only with zero pressure.
    pub fn satisfies_ideal_gas_law(&self, gas: &IdealGas, tol: Tolerances) -> bool {
        let n = self.moles();
        if n <= 0.0 {
            return self.pressure_atm == 0.0;
        }
        let expected = gas.pressure(n, self.volume_cm3, self.temperature_k);
        nearly_equal(self.pressure_atm, expected, tol)
    }
}

/// P, V, T triple without the particle count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasSnapshot {
    pub pressure_atm: f64,
    pub volume_cm3: f64,
    pub temperature_k: f64,
}
