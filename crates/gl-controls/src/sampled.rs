//! Fixed-rate stepping for the control loop.
//!
//! The host calls [`TickClock::advance`] with however much wall-clock time
//! has elapsed; the clock answers with the number of whole control ticks to
//! run. Leftover time carries over to the next call.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// Tick configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickConfig {
    /// Tick period in seconds.
    pub dt: f64,
    /// Upper bound on ticks run for a single `advance` call.
    pub max_catch_up: u32,
}

impl TickConfig {
    /// Create a tick configuration.
    ///
    /// # Errors
    ///
    /// Returns error if `dt` is not positive and finite, or `max_catch_up` is 0.
    pub fn new(dt: f64, max_catch_up: u32) -> ControlResult<Self> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "tick period must be positive",
            });
        }
        if max_catch_up == 0 {
            return Err(ControlError::InvalidArg {
                what: "max_catch_up must be at least 1",
            });
        }
        Ok(Self { dt, max_catch_up })
    }

    /// Create a tick configuration from a rate in Hz.
    pub fn from_frequency(freq_hz: f64) -> ControlResult<Self> {
        if !(freq_hz > 0.0 && freq_hz.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "tick rate must be positive",
            });
        }
        Self::new(1.0 / freq_hz, 10)
    }

    pub fn frequency(&self) -> f64 {
        1.0 / self.dt
    }
}

impl Default for TickConfig {
    /// 50 Hz, at most ten ticks per call.
    fn default() -> Self {
        Self {
            dt: 0.02,
            max_catch_up: 10,
        }
    }
}

/// Fixed timestep accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct TickClock {
    config: TickConfig,
    accumulator: f64,
    ticks: u64,
}

impl TickClock {
    pub fn new(config: TickConfig) -> Self {
        Self {
            config,
            accumulator: 0.0,
            ticks: 0,
        }
    }

    pub fn config(&self) -> TickConfig {
        self.config
    }

    pub fn dt(&self) -> f64 {
        self.config.dt
    }

    /// Total ticks handed out since creation or the last reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated time covered by the ticks handed out so far.
    pub fn elapsed(&self) -> f64 {
        self.ticks as f64 * self.config.dt
    }

    /// Add `elapsed` seconds and return how many ticks are due.
    ///
    /// When more than `max_catch_up` ticks are due the surplus time is
    /// dropped rather than queued.
    pub fn advance(&mut self, elapsed: f64) -> u32 {
        if !(elapsed > 0.0 && elapsed.is_finite()) {
            return 0;
        }
        self.accumulator += elapsed;
        // tolerate accumulated rounding just below a whole tick
        let due = ((self.accumulator + 1e-12) / self.config.dt).floor();
        let due = if due >= f64::from(self.config.max_catch_up) {
            self.accumulator = 0.0;
            self.config.max_catch_up
        } else {
            self.accumulator = (self.accumulator - due * self.config.dt).max(0.0);
            due as u32
        };
        self.ticks += u64::from(due);
        due
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.ticks = 0;
    }
}
