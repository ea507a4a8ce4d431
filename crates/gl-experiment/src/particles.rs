//! Particle count bookkeeping.
//!
//! The visual molecules themselves live outside this crate. The reservoir
//! only tracks how many are active and enforces the count limits.

use crate::error::{ExperimentError, ExperimentResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    pub initial_count: u32,
    pub min_count: u32,
    pub max_count: u32,
    /// Particles added or removed by one add/remove request.
    pub per_action: u32,
    /// Pre-allocated visual particles.
    pub pool_size: u32,
    /// When false the pool size also caps the count.
    pub allow_pool_growth: bool,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            initial_count: 10,
            min_count: 0,
            max_count: 30,
            per_action: 5,
            pool_size: 30,
            allow_pool_growth: true,
        }
    }
}

impl ParticleConfig {
    pub fn validate(&self) -> ExperimentResult<()> {
        if self.min_count > self.max_count {
            return Err(ExperimentError::config(format!(
                "particle limits inverted: {} > {}",
                self.min_count, self.max_count
            )));
        }
        if self.per_action == 0 {
            return Err(ExperimentError::config("particles per action must be positive"));
        }
        if self.initial_count > self.effective_max() {
            return Err(ExperimentError::config(format!(
                "initial particle count {} exceeds maximum {}",
                self.initial_count,
                self.effective_max()
            )));
        }
        Ok(())
    }

    /// Highest reachable count.
    pub fn effective_max(&self) -> u32 {
        if self.allow_pool_growth {
            self.max_count
        } else {
            self.max_count.min(self.pool_size)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParticleReservoir {
    config: ParticleConfig,
    count: u32,
}

impl ParticleReservoir {
    pub fn new(config: ParticleConfig) -> ExperimentResult<Self> {
        config.validate()?;
        Ok(Self { config, count: 0 })
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn per_action(&self) -> u32 {
        self.config.per_action
    }

    /// Add up to `n` particles. Returns the new count when it changed.
    pub fn add(&mut self, n: u32) -> Option<u32> {
        let max = self.config.effective_max();
        if n == 0 || self.count >= max {
            return None;
        }
        let next = self.count.saturating_add(n).min(max);
        self.set(next)
    }

    /// Remove up to `n` particles. Returns the new count when it changed.
    pub fn remove(&mut self, n: u32) -> Option<u32> {
        if n == 0 || self.count <= self.config.min_count {
            return None;
        }
        let next = self.count.saturating_sub(n).max(self.config.min_count);
        self.set(next)
    }

    /// Remove every particle regardless of the lower limit.
    pub fn clear(&mut self) -> Option<u32> {
        self.set(0)
    }

    /// Clear and repopulate with the initial count.
    pub fn repopulate(&mut self) -> u32 {
        self.count = 0;
        let _ = self.add(self.config.initial_count);
        self.count
    }

    fn set(&mut self, next: u32) -> Option<u32> {
        if next == self.count {
            return None;
        }
        self.count = next;
        Some(next)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn count_stays_within_configured_range(
            actions in prop::collection::vec((any::<bool>(), 0_u32..50), 0..64),
            allow_pool_growth in any::<bool>(),
        ) {
            let config = ParticleConfig {
                max_count: 40,
                pool_size: 25,
                allow_pool_growth,
                ..ParticleConfig::default()
            };
            let mut r = ParticleReservoir::new(config).unwrap();
            r.repopulate();
            for (add, n) in actions {
                let changed = if add { r.add(n) } else { r.remove(n) };
                if let Some(count) = changed {
                    prop_assert_eq!(count, r.count());
                }
                prop_assert!(r.count() >= config.min_count);
                prop_assert!(r.count() <= config.effective_max());
            }
        }
    }
}
