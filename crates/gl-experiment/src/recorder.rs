//! Significant-change filter for automatic data point recording.

use gl_thermo::GasSnapshot;

/// Default threshold for pressure [atm] and temperature [K].
pub const DEFAULT_RECORD_THRESHOLD: f64 = 0.01;

/// Volume [cm^3] uses a threshold this many times larger.
const VOLUME_THRESHOLD_FACTOR: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SignificanceFilter {
    threshold: f64,
    last: Option<GasSnapshot>,
}

impl Default for SignificanceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_RECORD_THRESHOLD)
    }
}

impl SignificanceFilter {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last: None,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Last recorded (or primed) state; `None` when unset.
    pub fn last(&self) -> Option<GasSnapshot> {
        self.last
    }

    /// True for the first sample after a clear, or when any of P, V, T moved
    /// past its threshold.
    pub fn is_significant(&self, current: &GasSnapshot) -> bool {
        let Some(last) = self.last else {
            return true;
        };
        (current.pressure_atm - last.pressure_atm).abs() > self.threshold
            || (current.volume_cm3 - last.volume_cm3).abs()
                > self.threshold * VOLUME_THRESHOLD_FACTOR
            || (current.temperature_k - last.temperature_k).abs() > self.threshold
    }

    /// Record `current` if significant. Returns whether it was recorded.
    pub fn offer(&mut self, current: GasSnapshot) -> bool {
        if self.is_significant(&current) {
            self.last = Some(current);
            true
        } else {
            false
        }
    }

    /// Set the baseline without recording, so the next sample is compared
    /// against `current`.
    pub fn prime(&mut self, current: GasSnapshot) {
        self.last = Some(current);
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(p: f64, v: f64, t: f64) -> GasSnapshot {
        GasSnapshot {
            pressure_atm: p,
            volume_cm3: v,
            temperature_k: t,
        }
    }

    #[test]
    fn first_sample_always_significant() {
        let mut f = SignificanceFilter::default();
        assert!(f.offer(snap(1.0, 1000.0, 300.0)));
        assert!(!f.offer(snap(1.0, 1000.0, 300.0)));
    }

    #[test]
    fn per_quantity_thresholds() {
        let mut f = SignificanceFilter::default();
        f.prime(snap(1.0, 1000.0, 300.0));
        assert!(!f.is_significant(&snap(1.005, 1000.0, 300.0)));
        assert!(f.is_significant(&snap(1.02, 1000.0, 300.0)));
        // volume threshold is 0.1 cm^3
        assert!(!f.is_significant(&snap(1.0, 1000.05, 300.0)));
        assert!(f.is_significant(&snap(1.0, 1000.2, 300.0)));
        assert!(f.is_significant(&snap(1.0, 1000.0, 300.02)));
    }

    #[test]
    fn clear_unsets_baseline() {
        let mut f = SignificanceFilter::default();
        f.prime(snap(1.0, 1000.0, 300.0));
        f.clear();
        assert_eq!(f.last(), None);
        assert!(f.is_significant(&snap(1.0, 1000.0, 300.0)));
    }
}
