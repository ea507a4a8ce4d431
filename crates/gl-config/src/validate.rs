//! Configuration validation.
//!
//! All problems are collected so a user fixing a file sees every mistake at
//! once.

use crate::schema::{CONFIG_VERSION, LabConfig};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Inconsistent values: {what}")]
    Inconsistent { what: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("{} configuration problems: {}", .0.len(), join_problems(.0))]
    Multiple(Vec<ValidationError>),
}

fn join_problems(problems: &[ValidationError]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Every individual problem, flattening [`ValidationError::Multiple`].
    pub fn problems(&self) -> Vec<&ValidationError> {
        match self {
            Self::Multiple(all) => all.iter().collect(),
            other => vec![other],
        }
    }
}

struct Problems(Vec<ValidationError>);

impl Problems {
    fn invalid(&mut self, field: &str, value: impl ToString, reason: &str) {
        self.0.push(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        });
    }

    fn positive(&mut self, field: &str, value: f64) {
        if !(value > 0.0 && value.is_finite()) {
            self.invalid(field, value, "must be positive and finite");
        }
    }

    fn non_negative(&mut self, field: &str, value: f64) {
        if !(value >= 0.0 && value.is_finite()) {
            self.invalid(field, value, "must be non-negative and finite");
        }
    }

    fn finite(&mut self, field: &str, value: f64) {
        if !value.is_finite() {
            self.invalid(field, value, "must be finite");
        }
    }

    fn inconsistent(&mut self, what: String) {
        self.0.push(ValidationError::Inconsistent { what });
    }
}

pub fn validate_config(config: &LabConfig) -> Result<(), ValidationError> {
    let mut p = Problems(Vec::new());

    if config.version > CONFIG_VERSION {
        p.0.push(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    let g = &config.geometry;
    if !(g.radius >= 0.01 && g.radius.is_finite()) {
        p.invalid("geometry.radius", g.radius, "must be at least 0.01");
    }
    p.finite("geometry.container_bottom_y", g.container_bottom_y);
    p.finite("geometry.mount_y", g.mount_y);
    p.positive("geometry.scale_factor", g.scale_factor);

    let t = &config.travel;
    p.finite("travel.min_local_y", t.min_local_y);
    p.finite("travel.max_local_y", t.max_local_y);
    p.finite("travel.initial_local_y", t.initial_local_y);
    if t.min_local_y > t.max_local_y {
        p.inconsistent(format!(
            "travel.min_local_y {} > travel.max_local_y {}",
            t.min_local_y, t.max_local_y
        ));
    } else if t.initial_local_y < t.min_local_y || t.initial_local_y > t.max_local_y {
        p.invalid(
            "travel.initial_local_y",
            t.initial_local_y,
            "outside travel limits",
        );
    }
    p.positive("travel.max_speed", t.max_speed);
    p.non_negative("travel.jog_speed", t.jog_speed);

    let s = &config.setpoints;
    p.non_negative("setpoints.temperature_k", s.temperature_k);
    p.non_negative("setpoints.pressure_atm", s.pressure_atm);
    p.non_negative("setpoints.volume_cm3", s.volume_cm3);

    let l = &config.limits;
    p.finite("limits.min_temperature_k", l.min_temperature_k);
    p.finite("limits.max_temperature_k", l.max_temperature_k);
    if l.min_temperature_k > l.max_temperature_k {
        p.inconsistent(format!(
            "limits.min_temperature_k {} > limits.max_temperature_k {}",
            l.min_temperature_k, l.max_temperature_k
        ));
    }
    if l.min_particles > l.max_particles {
        p.inconsistent(format!(
            "limits.min_particles {} > limits.max_particles {}",
            l.min_particles, l.max_particles
        ));
    }

    p.positive("steps.temperature_k", config.steps.temperature_k);
    p.positive("steps.pressure_atm", config.steps.pressure_atm);
    if config.steps.particles_per_action == 0 {
        p.invalid("steps.particles_per_action", 0, "must be positive");
    }

    p.positive("recording.threshold", config.recording.threshold);

    let parts = &config.particles;
    let reachable = if parts.allow_pool_growth {
        l.max_particles
    } else {
        l.max_particles.min(parts.pool_size)
    };
    if parts.initial_count > reachable {
        p.inconsistent(format!(
            "particles.initial_count {} exceeds reachable maximum {}",
            parts.initial_count, reachable
        ));
    }

    let h = &config.hardware;
    if h.enabled && h.port.trim().is_empty() {
        p.invalid("hardware.port", "\"\"", "required when hardware is enabled");
    }
    if h.baud == 0 {
        p.invalid("hardware.baud", 0, "must be positive");
    }
    if h.read_timeout_ms == 0 {
        p.invalid("hardware.read_timeout_ms", 0, "must be positive");
    }
    p.finite("hardware.press_threshold", h.press_threshold);
    p.positive("hardware.move_speed", h.move_speed);
    p.non_negative("hardware.warning_hold_s", h.warning_hold_s);

    p.positive("control.tick_rate_hz", config.control.tick_rate_hz);
    if config.control.max_catch_up == 0 {
        p.invalid("control.max_catch_up", 0, "must be at least 1");
    }

    match p.0.len() {
        0 => Ok(()),
        1 => Err(p.0.remove(0)),
        _ => Err(ValidationError::Multiple(p.0)),
    }
}
