//! Lab configuration schema.
//!
//! Every field has a default, so an empty document is a valid configuration.

use gl_controls::{ControlMode, PistonGeometry, PistonMotion, TickConfig, TravelLimits};
use gl_core::ProcessType;
use gl_experiment::{
    AdjustSteps, CoordinatorConfig, ParticleConfig, SetpointLimits, TargetSetpoints,
};
use gl_hardware::{HardwareSettings, SerialSettings};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabConfig {
    pub version: u32,
    pub name: String,
    pub geometry: GeometryDef,
    pub travel: TravelDef,
    pub setpoints: SetpointsDef,
    pub limits: LimitsDef,
    pub steps: StepsDef,
    pub recording: RecordingDef,
    pub particles: ParticlesDef,
    pub hardware: HardwareDef,
    pub control: ControlDef,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            name: "gaslab".to_string(),
            geometry: GeometryDef::default(),
            travel: TravelDef::default(),
            setpoints: SetpointsDef::default(),
            limits: LimitsDef::default(),
            steps: StepsDef::default(),
            recording: RecordingDef::default(),
            particles: ParticlesDef::default(),
            hardware: HardwareDef::default(),
            control: ControlDef::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeometryDef {
    pub radius: f64,
    pub container_bottom_y: f64,
    pub mount_y: f64,
    pub scale_factor: f64,
}

impl Default for GeometryDef {
    fn default() -> Self {
        let g = PistonGeometry::default();
        Self {
            radius: g.radius,
            container_bottom_y: g.container_bottom_y,
            mount_y: g.mount_y,
            scale_factor: g.scale_factor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TravelDef {
    pub min_local_y: f64,
    pub max_local_y: f64,
    pub initial_local_y: f64,
    /// Local units per second.
    pub max_speed: f64,
    pub jog_speed: f64,
}

impl Default for TravelDef {
    fn default() -> Self {
        let limits = TravelLimits::default();
        let motion = PistonMotion::default();
        Self {
            min_local_y: limits.min_local_y,
            max_local_y: limits.max_local_y,
            initial_local_y: motion.initial_local_y,
            max_speed: motion.max_speed,
            jog_speed: motion.jog_speed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SetpointsDef {
    pub temperature_k: f64,
    pub pressure_atm: f64,
    pub volume_cm3: f64,
}

impl Default for SetpointsDef {
    fn default() -> Self {
        let s = TargetSetpoints::default();
        Self {
            temperature_k: s.temperature_k,
            pressure_atm: s.pressure_atm,
            volume_cm3: s.volume_cm3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LimitsDef {
    pub min_temperature_k: f64,
    pub max_temperature_k: f64,
    pub min_particles: u32,
    pub max_particles: u32,
}

impl Default for LimitsDef {
    fn default() -> Self {
        let t = SetpointLimits::default();
        let p = ParticleConfig::default();
        Self {
            min_temperature_k: t.min_temperature_k,
            max_temperature_k: t.max_temperature_k,
            min_particles: p.min_count,
            max_particles: p.max_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StepsDef {
    pub temperature_k: f64,
    pub pressure_atm: f64,
    pub particles_per_action: u32,
}

impl Default for StepsDef {
    fn default() -> Self {
        let s = AdjustSteps::default();
        Self {
            temperature_k: s.temperature_k,
            pressure_atm: s.pressure_atm,
            particles_per_action: ParticleConfig::default().per_action,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecordingDef {
    /// Pressure and temperature threshold; volume uses ten times this.
    pub threshold: f64,
}

impl Default for RecordingDef {
    fn default() -> Self {
        Self {
            threshold: gl_experiment::DEFAULT_RECORD_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticlesDef {
    pub initial_count: u32,
    pub pool_size: u32,
    pub allow_pool_growth: bool,
}

impl Default for ParticlesDef {
    fn default() -> Self {
        let p = ParticleConfig::default();
        Self {
            initial_count: p.initial_count,
            pool_size: p.pool_size,
            allow_pool_growth: p.allow_pool_growth,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HardwareDef {
    pub enabled: bool,
    pub port: String,
    pub baud: u32,
    pub read_timeout_ms: u64,
    pub press_threshold: f64,
    pub move_speed: f64,
    pub warning_hold_s: f64,
    pub join_timeout_ms: u64,
}

impl Default for HardwareDef {
    fn default() -> Self {
        let serial = SerialSettings::default();
        let hw = HardwareSettings::default();
        Self {
            enabled: false,
            port: serial.port,
            baud: serial.baud,
            read_timeout_ms: serial.read_timeout.as_millis() as u64,
            press_threshold: hw.press_threshold,
            move_speed: hw.move_speed,
            warning_hold_s: hw.warning_hold,
            join_timeout_ms: serial.join_timeout.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlDef {
    pub initial_mode: ControlMode,
    pub initial_process: ProcessType,
    pub tick_rate_hz: f64,
    pub max_catch_up: u32,
}

impl Default for ControlDef {
    fn default() -> Self {
        let tick = TickConfig::default();
        Self {
            initial_mode: ControlMode::default(),
            initial_process: ProcessType::None,
            tick_rate_hz: tick.frequency(),
            max_catch_up: tick.max_catch_up,
        }
    }
}

/// Runtime views of the configuration.
impl LabConfig {
    pub fn piston_geometry(&self) -> PistonGeometry {
        PistonGeometry {
            radius: self.geometry.radius,
            container_bottom_y: self.geometry.container_bottom_y,
            mount_y: self.geometry.mount_y,
            scale_factor: self.geometry.scale_factor,
        }
    }

    pub fn travel_limits(&self) -> TravelLimits {
        TravelLimits {
            min_local_y: self.travel.min_local_y,
            max_local_y: self.travel.max_local_y,
        }
    }

    pub fn piston_motion(&self) -> PistonMotion {
        PistonMotion {
            initial_local_y: self.travel.initial_local_y,
            max_speed: self.travel.max_speed,
            jog_speed: self.travel.jog_speed,
        }
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            setpoints: TargetSetpoints {
                temperature_k: self.setpoints.temperature_k,
                pressure_atm: self.setpoints.pressure_atm,
                volume_cm3: self.setpoints.volume_cm3,
            },
            limits: SetpointLimits {
                min_temperature_k: self.limits.min_temperature_k,
                max_temperature_k: self.limits.max_temperature_k,
            },
            steps: AdjustSteps {
                temperature_k: self.steps.temperature_k,
                pressure_atm: self.steps.pressure_atm,
            },
            particles: ParticleConfig {
                initial_count: self.particles.initial_count,
                min_count: self.limits.min_particles,
                max_count: self.limits.max_particles,
                per_action: self.steps.particles_per_action,
                pool_size: self.particles.pool_size,
                allow_pool_growth: self.particles.allow_pool_growth,
            },
            record_threshold: self.recording.threshold,
            initial_process: self.control.initial_process,
        }
    }

    pub fn hardware_settings(&self) -> HardwareSettings {
        HardwareSettings {
            press_threshold: self.hardware.press_threshold,
            move_speed: self.hardware.move_speed,
            warning_hold: self.hardware.warning_hold_s,
        }
    }

    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings {
            port: self.hardware.port.clone(),
            baud: self.hardware.baud,
            read_timeout: Duration::from_millis(self.hardware.read_timeout_ms),
            join_timeout: Duration::from_millis(self.hardware.join_timeout_ms),
        }
    }

    /// Tick configuration. Falls back to the default rate when the configured
    /// one is unusable; [`crate::validate_config`] reports that case.
    pub fn tick_config(&self) -> TickConfig {
        TickConfig::from_frequency(self.control.tick_rate_hz)
            .and_then(|t| TickConfig::new(t.dt, self.control.max_catch_up))
            .unwrap_or_default()
    }
}
