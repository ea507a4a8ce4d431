//! Experiment state coordinator.
//!
//! Per process type:
//!
//! | process    | held        | read from piston | derived |
//! |------------|-------------|------------------|---------|
//! | none       | T (default) | V                | P       |
//! | isothermal | T           | V                | P       |
//! | isobaric   | P           | V                | T       |
//! | isochoric  | V, T        | -                | P       |
//!
//! The coordinator never owns the piston. The caller passes it into every
//! operation that reads the live volume or commands the actuator.

use crate::error::{ExperimentError, ExperimentResult};
use crate::events::{DataPoint, EventBus, ExperimentEvent, ExperimentListener};
use crate::particles::{ParticleConfig, ParticleReservoir};
use crate::recorder::{DEFAULT_RECORD_THRESHOLD, SignificanceFilter};
use crate::setpoints::{AdjustSteps, SetpointLimits, TargetSetpoints};
use gl_controls::Piston;
use gl_core::{ProcessType, changed};
use gl_thermo::{GasSnapshot, GasState, IdealGas};

/// Everything the coordinator needs at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
    /// Scene defaults, restored on reset.
    pub setpoints: TargetSetpoints,
    pub limits: SetpointLimits,
    pub steps: AdjustSteps,
    pub particles: ParticleConfig,
    pub record_threshold: f64,
    /// Process active before the first explicit switch.
    pub initial_process: ProcessType,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            setpoints: TargetSetpoints::default(),
            limits: SetpointLimits::default(),
            steps: AdjustSteps::default(),
            particles: ParticleConfig::default(),
            record_threshold: DEFAULT_RECORD_THRESHOLD,
            initial_process: ProcessType::None,
        }
    }
}

impl CoordinatorConfig {
    pub fn validate(&self) -> ExperimentResult<()> {
        self.setpoints.validate()?;
        self.limits.validate()?;
        self.steps.validate()?;
        self.particles.validate()?;
        if !(self.record_threshold > 0.0 && self.record_threshold.is_finite()) {
            return Err(ExperimentError::config("record threshold must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ExperimentCoordinator {
    gas: IdealGas,
    config: CoordinatorConfig,
    process: ProcessType,
    targets: TargetSetpoints,
    scene_defaults: TargetSetpoints,
    state: GasState,
    reservoir: ParticleReservoir,
    recorder: SignificanceFilter,
    bus: EventBus,
}

impl ExperimentCoordinator {
    /// Build a coordinator. Nothing is computed until [`Self::initialize`].
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid.
    pub fn new(config: CoordinatorConfig) -> ExperimentResult<Self> {
        config.validate()?;
        let reservoir = ParticleReservoir::new(config.particles)?;
        Ok(Self {
            gas: IdealGas::new(),
            process: config.initial_process,
            targets: config.setpoints,
            scene_defaults: config.setpoints,
            state: GasState::default(),
            reservoir,
            recorder: SignificanceFilter::new(config.record_threshold),
            bus: EventBus::new(),
            config,
        })
    }

    pub fn subscribe(&mut self, listener: Box<dyn ExperimentListener>) {
        self.bus.subscribe(listener);
    }

    /// Publish an event that originates outside the coordinator, such as a
    /// hardware warning cue.
    pub fn publish(&mut self, event: ExperimentEvent) {
        self.bus.publish(&event);
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn process(&self) -> ProcessType {
        self.process
    }

    pub fn state(&self) -> GasState {
        self.state
    }

    pub fn targets(&self) -> TargetSetpoints {
        self.targets
    }

    pub fn scene_defaults(&self) -> TargetSetpoints {
        self.scene_defaults
    }

    pub fn particle_count(&self) -> u32 {
        self.reservoir.count()
    }

    pub fn last_recorded(&self) -> Option<GasSnapshot> {
        self.recorder.last()
    }

    /// Startup: capture scene defaults, populate particles, compute the
    /// first consistent state and broadcast it.
    pub fn initialize(&mut self, piston: &mut Piston) {
        self.scene_defaults = self.targets;
        let volume = piston.current_volume();
        self.initialize_state(piston, volume);
        tracing::info!(
            process = %self.process,
            particles = self.state.particles,
            volume_cm3 = self.state.volume_cm3,
            pressure_atm = self.state.pressure_atm,
            "experiment initialized"
        );
        self.broadcast_state();
    }

    fn initialize_state(&mut self, piston: &mut Piston, volume_cm3: f64) {
        self.state.particles = self.reservoir.repopulate();
        let n = self.state.moles();

        self.state.temperature_k = self.targets.temperature_k;
        self.state.volume_cm3 = volume_cm3;
        self.state.pressure_atm = if n > 0.0 && volume_cm3 > 0.0 && self.state.temperature_k > 0.0
        {
            self.gas.pressure(n, volume_cm3, self.state.temperature_k)
        } else {
            0.0
        };

        if self.process == ProcessType::Isochoric {
            self.state.volume_cm3 = self.targets.volume_cm3;
            self.state.temperature_k = self.targets.temperature_k;
            self.state.pressure_atm =
                self.gas
                    .pressure(n, self.state.volume_cm3, self.state.temperature_k);
            let _ = piston.set_absolute_volume(self.state.volume_cm3, ProcessType::Isochoric);
        }

        piston.set_input_enabled(self.process.permits_manual_input());
        self.recorder.clear();
    }

    /// Switch the active process, capturing the current value of the newly
    /// held quantity as its setpoint.
    pub fn set_process_mode(&mut self, piston: &mut Piston, process: ProcessType) {
        let snapshot = self.state.snapshot();
        self.process = process;
        match process {
            ProcessType::None => {}
            ProcessType::Isothermal => self.targets.temperature_k = snapshot.temperature_k,
            ProcessType::Isobaric => self.targets.pressure_atm = snapshot.pressure_atm,
            // the piston stays where it is; the lock takes effect on the
            // next volume change
            ProcessType::Isochoric => self.targets.volume_cm3 = snapshot.volume_cm3,
        }
        tracing::info!(
            %process,
            pressure_atm = snapshot.pressure_atm,
            volume_cm3 = snapshot.volume_cm3,
            temperature_k = snapshot.temperature_k,
            "process changed"
        );

        piston.set_input_enabled(process.permits_manual_input());
        self.bus.publish(&ExperimentEvent::ProcessChanged(process));
        self.broadcast_state();
        self.recorder.prime(self.state.snapshot());
    }

    /// Index form of [`Self::set_process_mode`]. Unknown indices are logged
    /// and ignored.
    pub fn set_process_index(&mut self, piston: &mut Piston, index: usize) -> bool {
        match ProcessType::from_index(index) {
            Some(process) => {
                self.set_process_mode(piston, process);
                true
            }
            None => {
                tracing::warn!(index, "ignoring unknown process index");
                false
            }
        }
    }

    /// Recompute the state for the active process, record a data point when
    /// the change is significant, and broadcast.
    pub fn update_thermodynamic_state(&mut self, piston: &Piston) {
        let n = self.state.moles();

        if self.process == ProcessType::None {
            self.state.temperature_k = self.targets.temperature_k;
            if n <= 0.0 {
                self.state.pressure_atm = 0.0;
            } else {
                self.state.volume_cm3 = piston.current_volume();
                self.state.pressure_atm =
                    self.gas
                        .pressure(n, self.state.volume_cm3, self.state.temperature_k);
            }
            self.broadcast_state();
            return;
        }

        if n <= 0.0 {
            self.state.pressure_atm = 0.0;
            self.state.temperature_k = match self.process {
                ProcessType::Isobaric => 0.0,
                _ => self.targets.temperature_k,
            };
            self.broadcast_state();
            return;
        }

        match self.process {
            ProcessType::None => {}
            ProcessType::Isothermal => {
                self.state.temperature_k = self.targets.temperature_k;
                self.state.volume_cm3 = piston.current_volume();
                self.state.pressure_atm =
                    self.gas
                        .pressure(n, self.state.volume_cm3, self.state.temperature_k);
            }
            ProcessType::Isobaric => {
                self.state.pressure_atm = self.targets.pressure_atm;
                self.state.volume_cm3 = piston.current_volume();
                self.state.temperature_k =
                    self.gas
                        .temperature(n, self.state.volume_cm3, self.state.pressure_atm);
                self.targets.temperature_k = self.state.temperature_k;
            }
            ProcessType::Isochoric => {
                self.state.volume_cm3 = self.targets.volume_cm3;
                self.state.temperature_k = self.targets.temperature_k;
                self.state.pressure_atm =
                    self.gas
                        .pressure(n, self.state.volume_cm3, self.state.temperature_k);
            }
        }

        if self.recorder.offer(self.state.snapshot()) {
            self.request_record_data_point();
        }
        self.broadcast_state();
    }

    /// Piston volume notification.
    ///
    /// Under an isochoric lock the piston is sent back to the locked volume
    /// and the state is left alone.
    pub fn on_piston_volume_changed(&mut self, piston: &mut Piston, volume_cm3: f64) {
        if self.process == ProcessType::Isochoric {
            let _ = piston.set_absolute_volume(self.state.volume_cm3, ProcessType::Isochoric);
            return;
        }
        if !changed(self.state.volume_cm3, volume_cm3) {
            return;
        }
        self.state.volume_cm3 = volume_cm3;
        self.update_thermodynamic_state(piston);
    }

    pub fn on_particle_count_changed(&mut self, piston: &Piston, count: u32) {
        self.state.particles = count;
        self.update_thermodynamic_state(piston);
    }

    /// Shift the temperature setpoint by `delta_k`, clamped to the configured
    /// limits, and update.
    pub fn adjust_target_temperature(&mut self, piston: &Piston, delta_k: f64) {
        self.targets
            .adjust_temperature(delta_k, &self.config.limits);
        tracing::debug!(target_k = self.targets.temperature_k, "temperature setpoint");
        self.update_thermodynamic_state(piston);
    }

    /// One step of the temperature control.
    pub fn step_target_temperature(&mut self, piston: &Piston, up: bool) {
        let delta = self.config.steps.temperature_delta(up);
        self.adjust_target_temperature(piston, delta);
    }

    /// Shift the pressure setpoint by `delta_atm` (never below zero) and
    /// update.
    pub fn adjust_target_pressure(&mut self, piston: &Piston, delta_atm: f64) {
        self.targets.adjust_pressure(delta_atm);
        tracing::debug!(target_atm = self.targets.pressure_atm, "pressure setpoint");
        self.update_thermodynamic_state(piston);
    }

    /// One step of the pressure control.
    pub fn step_target_pressure(&mut self, piston: &Piston, up: bool) {
        let delta = self.config.steps.pressure_delta(up);
        self.adjust_target_pressure(piston, delta);
    }

    /// Add or remove `count` particles.
    pub fn request_particles(&mut self, piston: &Piston, count: u32, add: bool) {
        let outcome = if add {
            self.reservoir.add(count)
        } else {
            self.reservoir.remove(count)
        };
        match outcome {
            Some(new_count) => self.on_particle_count_changed(piston, new_count),
            None => tracing::debug!(count, add, "particle request had no effect"),
        }
    }

    pub fn add_particles(&mut self, piston: &Piston) {
        let n = self.reservoir.per_action();
        self.request_particles(piston, n, true);
    }

    pub fn remove_particles(&mut self, piston: &Piston) {
        let n = self.reservoir.per_action();
        self.request_particles(piston, n, false);
    }

    pub fn clear_particles(&mut self, piston: &Piston) {
        if let Some(count) = self.reservoir.clear() {
            self.on_particle_count_changed(piston, count);
        }
    }

    /// Emit the data point for the active process from the current state.
    /// Does nothing with no process selected.
    pub fn request_record_data_point(&mut self) {
        let Some(point) = DataPoint::for_process(self.process, self.state.snapshot()) else {
            return;
        };
        tracing::debug!(?point, "data point recorded");
        self.bus.publish(&ExperimentEvent::DataPointRecorded(point));
    }

    /// Back to the scene defaults with no process selected, starting from
    /// the piston's physical volume.
    pub fn reset_experiment(&mut self, piston: &mut Piston) {
        tracing::info!("experiment resetting");
        self.bus.publish(&ExperimentEvent::ExperimentReset);

        let _ = self.reservoir.clear();
        self.targets = self.scene_defaults;
        let previous = self.process;
        self.process = ProcessType::None;
        if previous != ProcessType::None {
            self.bus
                .publish(&ExperimentEvent::ProcessChanged(ProcessType::None));
        }

        let volume = piston.physical_volume();
        self.initialize_state(piston, volume);
        self.state.particles = self.reservoir.count();

        self.update_thermodynamic_state(piston);
        self.recorder.clear();
        tracing::info!(
            particles = self.state.particles,
            volume_cm3 = self.state.volume_cm3,
            "experiment reset complete"
        );
    }

    fn broadcast_state(&mut self) {
        self.bus
            .publish(&ExperimentEvent::MoleculeCountChanged(self.state.particles));
        self.bus
            .publish(&ExperimentEvent::VolumeChanged(self.state.volume_cm3));
        self.bus
            .publish(&ExperimentEvent::TemperatureChanged(self.state.temperature_k));
        self.bus
            .publish(&ExperimentEvent::PressureChanged(self.state.pressure_atm));
    }
}
