//! The lab session: one owner for every runtime component.

use crate::command::LabCommand;
use crate::error::AppResult;
use crate::script::{Script, ScriptStep};
use gl_config::{LabConfig, validate_config};
use gl_controls::{GestureTracker, Piston, TickClock};
use gl_core::ProcessType;
use gl_experiment::{ExperimentCoordinator, ExperimentEvent, ExperimentListener};
use gl_hardware::{HardwareInput, LatestSlot, LineSource, SerialPortSource, SerialReader};
use gl_thermo::GasState;
use std::sync::Arc;

struct HardwareLink {
    input: HardwareInput,
    reader: SerialReader,
}

pub struct LabSession {
    config: LabConfig,
    piston: Piston,
    coordinator: ExperimentCoordinator,
    gesture: GestureTracker,
    clock: TickClock,
    hardware: Option<HardwareLink>,
    started: bool,
    ticks_run: u64,
}

impl LabSession {
    /// Build every component from `config`.
    ///
    /// Nothing is broadcast until [`Self::start`], so listeners subscribed in
    /// between see the initial state.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid.
    pub fn new(config: LabConfig) -> AppResult<Self> {
        validate_config(&config)?;
        let piston = Piston::new(
            config.piston_geometry(),
            config.travel_limits(),
            config.piston_motion(),
            config.control.initial_mode,
        )?;
        let coordinator = ExperimentCoordinator::new(config.coordinator_config())?;
        let clock = TickClock::new(config.tick_config());
        Ok(Self {
            config,
            piston,
            coordinator,
            gesture: GestureTracker::new(),
            clock,
            hardware: None,
            started: false,
            ticks_run: 0,
        })
    }

    pub fn subscribe(&mut self, listener: Box<dyn ExperimentListener>) {
        self.coordinator.subscribe(listener);
    }

    /// Initialize the experiment and broadcast the first state. Opens the
    /// configured serial device when hardware is enabled.
    ///
    /// # Errors
    ///
    /// Returns error if the hardware link cannot be set up.
    pub fn start(&mut self) -> AppResult<()> {
        if self.started {
            tracing::warn!("session already started");
            return Ok(());
        }
        self.coordinator.initialize(&mut self.piston);
        self.started = true;
        if self.config.hardware.enabled && self.hardware.is_none() {
            self.connect_serial()?;
        }
        Ok(())
    }

    /// Open the serial device named in the configuration.
    pub fn connect_serial(&mut self) -> AppResult<()> {
        let source = SerialPortSource::new(self.config.serial_settings());
        self.attach_hardware(source)
    }

    /// Start reading hardware input from `source`. Replaces any previous link.
    pub fn attach_hardware<S: LineSource>(&mut self, source: S) -> AppResult<()> {
        self.detach_hardware();
        let slot = Arc::new(LatestSlot::new());
        let input = HardwareInput::new(
            self.config.hardware_settings(),
            Arc::clone(&slot),
            &self.piston,
        )?;
        let reader = SerialReader::spawn(
            source,
            slot,
            self.config.serial_settings().join_timeout,
        )?;
        self.hardware = Some(HardwareLink { input, reader });
        Ok(())
    }

    /// Stop the hardware reader, if any.
    pub fn detach_hardware(&mut self) {
        if let Some(mut link) = self.hardware.take() {
            link.reader.shutdown();
        }
    }

    pub fn has_hardware(&self) -> bool {
        self.hardware.is_some()
    }

    /// Whether the hardware reader thread is still alive.
    pub fn hardware_running(&self) -> bool {
        self.hardware
            .as_ref()
            .is_some_and(|link| link.reader.is_running())
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    pub fn piston(&self) -> &Piston {
        &self.piston
    }

    pub fn coordinator(&self) -> &ExperimentCoordinator {
        &self.coordinator
    }

    pub fn state(&self) -> GasState {
        self.coordinator.state()
    }

    pub fn process(&self) -> ProcessType {
        self.coordinator.process()
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    /// Simulated seconds covered by the ticks run so far.
    pub fn sim_time(&self) -> f64 {
        self.ticks_run as f64 * self.clock.dt()
    }

    pub fn handle(&mut self, command: LabCommand) {
        tracing::debug!(?command, "command");
        match command {
            LabCommand::SetProcessMode { process } => {
                self.coordinator.set_process_mode(&mut self.piston, process);
            }
            LabCommand::SetProcessIndex { index } => {
                self.coordinator.set_process_index(&mut self.piston, index);
            }
            LabCommand::AdjustTargetTemperature { up } => {
                self.coordinator.step_target_temperature(&self.piston, up);
            }
            LabCommand::AdjustTargetPressure { up } => {
                self.coordinator.step_target_pressure(&self.piston, up);
            }
            LabCommand::AddParticles => self.coordinator.add_particles(&self.piston),
            LabCommand::RemoveParticles => self.coordinator.remove_particles(&self.piston),
            LabCommand::ClearParticles => self.coordinator.clear_particles(&self.piston),
            LabCommand::RecordDataPoint => self.coordinator.request_record_data_point(),
            LabCommand::ResetExperiment => self.coordinator.reset_experiment(&mut self.piston),
            LabCommand::SetControlMode { index } => {
                if self.piston.set_control_mode_index(index) {
                    self.gesture.release();
                }
            }
            LabCommand::MovePiston { local_y } => {
                if !self.piston.move_manual(local_y).is_accepted() {
                    tracing::debug!(local_y, "manual move ignored");
                }
            }
            LabCommand::JogPiston { direction } => {
                let dt = self.clock.dt();
                if !self.piston.jog(direction, dt).is_accepted() {
                    tracing::debug!(?direction, "jog ignored");
                }
            }
            LabCommand::GestureHandle { world_y } => {
                let _ = self.gesture.observe(&mut self.piston, world_y);
            }
            LabCommand::GestureRelease => self.gesture.release(),
        }
    }

    /// One control tick: hardware input, piston motion, then the coordinator
    /// reacts to any volume change.
    pub fn tick(&mut self) {
        let dt = self.clock.dt();
        let process = self.coordinator.process();

        if let Some(link) = self.hardware.as_mut() {
            if let Some(warning) = link.input.tick(&mut self.piston, process, dt) {
                self.coordinator
                    .publish(ExperimentEvent::InputWarning(warning));
            }
        }

        if let Some(volume) = self.piston.tick(dt) {
            self.coordinator
                .on_piston_volume_changed(&mut self.piston, volume);
        }
        self.ticks_run += 1;
    }

    /// Run the ticks due for `elapsed` wall-clock seconds. Returns how many
    /// ran.
    pub fn advance(&mut self, elapsed: f64) -> u32 {
        let due = self.clock.advance(elapsed);
        for _ in 0..due {
            self.tick();
        }
        due
    }

    /// Run whole ticks covering `seconds` of simulated time, with no
    /// catch-up limit.
    pub fn run_for(&mut self, seconds: f64) -> u64 {
        if !(seconds > 0.0 && seconds.is_finite()) {
            return 0;
        }
        let ticks = (seconds / self.clock.dt()).round() as u64;
        for _ in 0..ticks {
            self.tick();
        }
        ticks
    }

    pub fn run_script(&mut self, script: &Script) {
        for step in &script.steps {
            match step {
                ScriptStep::Wait { wait_s } => {
                    self.run_for(*wait_s);
                }
                ScriptStep::Command(command) => self.handle(command.clone()),
            }
        }
    }

    pub fn shutdown(&mut self) {
        self.detach_hardware();
    }
}

impl Drop for LabSession {
    fn drop(&mut self) {
        self.detach_hardware();
    }
}

impl std::fmt::Debug for LabSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabSession")
            .field("process", &self.coordinator.process())
            .field("control_mode", &self.piston.control_mode())
            .field("state", &self.coordinator.state())
            .field("hardware", &self.hardware.is_some())
            .field("ticks_run", &self.ticks_run)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_experiment::EventLog;

    fn session() -> (LabSession, EventLog) {
        let mut s = LabSession::new(LabConfig::default()).unwrap();
        let log = EventLog::new();
        s.subscribe(Box::new(log.clone()));
        s.start().unwrap();
        (s, log)
    }

    #[test]
    fn start_broadcasts_initial_state() {
        let (s, log) = session();
        assert_eq!(log.len(), 4);
        assert_eq!(s.state().particles, 10);
        assert!(!s.has_hardware());
    }

    #[test]
    fn start_twice_is_harmless() {
        let (mut s, log) = session();
        s.start().unwrap();
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn invalid_config_refuses_to_build() {
        let mut config = LabConfig::default();
        config.travel.max_speed = 0.0;
        assert!(LabSession::new(config).is_err());
    }

    #[test]
    fn manual_move_ignored_until_input_enabled() {
        let (mut s, _) = session();
        let y = s.piston().actual_local_y();
        s.handle(LabCommand::MovePiston { local_y: 0.4 });
        s.run_for(0.5);
        assert_eq!(s.piston().actual_local_y(), y);

        s.handle(LabCommand::SetProcessMode {
            process: ProcessType::Isothermal,
        });
        s.handle(LabCommand::MovePiston { local_y: 0.4 });
        s.run_for(0.5);
        assert!((s.piston().actual_local_y() - 0.4).abs() < 1e-12);
        assert_eq!(s.state().volume_cm3, s.piston().current_volume());
    }

    #[test]
    fn advance_counts_ticks() {
        let (mut s, _) = session();
        assert_eq!(s.advance(0.05), 2);
        assert_eq!(s.advance(0.01), 1);
        assert!((s.sim_time() - 0.06).abs() < 1e-12);
    }
}
