//! Whole-session scenarios: commands, scripts and an in-memory serial device.

use gl_app::{LabCommand, LabSession, Script};
use gl_config::LabConfig;
use gl_controls::ControlMode;
use gl_core::ProcessType;
use gl_experiment::{ChannelListener, DataPoint, EventLog, ExperimentEvent, InputWarning};
use gl_hardware::LineSource;
use std::collections::VecDeque;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Yields each line once, then reports the end of the stream.
struct ScriptedSource {
    lines: VecDeque<String>,
}

impl ScriptedSource {
    fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| format!("{l}\n")).collect(),
        }
    }
}

impl LineSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

fn started(config: LabConfig) -> (LabSession, EventLog) {
    let mut session = LabSession::new(config).unwrap();
    let log = EventLog::new();
    session.subscribe(Box::new(log.clone()));
    session.start().unwrap();
    (session, log)
}

fn hardware_config() -> LabConfig {
    let mut config = LabConfig::default();
    config.control.initial_mode = ControlMode::ExternalHardware;
    config
}

/// Attach `lines` and wait for the reader to deliver all of them.
fn feed(session: &mut LabSession, lines: &[&str]) {
    session.attach_hardware(ScriptedSource::new(lines)).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while session.hardware_running() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn warnings(log: &EventLog) -> Vec<InputWarning> {
    log.events()
        .into_iter()
        .filter_map(|e| match e {
            ExperimentEvent::InputWarning(w) => Some(w),
            _ => None,
        })
        .collect()
}

#[test]
fn full_press_compresses_gas_at_constant_temperature() {
    let (mut s, _log) = started(hardware_config());
    s.handle(LabCommand::SetProcessMode {
        process: ProcessType::Isothermal,
    });
    let before = s.state();

    feed(&mut s, &["P:1.0"]);
    s.run_for(2.0);

    let after = s.state();
    let min = s.piston().min_local_y();
    assert!((s.piston().actual_local_y() - min).abs() < 2e-3);
    assert!(after.volume_cm3 < before.volume_cm3);
    assert!(after.pressure_atm > before.pressure_atm);
    assert_eq!(after.temperature_k, before.temperature_k);

    let pv_before = before.pressure_atm * before.volume_cm3;
    let pv_after = after.pressure_atm * after.volume_cm3;
    assert!((pv_after - pv_before).abs() / pv_before < 1e-9);
}

#[test]
fn press_without_a_process_warns_and_leaves_the_piston() {
    let (mut s, log) = started(hardware_config());
    let y = s.piston().actual_local_y();
    log.drain();

    feed(&mut s, &["P:0.8"]);
    s.run_for(0.5);

    assert_eq!(warnings(&log), vec![InputWarning::NoModeSelected]);
    assert_eq!(s.piston().actual_local_y(), y);
}

#[test]
fn press_under_volume_lock_warns_once() {
    let (mut s, log) = started(hardware_config());
    s.handle(LabCommand::SetProcessMode {
        process: ProcessType::Isothermal,
    });
    s.handle(LabCommand::SetProcessMode {
        process: ProcessType::Isochoric,
    });
    let volume = s.state().volume_cm3;
    log.drain();

    feed(&mut s, &["P:0.9", "P:0.95"]);
    s.run_for(0.5);

    assert_eq!(warnings(&log), vec![InputWarning::VolumeLocked]);
    assert_eq!(s.state().volume_cm3, volume);
}

#[test]
fn idle_hardware_link_does_not_fight_manual_moves() {
    for process in [ProcessType::Isothermal, ProcessType::Isobaric] {
        let (mut s, _) = started(LabConfig::default());
        feed(&mut s, &[]);
        assert!(s.has_hardware());

        s.handle(LabCommand::SetProcessMode { process });
        s.handle(LabCommand::MovePiston { local_y: 0.40 });
        s.run_for(1.0);
        assert_eq!(s.piston().actual_local_y(), 0.40, "{process}");
    }
}

#[test]
fn detach_stops_the_reader() {
    let (mut s, _) = started(hardware_config());
    feed(&mut s, &[]);
    assert!(s.has_hardware());
    s.detach_hardware();
    assert!(!s.has_hardware());
    assert!(!s.hardware_running());
}

#[test]
fn gesture_handle_drags_the_virtual_piston() {
    let (mut s, _log) = started(LabConfig::default());
    s.handle(LabCommand::SetProcessMode {
        process: ProcessType::Isothermal,
    });
    s.handle(LabCommand::SetControlMode { index: 1 });
    let start = s.piston().local_y();

    s.handle(LabCommand::GestureHandle { world_y: 1.0 });
    s.handle(LabCommand::GestureHandle { world_y: 0.95 });
    s.run_for(0.1);

    let dragged = s.piston().local_y();
    assert!((dragged - (start - 0.05)).abs() < 1e-9);
    assert!((s.state().volume_cm3 - s.piston().current_volume()).abs() < 1e-9);

    // a fresh grab only records where the handle is
    s.handle(LabCommand::GestureRelease);
    s.handle(LabCommand::GestureHandle { world_y: 3.0 });
    assert_eq!(s.piston().local_y(), dragged);

    // back to manual: the body follows the last virtual position
    s.handle(LabCommand::SetControlMode { index: 0 });
    s.run_for(1.0);
    assert!((s.piston().actual_local_y() - dragged).abs() < 1e-9);
}

#[test]
fn script_drives_a_recorded_isothermal_run() {
    let script = Script::from_yaml_str(
        r"
steps:
  - command: set_process_mode
    process: isothermal
  - command: move_piston
    local_y: 0.4
  - wait_s: 1.0
  - command: record_data_point
",
    )
    .unwrap();
    let (mut s, log) = started(LabConfig::default());
    s.run_script(&script);

    let state = s.state();
    let points = log.data_points();
    assert!(points.len() > 1);
    assert!(
        points
            .iter()
            .all(|p| matches!(p, DataPoint::PressureVolume { .. }))
    );
    assert_eq!(
        points.last(),
        Some(&DataPoint::PressureVolume {
            pressure_atm: state.pressure_atm,
            volume_cm3: state.volume_cm3,
        })
    );
    assert!((s.sim_time() - 1.0).abs() < 1e-9);
}

#[test]
fn reset_returns_to_scene_defaults() {
    let (mut s, log) = started(LabConfig::default());
    s.handle(LabCommand::SetProcessMode {
        process: ProcessType::Isochoric,
    });
    s.handle(LabCommand::AdjustTargetTemperature { up: true });
    s.handle(LabCommand::AddParticles);
    log.drain();

    s.handle(LabCommand::ResetExperiment);

    assert_eq!(log.events()[0], ExperimentEvent::ExperimentReset);
    assert_eq!(s.process(), ProcessType::None);
    assert_eq!(s.state().particles, 10);
    assert_eq!(s.state().temperature_k, 293.15);
    assert!(!s.piston().arbiter().input_enabled());
}

#[test]
fn channel_listener_sees_the_same_stream() {
    let mut s = LabSession::new(LabConfig::default()).unwrap();
    let (tx, rx) = mpsc::channel();
    s.subscribe(Box::new(ChannelListener::new(tx)));
    s.start().unwrap();
    s.handle(LabCommand::AddParticles);

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(events[0], ExperimentEvent::MoleculeCountChanged(10));
    assert!(events.contains(&ExperimentEvent::MoleculeCountChanged(15)));
}
