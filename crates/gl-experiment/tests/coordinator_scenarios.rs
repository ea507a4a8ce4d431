//! End-to-end coordinator behaviour with a real piston.

use gl_controls::{ControlMode, Piston, PistonGeometry, PistonMotion, TravelLimits};
use gl_core::{ProcessType, Tolerances};
use gl_experiment::{
    CoordinatorConfig, DataPoint, EventLog, ExperimentCoordinator, ExperimentEvent,
    TargetSetpoints,
};
use gl_thermo::IdealGas;

fn piston() -> Piston {
    Piston::new(
        PistonGeometry::default(),
        TravelLimits::default(),
        PistonMotion::default(),
        ControlMode::Manual,
    )
    .unwrap()
}

fn start(config: CoordinatorConfig) -> (ExperimentCoordinator, Piston, EventLog) {
    let mut coordinator = ExperimentCoordinator::new(config).unwrap();
    let log = EventLog::new();
    coordinator.subscribe(Box::new(log.clone()));
    let mut p = piston();
    coordinator.initialize(&mut p);
    (coordinator, p, log)
}

/// Move the piston manually and feed every volume change to the coordinator.
fn drive_to(c: &mut ExperimentCoordinator, p: &mut Piston, local_y: f64) {
    let _ = p.move_manual(local_y);
    for _ in 0..50 {
        if let Some(v) = p.tick(0.02) {
            c.on_piston_volume_changed(p, v);
        }
    }
}

#[test]
fn ten_particles_in_one_litre_at_300_k() {
    let config = CoordinatorConfig {
        initial_process: ProcessType::Isochoric,
        setpoints: TargetSetpoints {
            temperature_k: 300.0,
            pressure_atm: 1.0,
            volume_cm3: 1000.0,
        },
        ..Default::default()
    };
    let (c, _, log) = start(config);
    let state = c.state();
    assert_eq!(state.particles, 10);
    assert_eq!(state.volume_cm3, 1000.0);
    assert!((state.pressure_atm - 24.62).abs() < 0.01);
    assert_eq!(log.last_pressure(), Some(state.pressure_atm));
}

#[test]
fn empty_container_fallbacks() {
    for (process, expected_t) in [
        (ProcessType::Isothermal, Some(293.15)),
        (ProcessType::Isochoric, Some(293.15)),
        (ProcessType::Isobaric, Some(0.0)),
        (ProcessType::None, Some(293.15)),
    ] {
        let (mut c, mut p, log) = start(CoordinatorConfig::default());
        c.set_process_mode(&mut p, process);
        c.clear_particles(&p);

        let state = c.state();
        assert_eq!(state.pressure_atm, 0.0, "{process}");
        assert_eq!(Some(state.temperature_k), expected_t, "{process}");
        assert_eq!(log.last_pressure(), Some(0.0));
        assert!(log.data_points().is_empty(), "{process}");
    }
}

#[test]
fn isothermal_temperature_is_sticky_while_volume_moves() {
    let (mut c, mut p, _) = start(CoordinatorConfig::default());
    c.set_process_mode(&mut p, ProcessType::Isothermal);
    let held = c.targets().temperature_k;
    let p_before = c.state().pressure_atm;

    drive_to(&mut c, &mut p, 0.38);

    let state = c.state();
    assert_eq!(state.temperature_k, held);
    assert_eq!(state.volume_cm3, p.current_volume());
    assert!(state.pressure_atm > p_before);
    assert!(state.satisfies_ideal_gas_law(&IdealGas::new(), Tolerances::default()));
}

#[test]
fn isobaric_pressure_is_sticky_while_volume_moves() {
    let (mut c, mut p, _) = start(CoordinatorConfig::default());
    c.set_process_mode(&mut p, ProcessType::Isobaric);
    let held = c.targets().pressure_atm;
    let t_before = c.state().temperature_k;

    drive_to(&mut c, &mut p, 0.5);

    let state = c.state();
    assert_eq!(state.pressure_atm, held);
    assert!(state.temperature_k > t_before);
    assert_eq!(c.targets().temperature_k, state.temperature_k);
}

#[test]
fn temperature_setpoint_survives_a_mode_round_trip() {
    let (mut c, mut p, _) = start(CoordinatorConfig::default());
    // let the temperature drift away from the scene default first
    c.set_process_mode(&mut p, ProcessType::Isobaric);
    drive_to(&mut c, &mut p, 0.5);

    c.set_process_mode(&mut p, ProcessType::Isothermal);
    let captured = c.targets().temperature_k;
    assert!((captured - c.scene_defaults().temperature_k).abs() > 1.0);

    c.set_process_mode(&mut p, ProcessType::Isobaric);
    c.set_process_mode(&mut p, ProcessType::Isothermal);
    assert!((c.targets().temperature_k - captured).abs() < 1e-9);
    assert!((c.state().temperature_k - captured).abs() < 1e-9);
}

#[test]
fn pressure_setpoint_survives_a_mode_round_trip() {
    let (mut c, mut p, _) = start(CoordinatorConfig::default());
    c.set_process_mode(&mut p, ProcessType::Isothermal);
    drive_to(&mut c, &mut p, 0.38);

    c.set_process_mode(&mut p, ProcessType::Isobaric);
    let captured = c.targets().pressure_atm;
    assert!((captured - c.scene_defaults().pressure_atm).abs() > 0.01);

    c.set_process_mode(&mut p, ProcessType::Isochoric);
    c.set_process_mode(&mut p, ProcessType::Isobaric);
    assert!((c.targets().pressure_atm - captured).abs() < 1e-9);
    assert!((c.state().pressure_atm - captured).abs() < 1e-9);
}

#[test]
fn only_significant_changes_are_recorded() {
    let (mut c, mut p, log) = start(CoordinatorConfig::default());
    c.set_process_mode(&mut p, ProcessType::Isothermal);
    let v = c.state().volume_cm3;

    // below the 0.1 cm^3 volume threshold, and the pressure moves < 0.01 atm
    c.on_piston_volume_changed(&mut p, v + 0.05);
    assert!(log.data_points().is_empty());

    drive_to(&mut c, &mut p, 0.40);
    let points = log.data_points();
    assert!(!points.is_empty());
    assert!(
        points
            .iter()
            .all(|pt| matches!(pt, DataPoint::PressureVolume { .. }))
    );
}

#[test]
fn isochoric_temperature_steps_record_pressure_temperature_points() {
    let (mut c, mut p, log) = start(CoordinatorConfig::default());
    c.set_process_mode(&mut p, ProcessType::Isochoric);
    c.step_target_temperature(&p, true);
    c.step_target_temperature(&p, true);

    let points = log.data_points();
    assert_eq!(points.len(), 2);
    let DataPoint::PressureTemperature { temperature_k, .. } = points[1] else {
        panic!("expected a P-T point, got {:?}", points[1]);
    };
    assert!((temperature_k - 313.15).abs() < 1e-9);
}

#[test]
fn temperature_setpoint_stays_within_limits() {
    let (mut c, mut p, _) = start(CoordinatorConfig::default());
    c.set_process_mode(&mut p, ProcessType::Isochoric);
    for _ in 0..20 {
        c.step_target_temperature(&p, true);
    }
    assert_eq!(c.targets().temperature_k, 350.0);
    for _ in 0..40 {
        c.step_target_temperature(&p, false);
    }
    assert_eq!(c.targets().temperature_k, 200.0);
}

#[test]
fn reset_after_isochoric_lock() {
    let (mut c, mut p, log) = start(CoordinatorConfig::default());
    c.set_process_mode(&mut p, ProcessType::Isochoric);
    c.step_target_temperature(&p, true);
    c.add_particles(&p);
    log.drain();

    c.reset_experiment(&mut p);

    let events = log.events();
    assert_eq!(events[0], ExperimentEvent::ExperimentReset);
    assert!(events.contains(&ExperimentEvent::ProcessChanged(ProcessType::None)));

    assert_eq!(c.process(), ProcessType::None);
    assert_eq!(c.targets(), TargetSetpoints::default());
    assert_eq!(c.last_recorded(), None);
    assert!(!p.arbiter().input_enabled());

    let state = c.state();
    assert_eq!(state.particles, 10);
    assert_eq!(state.temperature_k, 293.15);
    assert!((state.volume_cm3 - p.physical_volume()).abs() < 1e-9);
    let expected = IdealGas::new().pressure(1.0, p.physical_volume(), 293.15);
    assert!((state.pressure_atm - expected).abs() < 1e-9);
    assert!(log.data_points().is_empty());
}

#[test]
fn broadcast_order_is_count_volume_temperature_pressure() {
    let (mut c, p, log) = start(CoordinatorConfig::default());
    log.drain();
    c.update_thermodynamic_state(&p);
    let events = log.events();
    assert!(matches!(events[0], ExperimentEvent::MoleculeCountChanged(_)));
    assert!(matches!(events[1], ExperimentEvent::VolumeChanged(_)));
    assert!(matches!(events[2], ExperimentEvent::TemperatureChanged(_)));
    assert!(matches!(events[3], ExperimentEvent::PressureChanged(_)));
}
