use gl_config::{
    ConfigError, LabConfig, from_yaml_str, load, load_json, load_yaml, save_json, save_yaml,
};
use gl_controls::ControlMode;
use gl_core::ProcessType;

#[test]
fn roundtrip_yaml_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lab.yaml");

    let config = LabConfig::default();
    save_yaml(&path, &config).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(config, loaded);
}

#[test]
fn roundtrip_json_customized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lab.json");

    let mut config = LabConfig::default();
    config.name = "classroom rig".to_string();
    config.hardware.enabled = true;
    config.hardware.port = "COM12".to_string();
    config.control.initial_mode = ControlMode::ExternalHardware;
    config.control.initial_process = ProcessType::Isothermal;

    save_json(&path, &config).unwrap();
    assert_eq!(load_json(&path).unwrap(), config);
    assert_eq!(load(&path).unwrap(), config);
}

#[test]
fn partial_document_fills_defaults() {
    let yaml = r#"
name: bench
setpoints:
  temperature_k: 300.0
control:
  initial_mode: gesture_delta
  initial_process: isochoric
"#;
    let config = from_yaml_str(yaml).unwrap();
    assert_eq!(config.name, "bench");
    assert_eq!(config.setpoints.temperature_k, 300.0);
    assert_eq!(config.setpoints.pressure_atm, 1.0);
    assert_eq!(config.control.initial_mode, ControlMode::GestureDelta);
    assert_eq!(config.control.initial_process, ProcessType::Isochoric);
    assert_eq!(config.travel, LabConfig::default().travel);
}

#[test]
fn empty_document_is_default() {
    assert_eq!(from_yaml_str("").unwrap(), LabConfig::default());
}

#[test]
fn invalid_document_is_rejected() {
    let yaml = "travel:\n  min_local_y: 0.9\n  max_local_y: 0.1\n";
    assert!(matches!(
        from_yaml_str(yaml),
        Err(ConfigError::Validation(_))
    ));
    assert!(matches!(
        from_yaml_str("limits: not-a-map"),
        Err(ConfigError::Yaml(_))
    ));
}

#[test]
fn runtime_views_match_sections() {
    let config = LabConfig::default();
    let coordinator = config.coordinator_config();
    assert_eq!(coordinator.particles.initial_count, 10);
    assert_eq!(coordinator.particles.per_action, 5);
    assert_eq!(coordinator.record_threshold, 0.01);
    assert!((config.tick_config().dt - 0.02).abs() < 1e-12);
    assert_eq!(config.serial_settings().baud, 115_200);
    assert_eq!(config.piston_geometry().scale_factor, 3000.0);
}
