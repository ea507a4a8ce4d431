//! Inbound commands from UI, keyboard and tracking front-ends.

use gl_controls::JogDirection;
use gl_core::ProcessType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum LabCommand {
    SetProcessMode { process: ProcessType },
    /// UI index form: 0 none, 1 isothermal, 2 isobaric, 3 isochoric.
    SetProcessIndex { index: usize },
    AdjustTargetTemperature { up: bool },
    AdjustTargetPressure { up: bool },
    AddParticles,
    RemoveParticles,
    ClearParticles,
    RecordDataPoint,
    ResetExperiment,
    /// 0 manual, 1 gesture, 2 hardware.
    SetControlMode { index: usize },
    MovePiston { local_y: f64 },
    /// One tick of a held jog key.
    JogPiston { direction: JogDirection },
    /// Tracked handle position for the gesture channel.
    GestureHandle { world_y: f64 },
    /// The handle was let go; the next sample starts a new drag.
    GestureRelease,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_shape() {
        let cmd: LabCommand =
            serde_yaml::from_str("command: set_process_mode\nprocess: isobaric\n").unwrap();
        assert_eq!(
            cmd,
            LabCommand::SetProcessMode {
                process: ProcessType::Isobaric
            }
        );

        let cmd: LabCommand =
            serde_yaml::from_str("command: jog_piston\ndirection: down\n").unwrap();
        assert_eq!(
            cmd,
            LabCommand::JogPiston {
                direction: JogDirection::Down
            }
        );

        let cmd: LabCommand = serde_yaml::from_str("command: reset_experiment\n").unwrap();
        assert_eq!(cmd, LabCommand::ResetExperiment);
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_string(&LabCommand::MovePiston { local_y: 0.4 }).unwrap();
        assert_eq!(json, r#"{"command":"move_piston","local_y":0.4}"#);
    }
}
