//! Scripted sessions: a list of commands with waits in between.
//!
//! ```yaml
//! steps:
//!   - command: set_process_mode
//!     process: isothermal
//!   - command: move_piston
//!     local_y: 0.4
//!   - wait_s: 1.0
//!   - command: record_data_point
//! ```

use crate::command::LabCommand;
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    /// Run the control loop for this long.
    Wait { wait_s: f64 },
    Command(LabCommand),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AppError::ScriptRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Total waiting time in seconds.
    pub fn duration(&self) -> f64 {
        self.steps
            .iter()
            .map(|s| match s {
                ScriptStep::Wait { wait_s } => wait_s.max(0.0),
                ScriptStep::Command(_) => 0.0,
            })
            .sum()
    }
}
