//! Shared application layer for gaslab.
//!
//! [`LabSession`] is the single owner of every runtime component: the piston,
//! the experiment coordinator, the gesture tracker, the tick clock and the
//! optional hardware link. Front-ends talk to it with [`LabCommand`]s and
//! listen to it through `gl_experiment::ExperimentListener`.

pub mod command;
pub mod error;
pub mod script;
pub mod session;

pub use command::LabCommand;
pub use error::{AppError, AppResult};
pub use script::{Script, ScriptStep};
pub use session::LabSession;
