//! Experiment state coordination for gaslab.
//!
//! The [`ExperimentCoordinator`] owns the gas state and decides, per process
//! type, which of pressure, volume and temperature is held, which one is read
//! from the piston, and which one is derived from `P V = n R T`.
//!
//! Everything observable leaves the coordinator as an [`ExperimentEvent`]
//! through the [`EventBus`]. Graph renderers, particle views and UI read-outs
//! subscribe as [`ExperimentListener`]s.

pub mod coordinator;
pub mod error;
pub mod events;
pub mod particles;
pub mod recorder;
pub mod setpoints;

pub use coordinator::{CoordinatorConfig, ExperimentCoordinator};
pub use error::{ExperimentError, ExperimentResult};
pub use events::{
    ChannelListener, DataPoint, EventBus, EventLog, ExperimentEvent, ExperimentListener,
    InputWarning,
};
pub use particles::{ParticleConfig, ParticleReservoir};
pub use recorder::{DEFAULT_RECORD_THRESHOLD, SignificanceFilter};
pub use setpoints::{AdjustSteps, SetpointLimits, TargetSetpoints};
