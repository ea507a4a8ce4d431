//! Piston actuation and input arbitration for gaslab.
//!
//! This crate owns the single mechanical degree of freedom of the experiment:
//! the piston whose height sets the gas volume. Several input channels compete
//! for it (manual/keyboard, gesture deltas, external hardware, and the
//! experiment itself), and the arbiter decides which of them may move it.
//!
//! # Architecture
//!
//! - `PistonGeometry` maps piston height to volume and back
//! - `Piston` holds physical, virtual and target positions and advances them
//!   once per control tick
//! - `InputArbiter` is the two-axis guard (control mode, input enabled)
//!   consulted before every mutating call
//! - `GestureTracker` turns tracked handle positions into piston deltas
//! - `TickClock` drives the fixed-rate control loop
//!
//! # Design Principles
//!
//! - **Never teleport**: the physical body always approaches its target at a
//!   bounded rate
//! - **No silent leaks**: an input from a channel that is not authorized is
//!   dropped before it touches any position

pub mod actuator;
pub mod arbiter;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod sampled;

pub use actuator::{CommandOutcome, JogDirection, Piston, PistonMotion};
pub use arbiter::{ControlMode, InputArbiter};
pub use error::{ControlError, ControlResult};
pub use geometry::{PistonGeometry, TravelLimits};
pub use gesture::GestureTracker;
pub use sampled::{TickClock, TickConfig};
