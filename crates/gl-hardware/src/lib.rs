//! External pressure-sensor input for gaslab.
//!
//! A microcontroller streams press readings over a serial link as
//! `P:<float>` lines. A dedicated reader thread keeps only the newest line in
//! a single-slot hand-off; the control loop drains that slot once per tick and
//! turns the reading into a piston target.
//!
//! ```text
//! serial device -> SerialReader (thread) -> LatestSlot -> HardwareInput::tick -> Piston
//! ```

pub mod adapter;
pub mod error;
pub mod protocol;
pub mod reader;
pub mod slot;

pub use adapter::{HardwareInput, HardwareSettings, WarningGate};
pub use error::{HardwareError, HardwareResult};
pub use protocol::{PRESS_PREFIX, parse_press_line};
pub use reader::{LineSource, SerialPortSource, SerialReader, SerialSettings};
pub use slot::LatestSlot;
