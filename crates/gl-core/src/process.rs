//! Experiment process type.
//!
//! The process type selects which of pressure, volume and temperature is held
//! fixed. It is shared by the actuator guard, the hardware adapter and the
//! coordinator, so it lives in the foundation crate.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ProcessType {
    /// No process selected. Initial and reset state.
    #[default]
    None,
    /// Temperature fixed; volume free; pressure derived.
    Isothermal,
    /// Pressure fixed; volume read from the piston; temperature derived.
    Isobaric,
    /// Volume fixed; temperature settable; pressure derived.
    Isochoric,
}

impl ProcessType {
    pub const ALL: [ProcessType; 4] = [
        ProcessType::None,
        ProcessType::Isothermal,
        ProcessType::Isobaric,
        ProcessType::Isochoric,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            Self::None => 0,
            Self::Isothermal => 1,
            Self::Isobaric => 2,
            Self::Isochoric => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Isothermal => "isothermal",
            Self::Isobaric => "isobaric",
            Self::Isochoric => "isochoric",
        }
    }

    /// Manual and gesture volume control is enabled only here.
    pub fn permits_manual_input(self) -> bool {
        matches!(self, Self::Isothermal | Self::Isobaric)
    }

    /// Processes whose experiment logic may position the piston regardless
    /// of the active control mode.
    pub fn overrides_actuator_guard(self) -> bool {
        matches!(self, Self::Isochoric | Self::Isobaric)
    }

    /// Hardware presses are turned into piston motion only here.
    pub fn permits_hardware_input(self) -> bool {
        !matches!(self, Self::None | Self::Isochoric)
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
