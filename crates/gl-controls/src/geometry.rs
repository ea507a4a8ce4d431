//! Cylinder geometry: piston height to gas volume.
//!
//! Volume is `pi * r^2 * max(0, piston_world_y - container_bottom_y) * scale`.
//! The scale factor turns scene units into the cm^3 range shown to students.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Scene-unit to cm^3 scale used by the reference apparatus.
pub const DEFAULT_SCALE_FACTOR: f64 = 3000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PistonGeometry {
    /// Container radius (scene units).
    pub radius: f64,
    /// World Y of the container floor.
    pub container_bottom_y: f64,
    /// World Y of the piston's local origin; world = mount + local.
    pub mount_y: f64,
    /// Multiplier from scene volume to cm^3.
    pub scale_factor: f64,
}

impl Default for PistonGeometry {
    fn default() -> Self {
        Self {
            radius: 2.0,
            container_bottom_y: 1.097,
            mount_y: 0.9,
            scale_factor: DEFAULT_SCALE_FACTOR,
        }
    }
}

impl PistonGeometry {
    /// Create a geometry, rejecting non-finite values and radii below 0.01.
    pub fn new(
        radius: f64,
        container_bottom_y: f64,
        mount_y: f64,
        scale_factor: f64,
    ) -> ControlResult<Self> {
        let geometry = Self {
            radius,
            container_bottom_y,
            mount_y,
            scale_factor,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> ControlResult<()> {
        if ![self.radius, self.container_bottom_y, self.mount_y, self.scale_factor]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ControlError::Geometry {
                what: "geometry values must be finite",
            });
        }
        if self.radius < 0.01 {
            return Err(ControlError::Geometry {
                what: "radius must be at least 0.01",
            });
        }
        if self.scale_factor <= 0.0 {
            return Err(ControlError::Geometry {
                what: "scale_factor must be positive",
            });
        }
        Ok(())
    }

    /// `pi * r^2 * scale`: cm^3 per unit of piston height.
    pub fn volume_per_height(&self) -> f64 {
        PI * self.radius.powi(2) * self.scale_factor
    }

    pub fn local_to_world(&self, local_y: f64) -> f64 {
        self.mount_y + local_y
    }

    pub fn world_to_local(&self, world_y: f64) -> f64 {
        world_y - self.mount_y
    }

    /// Gas volume [cm^3] with the piston face at `world_y`.
    pub fn volume_at_world_y(&self, world_y: f64) -> f64 {
        let height = (world_y - self.container_bottom_y).max(0.0);
        self.volume_per_height() * height
    }

    pub fn volume_at_local_y(&self, local_y: f64) -> f64 {
        self.volume_at_world_y(self.local_to_world(local_y))
    }

    /// World Y at which the piston encloses `volume_cm3`.
    ///
    /// A degenerate cross-section maps every volume to the container floor;
    /// negative volumes also map to the floor.
    pub fn world_y_for_volume(&self, volume_cm3: f64) -> f64 {
        let denominator = self.volume_per_height();
        let height = if denominator.abs() < f64::EPSILON {
            0.0
        } else {
            (volume_cm3 / denominator).max(0.0)
        };
        self.container_bottom_y + height
    }

    pub fn local_y_for_volume(&self, volume_cm3: f64) -> f64 {
        self.world_to_local(self.world_y_for_volume(volume_cm3))
    }
}

/// Piston travel range in local Y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelLimits {
    pub min_local_y: f64,
    pub max_local_y: f64,
}

impl Default for TravelLimits {
    fn default() -> Self {
        Self {
            min_local_y: 0.35,
            max_local_y: 0.5,
        }
    }
}

impl TravelLimits {
    pub fn new(min_local_y: f64, max_local_y: f64) -> ControlResult<Self> {
        if !min_local_y.is_finite() || !max_local_y.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "travel limits must be finite",
            });
        }
        if min_local_y > max_local_y {
            return Err(ControlError::Limits {
                min: min_local_y,
                max: max_local_y,
            });
        }
        Ok(Self {
            min_local_y,
            max_local_y,
        })
    }

    pub fn clamp(&self, local_y: f64) -> f64 {
        local_y.clamp(self.min_local_y, self.max_local_y)
    }

    pub fn span(&self) -> f64 {
        self.max_local_y - self.min_local_y
    }
}
