// gl-core/src/units.rs

use uom::si::f64::{Pressure as UomPressure, Volume as UomVolume};

// Public canonical unit types (SI, f64)
pub type Pressure = UomPressure;
pub type Volume = UomVolume;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn atm(v: f64) -> Pressure {
    use uom::si::pressure::atmosphere;
    Pressure::new::<atmosphere>(v)
}

#[inline]
pub fn cm3(v: f64) -> Volume {
    use uom::si::volume::cubic_centimeter;
    Volume::new::<cubic_centimeter>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

/// Display-unit conversions used at the calculator boundary.
pub mod convert {
    use super::*;
    use uom::si::{
        pressure::{atmosphere, pascal},
        volume::{cubic_centimeter, cubic_meter},
    };

    #[inline]
    pub fn cm3_to_m3(v_cm3: f64) -> f64 {
        cm3(v_cm3).get::<cubic_meter>()
    }

    #[inline]
    pub fn m3_to_cm3(v_m3: f64) -> f64 {
        m3(v_m3).get::<cubic_centimeter>()
    }

    #[inline]
    pub fn atm_to_pa(p_atm: f64) -> f64 {
        atm(p_atm).get::<pascal>()
    }

    #[inline]
    pub fn pa_to_atm(p_pa: f64) -> f64 {
        pa(p_pa).get::<atmosphere>()
    }
}

pub mod constants {
    /// Molar gas constant R [J/(mol K)].
    pub const GAS_CONSTANT_J_PER_MOL_K: f64 = 8.314;

    /// One standard atmosphere [Pa].
    pub const STANDARD_ATMOSPHERE_PA: f64 = 101_325.0;
}
