// hk-core/src/units.rs

use uom::si::f64::{Area as UomArea, Length as UomLength, VolumeRate as UomVolumeRate};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Length = UomLength;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn m3ps(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_second;
    VolumeRate::new::<cubic_meter_per_second>(v)
}

/// US customary inputs used by the pipe calculator.
pub mod us {
    use super::*;

    /// One square foot in square meters.
    pub const FT2_TO_M2: f64 = 0.092_903_04;

    #[inline]
    pub fn inch(v: f64) -> Length {
        use uom::si::length::inch;
        Length::new::<inch>(v)
    }

    #[inline]
    pub fn microinch(v: f64) -> Length {
        inch(v * 1e-6)
    }

    /// US gallons per minute.
    #[inline]
    pub fn gpm(v: f64) -> VolumeRate {
        use uom::si::volume_rate::gallon_per_minute;
        VolumeRate::new::<gallon_per_minute>(v)
    }

    /// Kinematic viscosity given in ft²/s, returned in m²/s.
    #[inline]
    pub fn ft2ps_to_m2ps(v: f64) -> f64 {
        v * FT2_TO_M2
    }
}

pub mod constants {
    use super::*;

    pub const G0_MPS2: f64 = 9.806_65;

    /// Kinematic viscosity of water near room temperature (ft²/s).
    pub const WATER_NU_FT2PS: f64 = 1.1e-5;

    /// [`WATER_NU_FT2PS`] in m²/s.
    #[inline]
    pub fn water_nu_m2ps() -> f64 {
        us::ft2ps_to_m2ps(WATER_NU_FT2PS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn si_constructors() {
        assert_eq!(m(2.0).value, 2.0);
        assert_eq!(m3ps(1e-3).value, 1e-3);
        let area: Area = m(0.5) * m(0.2);
        assert!((area.value - 0.1).abs() < 1e-15);
    }

    #[test]
    fn us_customary_conversions() {
        assert!((us::inch(12.0).value - 0.3048).abs() < 1e-12);
        assert!((us::inch(1.0).value - 0.0254).abs() < 1e-12);
        assert!((us::microinch(1e6).value - 0.0254).abs() < 1e-12);
        // 1 gpm = 6.309e-5 m³/s
        assert!((us::gpm(1.0).value - 6.309_020e-5).abs() < 1e-9);
        assert!((constants::water_nu_m2ps() - 1.021_933_44e-6).abs() < 1e-15);
    }
}
