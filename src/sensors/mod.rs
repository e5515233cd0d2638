//! Hardware sources.
//!
//! The drivers themselves come from the `pms-7003` and `bme680` crates and are only
//! built with the `linux` feature; this module adapts them to [`SampleSource`].
//!
//! [`SampleSource`]: crate::source::SampleSource

#[cfg(feature = "linux")]
mod bme;
#[cfg(feature = "linux")]
mod pms;

#[cfg(feature = "linux")]
pub use {bme::Bme680Source, pms::Pm25Uart};

/// Standard sea-level pressure, hPa.
pub const SEA_LEVEL_HPA: f64 = 1013.25;

/// Altitude in metres for `pressure_hpa`, given the local sea-level pressure.
///
/// International barometric formula, as used by the BME680 reference drivers.
#[must_use]
pub fn altitude_m(pressure_hpa: f64, sea_level_hpa: f64) -> f64 {
    44_330.0 * (1.0 - (pressure_hpa / sea_level_hpa).powf(0.1903))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn altitude_is_zero_at_sea_level() {
        assert!(altitude_m(SEA_LEVEL_HPA, SEA_LEVEL_HPA).abs() < 1e-9);
    }

    #[test]
    fn altitude_grows_as_pressure_drops() {
        let alt = altitude_m(900.0, SEA_LEVEL_HPA);
        assert!((980.0..1000.0).contains(&alt), "{alt}");
        assert!(altitude_m(1020.0, SEA_LEVEL_HPA) < 0.0);
    }
}
