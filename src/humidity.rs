//! Absolute humidity compensation.
//!
//! The SGP30 compensates its readings for humidity when given the absolute
//! humidity of the air as an 8.8 fixed-point number of g/m³. Most setups only
//! have a temperature and relative humidity sensor, so the conversion below
//! uses the Magnus approximation of the saturation vapour pressure from the
//! SGP30 datasheet (section 3.16).

use libm::{expf, truncf};

/// Absolute humidity in g/m³ for the given temperature and relative humidity.
pub fn absolute_humidity(temp_celsius: f32, rh_percent: f32) -> f32 {
    rh_percent / 100.0 * 6.112 * expf(17.62 * temp_celsius / (243.12 + temp_celsius))
        / (273.15 + temp_celsius)
        * 216.7
}

/// Encodes the absolute humidity for `set_absolute_humidity`: whole g/m³ in
/// the high byte, the fraction in 1/256ths (truncated) in the low byte.
///
/// Returns `None` when the result is not representable, e.g. for non-finite
/// inputs, negative humidity or more than 255 g/m³.
pub fn to_register(temp_celsius: f32, rh_percent: f32) -> Option<u16> {
    let humidity = absolute_humidity(temp_celsius, rh_percent);
    if !humidity.is_finite() || !(0.0..256.0).contains(&humidity) {
        return None;
    }

    let whole = truncf(humidity);
    let fraction = (humidity - whole) * 256.0;

    Some((whole as u16) << 8 | fraction as u16)
}
