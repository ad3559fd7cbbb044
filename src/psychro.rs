//! ASHRAE psychrometric relations used by the library-style calculation
//! strategy.
//!
//! Saturation vapor pressure comes from the Hyland-Wexler correlation of
//! the ASHRAE Handbook of Fundamentals. The liquid-water coefficients are
//! used over the whole temperature range (supercooled water below 0 °C),
//! matching what the Magnus approximation models.

/// Hyland-Wexler coefficients for saturation pressure over liquid water.
const C8: f64 = -5.800_220_6e3;
const C9: f64 = 1.391_499_3;
const C10: f64 = -4.864_023_9e-2;
const C11: f64 = 4.176_476_8e-5;
const C12: f64 = -1.445_209_3e-8;
const C13: f64 = 6.545_967_3;

/// Ratio of the molar masses of water and dry air.
const MASS_RATIO: f64 = 0.621_945;
/// Specific gas constant of dry air in J/(kg·K).
const DRY_AIR_GAS_CONSTANT: f64 = 287.042;
/// Standard atmospheric pressure at sea level in Pa.
const STANDARD_PRESSURE_PA: f64 = 101_325.0;
const KELVIN_OFFSET: f64 = 273.15;

/// Saturation vapor pressure over liquid water in Pa.
pub fn saturation_vapor_pressure(temperature: f64) -> f64 {
    let t = temperature + KELVIN_OFFSET;
    (C8 / t + C9 + C10 * t + C11 * t * t + C12 * t * t * t + C13 * t.ln()).exp()
}

/// Humidity ratio in kg of water vapor per kg of dry air.
///
/// `humidity` is the relative humidity in percent, `pressure` the total
/// pressure of the moist air in Pa.
pub fn humidity_ratio(temperature: f64, humidity: f64, pressure: f64) -> f64 {
    let vapor_pressure = (humidity / 100.0) * saturation_vapor_pressure(temperature);
    MASS_RATIO * vapor_pressure / (pressure - vapor_pressure)
}

/// Specific volume of moist air in m³ per kg of dry air, from the ideal
/// gas law.
pub fn moist_air_volume(temperature: f64, humidity_ratio: f64, pressure: f64) -> f64 {
    DRY_AIR_GAS_CONSTANT * (temperature + KELVIN_OFFSET) * (1.0 + humidity_ratio / MASS_RATIO)
        / pressure
}

/// Absolute humidity in g/m³ at sea-level pressure.
///
/// The humidity ratio relates vapor mass to dry air mass while the specific
/// volume relates moist air volume to dry air mass, so their quotient is
/// the vapor mass per volume of moist air.
pub fn absolute_humidity(temperature: f64, humidity: f64) -> f64 {
    let ratio = humidity_ratio(temperature, humidity, STANDARD_PRESSURE_PA);
    let volume = moist_air_volume(temperature, ratio, STANDARD_PRESSURE_PA);

    ratio / volume * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturation_pressure_matches_ashrae_tables() {
        // table values in Pa from the ASHRAE Handbook of Fundamentals
        let cases = [(0.0, 611.2), (25.0, 3169.7), (50.0, 12351.3)];
        for (temp, expected) in cases {
            let pressure = saturation_vapor_pressure(temp);
            assert!(
                (pressure - expected).abs() / expected < 0.003,
                "saturation pressure at {} °C: expected ~{}, got {}",
                temp,
                expected,
                pressure
            );
        }
    }

    #[test]
    fn supercooled_water_below_freezing() {
        // liquid-water extrapolation, not the ice correlation
        let pressure = saturation_vapor_pressure(-20.0);
        assert!((pressure - 125.6).abs() < 3.0);
    }

    #[test]
    fn humidity_ratio_at_room_conditions() {
        let ratio = humidity_ratio(25.0, 60.0, STANDARD_PRESSURE_PA);
        assert!((ratio - 0.0119).abs() < 5e-4);
    }

    #[test]
    fn dry_air_has_zero_humidity_ratio() {
        assert_eq!(humidity_ratio(25.0, 0.0, STANDARD_PRESSURE_PA), 0.0);
    }

    #[test]
    fn moist_air_is_lighter_than_dry_air() {
        let dry = moist_air_volume(25.0, 0.0, STANDARD_PRESSURE_PA);
        let moist = moist_air_volume(25.0, 0.0119, STANDARD_PRESSURE_PA);
        assert!(moist > dry);
    }

    #[test]
    fn absolute_humidity_at_room_conditions() {
        let value = absolute_humidity(25.0, 60.0);
        assert!((value - 13.82).abs() < 0.1);
    }
}
