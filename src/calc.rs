use crate::psychro;
use std::fmt;
use thiserror::Error;

/// Coefficients of the Magnus approximation for saturation vapor pressure.
const MAGNUS_A: f64 = 17.67;
const MAGNUS_B: f64 = 243.5;
/// Saturation vapor pressure at 0 °C in hPa.
const MAGNUS_C: f64 = 6.112;

/// Molar mass of water in g/mol.
const WATER_MOLAR_MASS: f64 = 18.016;
/// Universal gas constant in J/(kmol·K).
const GAS_CONSTANT: f64 = 8314.5;
/// Absolute zero in degree celsius.
const ABSOLUTE_ZERO_C: f64 = -273.15;

/// A validation or computation failure of the humidity calculator.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CalcError {
    #[error("relative humidity must be between 0 % and 100 %, got {0}")]
    InvalidHumidityRange(f64),
    #[error("temperature must be a finite value above -273.15 °C, got {0}")]
    InvalidTemperature(f64),
    #[error("the calculation is not defined at {0} °C")]
    SingularCalculation(f64),
}

/// How the saturation vapor pressure and the conversion to absolute
/// humidity are carried out.
///
/// Both strategies take the same inputs, honor the same validation rules
/// and agree closely over the meteorological range, so callers can treat
/// them as interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Closed-form Magnus approximation combined with the ideal gas law.
    ///
    /// The formula from [here](https://carnotcycle.wordpress.com/2012/08/04/how-to-convert-relative-humidity-to-absolute-humidity/)
    /// is supposedly accurate to within 0.1% over the temperature range
    /// -30°C to +35°C.
    Magnus,
    /// Humidity-ratio conversion via the ASHRAE psychrometric relations.
    Psychrometric,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Magnus => write!(f, "magnus"),
            Strategy::Psychrometric => write!(f, "psychrometric"),
        }
    }
}

/// Calculates absolute humidity from temperature and relative humidity.
///
/// The calculator is stateless apart from the strategy chosen at
/// construction time and may be shared freely between callers.
#[derive(Debug, Clone, Copy)]
pub struct HumidityCalculator {
    strategy: Strategy,
}

impl HumidityCalculator {
    pub fn new(strategy: Strategy) -> Self {
        HumidityCalculator { strategy }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Returns the absolute humidity in g/m³, rounded to 2 decimal places.
    ///
    /// Temperature in degree celsius, relative humidity in percent.
    pub fn calculate(&self, temperature: f64, humidity: f64) -> Result<f64, CalcError> {
        if !(0.0..=100.0).contains(&humidity) {
            return Err(CalcError::InvalidHumidityRange(humidity));
        }
        if !temperature.is_finite() || temperature <= ABSOLUTE_ZERO_C {
            return Err(CalcError::InvalidTemperature(temperature));
        }
        // Magnus has a pole at -243.5 °C; both strategies reject it so they
        // remain interchangeable.
        if temperature + MAGNUS_B == 0.0 {
            return Err(CalcError::SingularCalculation(temperature));
        }

        let raw = match self.strategy {
            Strategy::Magnus => magnus_absolute_humidity(temperature, humidity),
            Strategy::Psychrometric => psychro::absolute_humidity(temperature, humidity),
        };

        // Just below the pole the Magnus exponent overflows, and past the
        // boiling point the humidity-ratio denominator changes sign.
        if !raw.is_finite() || raw < 0.0 {
            return Err(CalcError::SingularCalculation(temperature));
        }

        Ok((raw * 100.0).round() / 100.0)
    }
}

/// Calculates the absolute humidity in g/m³ from the temperature and
/// relative humidity using the Magnus approximation.
fn magnus_absolute_humidity(temperature: f64, humidity: f64) -> f64 {
    // saturation vapor pressure in hPa, converted to Pa
    let saturation = MAGNUS_C * ((MAGNUS_A * temperature) / (temperature + MAGNUS_B)).exp();
    let vapor_pressure = (humidity / 100.0) * saturation * 100.0;
    let kelvin = temperature - ABSOLUTE_ZERO_C;

    vapor_pressure * WATER_MOLAR_MASS / (GAS_CONSTANT * kelvin) * 1000.0
}
