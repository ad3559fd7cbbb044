use serde::{Deserialize, Serialize};

/// Unit of the calculated absolute humidity.
pub const UNIT: &str = "g/m³";

/// Input of a humidity calculation.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CalculationRequest {
    /// Temperature in degree celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

/// Outcome of a humidity calculation, echoing the inputs.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationResult {
    /// Absolute humidity in grams per cubic meter of air.
    pub absolute_humidity: f64,
    /// Temperature in degree celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    pub unit: &'static str,
}

impl CalculationResult {
    pub fn new(absolute_humidity: f64, request: CalculationRequest) -> Self {
        CalculationResult {
            absolute_humidity,
            temperature: request.temperature,
            humidity: request.humidity,
            unit: UNIT,
        }
    }
}

/// Static liveness payload of the health endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        HealthResponse { status: "healthy" }
    }
}

/// Error payload returned by the JSON endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
        }
    }
}
