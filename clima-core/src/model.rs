use serde::{Deserialize, Serialize};

use crate::error::ClimaError;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Body returned by every backend endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    pub weather: CurrentWeather,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<PayloadLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Celsius.
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadLocation {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl WeatherPayload {
    /// Parse a response body, rejecting payloads the presenter cannot render.
    pub fn from_json(body: &str) -> Result<Self, ClimaError> {
        let payload: WeatherPayload = serde_json::from_str(body)
            .map_err(|e| ClimaError::MalformedResponse(e.to_string()))?;
        payload.validated()
    }

    pub fn validated(self) -> Result<Self, ClimaError> {
        if !self.weather.temperature.is_finite() {
            return Err(ClimaError::MalformedResponse(format!(
                "weather.temperature is not finite: {}",
                self.weather.temperature
            )));
        }
        Ok(self)
    }

    /// Coordinates echoed back by the backend, if any.
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location.as_ref().map(|l| Coordinates::new(l.lat, l.lon))
    }
}
