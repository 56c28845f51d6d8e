use thiserror::Error;

pub const UNSUPPORTED_MESSAGE: &str =
    "Geolocation is not supported on this system. Please try searching for a city.";
pub const DENIED_MESSAGE: &str = "Unable to get your location. Please try searching for a city.";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch weather data";

/// Every failure a fetch cycle can end in.
#[derive(Debug, Error)]
pub enum ClimaError {
    #[error("geolocation is not available on this system")]
    GeolocationUnsupported,

    #[error("geolocation failed: {0}")]
    GeolocationDenied(String),

    /// Non-success status, transport failure, or a request that could not be
    /// built. The status is kept for logs only.
    #[error(
        "weather request failed{}",
        .status.map(|s| format!(" with status {s}")).unwrap_or_default()
    )]
    FetchFailed { status: Option<u16> },

    #[error("malformed weather payload: {0}")]
    MalformedResponse(String),
}

impl ClimaError {
    /// Text shown to the user in the error view.
    pub fn user_message(&self) -> String {
        match self {
            ClimaError::GeolocationUnsupported => UNSUPPORTED_MESSAGE.to_string(),
            ClimaError::GeolocationDenied(_) => DENIED_MESSAGE.to_string(),
            ClimaError::FetchFailed { .. } | ClimaError::MalformedResponse(_) => {
                FETCH_FAILED_MESSAGE.to_string()
            }
        }
    }

    /// Whether the error view should point the user at manual entry.
    pub fn suggests_manual_entry(&self) -> bool {
        matches!(
            self,
            ClimaError::GeolocationUnsupported | ClimaError::GeolocationDenied(_)
        )
    }
}

impl From<reqwest::Error> for ClimaError {
    fn from(err: reqwest::Error) -> Self {
        ClimaError::FetchFailed {
            status: err.status().map(|s| s.as_u16()),
        }
    }
}
