use thiserror::Error;

/// Failure categories of a weather lookup.
///
/// Transport errors, bad statuses and malformed bodies are all collapsed into
/// [`WeatherError::NotFound`] or [`WeatherError::Unavailable`]; the detail is
/// only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("no city name was entered")]
    EmptyInput,
    #[error("current conditions could not be retrieved")]
    NotFound,
    #[error("forecast data not available")]
    Unavailable,
    #[error("geolocation is not supported")]
    Unsupported,
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location request timed out")]
    Timeout,
}

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a city name.";
pub const UNSUPPORTED_MESSAGE: &str = "Geolocation is not supported on this device.";
pub const CITY_NOT_FOUND_MESSAGE: &str =
    "City not found. Please check the spelling and try again.";
pub const LOCATION_FAILED_MESSAGE: &str =
    "Unable to get your location. Please check your location permissions.";

/// Which user action started an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptKind {
    Search,
    Device,
}

impl AttemptKind {
    /// Fixed, human-readable message shown for a failed attempt.
    pub fn user_message(self, err: WeatherError) -> &'static str {
        match err {
            WeatherError::EmptyInput => EMPTY_INPUT_MESSAGE,
            WeatherError::Unsupported => UNSUPPORTED_MESSAGE,
            _ => match self {
                AttemptKind::Search => CITY_NOT_FOUND_MESSAGE,
                AttemptKind::Device => LOCATION_FAILED_MESSAGE,
            },
        }
    }
}
