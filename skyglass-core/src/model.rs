use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subject of a weather lookup: a place name or explicit coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryTarget {
    City(String),
    Coordinates { latitude: f64, longitude: f64 },
}

impl std::fmt::Display for QueryTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryTarget::City(name) => f.write_str(name),
            QueryTarget::Coordinates { latitude, longitude } => {
                write!(f, "{latitude:.4},{longitude:.4}")
            }
        }
    }
}

/// Current conditions in provider (metric) units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country: String,
    pub description: String,
    pub icon: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    /// Metres; some stations do not report it.
    pub visibility_m: Option<u32>,
    pub pressure_hpa: u32,
}

/// One 3-hour interval of the provider's forecast feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub description: String,
    pub icon: String,
}

/// Representative forecast for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    pub date: NaiveDate,
    pub temperature_c: f64,
    pub description: String,
    pub icon: String,
}

/// The single persisted record: the last successfully resolved place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLocation {
    pub city: String,
    pub country: String,
}

/// Mutually exclusive presentation modes.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Welcome,
    Loading,
    Weather {
        current: CurrentConditions,
        forecast: Vec<DailyForecastEntry>,
        /// Local wall-clock time the result was shown at.
        shown_at: NaiveDateTime,
    },
    Error(String),
}
