//! Display-ready text for current conditions and forecast entries.

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::{CurrentConditions, DailyForecastEntry, ViewState};

const ICON_URL_PREFIX: &str = "https://openweathermap.org/img/wn/";
const NOT_AVAILABLE: &str = "N/A";

/// A surface that shows the current [`ViewState`].
pub trait Presenter {
    fn render(&mut self, state: &ViewState);
}

pub fn icon_url(icon: &str) -> String {
    format!("{ICON_URL_PREFIX}{icon}@2x.png")
}

/// Nearest integer, with exact halves going towards positive infinity.
fn round_half_up(value: f64) -> i64 {
    let rounded = value.round();
    // `round` sends negative halves away from zero.
    let rounded = if value - rounded == 0.5 { rounded + 1.0 } else { rounded };
    rounded as i64
}

pub fn round_temperature(celsius: f64) -> i64 {
    round_half_up(celsius)
}

/// m/s to whole km/h.
pub fn wind_speed_kmh(mps: f64) -> i64 {
    round_half_up(mps * 3.6)
}

/// Metres to kilometres with one decimal; ties go up.
pub fn visibility_km(metres: u32) -> String {
    let tenths = (f64::from(metres) / 100.0).round();
    format!("{:.1}", tenths / 10.0)
}

pub fn format_date_time(at: NaiveDateTime) -> String {
    at.format("%A, %B %-d, %Y at %I:%M %p").to_string()
}

pub fn format_forecast_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentView {
    pub city: String,
    pub country: String,
    pub date_time: String,
    pub icon_url: String,
    pub temperature: String,
    pub description: String,
    pub feels_like: String,
    pub humidity: String,
    pub wind_speed: String,
    pub visibility: String,
    pub pressure: String,
    pub uv_index: String,
}

impl CurrentView {
    pub fn new(current: &CurrentConditions, shown_at: NaiveDateTime) -> Self {
        Self {
            city: current.location_name.clone(),
            country: current.country.clone(),
            date_time: format_date_time(shown_at),
            icon_url: icon_url(&current.icon),
            temperature: round_temperature(current.temperature_c).to_string(),
            description: current.description.clone(),
            feels_like: format!("{}°C", round_temperature(current.feels_like_c)),
            humidity: format!("{}%", current.humidity_pct),
            wind_speed: format!("{} km/h", wind_speed_kmh(current.wind_speed_mps)),
            visibility: current
                .visibility_m
                .map(|m| format!("{} km", visibility_km(m)))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            pressure: format!("{} hPa", current.pressure_hpa),
            // The current-conditions endpoint carries no UV data.
            uv_index: NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastView {
    pub date: String,
    pub icon_url: String,
    pub temperature: String,
    pub description: String,
}

impl From<&DailyForecastEntry> for ForecastView {
    fn from(entry: &DailyForecastEntry) -> Self {
        Self {
            date: format_forecast_date(entry.date),
            icon_url: icon_url(&entry.icon),
            temperature: format!("{}°C", round_temperature(entry.temperature_c)),
            description: entry.description.clone(),
        }
    }
}
