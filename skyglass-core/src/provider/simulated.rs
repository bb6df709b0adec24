//! Demo-mode provider: canned current conditions and a randomised forecast.
//!
//! Coordinate lookups ignore the coordinates and are labelled
//! "Current Location".

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::time::sleep;
use tracing::debug;

use crate::{
    WeatherError,
    model::{CurrentConditions, ForecastSample, QueryTarget},
};

use super::WeatherProvider;

const CURRENT_LOCATION_LABEL: &str = "Current Location";
const SAMPLE_COUNT: i64 = 40;
const SAMPLE_INTERVAL_HOURS: i64 = 3;
const CONDITIONS: [(&str, &str); 5] = [
    ("Sunny", "01d"),
    ("Partly cloudy", "02d"),
    ("Cloudy", "03d"),
    ("Light rain", "04d"),
    ("Clear", "10d"),
];

#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    current_delay: Duration,
    forecast_delay: Duration,
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedProvider {
    pub fn new() -> Self {
        Self::with_delays(Duration::from_millis(1000), Duration::from_millis(500))
    }

    pub fn with_delays(current_delay: Duration, forecast_delay: Duration) -> Self {
        Self { current_delay, forecast_delay }
    }
}

fn label(target: &QueryTarget) -> &str {
    match target {
        QueryTarget::City(name) => name,
        QueryTarget::Coordinates { .. } => CURRENT_LOCATION_LABEL,
    }
}

fn random_samples(start: DateTime<Utc>) -> Vec<ForecastSample> {
    let mut rng = rand::thread_rng();

    (0..SAMPLE_COUNT)
        .map(|i| {
            let (description, icon) = CONDITIONS[rng.gen_range(0..CONDITIONS.len())];
            ForecastSample {
                timestamp: start + chrono::Duration::hours(i * SAMPLE_INTERVAL_HOURS),
                temperature_c: rng.gen_range(20.0..30.0),
                description: description.to_string(),
                icon: icon.to_string(),
            }
        })
        .collect()
}

#[async_trait]
impl WeatherProvider for SimulatedProvider {
    async fn fetch_current(&self, target: &QueryTarget) -> Result<CurrentConditions, WeatherError> {
        sleep(self.current_delay).await;
        debug!(%target, "serving simulated current conditions");

        Ok(CurrentConditions {
            location_name: label(target).to_string(),
            country: "Demo".to_string(),
            description: "Partly cloudy".to_string(),
            icon: "02d".to_string(),
            temperature_c: 22.0,
            feels_like_c: 24.0,
            humidity_pct: 65,
            wind_speed_mps: 5.5,
            visibility_m: Some(10_000),
            pressure_hpa: 1013,
        })
    }

    async fn fetch_forecast(
        &self,
        target: &QueryTarget,
    ) -> Result<Vec<ForecastSample>, WeatherError> {
        sleep(self.forecast_delay).await;
        debug!(%target, "serving simulated forecast");

        Ok(random_samples(Utc::now()))
    }
}
