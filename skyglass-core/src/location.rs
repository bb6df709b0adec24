//! Turns user input or a device fix into a [`QueryTarget`].

use std::{fmt::Debug, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::{QueryTarget, WeatherError};

/// A single geolocation fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub acquired_at: DateTime<Utc>,
}

/// Options handed to the device capability for one acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix that is still acceptable.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(5 * 60),
        }
    }
}

/// Device geolocation capability.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(&self, options: &PositionOptions) -> Result<Position, WeatherError>;
}

/// Geolocator that always reports one configured position.
#[derive(Debug, Clone, Copy)]
pub struct StaticGeolocator {
    latitude: f64,
    longitude: f64,
}

impl StaticGeolocator {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

#[async_trait]
impl Geolocator for StaticGeolocator {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Position, WeatherError> {
        Ok(Position {
            latitude: self.latitude,
            longitude: self.longitude,
            acquired_at: Utc::now(),
        })
    }
}

/// Resolve typed input into a city target.
pub fn resolve_from_text(input: &str) -> Result<QueryTarget, WeatherError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(WeatherError::EmptyInput);
    }
    Ok(QueryTarget::City(trimmed.to_string()))
}

/// Resolves device position, reusing the last fix while it is fresh enough.
#[derive(Debug, Clone)]
pub struct DeviceLocator {
    geolocator: Option<Arc<dyn Geolocator>>,
    options: PositionOptions,
    last_fix: Option<Position>,
}

impl DeviceLocator {
    pub fn new(geolocator: Option<Arc<dyn Geolocator>>) -> Self {
        Self::with_options(geolocator, PositionOptions::default())
    }

    pub fn with_options(geolocator: Option<Arc<dyn Geolocator>>, options: PositionOptions) -> Self {
        Self { geolocator, options, last_fix: None }
    }

    /// Whether a geolocation capability is present at all.
    pub fn is_supported(&self) -> bool {
        self.geolocator.is_some()
    }

    pub async fn resolve(&mut self) -> Result<QueryTarget, WeatherError> {
        let geolocator = self.geolocator.as_ref().ok_or(WeatherError::Unsupported)?;

        let now = Utc::now();
        let maximum_age = self.options.maximum_age;
        if let Some(fix) = self.last_fix.filter(|fix| is_fresh(fix, now, maximum_age)) {
            debug!(acquired_at = %fix.acquired_at, "reusing cached position");
            return Ok(target_of(&fix));
        }

        let request = geolocator.current_position(&self.options);
        let fix = tokio::time::timeout(self.options.timeout, request)
            .await
            .map_err(|_| {
                warn!(timeout = ?self.options.timeout, "position request timed out");
                WeatherError::Timeout
            })??;

        self.last_fix = Some(fix);
        Ok(target_of(&fix))
    }
}

fn is_fresh(fix: &Position, now: DateTime<Utc>, maximum_age: Duration) -> bool {
    (now - fix.acquired_at)
        .to_std()
        .map(|age| age <= maximum_age)
        // A fix stamped in the future counts as fresh.
        .unwrap_or(true)
}

fn target_of(fix: &Position) -> QueryTarget {
    QueryTarget::Coordinates { latitude: fix.latitude, longitude: fix.longitude }
}

/// One-shot device resolution with default options and no fix cache.
pub async fn resolve_from_device(
    geolocator: Option<Arc<dyn Geolocator>>,
) -> Result<QueryTarget, WeatherError> {
    DeviceLocator::new(geolocator).resolve().await
}
