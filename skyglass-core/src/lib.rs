//! Core library for the `skyglass` weather client.
//!
//! This crate defines:
//! - Configuration handling
//! - Abstraction over weather providers (live OpenWeatherMap and a simulated demo feed)
//! - Location resolution, forecast bucketing and location memory
//! - The orchestration context that drives view state
//!
//! It is used by `skyglass-cli`, but any surface implementing [`Presenter`]
//! can drive it.

pub mod app;
pub mod config;
pub mod error;
pub mod forecast;
pub mod location;
pub mod memory;
pub mod model;
pub mod provider;
pub mod view;

pub use app::{Attempt, WeatherApp, fetch_weather};
pub use config::{Config, DeviceConfig};
pub use error::{AttemptKind, WeatherError};
pub use location::{DeviceLocator, Geolocator, StaticGeolocator};
pub use memory::{FileStore, KeyValueStore, LocationMemory, MemoryStore};
pub use model::{
    CurrentConditions, DailyForecastEntry, ForecastSample, QueryTarget, StoredLocation, ViewState,
};
pub use provider::{ProviderId, WeatherProvider};
pub use view::Presenter;
