use crate::{
    Config, CurrentConditions, ForecastSample, QueryTarget, WeatherError,
    provider::{openweather::OpenWeatherProvider, simulated::SimulatedProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};

pub mod openweather;
pub mod simulated;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Live,
    Simulated,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Live => "live",
            ProviderId::Simulated => "simulated",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Live, ProviderId::Simulated]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "live" => Ok(ProviderId::Live),
            "simulated" | "demo" => Ok(ProviderId::Simulated),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: live, simulated."
            )),
        }
    }
}

/// Source of current conditions and the 5-day/3-hour forecast feed.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, target: &QueryTarget) -> Result<CurrentConditions, WeatherError>;

    async fn fetch_forecast(
        &self,
        target: &QueryTarget,
    ) -> Result<Vec<ForecastSample>, WeatherError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let provider: Arc<dyn WeatherProvider> = match id {
        ProviderId::Live => {
            let api_key = config.api_key.as_deref().ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for the live provider.\n\
                     Hint: run `skyglass configure` and enter your OpenWeatherMap API key, \
                     or pass `--demo`."
                )
            })?;
            let provider = match config.base_url.as_deref() {
                Some(base_url) => OpenWeatherProvider::with_base_url(api_key.to_owned(), base_url),
                None => OpenWeatherProvider::new(api_key.to_owned()),
            };
            Arc::new(provider)
        }
        ProviderId::Simulated => Arc::new(SimulatedProvider::new()),
    };

    Ok(provider)
}

/// Construct the provider selected by `provider` in config, falling back to
/// demo mode when no API key is present.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let id = config.provider_id()?;
    tracing::info!(provider = %id, "selected weather provider");
    provider_from_config(id, config)
}
