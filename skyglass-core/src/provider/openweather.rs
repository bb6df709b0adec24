use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    WeatherError,
    model::{CurrentConditions, ForecastSample, QueryTarget},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Every request asks for metric units; presentation converts from there.
const UNITS: &str = "metric";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn query(&self, target: &QueryTarget) -> Vec<(&'static str, String)> {
        let mut params = match target {
            QueryTarget::City(name) => vec![("q", name.clone())],
            QueryTarget::Coordinates { latitude, longitude } => {
                vec![("lat", latitude.to_string()), ("lon", longitude.to_string())]
            }
        };
        params.push(("appid", self.api_key.clone()));
        params.push(("units", UNITS.to_string()));
        params
    }

    async fn get(&self, endpoint: &str, target: &QueryTarget) -> Result<String> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, %target, "requesting OpenWeather {endpoint}");

        let res = self
            .http
            .get(&url)
            .query(&self.query(target))
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {endpoint} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {endpoint} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }

    async fn current(&self, target: &QueryTarget) -> Result<CurrentConditions> {
        let body = self.get("weather", target).await?;

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        let condition = parsed
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OpenWeather current response contained no weather condition"))?;

        Ok(CurrentConditions {
            location_name: parsed.name,
            country: parsed.sys.country.unwrap_or_default(),
            description: condition.description,
            icon: condition.icon,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            visibility_m: parsed.visibility,
            pressure_hpa: parsed.main.pressure,
        })
    }

    async fn forecast(&self, target: &QueryTarget) -> Result<Vec<ForecastSample>> {
        let body = self.get("forecast", target).await?;

        let parsed: OwForecastResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather forecast JSON")?;

        parsed
            .list
            .into_iter()
            .map(|entry| {
                let timestamp = unix_to_utc(entry.dt)
                    .ok_or_else(|| anyhow!("Invalid forecast timestamp {}", entry.dt))?;
                let condition = entry.weather.into_iter().next().ok_or_else(|| {
                    anyhow!("OpenWeather forecast entry {} has no weather condition", entry.dt)
                })?;

                Ok(ForecastSample {
                    timestamp,
                    temperature_c: entry.main.temp,
                    description: condition.description,
                    icon: condition.icon,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, target: &QueryTarget) -> Result<CurrentConditions, WeatherError> {
        self.current(target).await.map_err(|err| {
            warn!(%target, "current conditions lookup failed: {err:#}");
            WeatherError::NotFound
        })
    }

    async fn fetch_forecast(
        &self,
        target: &QueryTarget,
    ) -> Result<Vec<ForecastSample>, WeatherError> {
        self.forecast(target).await.map_err(|err| {
            warn!(%target, "forecast lookup failed: {err:#}");
            WeatherError::Unavailable
        })
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn current_body() -> serde_json::Value {
        json!({
            "name": "Paris",
            "sys": { "country": "FR" },
            "weather": [{ "description": "light rain", "icon": "10d" }],
            "main": { "temp": 12.3, "feels_like": 11.1, "humidity": 81, "pressure": 1009 },
            "wind": { "speed": 5.5 },
            "visibility": 10000,
            "dt": 1792400000
        })
    }

    #[tokio::test]
    async fn fetch_current_by_city_sends_expected_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "New York"))
            .and(query_param("appid", "KEY"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &mock_server.uri());
        let current = provider
            .fetch_current(&QueryTarget::City("New York".into()))
            .await
            .unwrap();

        assert_eq!(current.location_name, "Paris");
        assert_eq!(current.country, "FR");
        assert_eq!(current.icon, "10d");
        assert_eq!(current.pressure_hpa, 1009);
        assert_eq!(current.visibility_m, Some(10000));
        assert_eq!(current.wind_speed_mps, 5.5);
    }

    #[tokio::test]
    async fn fetch_current_by_coordinates_sends_lat_lon() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "48.85"))
            .and(query_param("lon", "2.35"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &mock_server.uri());
        let target = QueryTarget::Coordinates { latitude: 48.85, longitude: 2.35 };

        assert!(provider.fetch_current(&target).await.is_ok());
    }

    #[tokio::test]
    async fn missing_visibility_is_tolerated() {
        let mock_server = MockServer::start().await;
        let mut body = current_body();
        body.as_object_mut().unwrap().remove("visibility");

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &mock_server.uri());
        let current = provider
            .fetch_current(&QueryTarget::City("Paris".into()))
            .await
            .unwrap();

        assert_eq!(current.visibility_m, None);
    }

    #[tokio::test]
    async fn non_success_current_maps_to_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "cod": "404", "message": "city not found" })),
            )
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &mock_server.uri());
        let err = provider
            .fetch_current(&QueryTarget::City("Atlantis".into()))
            .await
            .unwrap_err();

        assert_eq!(err, WeatherError::NotFound);
    }

    #[tokio::test]
    async fn malformed_current_maps_to_not_found() {
        let mock_server = MockServer::start().await;
        let mut body = current_body();
        body["weather"] = json!([]);

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &mock_server.uri());
        let err = provider
            .fetch_current(&QueryTarget::City("Paris".into()))
            .await
            .unwrap_err();

        assert_eq!(err, WeatherError::NotFound);
    }

    #[tokio::test]
    async fn fetch_forecast_parses_samples_in_order() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("q", "Paris"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cod": "200",
                "list": [
                    { "dt": 1792400400, "main": { "temp": 10.0 },
                      "weather": [{ "description": "clear sky", "icon": "01n" }] },
                    { "dt": 1792411200, "main": { "temp": 11.5 },
                      "weather": [{ "description": "few clouds", "icon": "02d" }] }
                ],
                "city": { "name": "Paris", "country": "FR" }
            })))
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &mock_server.uri());
        let samples = provider
            .fetch_forecast(&QueryTarget::City("Paris".into()))
            .await
            .unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].timestamp.timestamp(), 1792400400);
        assert_eq!(samples[1].description, "few clouds");
        assert_eq!(samples[1].icon, "02d");
    }

    #[tokio::test]
    async fn non_success_forecast_maps_to_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &mock_server.uri());
        let err = provider
            .fetch_forecast(&QueryTarget::City("Paris".into()))
            .await
            .unwrap_err();

        assert_eq!(err, WeatherError::Unavailable);
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn new_targets_the_public_api() {
        let provider = OpenWeatherProvider::new("KEY".into());
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn trailing_slash_in_base_url_is_dropped() {
        let provider = OpenWeatherProvider::with_base_url("KEY".into(), "http://localhost/");
        assert_eq!(provider.base_url, "http://localhost");
    }
}
