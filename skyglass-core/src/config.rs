use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    location::{Geolocator, StaticGeolocator},
    provider::ProviderId,
};

/// Position reported as the device location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub latitude: f64,
    pub longitude: f64,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Optional provider id, "live" or "simulated".
    pub provider: Option<String>,

    /// OpenWeatherMap API key used by the live provider.
    pub api_key: Option<String>,

    /// Overrides the OpenWeatherMap base URL.
    pub base_url: Option<String>,

    /// Example TOML:
    /// [device]
    /// latitude = 48.85
    /// longitude = 2.35
    pub device: Option<DeviceConfig>,
}

impl Config {
    /// Explicit provider if set, otherwise live when a key is present and
    /// demo mode when it is not.
    pub fn provider_id(&self) -> Result<ProviderId> {
        match &self.provider {
            Some(s) => ProviderId::try_from(s.as_str()),
            None if self.api_key.is_some() => Ok(ProviderId::Live),
            None => Ok(ProviderId::Simulated),
        }
    }

    pub fn set_provider(&mut self, id: ProviderId) {
        self.provider = Some(id.as_str().to_string());
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// The device geolocation capability, absent unless `[device]` is set.
    pub fn geolocator(&self) -> Option<Arc<dyn Geolocator>> {
        self.device.map(|d| {
            Arc::new(StaticGeolocator::new(d.latitude, d.longitude)) as Arc<dyn Geolocator>
        })
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Some(p) = &cfg.provider {
            ProviderId::try_from(p.as_str()).with_context(|| {
                format!(
                    "Invalid `provider` in {}.\nHint: run `skyglass configure`.",
                    path.display()
                )
            })?;
        }

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skyglass", "skyglass")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
