//! Remembers the last successfully resolved location.

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::{
    collections::BTreeMap,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::{info, warn};

use crate::model::StoredLocation;

/// Key the location record is stored under.
pub const LAST_LOCATION_KEY: &str = "lastLocation";

/// Flat string key-value persistence.
pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Store backed by a single JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skyglass", "skyglass")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(dirs.data_dir().join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read storage file: {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse storage file: {}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all().unwrap_or_else(|err| {
            warn!("discarding unreadable storage file: {err:#}");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create storage directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(&entries).context("Failed to serialize storage")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write storage file: {}", self.path.display()))
    }
}

/// In-process store, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The single persisted `{city, country}` record.
#[derive(Debug, Clone)]
pub struct LocationMemory {
    store: Arc<dyn KeyValueStore>,
}

impl LocationMemory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Overwrite the stored location.
    pub fn save(&self, city: &str, country: &str) -> Result<()> {
        let record = StoredLocation { city: city.to_string(), country: country.to_string() };
        let json = serde_json::to_string(&record).context("Failed to serialize stored location")?;
        self.store.set(LAST_LOCATION_KEY, &json)?;
        info!(city, country, "remembered location");
        Ok(())
    }

    /// Last stored location; unreadable or corrupt records count as absent.
    pub fn load_last(&self) -> Option<StoredLocation> {
        let raw = match self.store.get(LAST_LOCATION_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!("could not read stored location: {err:#}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("ignoring corrupt stored location: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> (MemoryStore, LocationMemory) {
        let store = MemoryStore::default();
        let memory = LocationMemory::new(Arc::new(store.clone()));
        (store, memory)
    }

    #[test]
    fn load_last_is_none_when_empty() {
        let (_, memory) = memory();
        assert_eq!(memory.load_last(), None);
    }

    #[test]
    fn save_overwrites_previous_value() {
        let (_, memory) = memory();
        memory.save("Paris", "FR").unwrap();
        memory.save("Oslo", "NO").unwrap();

        assert_eq!(
            memory.load_last(),
            Some(StoredLocation { city: "Oslo".into(), country: "NO".into() })
        );
    }

    #[test]
    fn record_is_stored_as_flat_json_under_well_known_key() {
        let (store, memory) = memory();
        memory.save("Paris", "FR").unwrap();

        let raw = store.get(LAST_LOCATION_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({ "city": "Paris", "country": "FR" }));
    }

    #[test]
    fn corrupt_record_is_treated_as_absent() {
        let (store, memory) = memory();
        store.set(LAST_LOCATION_KEY, "{not json").unwrap();

        assert_eq!(memory.load_last(), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        LocationMemory::new(Arc::new(FileStore::new(&path)))
            .save("Paris", "FR")
            .unwrap();

        let reopened = LocationMemory::new(Arc::new(FileStore::new(&path)));
        assert_eq!(reopened.load_last().unwrap().city, "Paris");
    }

    #[test]
    fn file_store_keeps_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("storage.json"));

        store.set("theme", "dark").unwrap();
        store.set(LAST_LOCATION_KEY, "{}").unwrap();

        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn file_store_reports_unparseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "garbage").unwrap();

        let err = FileStore::new(&path).get(LAST_LOCATION_KEY).unwrap_err();
        assert!(err.to_string().contains("Failed to parse storage file"));
    }
}
