use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScheduleError};

/// Small key/value store persisted as one JSON object on disk
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl Store {
    /// Load the store from file, or start empty if it doesn't exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Ok(Self {
                path,
                entries: BTreeMap::new(),
            });
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            ScheduleError::Store(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let entries = serde_json::from_str(&content).map_err(|e| {
            ScheduleError::Store(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        Ok(Self { path, entries })
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.entries
            .get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| {
                    ScheduleError::Store(format!("Entry '{}' has unexpected shape: {}", key, e))
                })
            })
            .transpose()
    }

    /// Store `value` under `key` and write the file
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        self.entries.insert(key.to_string(), serde_json::to_value(value)?);
        self.save()
    }

    pub fn remove(&mut self, key: &str) -> Result<bool> {
        if self.entries.remove(key).is_some() {
            self.save()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            ScheduleError::Store(format!("Failed to serialize store: {}", e))
        })?;

        fs::write(&self.path, content).map_err(|e| {
            ScheduleError::Store(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }
}
