//! JSON file backed key-value storage
//!
//! Plays the part of the browser's `localStorage` across CLI runs. The file
//! holds a flat JSON object of string values and is rewritten on every
//! change.

use anyhow::{Context, Result};
use dropsync_core::store::{KVStore, Storage};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default storage file, relative to the working directory
pub const DEFAULT_STORAGE_FILE: &str = ".dropsync-storage.json";

#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: KVStore,
}

impl FileStorage {
    /// Open a storage file; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let entries: BTreeMap<String, String> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            KVStore::with_entries(entries)
        } else {
            KVStore::new()
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        let entries: BTreeMap<String, String> = self.values.entries().into_iter().collect();
        let content = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, content + "\n")
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    fn save_or_log(&self) {
        if let Err(e) = self.save() {
            tracing::error!("{:#}", e);
        }
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.values.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) {
        self.values.set_item(key, value);
        self.save_or_log();
    }

    fn remove_item(&self, key: &str) {
        self.values.remove_item(key);
        self.save_or_log();
    }
}
