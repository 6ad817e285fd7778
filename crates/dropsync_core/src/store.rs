//! Key-value storage
//!
//! [`Storage`] is the string-to-string contract of a browser's `localStorage`:
//! values survive page reloads and are shared by everything on the page.
//! [`KVStore`] is the in-memory implementation; persistent backends (a JSON
//! file in the CLI) implement the same trait.
//!
//! ```rust
//! use dropsync_core::store::{KVStore, Storage};
//!
//! let store = KVStore::new();
//! store.set_item("darkMode", "enabled");
//! assert_eq!(store.get_item("darkMode").as_deref(), Some("enabled"));
//! ```

use rustc_hash::FxHashMap;
use std::sync::{PoisonError, RwLock};

/// String key-value storage
pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);

    fn contains(&self, key: &str) -> bool {
        self.get_item(key).is_some()
    }
}

impl<S: Storage + ?Sized> Storage for &S {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) {
        (**self).remove_item(key)
    }
}

/// In-memory [`Storage`]
#[derive(Debug, Default)]
pub struct KVStore {
    values: RwLock<FxHashMap<String, String>>,
}

impl KVStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-filled with `entries`
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }

    /// Copy of every entry, sorted by key
    pub fn entries(&self) -> Vec<(String, String)> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<_> = values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort();
        entries
    }

    pub fn len(&self) -> usize {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Storage for KVStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}
