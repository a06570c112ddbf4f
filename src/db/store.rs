use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Mutex;

use crate::error::{AppError, AppResult};

/// Keys under which session state is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Favorites,
    Comparison,
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKey::Favorites => write!(f, "movieFavorites"),
            StorageKey::Comparison => write!(f, "movieComparison"),
        }
    }
}

/// Durable string-keyed store that survives restarts
///
/// Calls are synchronous: callers never suspend on a read or write.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value stored under `key`, or `None` when absent
    fn get(&self, key: &StorageKey) -> AppResult<Option<String>>;

    /// Replaces the value stored under `key`
    fn set(&self, key: &StorageKey, value: &str) -> AppResult<()>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Reads and decodes the value stored under `key`
///
/// Absent keys and values that don't decode into `T` come back as `Ok(None)`;
/// the latter are logged and discarded. A backend that cannot be read is an
/// error, so callers can tell "nothing stored" from "not read yet".
pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &StorageKey,
) -> AppResult<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(
                error = %e,
                key = %key,
                backend = store.name(),
                "Discarding malformed persisted state"
            );
            Ok(None)
        }
    }
}

/// Encodes `value` and replaces whatever is stored under `key`
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &StorageKey,
    value: &T,
) -> AppResult<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// Process-local store, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value, bypassing encoding
    pub fn with_raw(key: &StorageKey, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &StorageKey) -> AppResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| AppError::Storage(format!("Memory store poisoned: {}", e)))?;
        Ok(entries.get(&key.to_string()).cloned())
    }

    fn set(&self, key: &StorageKey, value: &str) -> AppResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| AppError::Storage(format!("Memory store poisoned: {}", e)))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
