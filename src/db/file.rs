use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{KeyValueStore, StorageKey};
use crate::error::{AppError, AppResult};

/// Durable store backed by a single JSON object on disk
///
/// Each key maps to its raw string value. Writes land in a sibling temp file
/// that is then renamed over the document, so a crash mid-write leaves the
/// previous document in place.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> AppResult<BTreeMap<String, String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            AppError::Storage(format!(
                "Corrupt storage document {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_document(&self, document: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_vec_pretty(document)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &StorageKey) -> AppResult<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| AppError::Storage(format!("File store poisoned: {}", e)))?;

        // A corrupt document holds nothing readable; it counts as absent, like malformed values.
        match self.read_document() {
            Ok(mut document) => Ok(document.remove(&key.to_string())),
            Err(AppError::Storage(msg)) => {
                tracing::warn!(error = %msg, key = %key, "Ignoring corrupt storage document");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &StorageKey, value: &str) -> AppResult<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| AppError::Storage(format!("File store poisoned: {}", e)))?;

        // A corrupt document is replaced rather than blocking every later write.
        let mut document = match self.read_document() {
            Ok(document) => document,
            Err(AppError::Storage(msg)) => {
                tracing::warn!(error = %msg, "Overwriting corrupt storage document");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        document.insert(key.to_string(), value.to_string());
        self.write_document(&document)?;

        tracing::debug!(key = %key, path = %self.path.display(), "Persisted state to file");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("vault.json"));
        assert_eq!(store.get(&StorageKey::Favorites).unwrap(), None);
    }

    #[test]
    fn test_set_then_get_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");

        let store = FileStore::new(&path);
        store.set(&StorageKey::Favorites, "[]").unwrap();
        store.set(&StorageKey::Comparison, "[null,null]").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get(&StorageKey::Favorites).unwrap().as_deref(),
            Some("[]")
        );
        assert_eq!(
            reopened.get(&StorageKey::Comparison).unwrap().as_deref(),
            Some("[null,null]")
        );
    }

    #[test]
    fn test_set_replaces_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("vault.json"));
        store.set(&StorageKey::Favorites, "[1]").unwrap();
        store.set(&StorageKey::Favorites, "[2]").unwrap();
        assert_eq!(
            store.get(&StorageKey::Favorites).unwrap().as_deref(),
            Some("[2]")
        );
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested/profile/vault.json"));
        store.set(&StorageKey::Favorites, "[]").unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_unreadable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the document should be cannot be read as a file
        let store = FileStore::new(dir.path());
        assert!(matches!(store.get(&StorageKey::Favorites), Err(AppError::Io(_))));
    }

    #[test]
    fn test_corrupt_document_reads_as_absent_and_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");
        fs::write(&path, "garbage").unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.get(&StorageKey::Favorites).unwrap(), None);

        store.set(&StorageKey::Favorites, "[]").unwrap();
        assert_eq!(
            store.get(&StorageKey::Favorites).unwrap().as_deref(),
            Some("[]")
        );
    }
}
