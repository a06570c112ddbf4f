use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    db::{read_json, write_json, KeyValueStore, StorageKey},
    error::AppResult,
    models::MovieSummary,
};

/// Favorited titles, unique by id, mirrored to the durable store
///
/// A `FavoritesStore` only comes into existence through [`FavoritesStore::open`],
/// which reads persisted state first. When that read fails the store starts
/// unloaded: changes stay in memory and nothing is written until a later read
/// succeeds and the persisted favorites are merged in.
pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStore>,
    favorites: Vec<MovieSummary>,
    loaded: bool,
    dirty: bool,
}

impl FavoritesStore {
    /// Reads persisted favorites
    ///
    /// Absent or malformed data yields an empty list. Duplicate ids keep
    /// their first occurrence. Fails only when the backend cannot be read.
    pub fn load(storage: &dyn KeyValueStore) -> AppResult<Vec<MovieSummary>> {
        let stored: Vec<MovieSummary> =
            read_json(storage, &StorageKey::Favorites)?.unwrap_or_default();

        let mut seen = HashSet::new();
        let favorites: Vec<MovieSummary> = stored
            .into_iter()
            .filter(|movie| seen.insert(movie.id.clone()))
            .collect();

        tracing::debug!(
            count = favorites.len(),
            backend = storage.name(),
            "Loaded favorites"
        );
        Ok(favorites)
    }

    /// Creates the store from whatever is persisted
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let (favorites, loaded) = match Self::load(storage.as_ref()) {
            Ok(favorites) => (favorites, true),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    backend = storage.name(),
                    "Favorites unreadable, writes held until a read succeeds"
                );
                (Vec::new(), false)
            }
        };

        Self {
            storage,
            favorites,
            loaded,
            dirty: false,
        }
    }

    pub fn favorites(&self) -> &[MovieSummary] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|movie| movie.id == id)
    }

    /// Adds `movie` unless its id is already present
    pub fn add(&mut self, movie: MovieSummary) {
        self.try_load();
        if self.is_favorite(&movie.id) {
            return;
        }
        tracing::info!(id = %movie.id, title = %movie.title, "Added favorite");
        self.favorites.push(movie);
        self.persist();
    }

    /// Removes the record with `id`, if any
    pub fn remove(&mut self, id: &str) {
        self.try_load();
        let before = self.favorites.len();
        self.favorites.retain(|movie| movie.id != id);
        if self.favorites.len() != before {
            tracing::info!(id = %id, "Removed favorite");
        }
        self.persist();
    }

    /// Removes `movie` if favorited, adds it otherwise
    ///
    /// Returns whether the movie is a favorite afterwards.
    pub fn toggle(&mut self, movie: MovieSummary) -> bool {
        self.try_load();
        if self.is_favorite(&movie.id) {
            self.remove(&movie.id);
            false
        } else {
            self.add(movie);
            true
        }
    }

    /// Whether persisted favorites have been read
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether in-memory changes are waiting to be written
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes outstanding changes, reading persisted favorites first if that never succeeded
    pub fn flush(&mut self) -> AppResult<()> {
        self.ensure_loaded()?;
        if !self.dirty {
            return Ok(());
        }
        write_json(self.storage.as_ref(), &StorageKey::Favorites, &self.favorites)?;
        self.dirty = false;
        Ok(())
    }

    /// Reads persisted favorites once, keeping them ahead of anything added while unloaded
    fn ensure_loaded(&mut self) -> AppResult<()> {
        if self.loaded {
            return Ok(());
        }

        let mut merged = Self::load(self.storage.as_ref())?;
        for movie in self.favorites.drain(..) {
            if !merged.iter().any(|m| m.id == movie.id) {
                merged.push(movie);
            }
        }
        self.favorites = merged;
        self.loaded = true;
        tracing::info!(count = self.favorites.len(), "Favorites recovered from storage");
        Ok(())
    }

    fn try_load(&mut self) {
        if let Err(e) = self.ensure_loaded() {
            tracing::warn!(error = %e, backend = self.storage.name(), "Favorites still unreadable");
        }
    }

    /// Writes the full collection; a failure keeps in-memory state and marks the store dirty
    fn persist(&mut self) {
        if !self.loaded {
            self.dirty = true;
            return;
        }
        match write_json(self.storage.as_ref(), &StorageKey::Favorites, &self.favorites) {
            Ok(()) => self.dirty = false,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    backend = self.storage.name(),
                    "Failed to persist favorites"
                );
                self.dirty = true;
            }
        }
    }
}
