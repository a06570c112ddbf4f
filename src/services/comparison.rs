use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    db::{read_json, write_json, KeyValueStore, StorageKey},
    error::{AppError, AppResult},
    models::MovieDetail,
};

/// One of the two comparison positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }
}

impl TryFrom<usize> for Slot {
    type Error = AppError;

    fn try_from(index: usize) -> AppResult<Self> {
        match index {
            0 => Ok(Slot::First),
            1 => Ok(Slot::Second),
            other => Err(AppError::InvalidInput(format!(
                "Comparison slot must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

/// Both slot contents, index-exact
pub type SlotPair = [Option<MovieDetail>; 2];

/// Two fixed comparison slots mirrored to the durable store
///
/// Like [`crate::services::FavoritesStore`], the only constructor reads
/// persisted state before anything can be written, and an unreadable backend
/// holds writes back until a read succeeds.
pub struct ComparisonSlotStore {
    storage: Arc<dyn KeyValueStore>,
    slots: SlotPair,
    loaded: bool,
    dirty: bool,
}

impl ComparisonSlotStore {
    /// Reads the persisted pair, falling back to two empty slots
    ///
    /// Fails only when the backend cannot be read.
    pub fn load(storage: &dyn KeyValueStore) -> AppResult<SlotPair> {
        let slots: SlotPair = read_json(storage, &StorageKey::Comparison)?.unwrap_or_default();
        tracing::debug!(
            occupied = slots.iter().filter(|s| s.is_some()).count(),
            backend = storage.name(),
            "Loaded comparison slots"
        );
        Ok(slots)
    }

    /// Creates the store from whatever is persisted
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let (slots, loaded) = match Self::load(storage.as_ref()) {
            Ok(slots) => (slots, true),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    backend = storage.name(),
                    "Comparison slots unreadable, writes held until a read succeeds"
                );
                ([None, None], false)
            }
        };

        Self {
            storage,
            slots,
            loaded,
            dirty: false,
        }
    }

    pub fn slots(&self) -> &SlotPair {
        &self.slots
    }

    pub fn get(&self, slot: Slot) -> Option<&MovieDetail> {
        self.slots[slot.index()].as_ref()
    }

    /// Both movies, when both slots are occupied
    pub fn pair(&self) -> Option<(&MovieDetail, &MovieDetail)> {
        match &self.slots {
            [Some(first), Some(second)] => Some((first, second)),
            _ => None,
        }
    }

    /// Number of occupied slots
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_in_comparison(&self, id: &str) -> bool {
        self.slots.iter().flatten().any(|movie| movie.id == id)
    }

    /// Fills the first empty slot, overwriting the second when both are full
    ///
    /// The first slot is never evicted here. Returns the slot written.
    pub fn add_to_first_open_slot(&mut self, movie: MovieDetail) -> Slot {
        self.try_load();
        let slot = if self.slots[0].is_none() {
            Slot::First
        } else {
            Slot::Second
        };
        self.add_to_slot(movie, slot);
        slot
    }

    /// Overwrites `slot` regardless of what it held
    pub fn add_to_slot(&mut self, movie: MovieDetail, slot: Slot) {
        self.try_load();
        tracing::info!(id = %movie.id, title = %movie.title, slot = slot.index(), "Placed movie in comparison slot");
        self.slots[slot.index()] = Some(movie);
        self.persist();
    }

    pub fn clear_slot(&mut self, slot: Slot) {
        self.try_load();
        self.slots[slot.index()] = None;
        self.persist();
    }

    pub fn clear_all(&mut self) {
        self.try_load();
        self.slots = [None, None];
        self.persist();
    }

    /// Whether persisted slots have been read
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether in-memory changes are waiting to be written
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes outstanding changes, reading persisted slots first if that never succeeded
    pub fn flush(&mut self) -> AppResult<()> {
        self.ensure_loaded()?;
        if !self.dirty {
            return Ok(());
        }
        write_json(self.storage.as_ref(), &StorageKey::Comparison, &self.slots)?;
        self.dirty = false;
        Ok(())
    }

    /// Reads persisted slots once; slots filled while unloaded keep their movie
    fn ensure_loaded(&mut self) -> AppResult<()> {
        if self.loaded {
            return Ok(());
        }

        let persisted = Self::load(self.storage.as_ref())?;
        for (slot, stored) in self.slots.iter_mut().zip(persisted) {
            if slot.is_none() {
                *slot = stored;
            }
        }
        self.loaded = true;
        tracing::info!(occupied = self.count(), "Comparison slots recovered from storage");
        Ok(())
    }

    fn try_load(&mut self) {
        if let Err(e) = self.ensure_loaded() {
            tracing::warn!(error = %e, backend = self.storage.name(), "Comparison slots still unreadable");
        }
    }

    fn persist(&mut self) {
        if !self.loaded {
            self.dirty = true;
            return;
        }
        match write_json(self.storage.as_ref(), &StorageKey::Comparison, &self.slots) {
            Ok(()) => self.dirty = false,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    backend = self.storage.name(),
                    "Failed to persist comparison slots"
                );
                self.dirty = true;
            }
        }
    }
}
