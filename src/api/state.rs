use std::sync::Arc;

use tokio::sync::RwLock;

use crate::db::KeyValueStore;
use crate::error::{AppError, AppResult};
use crate::services::{ComparisonSlotStore, FavoritesStore, MovieProvider};

/// Shared application state
///
/// Each store sits behind its own lock; a handler runs one store operation to
/// completion while holding it.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn MovieProvider>,
    pub favorites: Arc<RwLock<FavoritesStore>>,
    pub comparison: Arc<RwLock<ComparisonSlotStore>>,
}

impl AppState {
    /// Opens both stores from `storage` and wires them to `provider`
    pub fn new(provider: Arc<dyn MovieProvider>, storage: Arc<dyn KeyValueStore>) -> Self {
        let favorites = FavoritesStore::open(storage.clone());
        let comparison = ComparisonSlotStore::open(storage);

        tracing::info!(
            provider = provider.name(),
            favorites = favorites.len(),
            comparison = comparison.count(),
            "Session state loaded"
        );

        Self {
            provider,
            favorites: Arc::new(RwLock::new(favorites)),
            comparison: Arc::new(RwLock::new(comparison)),
        }
    }

    /// Writes any changes the stores are still holding
    ///
    /// Both stores are attempted; the first failure is returned.
    pub async fn flush(&self) -> AppResult<()> {
        let favorites = write_blocking(&self.favorites, |store| store.flush()).await?;
        let comparison = write_blocking(&self.comparison, |store| store.flush()).await?;

        if let Err(e) = &favorites {
            tracing::error!(error = %e, "Favorites not flushed");
        }
        if let Err(e) = &comparison {
            tracing::error!(error = %e, "Comparison slots not flushed");
        }
        favorites.and(comparison)
    }
}

/// Runs `op` on the store behind `lock` on the blocking pool
///
/// Store operations do synchronous I/O, so they stay off the async workers.
/// The write guard moves into the blocking task and is released when `op` returns.
pub(crate) async fn write_blocking<S, R, F>(lock: &Arc<RwLock<S>>, op: F) -> AppResult<R>
where
    S: Send + Sync + 'static,
    R: Send + 'static,
    F: FnOnce(&mut S) -> R + Send + 'static,
{
    let mut guard = lock.clone().write_owned().await;
    tokio::task::spawn_blocking(move || op(&mut guard))
        .await
        .map_err(|e| AppError::Internal(format!("Store task failed: {}", e)))
}
