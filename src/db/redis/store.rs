use std::sync::Mutex;
use std::time::Duration;

use redis::{Client, Commands, Connection, RedisResult};

use crate::db::{KeyValueStore, StorageKey};
use crate::error::{AppError, AppResult};

/// Creates a Redis client for the durable store
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Connect, read and write timeout applied to the store's connection
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Durable store backed by plain Redis strings with no expiry
///
/// One connection is opened lazily and reused. A command that fails drops it,
/// so the next call reconnects.
pub struct RedisStore {
    client: Client,
    namespace: String,
    timeout: Duration,
    conn: Mutex<Option<Connection>>,
}

impl RedisStore {
    pub fn new(client: Client) -> Self {
        Self::with_namespace(client, "cinema-vault")
    }

    /// Prefixes every key with `namespace:` so several profiles can share one instance
    pub fn with_namespace(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            timeout: DEFAULT_TIMEOUT,
            conn: Mutex::new(None),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn redis_key(&self, key: &StorageKey) -> String {
        format!("{}:{}", self.namespace, key)
    }

    fn connect(&self) -> RedisResult<Connection> {
        let conn = self.client.get_connection_with_timeout(self.timeout)?;
        conn.set_read_timeout(Some(self.timeout))?;
        conn.set_write_timeout(Some(self.timeout))?;
        tracing::debug!(namespace = %self.namespace, "Opened Redis connection");
        Ok(conn)
    }

    fn with_connection<T>(&self, op: impl FnOnce(&mut Connection) -> RedisResult<T>) -> AppResult<T> {
        let mut slot = self
            .conn
            .lock()
            .map_err(|e| AppError::Storage(format!("Redis connection poisoned: {}", e)))?;

        if slot.is_none() {
            *slot = Some(self.connect()?);
        }
        let Some(conn) = slot.as_mut() else {
            return Err(AppError::Storage("Redis connection unavailable".to_string()));
        };

        let result = op(conn);
        if result.is_err() {
            *slot = None;
        }
        result.map_err(AppError::from)
    }
}

impl KeyValueStore for RedisStore {
    fn get(&self, key: &StorageKey) -> AppResult<Option<String>> {
        let redis_key = self.redis_key(key);
        self.with_connection(|conn| conn.get(&redis_key))
    }

    fn set(&self, key: &StorageKey, value: &str) -> AppResult<()> {
        let redis_key = self.redis_key(key);
        self.with_connection(|conn| conn.set(&redis_key, value))
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    #[test]
    fn test_redis_key_is_namespaced() {
        let client = create_redis_client("redis://localhost:6379").unwrap();
        let store = RedisStore::with_namespace(client, "profile-a");
        assert_eq!(store.redis_key(&StorageKey::Favorites), "profile-a:movieFavorites");
        assert_eq!(store.redis_key(&StorageKey::Comparison), "profile-a:movieComparison");
    }

    #[test]
    fn test_unreachable_server_fails_within_timeout() {
        // Port 1 on loopback refuses connections
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let store = RedisStore::new(client).with_timeout(Duration::from_millis(200));

        let started = std::time::Instant::now();
        assert!(matches!(store.get(&StorageKey::Favorites), Err(AppError::Redis(_))));
        assert!(store.set(&StorageKey::Favorites, "[]").is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    #[ignore = "requires a running Redis server"]
    fn test_set_then_get() {
        let client = create_redis_client(&redis_url()).unwrap();
        let store = RedisStore::with_namespace(client.clone(), "cinema-vault-test");

        store.set(&StorageKey::Favorites, "[]").unwrap();
        assert_eq!(
            store.get(&StorageKey::Favorites).unwrap().as_deref(),
            Some("[]")
        );

        // Clean up
        let mut conn = client.get_connection().unwrap();
        let _: () = conn.del(store.redis_key(&StorageKey::Favorites)).unwrap();
    }

    #[test]
    #[ignore = "requires a running Redis server"]
    fn test_missing_key() {
        let client = create_redis_client(&redis_url()).unwrap();
        let store = RedisStore::with_namespace(client, "cinema-vault-test-missing");
        assert_eq!(store.get(&StorageKey::Comparison).unwrap(), None);
    }
}
