pub mod file;
pub mod redis;
pub mod store;

pub use file::FileStore;
pub use self::redis::{create_redis_client, RedisStore};
pub use store::{read_json, write_json, KeyValueStore, MemoryStore, StorageKey};

#[cfg(test)]
pub(crate) use store::testing::FlakyStore;
