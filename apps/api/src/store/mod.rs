// Profile Store: whole-document persistence of candidate profiles keyed by user id.
// Postgres holds the source of truth; Redis mirrors it for read-through availability.

pub mod cached;
#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod redis_cache;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::profile::CandidateProfile;

pub use cached::CachedProfileStore;
#[cfg(test)]
pub use memory::MemoryProfileStore;
pub use postgres::PgProfileStore;
pub use redis_cache::RedisProfileCache;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("profile document could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("profile store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store of candidate profiles. Callers always read-modify-write the
/// whole document; concurrent writers overwrite each other.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<CandidateProfile>, StoreError>;

    async fn save(&self, user_id: Uuid, profile: &CandidateProfile) -> Result<(), StoreError>;

    /// Every stored profile. Only used for admin aggregation.
    async fn list(&self) -> Result<Vec<(Uuid, CandidateProfile)>, StoreError>;
}

/// A best-effort mirror in front of a [`ProfileStore`].
#[async_trait]
pub trait ProfileCache: Send + Sync {
    async fn fetch(&self, user_id: Uuid) -> Result<Option<CandidateProfile>, StoreError>;

    async fn put(&self, user_id: Uuid, profile: &CandidateProfile) -> Result<(), StoreError>;

    /// Drops the mirrored entry so the next read goes to the primary store.
    async fn invalidate(&self, user_id: Uuid) -> Result<(), StoreError>;
}
