use async_trait::async_trait;
use redis::Client as RedisClient;
use uuid::Uuid;

use crate::models::profile::CandidateProfile;
use crate::store::{ProfileCache, StoreError};

/// Redis mirror of candidate profiles under `profile:{user_id}`.
#[derive(Clone)]
pub struct RedisProfileCache {
    client: RedisClient,
    ttl_secs: u64,
}

impl RedisProfileCache {
    pub fn new(client: RedisClient, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }
}

pub fn cache_key(user_id: Uuid) -> String {
    format!("profile:{user_id}")
}

#[async_trait]
impl ProfileCache for RedisProfileCache {
    async fn fetch(&self, user_id: Uuid) -> Result<Option<CandidateProfile>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(cache_key(user_id))
            .query_async(&mut conn)
            .await?;
        match raw {
            Some(doc) => Ok(Some(serde_json::from_str(&doc)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, user_id: Uuid, profile: &CandidateProfile) -> Result<(), StoreError> {
        let doc = serde_json::to_string(profile)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(cache_key(user_id))
            .arg(doc)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn invalidate(&self, user_id: Uuid) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("DEL")
            .arg(cache_key(user_id))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}
