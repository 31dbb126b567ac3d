use async_trait::async_trait;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::models::profile::CandidateProfile;
use crate::store::{ProfileCache, ProfileStore, StoreError};

/// Read-through mirror: reads hit the cache first and fall back to the primary
/// store; writes go to the primary and then refresh the cache.
///
/// Cache failures are logged and never fail the caller.
pub struct CachedProfileStore<P, C> {
    primary: P,
    cache: C,
}

impl<P, C> CachedProfileStore<P, C>
where
    P: ProfileStore,
    C: ProfileCache,
{
    pub fn new(primary: P, cache: C) -> Self {
        Self { primary, cache }
    }

    /// Refreshes the mirror. A failed refresh drops the entry instead, so a
    /// stale document is never served after a newer primary write.
    async fn mirror(&self, user_id: Uuid, profile: &CandidateProfile) {
        if let Err(e) = self.cache.put(user_id, profile).await {
            warn!("Profile cache refresh failed for user {user_id}: {e}");
            if let Err(e) = self.cache.invalidate(user_id).await {
                error!("Profile cache entry for user {user_id} may be stale: {e}");
            }
        }
    }
}

#[async_trait]
impl<P, C> ProfileStore for CachedProfileStore<P, C>
where
    P: ProfileStore,
    C: ProfileCache,
{
    async fn get(&self, user_id: Uuid) -> Result<Option<CandidateProfile>, StoreError> {
        match self.cache.fetch(user_id).await {
            Ok(Some(profile)) => {
                debug!("Profile cache hit for user {user_id}");
                return Ok(Some(profile));
            }
            Ok(None) => {}
            Err(e) => warn!("Profile cache read failed for user {user_id}: {e}"),
        }

        let profile = self.primary.get(user_id).await?;
        if let Some(profile) = &profile {
            self.mirror(user_id, profile).await;
        }
        Ok(profile)
    }

    async fn save(&self, user_id: Uuid, profile: &CandidateProfile) -> Result<(), StoreError> {
        self.primary.save(user_id, profile).await?;
        self.mirror(user_id, profile).await;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<(Uuid, CandidateProfile)>, StoreError> {
        self.primary.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stage::AssessmentStage;
    use crate::store::MemoryProfileStore;

    fn store() -> (
        CachedProfileStore<MemoryProfileStore, MemoryProfileStore>,
        MemoryProfileStore,
        MemoryProfileStore,
    ) {
        let primary = MemoryProfileStore::new();
        let cache = MemoryProfileStore::new();
        (
            CachedProfileStore::new(primary.clone(), cache.clone()),
            primary,
            cache,
        )
    }

    #[tokio::test]
    async fn test_save_writes_through_to_cache() {
        let (cached, primary, cache) = store();
        let user_id = Uuid::new_v4();
        let profile = CandidateProfile::new_candidate();

        cached.save(user_id, &profile).await.unwrap();
        assert_eq!(primary.get(user_id).await.unwrap(), Some(profile.clone()));
        assert_eq!(cache.fetch(user_id).await.unwrap(), Some(profile));
    }

    #[tokio::test]
    async fn test_read_miss_fills_cache() {
        let (cached, primary, cache) = store();
        let user_id = Uuid::new_v4();
        primary
            .save(user_id, &CandidateProfile::new_candidate())
            .await
            .unwrap();
        assert!(cache.fetch(user_id).await.unwrap().is_none());

        assert!(cached.get(user_id).await.unwrap().is_some());
        assert!(cache.fetch(user_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cache_hit_serves_read() {
        let (cached, _primary, cache) = store();
        let user_id = Uuid::new_v4();
        let mut profile = CandidateProfile::new_candidate();
        profile.name = "Cached Only".to_string();
        cache.put(user_id, &profile).await.unwrap();

        let loaded = cached.get(user_id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Cached Only");
    }

    #[tokio::test]
    async fn test_cache_failure_does_not_fail_save() {
        let (cached, primary, cache) = store();
        cache.set_fail_writes(true);
        let user_id = Uuid::new_v4();

        cached
            .save(user_id, &CandidateProfile::new_candidate())
            .await
            .unwrap();
        assert!(primary.get(user_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_refresh_drops_stale_entry() {
        let (cached, primary, cache) = store();
        let user_id = Uuid::new_v4();
        let mut profile = CandidateProfile::new_candidate();
        cached.save(user_id, &profile).await.unwrap();

        cache.set_fail_writes(true);
        profile.current_stage = AssessmentStage::RoleSelection;
        cached.save(user_id, &profile).await.unwrap();

        assert!(cache.fetch(user_id).await.unwrap().is_none());
        let loaded = cached.get(user_id).await.unwrap().unwrap();
        assert_eq!(loaded.current_stage, AssessmentStage::RoleSelection);
        assert_eq!(
            primary.get(user_id).await.unwrap().unwrap().current_stage,
            AssessmentStage::RoleSelection
        );
    }

    #[tokio::test]
    async fn test_primary_failure_propagates() {
        let (cached, primary, cache) = store();
        primary.set_fail_writes(true);
        let user_id = Uuid::new_v4();

        assert!(cached
            .save(user_id, &CandidateProfile::new_candidate())
            .await
            .is_err());
        assert!(cache.fetch(user_id).await.unwrap().is_none());
    }
}
