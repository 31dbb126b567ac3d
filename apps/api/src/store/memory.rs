use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::profile::CandidateProfile;
use crate::store::{ProfileCache, ProfileStore, StoreError};

/// In-process profile store. Stores serialized documents so reads go through
/// the same JSON round trip as the real backends.
#[derive(Clone, Default)]
pub struct MemoryProfileStore {
    docs: Arc<RwLock<HashMap<Uuid, String>>>,
    saves: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save`/`put` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Makes every subsequent write fail, simulating an unreachable backend.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    async fn read(&self, user_id: Uuid) -> Result<Option<CandidateProfile>, StoreError> {
        let docs = self.docs.read().await;
        match docs.get(&user_id) {
            Some(doc) => Ok(Some(serde_json::from_str(doc)?)),
            None => Ok(None),
        }
    }

    async fn write(&self, user_id: Uuid, profile: &CandidateProfile) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store is rejecting writes".to_string(),
            ));
        }
        let doc = serde_json::to_string(profile)?;
        self.docs.write().await.insert(user_id, doc);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<CandidateProfile>, StoreError> {
        self.read(user_id).await
    }

    async fn save(&self, user_id: Uuid, profile: &CandidateProfile) -> Result<(), StoreError> {
        self.write(user_id, profile).await
    }

    async fn list(&self) -> Result<Vec<(Uuid, CandidateProfile)>, StoreError> {
        let docs = self.docs.read().await;
        docs.iter()
            .map(|(id, doc)| -> Result<_, StoreError> { Ok((*id, serde_json::from_str(doc)?)) })
            .collect()
    }
}

#[async_trait]
impl ProfileCache for MemoryProfileStore {
    async fn fetch(&self, user_id: Uuid) -> Result<Option<CandidateProfile>, StoreError> {
        self.read(user_id).await
    }

    async fn put(&self, user_id: Uuid, profile: &CandidateProfile) -> Result<(), StoreError> {
        self.write(user_id, profile).await
    }

    /// Always accepted, even while writes are rejected.
    async fn invalidate(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.docs.write().await.remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{CodingSolution, EducationEntry, TechnicalScore};
    use crate::pipeline::stage::AssessmentStage;

    fn rich_profile() -> CandidateProfile {
        let mut profile = CandidateProfile::new_candidate();
        profile.name = "Meera Iyer".to_string();
        profile.email = "meera@example.com".to_string();
        profile.skills = vec!["Python".to_string(), "Django".to_string()];
        profile.education = vec![EducationEntry {
            school: "IIT Madras".to_string(),
            degree: "B.Tech".to_string(),
            year: "2024".to_string(),
        }];
        profile.selected_role = Some("Python Developer".to_string());
        profile.target_jd = Some("Build Django services".to_string());
        profile.current_stage = AssessmentStage::Interview;
        profile.resume_score = Some(88.0);
        profile.is_resume_passed = true;
        profile.is_coding_passed = true;
        profile.technical_result = Some(TechnicalScore {
            score: 72.0,
            total: 100.0,
            feedback: "Clean solutions".to_string(),
            integrity_violations: 1,
            solutions: vec![CodingSolution {
                challenge_title: "Rate limiter".to_string(),
                code: "def allow(): return True".to_string(),
                topic: "Design".to_string(),
            }],
        });
        profile
    }

    #[tokio::test]
    async fn test_save_then_get_round_trips() {
        let store = MemoryProfileStore::new();
        let user_id = Uuid::new_v4();
        let profile = rich_profile();

        store.save(user_id, &profile).await.unwrap();
        let loaded = store.get(user_id).await.unwrap().unwrap();
        assert_eq!(loaded, profile);

        // A second cycle stays equivalent.
        store.save(user_id, &loaded).await.unwrap();
        assert_eq!(store.get(user_id).await.unwrap().unwrap(), profile);
    }

    #[tokio::test]
    async fn test_missing_profile_is_none() {
        let store = MemoryProfileStore::new();
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = MemoryProfileStore::new();
        let user_id = Uuid::new_v4();
        let mut first = rich_profile();
        first.name = "Tab One".to_string();
        let mut second = rich_profile();
        second.name = "Tab Two".to_string();

        store.save(user_id, &first).await.unwrap();
        store.save(user_id, &second).await.unwrap();
        assert_eq!(store.get(user_id).await.unwrap().unwrap().name, "Tab Two");
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_writes_surface_errors() {
        let store = MemoryProfileStore::new();
        store.set_fail_writes(true);
        let err = store
            .save(Uuid::new_v4(), &rich_profile())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.save_count(), 0);
    }
}
