use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::profile::CandidateProfile;
use crate::store::{ProfileStore, StoreError};

/// Profiles stored as one JSONB document per candidate in `candidate_profiles`.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<CandidateProfile>, StoreError> {
        let row: Option<Json<CandidateProfile>> =
            sqlx::query_scalar("SELECT data FROM candidate_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(profile)| profile))
    }

    async fn save(&self, user_id: Uuid, profile: &CandidateProfile) -> Result<(), StoreError> {
        // Whole-document upsert: last write wins.
        sqlx::query(
            r#"
            INSERT INTO candidate_profiles (user_id, data, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(Json(profile))
        .execute(&self.pool)
        .await?;

        debug!("Saved profile for user {user_id} at stage {}", profile.current_stage);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<(Uuid, CandidateProfile)>, StoreError> {
        let rows: Vec<(Uuid, Json<CandidateProfile>)> =
            sqlx::query_as("SELECT user_id, data FROM candidate_profiles ORDER BY updated_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(user_id, Json(profile))| (user_id, profile))
            .collect())
    }
}
