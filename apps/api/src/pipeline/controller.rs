use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::CandidateProfile;
use crate::pipeline::machine::{Applied, Command, Pipeline, Transition};
use crate::pipeline::stage::AssessmentStage;
use crate::store::ProfileStore;

/// What to do when a profile write fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistencePolicy {
    /// Log the failure and carry on with the in-memory state.
    #[default]
    BestEffort,
    /// Fail the request; the change is not acknowledged.
    FailLoud,
}

impl FromStr for PersistencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "best_effort" => Ok(PersistencePolicy::BestEffort),
            "fail_loud" => Ok(PersistencePolicy::FailLoud),
            other => Err(format!(
                "unknown persistence policy '{other}' (expected best_effort or fail_loud)"
            )),
        }
    }
}

/// Client view of a candidate's pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSnapshot {
    pub user_id: Uuid,
    pub stage: AssessmentStage,
    pub unlocked_stages: Vec<AssessmentStage>,
    /// False when the last write failed under the best-effort policy.
    pub synced: bool,
    pub profile: CandidateProfile,
}

/// Owns one candidate's re-hydrated [`Pipeline`] for the duration of a request
/// and persists the whole profile after every state-changing command.
pub struct PipelineController<'a> {
    user_id: Uuid,
    pipeline: Pipeline,
    store: &'a dyn ProfileStore,
    policy: PersistencePolicy,
    synced: bool,
}

impl<'a> PipelineController<'a> {
    /// Loads the candidate's profile, creating and saving a fresh one on first sign-in.
    pub async fn sign_in(
        store: &'a dyn ProfileStore,
        user_id: Uuid,
        policy: PersistencePolicy,
    ) -> Result<Self, AppError> {
        if let Some(profile) = store.get(user_id).await? {
            info!(
                "Candidate {user_id} signed in at stage {}",
                profile.current_stage
            );
            return Ok(Self::new(store, user_id, profile, policy));
        }

        info!("Creating profile for new candidate {user_id}");
        let mut controller = Self::new(store, user_id, CandidateProfile::new_candidate(), policy);
        controller.persist().await?;
        Ok(controller)
    }

    /// Loads an existing candidate; unknown ids are a 404.
    pub async fn load(
        store: &'a dyn ProfileStore,
        user_id: Uuid,
        policy: PersistencePolicy,
    ) -> Result<Self, AppError> {
        let profile = store
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Candidate {user_id} not found")))?;
        Ok(Self::new(store, user_id, profile, policy))
    }

    fn new(
        store: &'a dyn ProfileStore,
        user_id: Uuid,
        profile: CandidateProfile,
        policy: PersistencePolicy,
    ) -> Self {
        Self {
            user_id,
            pipeline: Pipeline::from_profile(profile),
            store,
            policy,
            synced: true,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn stage(&self) -> AssessmentStage {
        self.pipeline.stage()
    }

    pub fn profile(&self) -> &CandidateProfile {
        self.pipeline.profile()
    }

    /// Rejects stage actions while the candidate is elsewhere in the pipeline.
    pub fn ensure_stage(&self, expected: AssessmentStage, action: &str) -> Result<(), AppError> {
        if self.stage() == expected {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "{action} requires stage {expected}, candidate is at {}",
                self.stage()
            )))
        }
    }

    pub async fn dispatch(&mut self, command: Command) -> Result<Applied, AppError> {
        let name = command.name();
        let applied = self.pipeline.apply(command)?;

        match applied.transition {
            Transition::Moved { from, to } => {
                info!("Candidate {} moved {from} -> {to} ({name})", self.user_id)
            }
            Transition::Denied { target, gate } => debug!(
                "Candidate {} denied entry to {target}: gate {gate:?} not satisfied",
                self.user_id
            ),
            Transition::Stayed { stage } => {
                debug!("Candidate {} stays at {stage} ({name})", self.user_id)
            }
        }

        if applied.changed {
            self.persist().await?;
        }
        Ok(applied)
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        let profile = self.pipeline.profile();
        PipelineSnapshot {
            user_id: self.user_id,
            stage: profile.current_stage,
            unlocked_stages: AssessmentStage::unlocked_for(profile),
            synced: self.synced,
            profile: profile.clone(),
        }
    }

    async fn persist(&mut self) -> Result<(), AppError> {
        match self.store.save(self.user_id, self.pipeline.profile()).await {
            Ok(()) => {
                self.synced = true;
                Ok(())
            }
            Err(e) => match self.policy {
                PersistencePolicy::BestEffort => {
                    warn!(
                        "Profile save failed for candidate {} (continuing): {e}",
                        self.user_id
                    );
                    self.synced = false;
                    Ok(())
                }
                PersistencePolicy::FailLoud => Err(AppError::Store(e)),
            },
        }
    }
}
