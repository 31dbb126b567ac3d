use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::assessment::CodingChallenge;
use crate::pipeline::stage::AssessmentStage;
use crate::proctoring::tracker::IntegrityTracker;

/// Server-side state of one proctored stage attempt.
#[derive(Debug, Clone)]
pub struct StageSession {
    pub stage: AssessmentStage,
    pub tracker: IntegrityTracker,
    pub challenges: Vec<CodingChallenge>,
    pub transcript: Vec<String>,
    pub started_at: DateTime<Utc>,
}

impl StageSession {
    fn new(stage: AssessmentStage) -> Self {
        Self {
            stage,
            tracker: IntegrityTracker::armed(),
            challenges: vec![],
            transcript: vec![],
            started_at: Utc::now(),
        }
    }

    pub fn duration_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_seconds().max(0)
    }
}

/// In-process registry of active stage sessions, at most one per candidate.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, StageSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) a session, replacing whatever was there. The
    /// violation counter starts at zero.
    pub async fn start(&self, user_id: Uuid, stage: AssessmentStage) -> StageSession {
        debug_assert!(stage.is_proctored(), "{stage} is not a proctored stage");
        let session = StageSession::new(stage);
        self.sessions.lock().await.insert(user_id, session.clone());
        debug!("Armed {stage} session for candidate {user_id}");
        session
    }

    /// Counts a focus-loss event. `None` when no armed session exists.
    pub async fn focus_lost(&self, user_id: Uuid) -> Option<u32> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&user_id)?;
        session
            .tracker
            .on_focus_lost()
            .then(|| session.tracker.violations())
    }

    /// Runs `f` against the candidate's session for `stage`, if one is active.
    pub async fn with_session<R>(
        &self,
        user_id: Uuid,
        stage: AssessmentStage,
        f: impl FnOnce(&mut StageSession) -> R,
    ) -> Option<R> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .get_mut(&user_id)
            .filter(|s| s.stage == stage)
            .map(f)
    }

    pub async fn get(&self, user_id: Uuid, stage: AssessmentStage) -> Option<StageSession> {
        self.with_session(user_id, stage, |s| s.clone()).await
    }

    /// Ends the session and returns it with the tracker disarmed.
    pub async fn finish(&self, user_id: Uuid, stage: AssessmentStage) -> Option<StageSession> {
        let mut sessions = self.sessions.lock().await;
        if sessions.get(&user_id).map(|s| s.stage) != Some(stage) {
            return None;
        }
        let mut session = sessions.remove(&user_id)?;
        let violations = session.tracker.disarm();
        info!(
            "Closed {stage} session for candidate {user_id} after {}s with {violations} violation(s)",
            session.duration_secs(Utc::now())
        );
        Some(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_focus_lost_without_session_is_ignored() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.focus_lost(Uuid::new_v4()).await, None);
    }

    #[tokio::test]
    async fn test_restart_resets_counter() {
        let registry = SessionRegistry::new();
        let user_id = Uuid::new_v4();

        registry.start(user_id, AssessmentStage::TechnicalCoding).await;
        assert_eq!(registry.focus_lost(user_id).await, Some(1));
        assert_eq!(registry.focus_lost(user_id).await, Some(2));

        registry.start(user_id, AssessmentStage::TechnicalCoding).await;
        let session = registry
            .get(user_id, AssessmentStage::TechnicalCoding)
            .await
            .unwrap();
        assert_eq!(session.tracker.violations(), 0);
    }

    #[tokio::test]
    async fn test_finish_requires_matching_stage() {
        let registry = SessionRegistry::new();
        let user_id = Uuid::new_v4();
        registry.start(user_id, AssessmentStage::Interview).await;
        registry.focus_lost(user_id).await;

        assert!(registry
            .finish(user_id, AssessmentStage::TechnicalCoding)
            .await
            .is_none());

        let session = registry
            .finish(user_id, AssessmentStage::Interview)
            .await
            .unwrap();
        assert_eq!(session.tracker.violations(), 1);
        assert!(!session.tracker.is_armed());
        assert_eq!(registry.focus_lost(user_id).await, None);
    }

    #[tokio::test]
    async fn test_session_duration_from_start() {
        let registry = SessionRegistry::new();
        let session = registry
            .start(Uuid::new_v4(), AssessmentStage::TechnicalCoding)
            .await;

        let later = session.started_at + chrono::Duration::seconds(95);
        assert_eq!(session.duration_secs(later), 95);
        let earlier = session.started_at - chrono::Duration::seconds(5);
        assert_eq!(session.duration_secs(earlier), 0);
    }

    #[tokio::test]
    async fn test_with_session_mutates_transcript() {
        let registry = SessionRegistry::new();
        let user_id = Uuid::new_v4();
        registry.start(user_id, AssessmentStage::Interview).await;

        let len = registry
            .with_session(user_id, AssessmentStage::Interview, |s| {
                s.transcript.push("AI: Tell me about yourself.".to_string());
                s.transcript.len()
            })
            .await;
        assert_eq!(len, Some(1));
    }
}
