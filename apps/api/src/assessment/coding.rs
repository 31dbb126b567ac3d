use serde::Serialize;
use tracing::info;

use crate::ai_client::{tasks, AiGateway};
use crate::errors::AppError;
use crate::models::assessment::{CodingChallenge, TestRunReport};
use crate::models::profile::{CodingSolution, TechnicalScore};
use crate::pipeline::controller::PipelineController;
use crate::pipeline::machine::{Applied, Command};
use crate::pipeline::stage::AssessmentStage;
use crate::proctoring::{integrity_score, SessionRegistry};

const STAGE: AssessmentStage = AssessmentStage::TechnicalCoding;

/// A graded coding submission.
#[derive(Debug, Clone)]
pub struct CodingSubmission {
    pub applied: Applied,
    pub result: TechnicalScore,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingStart {
    pub challenges: Vec<CodingChallenge>,
    pub language: String,
}

fn no_session() -> AppError {
    AppError::Conflict("No active coding session; start the coding test first".to_string())
}

/// Generates the challenges and arms a fresh proctored session.
pub async fn start_coding(
    controller: &PipelineController<'_>,
    ai: &dyn AiGateway,
    sessions: &SessionRegistry,
    language: &str,
) -> Result<CodingStart, AppError> {
    controller.ensure_stage(STAGE, "Starting the coding test")?;

    let profile = controller.profile();
    let challenges = tasks::generate_coding_challenges(
        ai,
        profile.role_or_default(),
        &profile.skills,
        profile.target_jd_or_empty(),
        language,
    )
    .await?
    .into_parsed()?;

    if challenges.is_empty() {
        return Err(AppError::Ai("no coding challenges were generated".to_string()));
    }

    let user_id = controller.user_id();
    sessions.start(user_id, STAGE).await;
    sessions
        .with_session(user_id, STAGE, |s| s.challenges = challenges.clone())
        .await;

    info!(
        "Coding test started for candidate {user_id} with {} challenges",
        challenges.len()
    );
    Ok(CodingStart {
        challenges,
        language: language.to_string(),
    })
}

/// Simulated test run for one challenge of the active session.
pub async fn run_tests(
    controller: &PipelineController<'_>,
    ai: &dyn AiGateway,
    sessions: &SessionRegistry,
    challenge_index: usize,
    code: &str,
    language: &str,
) -> Result<TestRunReport, AppError> {
    controller.ensure_stage(STAGE, "Running tests")?;

    let session = sessions
        .get(controller.user_id(), STAGE)
        .await
        .ok_or_else(no_session)?;
    let challenge = session.challenges.get(challenge_index).ok_or_else(|| {
        AppError::Validation(format!(
            "challenge index {challenge_index} is out of range (0..{})",
            session.challenges.len()
        ))
    })?;

    Ok(tasks::run_code_tests(ai, challenge, code, language)
        .await?
        .into_parsed()?)
}

/// Evaluates all solutions together, closes the session and records the
/// result. The session stays open if evaluation fails so the candidate can
/// resubmit.
pub async fn submit_coding(
    controller: &mut PipelineController<'_>,
    ai: &dyn AiGateway,
    sessions: &SessionRegistry,
    codes: Vec<String>,
    language: &str,
) -> Result<CodingSubmission, AppError> {
    controller.ensure_stage(STAGE, "Submitting the coding test")?;

    let user_id = controller.user_id();
    let session = sessions.get(user_id, STAGE).await.ok_or_else(no_session)?;
    if codes.len() != session.challenges.len() {
        return Err(AppError::Validation(format!(
            "expected {} solutions, got {}",
            session.challenges.len(),
            codes.len()
        )));
    }

    let evaluation = tasks::evaluate_code(ai, &session.challenges, &codes, language)
        .await?
        .into_parsed()?;
    if !evaluation.score.is_finite() {
        return Err(AppError::Ai("code score is not a number".to_string()));
    }

    let finished = sessions.finish(user_id, STAGE).await.ok_or_else(no_session)?;
    let integrity_violations = finished.tracker.violations();

    let solutions = finished
        .challenges
        .into_iter()
        .zip(codes)
        .map(|(challenge, code)| CodingSolution {
            challenge_title: challenge.title,
            code,
            topic: challenge.topic,
        })
        .collect();

    let result = TechnicalScore {
        score: evaluation.score.clamp(0.0, 100.0),
        total: 100.0,
        feedback: evaluation.feedback,
        integrity_violations,
        solutions,
    };

    info!(
        "Coding test scored {} for candidate {user_id} (integrity {}%)",
        result.score,
        integrity_score(integrity_violations)
    );

    let applied = controller
        .dispatch(Command::RecordCoding(result.clone()))
        .await?;
    Ok(CodingSubmission { applied, result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai_client::scripted::ScriptedGateway;
    use crate::ai_client::tasks::DEFAULT_LANGUAGE;
    use crate::ai_client::AiTask;
    use crate::models::profile::CandidateProfile;
    use crate::pipeline::controller::PersistencePolicy;
    use crate::store::{MemoryProfileStore, ProfileStore};
    use uuid::Uuid;

    const CHALLENGES: &str = r#"[
        {"title": "Debounce", "description": "Implement debounce", "difficulty": "Medium",
         "examples": [{"input": "fn, 100", "output": "debounced fn", "explanation": ""}],
         "starterCode": "function debounce(fn, ms) {}", "constraints": [], "topic": "Async"},
        {"title": "LRU Cache", "description": "Implement an LRU cache", "difficulty": "Hard",
         "examples": [], "starterCode": "class LRU {}", "topic": "Data Structures"},
        {"title": "Flatten", "description": "Flatten nested arrays", "difficulty": "Easy",
         "starterCode": "function flatten(a) {}", "topic": "Arrays"}
    ]"#;

    async fn at_coding_stage(store: &MemoryProfileStore, user_id: Uuid) -> PipelineController<'_> {
        let mut profile = CandidateProfile::new_candidate();
        profile.selected_role = Some("MERN Stack Developer".to_string());
        profile.is_resume_passed = true;
        profile.current_stage = AssessmentStage::TechnicalCoding;
        store.save(user_id, &profile).await.unwrap();
        PipelineController::load(store, user_id, PersistencePolicy::BestEffort)
            .await
            .unwrap()
    }

    fn codes(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("// solution {i}")).collect()
    }

    #[tokio::test]
    async fn test_failed_submission_records_violations_and_stays() {
        let store = MemoryProfileStore::new();
        let user_id = Uuid::new_v4();
        let mut controller = at_coding_stage(&store, user_id).await;
        let sessions = SessionRegistry::new();
        let gateway = ScriptedGateway::new()
            .reply(CHALLENGES)
            .reply("{\"score\": 40, \"feedback\": \"Edge cases missed\"}");

        let start = start_coding(&controller, &gateway, &sessions, DEFAULT_LANGUAGE)
            .await
            .unwrap();
        assert_eq!(start.challenges.len(), 3);

        sessions.focus_lost(user_id).await;
        sessions.focus_lost(user_id).await;

        let submission = submit_coding(&mut controller, &gateway, &sessions, codes(3), DEFAULT_LANGUAGE)
            .await
            .unwrap();
        assert_eq!(submission.applied.passed, Some(false));
        assert_eq!(submission.result.integrity_violations, 2);
        assert_eq!(submission.result.solutions[1].challenge_title, "LRU Cache");
        assert_eq!(submission.result.solutions[1].topic, "Data Structures");

        let stored = store.get(user_id).await.unwrap().unwrap();
        assert_eq!(stored.current_stage, AssessmentStage::TechnicalCoding);
        assert!(!stored.is_coding_passed);
        assert_eq!(stored.technical_result.unwrap().score, 40.0);
        assert!(sessions.get(user_id, STAGE).await.is_none());
        assert_eq!(
            gateway.tasks(),
            vec![AiTask::CodingChallenges, AiTask::CodeEvaluation]
        );
    }

    #[tokio::test]
    async fn test_passing_submission_unlocks_interview() {
        let store = MemoryProfileStore::new();
        let user_id = Uuid::new_v4();
        let mut controller = at_coding_stage(&store, user_id).await;
        let sessions = SessionRegistry::new();
        let gateway = ScriptedGateway::new()
            .reply(CHALLENGES)
            .reply("```json\n{\"score\": 60, \"feedback\": \"Meets the bar\"}\n```");

        start_coding(&controller, &gateway, &sessions, DEFAULT_LANGUAGE)
            .await
            .unwrap();
        let submission = submit_coding(&mut controller, &gateway, &sessions, codes(3), DEFAULT_LANGUAGE)
            .await
            .unwrap();

        assert_eq!(submission.applied.passed, Some(true));
        assert_eq!(controller.stage(), AssessmentStage::Interview);
        assert_eq!(submission.result.integrity_violations, 0);
    }

    #[tokio::test]
    async fn test_submit_without_session_is_conflict() {
        let store = MemoryProfileStore::new();
        let mut controller = at_coding_stage(&store, Uuid::new_v4()).await;
        let gateway = ScriptedGateway::new();

        let result = submit_coding(
            &mut controller,
            &gateway,
            &SessionRegistry::new(),
            codes(3),
            DEFAULT_LANGUAGE,
        )
        .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_solution_count_must_match_challenges() {
        let store = MemoryProfileStore::new();
        let user_id = Uuid::new_v4();
        let mut controller = at_coding_stage(&store, user_id).await;
        let sessions = SessionRegistry::new();
        let gateway = ScriptedGateway::new().reply(CHALLENGES);

        start_coding(&controller, &gateway, &sessions, DEFAULT_LANGUAGE)
            .await
            .unwrap();
        let result =
            submit_coding(&mut controller, &gateway, &sessions, codes(2), DEFAULT_LANGUAGE).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(sessions.get(user_id, STAGE).await.is_some());
    }

    #[tokio::test]
    async fn test_failed_evaluation_keeps_session_open() {
        let store = MemoryProfileStore::new();
        let user_id = Uuid::new_v4();
        let mut controller = at_coding_stage(&store, user_id).await;
        let sessions = SessionRegistry::new();
        let gateway = ScriptedGateway::new()
            .reply(CHALLENGES)
            .fail("model overloaded");

        start_coding(&controller, &gateway, &sessions, DEFAULT_LANGUAGE)
            .await
            .unwrap();
        sessions.focus_lost(user_id).await;
        let result =
            submit_coding(&mut controller, &gateway, &sessions, codes(3), DEFAULT_LANGUAGE).await;
        assert!(matches!(result, Err(AppError::Ai(_))));

        let session = sessions.get(user_id, STAGE).await.unwrap();
        assert_eq!(session.tracker.violations(), 1);
        assert!(store
            .get(user_id)
            .await
            .unwrap()
            .unwrap()
            .technical_result
            .is_none());
    }

    #[tokio::test]
    async fn test_run_tests_checks_challenge_index() {
        let store = MemoryProfileStore::new();
        let user_id = Uuid::new_v4();
        let controller = at_coding_stage(&store, user_id).await;
        let sessions = SessionRegistry::new();
        let gateway = ScriptedGateway::new().reply(CHALLENGES).reply(
            "{\"results\": [{\"testCase\": \"flatten([1,[2]])\", \"passed\": true}]}",
        );

        start_coding(&controller, &gateway, &sessions, DEFAULT_LANGUAGE)
            .await
            .unwrap();

        let out_of_range =
            run_tests(&controller, &gateway, &sessions, 3, "code", DEFAULT_LANGUAGE).await;
        assert!(matches!(out_of_range, Err(AppError::Validation(_))));

        let report = run_tests(&controller, &gateway, &sessions, 2, "code", DEFAULT_LANGUAGE)
            .await
            .unwrap();
        assert!(report.all_passed());
    }
}
