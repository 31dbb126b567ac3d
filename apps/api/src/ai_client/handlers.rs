//! `POST /api/ai`: generic action proxy in front of the typed AI tasks.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::ai_client::tasks::{self, TaskResult, DEFAULT_LANGUAGE};
use crate::ai_client::AiGateway;
use crate::errors::AppError;
use crate::models::assessment::CodingChallenge;
use crate::state::AppState;

fn default_role() -> String {
    "Software Engineer".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
pub enum AiAction {
    GenerateJobDescription {
        role: String,
    },
    #[serde(rename_all = "camelCase")]
    AnalyzeResume {
        resume_text: String,
        #[serde(default = "default_role")]
        target_role: String,
        #[serde(default, rename = "targetJD")]
        target_jd: String,
    },
    GenerateTechnicalQuestions {
        role: String,
        #[serde(default)]
        skills: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    GenerateCodingChallenge {
        role: String,
        #[serde(default)]
        skills: Vec<String>,
        #[serde(default, rename = "targetJD")]
        target_jd: String,
        language: Option<String>,
    },
    EvaluateCode {
        challenges: Vec<CodingChallenge>,
        codes: Vec<String>,
        language: Option<String>,
    },
    RunCodeTests {
        challenge: CodingChallenge,
        code: String,
        language: Option<String>,
    },
    GetNextInterviewQuestion {
        role: String,
        #[serde(default)]
        transcript: Vec<String>,
    },
    EvaluateInterview {
        transcript: Vec<String>,
    },
    #[serde(rename = "calculateJRI")]
    CalculateJri {
        data: Value,
    },
}

fn reply<T: Serialize>(result: TaskResult<T>) -> Value {
    json!({
        "task": result.task,
        "outcome": result.outcome,
        "groundingSources": result.grounding,
    })
}

pub async fn dispatch_action(ai: &dyn AiGateway, action: AiAction) -> Result<Value, AppError> {
    let body = match action {
        AiAction::GenerateJobDescription { role } => {
            reply(tasks::generate_job_description(ai, &role).await?)
        }
        AiAction::AnalyzeResume {
            resume_text,
            target_role,
            target_jd,
        } => reply(tasks::analyze_resume(ai, &resume_text, &target_role, &target_jd).await?),
        AiAction::GenerateTechnicalQuestions { role, skills } => {
            reply(tasks::generate_technical_questions(ai, &role, &skills).await?)
        }
        AiAction::GenerateCodingChallenge {
            role,
            skills,
            target_jd,
            language,
        } => reply(
            tasks::generate_coding_challenges(
                ai,
                &role,
                &skills,
                &target_jd,
                language.as_deref().unwrap_or(DEFAULT_LANGUAGE),
            )
            .await?,
        ),
        AiAction::EvaluateCode {
            challenges,
            codes,
            language,
        } => {
            if challenges.len() != codes.len() {
                return Err(AppError::Validation(
                    "codes must contain one solution per challenge".to_string(),
                ));
            }
            reply(
                tasks::evaluate_code(
                    ai,
                    &challenges,
                    &codes,
                    language.as_deref().unwrap_or(DEFAULT_LANGUAGE),
                )
                .await?,
            )
        }
        AiAction::RunCodeTests {
            challenge,
            code,
            language,
        } => reply(
            tasks::run_code_tests(
                ai,
                &challenge,
                &code,
                language.as_deref().unwrap_or(DEFAULT_LANGUAGE),
            )
            .await?,
        ),
        AiAction::GetNextInterviewQuestion { role, transcript } => {
            reply(tasks::next_interview_question(ai, &role, &transcript).await?)
        }
        AiAction::EvaluateInterview { transcript } => {
            reply(tasks::evaluate_interview(ai, &transcript).await?)
        }
        AiAction::CalculateJri { data } => reply(tasks::calculate_readiness(ai, &data).await?),
    };
    Ok(body)
}

/// POST /api/ai
///
/// Body: `{ "action": "...", "payload": { ... } }`. Replies with the tagged outcome.
pub async fn handle_ai_action(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let action: AiAction = serde_json::from_value(body)
        .map_err(|e| AppError::Validation(format!("Invalid action: {e}")))?;
    Ok(Json(dispatch_action(state.ai.as_ref(), action).await?))
}
