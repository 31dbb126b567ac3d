//! Axum route handlers for the assessment stages.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::ai_client::tasks::DEFAULT_LANGUAGE;
use crate::assessment::coding::{self, CodingStart};
use crate::assessment::interview::{self, InterviewCompletion, InterviewStep};
use crate::assessment::resume::{self, DocumentMeta, ResumeDocument};
use crate::assessment::roles::{self, PresetRole, PRESET_ROLES};
use crate::errors::AppError;
use crate::models::assessment::TestRunReport;
use crate::models::profile::{InterviewEvaluation, TechnicalScore};
use crate::pipeline::controller::{PipelineController, PipelineSnapshot};
use crate::pipeline::handlers::{load_controller, CommandResponse};
use crate::pipeline::machine::{Applied, Command, Transition};
use crate::pipeline::stage::AssessmentStage;
use crate::proctoring::integrity_score;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JobDescriptionRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRoleRequest {
    pub role: String,
    #[serde(default, rename = "targetJD")]
    pub target_jd: Option<String>,
    #[serde(default, rename = "generateJD")]
    pub generate_jd: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeTextRequest {
    pub resume_text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CodingStartRequest {
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunRequest {
    pub challenge_index: usize,
    pub code: String,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CodingSubmitRequest {
    pub codes: Vec<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

/// A recorded stage result together with the pipeline outcome.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageResultResponse<T> {
    pub transition: Transition,
    pub passed: Option<bool>,
    pub result: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity_score: Option<u32>,
    pub snapshot: PipelineSnapshot,
}

impl<T> StageResultResponse<T> {
    fn new(applied: Applied, result: T, controller: &PipelineController<'_>) -> Self {
        Self {
            transition: applied.transition,
            passed: applied.passed,
            result,
            integrity_score: None,
            snapshot: controller.snapshot(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InterviewResponse {
    Asked {
        question: String,
        transcript: Vec<String>,
    },
    Completed(StageResultResponse<InterviewEvaluation>),
}

fn interview_response(step: InterviewStep, controller: &PipelineController<'_>) -> InterviewResponse {
    match step {
        InterviewStep::Asked {
            question,
            transcript,
        } => InterviewResponse::Asked {
            question,
            transcript,
        },
        InterviewStep::Completed(InterviewCompletion {
            applied,
            evaluation,
        }) => InterviewResponse::Completed(StageResultResponse::new(applied, evaluation, controller)),
    }
}

fn language_or_default(language: Option<String>) -> String {
    language
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Role selection
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/roles
pub async fn handle_list_roles() -> Json<Vec<PresetRole>> {
    Json(PRESET_ROLES.to_vec())
}

/// POST /api/v1/roles/job-description
pub async fn handle_generate_job_description(
    State(state): State<AppState>,
    Json(request): Json<JobDescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    if request.role.trim().is_empty() {
        return Err(AppError::Validation("role cannot be empty".to_string()));
    }
    let jd = roles::generate_job_description(state.ai.as_ref(), request.role.trim()).await?;
    Ok(Json(json!({ "jobDescription": jd })))
}

/// POST /api/v1/candidates/:user_id/role
pub async fn handle_select_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<SelectRoleRequest>,
) -> Result<Json<CommandResponse>, AppError> {
    let mut controller = load_controller(&state, user_id).await?;
    let target = roles::resolve_role(
        state.ai.as_ref(),
        &request.role,
        request.target_jd.as_deref(),
        request.generate_jd,
    )
    .await?;

    let applied = controller
        .dispatch(Command::SelectRole {
            role: target.role,
            target_jd: target.target_jd,
        })
        .await?;
    Ok(Json(CommandResponse::new(applied, &controller)))
}

// ────────────────────────────────────────────────────────────────────────────
// Resume screening
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/candidates/:user_id/resume
pub async fn handle_screen_resume_text(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<ResumeTextRequest>,
) -> Result<Json<CommandResponse>, AppError> {
    let mut controller = load_controller(&state, user_id).await?;
    let applied = resume::screen_resume(
        &mut controller,
        state.ai.as_ref(),
        &request.resume_text,
        DocumentMeta::default(),
    )
    .await?;
    Ok(Json(CommandResponse::new(applied, &controller)))
}

/// POST /api/v1/candidates/:user_id/resume/upload
///
/// Multipart form with a `resume` file field (PDF or UTF-8 text). The file is
/// stored in S3 and its text is screened like a pasted resume.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<CommandResponse>, AppError> {
    let mut controller = load_controller(&state, user_id).await?;
    controller.ensure_stage(AssessmentStage::Resume, "Resume upload")?;

    let mut document: Option<ResumeDocument> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if !matches!(field.name(), Some("resume") | Some("file")) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::Validation("Invalid file".to_string()))?;
        document = Some(ResumeDocument {
            file_name,
            content_type,
            bytes,
        });
        break;
    }

    let document =
        document.ok_or_else(|| AppError::Validation("No resume file provided".to_string()))?;
    let text = resume::extract_text(&document)?;

    let key = resume::document_key(user_id, &document.file_name);
    resume::store_document(&state.s3, &state.config.s3_bucket, &key, &document).await?;
    info!(
        "Screening uploaded resume '{}' for candidate {user_id}",
        document.file_name
    );

    let meta = DocumentMeta {
        file_name: Some(document.file_name),
        file_type: Some(document.content_type),
        document_key: Some(key),
    };
    let applied = resume::screen_resume(&mut controller, state.ai.as_ref(), &text, meta).await?;
    Ok(Json(CommandResponse::new(applied, &controller)))
}

// ────────────────────────────────────────────────────────────────────────────
// Coding assessment
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/candidates/:user_id/coding/start
pub async fn handle_start_coding(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    request: Option<Json<CodingStartRequest>>,
) -> Result<Json<CodingStart>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let controller = load_controller(&state, user_id).await?;
    let start = coding::start_coding(
        &controller,
        state.ai.as_ref(),
        &state.sessions,
        &language_or_default(request.language),
    )
    .await?;
    Ok(Json(start))
}

/// POST /api/v1/candidates/:user_id/coding/run
pub async fn handle_run_tests(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<TestRunRequest>,
) -> Result<Json<TestRunReport>, AppError> {
    let controller = load_controller(&state, user_id).await?;
    let report = coding::run_tests(
        &controller,
        state.ai.as_ref(),
        &state.sessions,
        request.challenge_index,
        &request.code,
        &language_or_default(request.language),
    )
    .await?;
    Ok(Json(report))
}

/// POST /api/v1/candidates/:user_id/coding/submit
pub async fn handle_submit_coding(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<CodingSubmitRequest>,
) -> Result<Json<StageResultResponse<TechnicalScore>>, AppError> {
    let mut controller = load_controller(&state, user_id).await?;
    let submission = coding::submit_coding(
        &mut controller,
        state.ai.as_ref(),
        &state.sessions,
        request.codes,
        &language_or_default(request.language),
    )
    .await?;

    let integrity = integrity_score(submission.result.integrity_violations);
    let mut response = StageResultResponse::new(submission.applied, submission.result, &controller);
    response.integrity_score = Some(integrity);
    Ok(Json(response))
}

// ────────────────────────────────────────────────────────────────────────────
// Interview
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/candidates/:user_id/interview/start
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<InterviewResponse>, AppError> {
    let controller = load_controller(&state, user_id).await?;
    let step = interview::start_interview(&controller, state.ai.as_ref(), &state.sessions).await?;
    Ok(Json(interview_response(step, &controller)))
}

/// POST /api/v1/candidates/:user_id/interview/answer
pub async fn handle_answer(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<InterviewResponse>, AppError> {
    let mut controller = load_controller(&state, user_id).await?;
    let step = interview::answer(
        &mut controller,
        state.ai.as_ref(),
        &state.sessions,
        &request.answer,
    )
    .await?;
    Ok(Json(interview_response(step, &controller)))
}

/// POST /api/v1/candidates/:user_id/interview/finish
pub async fn handle_finish_interview(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<StageResultResponse<InterviewEvaluation>>, AppError> {
    let mut controller = load_controller(&state, user_id).await?;
    let completion =
        interview::finish_interview(&mut controller, state.ai.as_ref(), &state.sessions).await?;
    Ok(Json(StageResultResponse::new(
        completion.applied,
        completion.evaluation,
        &controller,
    )))
}
