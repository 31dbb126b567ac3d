//! Axum route handlers for the candidate pipeline.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::ProfileEdit;
use crate::pipeline::controller::{PipelineController, PipelineSnapshot};
use crate::pipeline::machine::{Applied, Command, Transition};
use crate::pipeline::stage::AssessmentStage;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub stage: AssessmentStage,
}

/// Result of a pipeline command plus the resulting snapshot.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub transition: Transition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    pub snapshot: PipelineSnapshot,
}

impl CommandResponse {
    pub fn new(applied: Applied, controller: &PipelineController<'_>) -> Self {
        Self {
            transition: applied.transition,
            passed: applied.passed,
            snapshot: controller.snapshot(),
        }
    }
}

pub async fn load_controller(
    state: &AppState,
    user_id: Uuid,
) -> Result<PipelineController<'_>, AppError> {
    PipelineController::load(state.store.as_ref(), user_id, state.config.persistence_policy).await
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/candidates/:user_id/session
///
/// Sign-in: loads the stored profile or creates a fresh one, and resumes the
/// pipeline at the stored stage.
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PipelineSnapshot>, AppError> {
    let controller =
        PipelineController::sign_in(state.store.as_ref(), user_id, state.config.persistence_policy)
            .await?;
    Ok(Json(controller.snapshot()))
}

/// GET /api/v1/candidates/:user_id
pub async fn handle_get_pipeline(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PipelineSnapshot>, AppError> {
    let controller = load_controller(&state, user_id).await?;
    Ok(Json(controller.snapshot()))
}

/// PUT /api/v1/candidates/:user_id/profile
///
/// Edits identity and background fields. Stage, pass flags and results are
/// not editable here.
pub async fn handle_edit_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(edit): Json<ProfileEdit>,
) -> Result<Json<CommandResponse>, AppError> {
    if edit.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let mut controller = load_controller(&state, user_id).await?;
    let applied = controller.dispatch(Command::EditProfile(edit)).await?;
    Ok(Json(CommandResponse::new(applied, &controller)))
}

/// POST /api/v1/candidates/:user_id/stage
///
/// Requests a stage change. A locked stage is not an error: the transition is
/// reported as denied and the snapshot is unchanged.
pub async fn handle_advance(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AdvanceRequest>,
) -> Result<Json<CommandResponse>, AppError> {
    let mut controller = load_controller(&state, user_id).await?;
    let applied = controller.dispatch(Command::Advance(request.stage)).await?;
    Ok(Json(CommandResponse::new(applied, &controller)))
}
