// Job Readiness Index report, computed on demand once the interview is done.

pub mod readiness;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::report::JriReport;
use crate::pipeline::handlers::load_controller;
use crate::state::AppState;

/// GET /api/v1/candidates/:user_id/report
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<JriReport>, AppError> {
    let controller = load_controller(&state, user_id).await?;
    let report = readiness::build_report(state.ai.as_ref(), controller.profile()).await?;
    Ok(Json(report))
}
