use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::proctoring::tracker::integrity_score;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusLostResponse {
    pub counted: bool,
    pub violations: u32,
    pub integrity_score: u32,
}

/// POST /api/v1/candidates/:user_id/integrity/focus-lost
///
/// Counts a focus-loss event against the candidate's armed stage session.
/// Events outside a proctored session are acknowledged but ignored.
pub async fn handle_focus_lost(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<FocusLostResponse>, AppError> {
    let response = match state.sessions.focus_lost(user_id).await {
        Some(violations) => {
            info!("Integrity violation #{violations} for candidate {user_id}");
            FocusLostResponse {
                counted: true,
                violations,
                integrity_score: integrity_score(violations),
            }
        }
        None => FocusLostResponse {
            counted: false,
            violations: 0,
            integrity_score: integrity_score(0),
        },
    };
    Ok(Json(response))
}
