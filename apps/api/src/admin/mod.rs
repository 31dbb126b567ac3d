// Admin cohort summary across all candidates.

pub mod summary;

use axum::{extract::State, http::HeaderMap, Json};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

use summary::{summarize, AdminSummary};

/// Checks `Authorization: Bearer <ADMIN_TOKEN>`. Admin routes are closed when
/// no token is configured.
pub fn authorize(headers: &HeaderMap, admin_token: Option<&str>) -> Result<(), AppError> {
    let expected = admin_token.ok_or(AppError::Unauthorized)?;
    let provided = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match provided {
        Some(token) if token == expected => Ok(()),
        _ => {
            warn!("Rejected admin request with missing or invalid token");
            Err(AppError::Unauthorized)
        }
    }
}

/// GET /api/v1/admin/summary
pub async fn handle_admin_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminSummary>, AppError> {
    authorize(&headers, state.config.admin_token.as_deref())?;
    let profiles = state.store.list().await?;
    Ok(Json(summarize(&profiles)))
}
