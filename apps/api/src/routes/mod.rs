pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::admin;
use crate::ai_client::handlers as ai;
use crate::assessment::handlers as assessment;
use crate::assessment::resume::MAX_RESUME_BYTES;
use crate::pipeline::handlers as pipeline;
use crate::proctoring::handlers as proctoring;
use crate::report;
use crate::state::AppState;

/// Multipart framing overhead allowed on top of the resume size limit.
const UPLOAD_SLACK_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Role catalogue
        .route("/api/v1/roles", get(assessment::handle_list_roles))
        .route(
            "/api/v1/roles/job-description",
            post(assessment::handle_generate_job_description),
        )
        // Pipeline
        .route(
            "/api/v1/candidates/:user_id/session",
            post(pipeline::handle_sign_in),
        )
        .route(
            "/api/v1/candidates/:user_id",
            get(pipeline::handle_get_pipeline),
        )
        .route(
            "/api/v1/candidates/:user_id/profile",
            put(pipeline::handle_edit_profile),
        )
        .route(
            "/api/v1/candidates/:user_id/stage",
            post(pipeline::handle_advance),
        )
        .route(
            "/api/v1/candidates/:user_id/role",
            post(assessment::handle_select_role),
        )
        // Resume screening
        .route(
            "/api/v1/candidates/:user_id/resume",
            post(assessment::handle_screen_resume_text),
        )
        .route(
            "/api/v1/candidates/:user_id/resume/upload",
            post(assessment::handle_upload_resume)
                .layer(DefaultBodyLimit::max(MAX_RESUME_BYTES + UPLOAD_SLACK_BYTES)),
        )
        // Coding assessment
        .route(
            "/api/v1/candidates/:user_id/coding/start",
            post(assessment::handle_start_coding),
        )
        .route(
            "/api/v1/candidates/:user_id/coding/run",
            post(assessment::handle_run_tests),
        )
        .route(
            "/api/v1/candidates/:user_id/coding/submit",
            post(assessment::handle_submit_coding),
        )
        // Interview
        .route(
            "/api/v1/candidates/:user_id/interview/start",
            post(assessment::handle_start_interview),
        )
        .route(
            "/api/v1/candidates/:user_id/interview/answer",
            post(assessment::handle_answer),
        )
        .route(
            "/api/v1/candidates/:user_id/interview/finish",
            post(assessment::handle_finish_interview),
        )
        // Proctoring
        .route(
            "/api/v1/candidates/:user_id/integrity/focus-lost",
            post(proctoring::handle_focus_lost),
        )
        // Readiness report
        .route(
            "/api/v1/candidates/:user_id/report",
            get(report::handle_get_report),
        )
        // Admin
        .route("/api/v1/admin/summary", get(admin::handle_admin_summary))
        // AI gateway action proxy
        .route("/api/ai", post(ai::handle_ai_action))
        .with_state(state)
}
