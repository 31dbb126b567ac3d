use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;

use crate::ai_client::AiGateway;
use crate::config::Config;
use crate::proctoring::SessionRegistry;
use crate::store::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres-backed profile store behind the Redis mirror.
    pub store: Arc<dyn ProfileStore>,
    pub ai: Arc<dyn AiGateway>,
    pub s3: S3Client,
    /// Active proctored stage sessions.
    pub sessions: SessionRegistry,
    pub config: Config,
}
