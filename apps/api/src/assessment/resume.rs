use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::ai_client::{tasks, AiGateway};
use crate::errors::AppError;
use crate::pipeline::controller::PipelineController;
use crate::pipeline::machine::{Applied, Command, ResumeOutcome};
use crate::pipeline::stage::AssessmentStage;

pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// An uploaded resume file.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ResumeDocument {
    pub fn is_pdf(&self) -> bool {
        self.content_type.eq_ignore_ascii_case("application/pdf")
            || self.file_name.to_ascii_lowercase().ends_with(".pdf")
            || self.bytes.starts_with(b"%PDF")
    }
}

/// File metadata recorded on the profile alongside the analysis.
#[derive(Debug, Clone, Default)]
pub struct DocumentMeta {
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub document_key: Option<String>,
}

fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name).trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "resume".to_string()
    } else {
        cleaned
    }
}

/// Object key for an uploaded resume: `resumes/{user_id}/{file_name}`.
pub fn document_key(user_id: Uuid, file_name: &str) -> String {
    format!("resumes/{user_id}/{}", sanitize_file_name(file_name))
}

/// Plain text of an uploaded resume. PDFs go through `pdf-extract`; anything
/// else must be UTF-8 text.
pub fn extract_text(document: &ResumeDocument) -> Result<String, AppError> {
    if document.bytes.len() > MAX_RESUME_BYTES {
        return Err(AppError::Validation(format!(
            "Resume exceeds the {} MB limit",
            MAX_RESUME_BYTES / (1024 * 1024)
        )));
    }

    let text = if document.is_pdf() {
        pdf_extract::extract_text_from_mem(&document.bytes)
            .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?
    } else {
        String::from_utf8(document.bytes.to_vec()).map_err(|_| {
            AppError::Validation("Resume must be a PDF or a UTF-8 text file".to_string())
        })?
    };

    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "No readable text found in the resume".to_string(),
        ));
    }
    Ok(text)
}

pub async fn store_document(
    s3: &S3Client,
    bucket: &str,
    key: &str,
    document: &ResumeDocument,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(document.bytes.clone()))
        .content_type(&document.content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Resume upload failed: {e}")))?;

    info!("Uploaded resume to s3://{bucket}/{key}");
    Ok(())
}

/// Scores a resume against the candidate's target role and records the result.
/// Passing (score ≥ 70) moves the candidate on to the coding stage.
pub async fn screen_resume(
    controller: &mut PipelineController<'_>,
    ai: &dyn AiGateway,
    resume_text: &str,
    meta: DocumentMeta,
) -> Result<Applied, AppError> {
    controller.ensure_stage(AssessmentStage::Resume, "Resume screening")?;
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume text cannot be empty".to_string()));
    }

    let profile = controller.profile();
    let role = profile.role_or_default().to_string();
    let target_jd = profile.target_jd_or_empty().to_string();

    let (mut analysis, grounding_sources) =
        tasks::analyze_resume(ai, resume_text, &role, &target_jd)
            .await?
            .into_grounded()?;

    if !analysis.resume_score.is_finite() {
        return Err(AppError::Ai("resume score is not a number".to_string()));
    }
    analysis.resume_score = analysis.resume_score.clamp(0.0, 100.0);

    info!(
        "Resume scored {} for candidate {} ({role})",
        analysis.resume_score,
        controller.user_id()
    );

    let outcome = ResumeOutcome {
        analysis,
        file_name: meta.file_name,
        file_type: meta.file_type,
        document_key: meta.document_key,
        grounding_sources,
    };
    controller.dispatch(Command::RecordResume(outcome)).await
}
