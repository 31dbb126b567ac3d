use serde_json::{json, Value};
use tracing::info;

use crate::ai_client::{tasks, AiGateway};
use crate::errors::AppError;
use crate::models::profile::CandidateProfile;
use crate::models::report::JriReport;

/// The assessment summary sent to the readiness task.
pub fn assessment_summary(profile: &CandidateProfile) -> Value {
    json!({
        "name": profile.name,
        "role": profile.role_or_default(),
        "targetJD": profile.target_jd_or_empty(),
        "skills": profile.skills,
        "education": profile.education,
        "experience": profile.work_experience,
        "resume": {
            "score": profile.resume_score,
            "feedback": profile.resume_feedback,
        },
        "technical": profile.technical_result.as_ref().map(|t| json!({
            "score": t.score,
            "total": t.total,
            "feedback": t.feedback,
            "integrityViolations": t.integrity_violations,
        })),
        "interview": profile.interview_result.as_ref().map(|i| json!({
            "clarity": i.clarity,
            "confidence": i.confidence,
            "sentiment": i.sentiment,
            "feedback": i.feedback,
            "integrityViolations": i.integrity_violations,
        })),
        "totalIntegrityViolations": profile.total_integrity_violations(),
    })
}

/// Computes the Job Readiness Index. Derived on demand, never stored.
pub async fn build_report(
    ai: &dyn AiGateway,
    profile: &CandidateProfile,
) -> Result<JriReport, AppError> {
    if !profile.is_interview_passed {
        return Err(AppError::Conflict(
            "The readiness report is available after the interview".to_string(),
        ));
    }

    let (mut report, grounding) = tasks::calculate_readiness(ai, &assessment_summary(profile))
        .await?
        .into_grounded()?;

    if !report.overall_score.is_finite() {
        return Err(AppError::Ai("readiness score is not a number".to_string()));
    }
    report.overall_score = report.overall_score.clamp(0.0, 100.0);
    if !grounding.is_empty() {
        report.grounding_sources = grounding;
    }

    info!(
        "Readiness index {} ({:?}) for {}",
        report.overall_score, report.verdict, profile.name
    );
    Ok(report)
}
