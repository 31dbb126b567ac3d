use tracing::{debug, info};

use crate::ai_client::{tasks, AiGateway};
use crate::errors::AppError;
use crate::models::profile::InterviewEvaluation;
use crate::pipeline::controller::PipelineController;
use crate::pipeline::machine::{Applied, Command};
use crate::pipeline::stage::AssessmentStage;
use crate::proctoring::SessionRegistry;

const STAGE: AssessmentStage = AssessmentStage::Interview;

/// The interview is evaluated once the transcript holds this many lines.
pub const TRANSCRIPT_LIMIT: usize = 8;

#[derive(Debug, Clone)]
pub struct InterviewCompletion {
    pub applied: Applied,
    pub evaluation: InterviewEvaluation,
}

#[derive(Debug, Clone)]
pub enum InterviewStep {
    Asked {
        question: String,
        transcript: Vec<String>,
    },
    Completed(InterviewCompletion),
}

fn no_session() -> AppError {
    AppError::Conflict("No active interview session; start the interview first".to_string())
}

async fn ask_next(
    controller: &PipelineController<'_>,
    ai: &dyn AiGateway,
    transcript: &[String],
) -> Result<String, AppError> {
    let question = tasks::next_interview_question(ai, controller.profile().role_or_default(), transcript)
        .await?
        .into_parsed()?
        .question;
    if question.trim().is_empty() {
        return Err(AppError::Ai("empty interview question".to_string()));
    }
    Ok(question)
}

/// Arms a fresh proctored session and asks the opening question.
pub async fn start_interview(
    controller: &PipelineController<'_>,
    ai: &dyn AiGateway,
    sessions: &SessionRegistry,
) -> Result<InterviewStep, AppError> {
    controller.ensure_stage(STAGE, "Starting the interview")?;

    let question = ask_next(controller, ai, &[]).await?;
    let transcript = vec![format!("AI: {question}")];

    let user_id = controller.user_id();
    sessions.start(user_id, STAGE).await;
    sessions
        .with_session(user_id, STAGE, |s| s.transcript = transcript.clone())
        .await;

    info!("Interview started for candidate {user_id}");
    Ok(InterviewStep::Asked {
        question,
        transcript,
    })
}

/// Records an answer, then asks the next question or, once the transcript is
/// full, evaluates the interview. A full transcript is never extended.
pub async fn answer(
    controller: &mut PipelineController<'_>,
    ai: &dyn AiGateway,
    sessions: &SessionRegistry,
    answer: &str,
) -> Result<InterviewStep, AppError> {
    controller.ensure_stage(STAGE, "Answering")?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(AppError::Validation("answer cannot be empty".to_string()));
    }

    let user_id = controller.user_id();
    let session = sessions.get(user_id, STAGE).await.ok_or_else(no_session)?;
    if session.transcript.len() >= TRANSCRIPT_LIMIT {
        // A previous evaluation failed on a full transcript; retry it as is.
        debug!("Transcript already full for candidate {user_id}, re-evaluating");
        let completion = finish_interview(controller, ai, sessions).await?;
        return Ok(InterviewStep::Completed(completion));
    }

    let mut transcript = session.transcript;
    transcript.push(format!("USER: {answer}"));

    if transcript.len() >= TRANSCRIPT_LIMIT {
        sessions
            .with_session(user_id, STAGE, |s| s.transcript = transcript)
            .await
            .ok_or_else(no_session)?;
        let completion = finish_interview(controller, ai, sessions).await?;
        return Ok(InterviewStep::Completed(completion));
    }

    let question = ask_next(controller, ai, &transcript).await?;
    transcript.push(format!("AI: {question}"));
    sessions
        .with_session(user_id, STAGE, |s| s.transcript = transcript.clone())
        .await
        .ok_or_else(no_session)?;

    Ok(InterviewStep::Asked {
        question,
        transcript,
    })
}

/// Evaluates the transcript so far, closes the session and records the result.
pub async fn finish_interview(
    controller: &mut PipelineController<'_>,
    ai: &dyn AiGateway,
    sessions: &SessionRegistry,
) -> Result<InterviewCompletion, AppError> {
    controller.ensure_stage(STAGE, "Finishing the interview")?;

    let user_id = controller.user_id();
    let session = sessions.get(user_id, STAGE).await.ok_or_else(no_session)?;
    let scores = tasks::evaluate_interview(ai, &session.transcript)
        .await?
        .into_parsed()?;

    let finished = sessions.finish(user_id, STAGE).await.ok_or_else(no_session)?;
    let evaluation = InterviewEvaluation {
        clarity: scores.clarity,
        confidence: scores.confidence,
        sentiment: scores.sentiment,
        transcript: finished.transcript,
        feedback: scores.feedback,
        integrity_violations: finished.tracker.violations(),
    };

    info!(
        "Interview evaluated for candidate {user_id}: clarity {}, confidence {}, {} violations",
        evaluation.clarity, evaluation.confidence, evaluation.integrity_violations
    );

    let applied = controller
        .dispatch(Command::RecordInterview(evaluation.clone()))
        .await?;
    Ok(InterviewCompletion {
        applied,
        evaluation,
    })
}
