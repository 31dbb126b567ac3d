//! Typed AI tasks. Each function builds its request, calls the gateway and
//! validates the reply. Transport errors are `Err`; schema mismatches come
//! back as `AiOutcome::ParseError` inside an `Ok` so callers can decide.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::error;

use crate::ai_client::{parse_response, prompts, AiError, AiGateway, AiOutcome, AiTask, GatewayRequest};
use crate::models::assessment::{
    CodeEvaluation, CodingChallenge, InterviewQuestion, InterviewScores, JobDescription,
    McqQuestion, ResumeAnalysis, TestRunReport,
};
use crate::models::profile::GroundingSource;
use crate::models::report::JriReport;

pub const DEFAULT_LANGUAGE: &str = "javascript";
pub const DEFAULT_CHALLENGE_COUNT: usize = 3;
pub const DEFAULT_MCQ_COUNT: usize = 5;

#[derive(Debug, Clone)]
pub struct TaskResult<T> {
    pub task: AiTask,
    pub outcome: AiOutcome<T>,
    pub grounding: Vec<GroundingSource>,
}

impl<T> TaskResult<T> {
    pub fn into_parsed(self) -> Result<T, AiError> {
        self.outcome.into_result(self.task)
    }

    pub fn into_grounded(self) -> Result<(T, Vec<GroundingSource>), AiError> {
        let grounding = self.grounding;
        let value = self.outcome.into_result(self.task)?;
        Ok((value, grounding))
    }
}

async fn run<T: DeserializeOwned>(
    ai: &dyn AiGateway,
    request: GatewayRequest,
) -> Result<TaskResult<T>, AiError> {
    let completion = ai.complete(&request).await.map_err(|e| {
        error!("{} call failed: {e}", request.task.name());
        e
    })?;

    let outcome = parse_response::<T>(&completion.text);
    if let AiOutcome::ParseError { message, .. } = &outcome {
        error!(
            "{} response could not be parsed: {message}",
            request.task.name()
        );
    }

    Ok(TaskResult {
        task: request.task,
        outcome,
        grounding: completion.grounding,
    })
}

pub async fn generate_job_description(
    ai: &dyn AiGateway,
    role: &str,
) -> Result<TaskResult<JobDescription>, AiError> {
    run(ai, prompts::job_description(role)).await
}

pub async fn analyze_resume(
    ai: &dyn AiGateway,
    resume_text: &str,
    target_role: &str,
    target_jd: &str,
) -> Result<TaskResult<ResumeAnalysis>, AiError> {
    run(ai, prompts::resume_analysis(resume_text, target_role, target_jd)).await
}

pub async fn generate_technical_questions(
    ai: &dyn AiGateway,
    role: &str,
    skills: &[String],
) -> Result<TaskResult<Vec<McqQuestion>>, AiError> {
    run(ai, prompts::technical_questions(role, skills, DEFAULT_MCQ_COUNT)).await
}

pub async fn generate_coding_challenges(
    ai: &dyn AiGateway,
    role: &str,
    skills: &[String],
    target_jd: &str,
    language: &str,
) -> Result<TaskResult<Vec<CodingChallenge>>, AiError> {
    run(
        ai,
        prompts::coding_challenges(role, skills, target_jd, DEFAULT_CHALLENGE_COUNT, language),
    )
    .await
}

pub async fn evaluate_code(
    ai: &dyn AiGateway,
    challenges: &[CodingChallenge],
    codes: &[String],
    language: &str,
) -> Result<TaskResult<CodeEvaluation>, AiError> {
    run(ai, prompts::code_evaluation(challenges, codes, language)).await
}

pub async fn run_code_tests(
    ai: &dyn AiGateway,
    challenge: &CodingChallenge,
    code: &str,
    language: &str,
) -> Result<TaskResult<TestRunReport>, AiError> {
    run(ai, prompts::test_run(challenge, code, language)).await
}

pub async fn next_interview_question(
    ai: &dyn AiGateway,
    role: &str,
    transcript: &[String],
) -> Result<TaskResult<InterviewQuestion>, AiError> {
    run(ai, prompts::interview_question(role, transcript)).await
}

pub async fn evaluate_interview(
    ai: &dyn AiGateway,
    transcript: &[String],
) -> Result<TaskResult<InterviewScores>, AiError> {
    run(ai, prompts::interview_evaluation(transcript)).await
}

pub async fn calculate_readiness(
    ai: &dyn AiGateway,
    assessment: &Value,
) -> Result<TaskResult<JriReport>, AiError> {
    run(ai, prompts::readiness_index(assessment)).await
}
