// Prompt templates and response schemas for every AI task.
// Prompt wording is deliberately minimal; the schemas carry the contract.

use serde_json::{json, Value};

use crate::ai_client::{AiTask, GatewayRequest};
use crate::models::assessment::CodingChallenge;

pub const SYSTEM_IDENTITY: &str = "You are a proprietary recruitment engine built by HireAI. \
    You must NEVER identify as Google or Gemini. \
    You are a custom-developed assessment logic designed to evaluate job readiness with high precision.";

const JSON_ONLY: &str = "Respond with valid JSON only. Do NOT use markdown code fences.";

fn request(task: AiTask, system: String, prompt: String, schema: Option<Value>) -> GatewayRequest {
    GatewayRequest {
        task,
        system,
        prompt,
        response_schema: schema,
    }
}

pub fn job_description(role: &str) -> GatewayRequest {
    request(
        AiTask::JobDescription,
        SYSTEM_IDENTITY.to_string(),
        format!(
            "Generate a concise, professional job description for the role: \"{role}\". \
             Focus on key technical responsibilities. {JSON_ONLY}"
        ),
        Some(json!({
            "type": "OBJECT",
            "properties": { "jobDescription": { "type": "STRING" } },
            "required": ["jobDescription"]
        })),
    )
}

pub fn resume_analysis(resume_text: &str, target_role: &str, target_jd: &str) -> GatewayRequest {
    request(
        AiTask::ResumeAnalysis,
        SYSTEM_IDENTITY.to_string(),
        format!(
            "Retrieve current industry standards for a \"{target_role}\" position.\n\
             Analyze this resume against those standards and this specific JD: {target_jd}\n\
             Resume: {resume_text}\n\
             Output the analysis as a JSON object with properties: name, skills (array), \
             resumeScore (number 0-100), and resumeFeedback (string)."
        ),
        None,
    )
}

pub fn technical_questions(role: &str, skills: &[String], count: usize) -> GatewayRequest {
    request(
        AiTask::TechnicalQuestions,
        format!("{SYSTEM_IDENTITY} Focus on high-precision technical accuracy."),
        format!(
            "Generate {count} technical multiple-choice questions for a \"{role}\" role. \
             Skills: {}. Output ONLY a JSON array.",
            skills.join(", ")
        ),
        Some(json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "question": { "type": "STRING" },
                    "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "correctIndex": { "type": "NUMBER" }
                },
                "required": ["question", "options", "correctIndex"]
            }
        })),
    )
}

pub fn coding_challenges(
    role: &str,
    skills: &[String],
    target_jd: &str,
    count: usize,
    language: &str,
) -> GatewayRequest {
    request(
        AiTask::CodingChallenges,
        SYSTEM_IDENTITY.to_string(),
        format!(
            "Generate exactly {count} coding challenges for a \"{role}\" in {language}. \
             Skills: {}. JD context: {target_jd}. Use real-world logic, no filler.",
            skills.join(", ")
        ),
        Some(json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING" },
                    "description": { "type": "STRING" },
                    "difficulty": { "type": "STRING" },
                    "examples": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "input": { "type": "STRING" },
                                "output": { "type": "STRING" },
                                "explanation": { "type": "STRING" }
                            }
                        }
                    },
                    "starterCode": { "type": "STRING" },
                    "constraints": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "topic": { "type": "STRING" }
                },
                "required": ["title", "description", "starterCode", "topic", "difficulty", "examples"]
            }
        })),
    )
}

pub fn code_evaluation(
    challenges: &[CodingChallenge],
    codes: &[String],
    language: &str,
) -> GatewayRequest {
    let submissions: Vec<Value> = challenges
        .iter()
        .zip(codes)
        .map(|(challenge, code)| json!({ "title": challenge.title, "solution": code }))
        .collect();

    request(
        AiTask::CodeEvaluation,
        SYSTEM_IDENTITY.to_string(),
        format!(
            "Evaluate these technical solutions written in {language}. \
             Score 0-100 across all of them and give feedback.\n{}",
            Value::Array(submissions)
        ),
        Some(json!({
            "type": "OBJECT",
            "properties": {
                "score": { "type": "NUMBER" },
                "feedback": { "type": "STRING" }
            },
            "required": ["score", "feedback"]
        })),
    )
}

pub fn test_run(challenge: &CodingChallenge, code: &str, language: &str) -> GatewayRequest {
    request(
        AiTask::TestRun,
        "You are a virtual code execution engine. Return test results in JSON format.".to_string(),
        format!(
            "Simulate test execution for challenge: {}. Language: {language}. Code: {code}",
            challenge.title
        ),
        Some(json!({
            "type": "OBJECT",
            "properties": {
                "results": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "testCase": { "type": "STRING" },
                            "passed": { "type": "BOOLEAN" },
                            "error": { "type": "STRING" }
                        }
                    }
                }
            }
        })),
    )
}

pub fn interview_question(role: &str, transcript: &[String]) -> GatewayRequest {
    request(
        AiTask::InterviewQuestion,
        format!("{SYSTEM_IDENTITY} Be professional, probing, and conversational."),
        format!(
            "Conduct an interview for the role: {role}.\nTranscript so far:\n{}\n\
             Generate the next interview question.",
            transcript.join("\n")
        ),
        Some(json!({
            "type": "OBJECT",
            "properties": { "question": { "type": "STRING" } },
            "required": ["question"]
        })),
    )
}

pub fn interview_evaluation(transcript: &[String]) -> GatewayRequest {
    request(
        AiTask::InterviewEvaluation,
        SYSTEM_IDENTITY.to_string(),
        format!(
            "Evaluate this interview transcript for clarity, confidence, and sentiment. \
             Scores are 0-100.\nTranscript:\n{}",
            transcript.join("\n")
        ),
        Some(json!({
            "type": "OBJECT",
            "properties": {
                "clarity": { "type": "NUMBER" },
                "confidence": { "type": "NUMBER" },
                "sentiment": { "type": "STRING" },
                "feedback": { "type": "STRING" }
            },
            "required": ["clarity", "confidence", "sentiment", "feedback"]
        })),
    )
}

pub fn readiness_index(assessment: &Value) -> GatewayRequest {
    request(
        AiTask::ReadinessIndex,
        SYSTEM_IDENTITY.to_string(),
        format!(
            "Evaluate this candidate profile for the Job Readiness Index (JRI): {assessment}\n\
             Include current market demand levels in your reasoning.\n\
             Output a JSON object with properties: overallScore, verdict (SELECTED, \
             HIGHLY_RECOMMENDED, or NEEDS_GROWTH), decisionSummary, resumeQuality, \
             technicalProficiency, communicationLevel, ethicalBehavior, and improvements \
             (array of objects with domain, score, gap, actionPlan, suggestedResources)."
        ),
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_tasks_carry_no_schema() {
        assert!(resume_analysis("cv", "Java Developer", "").response_schema.is_none());
        assert!(readiness_index(&json!({})).response_schema.is_none());
        assert!(job_description("SRE").response_schema.is_some());
    }

    #[test]
    fn test_code_evaluation_pairs_titles_with_solutions() {
        let challenge = CodingChallenge {
            title: "Two Sum".to_string(),
            description: "Find indices".to_string(),
            difficulty: "Easy".to_string(),
            examples: vec![],
            starter_code: String::new(),
            constraints: vec![],
            topic: "Arrays".to_string(),
        };
        let req = code_evaluation(&[challenge], &["return [0, 1];".to_string()], "javascript");
        assert_eq!(req.task, AiTask::CodeEvaluation);
        assert!(req.prompt.contains("\"title\":\"Two Sum\""));
        assert!(req.prompt.contains("return [0, 1];"));
    }
}
