//! Typed response schemas for each AI Gateway task.
//!
//! Required fields fail validation when missing; fields the model often omits
//! carry serde defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescription {
    pub job_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysis {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub resume_score: f64,
    #[serde(default)]
    pub resume_feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeExample {
    pub input: String,
    pub output: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingChallenge {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub examples: Vec<ChallengeExample>,
    #[serde(default)]
    pub starter_code: String,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default = "default_topic")]
    pub topic: String,
}

fn default_topic() -> String {
    "General".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeEvaluation {
    pub score: f64,
    #[serde(default = "default_code_feedback")]
    pub feedback: String,
}

fn default_code_feedback() -> String {
    "Evaluation complete.".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    #[serde(default)]
    pub test_case: String,
    pub passed: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestRunReport {
    #[serde(default)]
    pub results: Vec<TestCaseResult>,
}

impl TestRunReport {
    pub fn all_passed(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|r| r.passed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewScores {
    #[serde(default)]
    pub clarity: f64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default = "default_sentiment")]
    pub sentiment: String,
    #[serde(default = "default_interview_feedback")]
    pub feedback: String,
}

fn default_sentiment() -> String {
    "Neutral".to_string()
}

fn default_interview_feedback() -> String {
    "Session concluded.".to_string()
}
