/// AI Gateway: the single point of entry for all Gemini calls in HireAI.
///
/// No other module talks to the Generative Language API directly. Stage
/// services call the typed task functions in [`tasks`], which build a
/// [`GatewayRequest`], send it through an [`AiGateway`] and validate the reply
/// into an [`AiOutcome`].
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::profile::GroundingSource;

pub mod extract;
pub mod handlers;
pub mod prompts;
#[cfg(test)]
pub mod scripted;
pub mod tasks;

pub use extract::{parse_response, AiOutcome};

pub const FLASH_MODEL: &str = "gemini-3-flash-preview";
pub const PRO_MODEL: &str = "gemini-3-pro-preview";

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("AI returned empty content")]
    EmptyContent,

    #[error("{task} response did not match the expected schema: {message}")]
    Malformed { task: &'static str, message: String },

    #[error("AI call failed after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Task discriminator; selects the model and whether search grounding is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AiTask {
    JobDescription,
    ResumeAnalysis,
    TechnicalQuestions,
    CodingChallenges,
    CodeEvaluation,
    TestRun,
    InterviewQuestion,
    InterviewEvaluation,
    ReadinessIndex,
}

impl AiTask {
    pub fn model(self) -> &'static str {
        match self {
            AiTask::JobDescription
            | AiTask::ResumeAnalysis
            | AiTask::TechnicalQuestions
            | AiTask::TestRun => FLASH_MODEL,
            AiTask::CodingChallenges
            | AiTask::CodeEvaluation
            | AiTask::InterviewQuestion
            | AiTask::InterviewEvaluation
            | AiTask::ReadinessIndex => PRO_MODEL,
        }
    }

    /// Search-grounded tasks return citations and cannot request a JSON mime type.
    pub fn uses_search(self) -> bool {
        matches!(self, AiTask::ResumeAnalysis | AiTask::ReadinessIndex)
    }

    pub fn name(self) -> &'static str {
        match self {
            AiTask::JobDescription => "job_description",
            AiTask::ResumeAnalysis => "resume_analysis",
            AiTask::TechnicalQuestions => "technical_questions",
            AiTask::CodingChallenges => "coding_challenges",
            AiTask::CodeEvaluation => "code_evaluation",
            AiTask::TestRun => "test_run",
            AiTask::InterviewQuestion => "interview_question",
            AiTask::InterviewEvaluation => "interview_evaluation",
            AiTask::ReadinessIndex => "readiness_index",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub task: AiTask,
    pub system: String,
    pub prompt: String,
    /// JSON schema for the reply; ignored for search-grounded tasks.
    pub response_schema: Option<Value>,
}

/// Raw model text plus any grounding citations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: String,
    pub grounding: Vec<GroundingSource>,
}

#[async_trait]
pub trait AiGateway: Send + Sync {
    async fn complete(&self, request: &GatewayRequest) -> Result<Completion, AiError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

impl<'a> GenerateContentRequest<'a> {
    fn from_gateway(request: &'a GatewayRequest) -> Self {
        let search = request.task.uses_search();
        Self {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &request.system,
                }],
            },
            generation_config: (!search).then(|| GenerationConfig {
                response_mime_type: "application/json",
                response_schema: request.response_schema.as_ref(),
            }),
            tools: if search {
                vec![Tool {
                    google_search: GoogleSearch {},
                }]
            } else {
                vec![]
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
pub struct WebSource {
    pub title: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }

    /// Web citations of the first candidate; chunks without a URI are dropped.
    pub fn grounding_sources(&self) -> Vec<GroundingSource> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|meta| {
                meta.grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.as_ref())
                    .filter_map(|web| {
                        let uri = web.uri.as_deref().filter(|u| !u.is_empty())?;
                        Some(GroundingSource {
                            title: web
                                .title
                                .clone()
                                .unwrap_or_else(|| "External Source".to_string()),
                            uri: uri.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

/// Gemini `generateContent` client.
/// Retries on 429 and 5xx with exponential backoff when `max_attempts > 1`.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_attempts: u32,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String, max_attempts: u32) -> Result<Self, AiError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_attempts: max_attempts.max(1),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    async fn call(&self, request: &GatewayRequest) -> Result<GenerateContentResponse, AiError> {
        let body = GenerateContentRequest::from_gateway(request);
        let url = self.endpoint(request.task.model());

        let mut last_error: Option<AiError> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1).min(5)));
                warn!(
                    "{} call attempt {} failed, retrying after {}ms...",
                    request.task.name(),
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(AiError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Gemini API returned {status}: {body}");
                last_error = Some(AiError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GoogleError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(AiError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: GenerateContentResponse = response.json().await?;

            if let Some(usage) = &parsed.usage_metadata {
                debug!(
                    "{} call succeeded on {}: prompt_tokens={}, output_tokens={}",
                    request.task.name(),
                    request.task.model(),
                    usage.prompt_token_count,
                    usage.candidates_token_count
                );
            }

            return Ok(parsed);
        }

        Err(last_error.unwrap_or(AiError::Exhausted {
            attempts: self.max_attempts,
        }))
    }
}

#[async_trait]
impl AiGateway for GeminiClient {
    async fn complete(&self, request: &GatewayRequest) -> Result<Completion, AiError> {
        let response = self.call(request).await?;
        let text = response.text().ok_or(AiError::EmptyContent)?;
        Ok(Completion {
            text,
            grounding: response.grounding_sources(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(task: AiTask) -> GatewayRequest {
        GatewayRequest {
            task,
            system: "system".to_string(),
            prompt: "prompt".to_string(),
            response_schema: Some(json!({"type": "OBJECT"})),
        }
    }

    #[test]
    fn test_model_selection_per_task() {
        assert_eq!(AiTask::ResumeAnalysis.model(), FLASH_MODEL);
        assert_eq!(AiTask::TestRun.model(), FLASH_MODEL);
        assert_eq!(AiTask::CodeEvaluation.model(), PRO_MODEL);
        assert_eq!(AiTask::ReadinessIndex.model(), PRO_MODEL);
    }

    #[test]
    fn test_json_task_requests_mime_type_and_no_tools() {
        let req = request(AiTask::CodeEvaluation);
        let body = serde_json::to_value(GenerateContentRequest::from_gateway(&req)).unwrap();
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!(body.get("tools").is_none());
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "system");
        assert_eq!(body["contents"][0]["role"], "user");
    }

    #[test]
    fn test_search_task_uses_google_search_without_mime_type() {
        let req = request(AiTask::ResumeAnalysis);
        let body = serde_json::to_value(GenerateContentRequest::from_gateway(&req)).unwrap();
        assert!(body.get("generationConfig").is_none());
        assert_eq!(body["tools"], json!([{"googleSearch": {}}]));
    }

    #[test]
    fn test_response_text_and_grounding() {
        let raw = json!({
            "candidates": [{
                "content": {"parts": [{"text": "{\"score\":"}, {"text": " 80}"}]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"title": "Hiring trends", "uri": "https://example.com/trends"}},
                    {"web": {"uri": "https://example.com/untitled"}},
                    {"web": {"title": "No link"}}
                ]}
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4}
        });
        let response: GenerateContentResponse = serde_json::from_value(raw).unwrap();

        assert_eq!(response.text().as_deref(), Some("{\"score\": 80}"));
        let sources = response.grounding_sources();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title, "Hiring trends");
        assert_eq!(sources[1].title, "External Source");
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
        assert!(response.grounding_sources().is_empty());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GeminiClient::new(
            "key".to_string(),
            "https://example.test/v1beta/".to_string(),
            1,
        )
        .unwrap();
        assert_eq!(
            client.endpoint(FLASH_MODEL),
            "https://example.test/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }
}
