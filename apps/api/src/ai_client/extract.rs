use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::ai_client::{AiError, AiTask};

/// Result of validating model text against a task schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AiOutcome<T> {
    Parsed { value: T },
    ParseError { message: String, raw: String },
}

impl<T> AiOutcome<T> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, AiOutcome::Parsed { .. })
    }

    pub fn into_result(self, task: AiTask) -> Result<T, AiError> {
        match self {
            AiOutcome::Parsed { value } => Ok(value),
            AiOutcome::ParseError { message, .. } => Err(AiError::Malformed {
                task: task.name(),
                message,
            }),
        }
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// The span from the first `{`/`[` to the last `}`/`]`, if any.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c == '{' || c == '[')?;
    let end = text.rfind(|c: char| c == '}' || c == ']')?;
    (end > start).then(|| &text[start..=end])
}

/// Parses model text as `T`: directly, then without code fences, then from the
/// embedded JSON span. Never panics; failures keep the raw text.
pub fn parse_response<T: DeserializeOwned>(raw: &str) -> AiOutcome<T> {
    let first_error = match serde_json::from_str::<T>(raw.trim()) {
        Ok(value) => return AiOutcome::Parsed { value },
        Err(e) => e,
    };

    let unfenced = strip_json_fences(raw);
    if let Ok(value) = serde_json::from_str::<T>(unfenced) {
        return AiOutcome::Parsed { value };
    }

    if let Some(span) = extract_json(unfenced) {
        match serde_json::from_str::<T>(span) {
            Ok(value) => return AiOutcome::Parsed { value },
            Err(e) => {
                warn!("Embedded JSON did not match schema: {e}");
                return AiOutcome::ParseError {
                    message: e.to_string(),
                    raw: raw.to_string(),
                };
            }
        }
    }

    AiOutcome::ParseError {
        message: first_error.to_string(),
        raw: raw.to_string(),
    }
}
