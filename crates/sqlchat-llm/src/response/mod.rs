//! Response bodies for the two supported wire formats, and the parser that turns a body into
//! assistant text.
#![allow(
    dead_code,
    reason = "provider metadata is kept on the structs for Debug output in logs"
)]

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LlmError, truncate_for_error};
use crate::manager::Role;
use crate::provider::ProviderKind;

const ERROR_EXCERPT_LEN: usize = 2_000;

/// `POST /api/chat` with `stream: false`.
#[derive(Deserialize, Debug, Serialize, Clone)]
pub(crate) struct OllamaResponse {
    #[serde(default)]
    pub(crate) model: String,
    #[serde(default)]
    pub(crate) message: Option<ResponseMessage>,
    #[serde(default)]
    pub(crate) done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) done_reason: Option<String>,
}

/// OpenAI-style `/chat/completions` body.
#[derive(Deserialize, Debug, Serialize, Clone)]
pub(crate) struct OpenAiResponse {
    #[serde(default)]
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) choices: Vec<Choice>,
    #[serde(default)]
    pub(crate) model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TokenUsage {
    pub(crate) prompt_tokens: u32,
    pub(crate) completion_tokens: u32,
    pub(crate) total_tokens: u32,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub(crate) struct Choice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<ResponseMessage>,
    // Legacy completions-style choices carry `text` instead of `message`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) finish_reason: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub(crate) struct ResponseMessage {
    pub(crate) role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) content: Option<String>,
}

/// Parse a (non-streaming) response body into the assistant's text.
///
/// Providers sometimes return `{ "error": ... }` in a 200 OK body; that is detected first and
/// surfaced as `LlmError::Api`. An absent or blank message is `LlmError::EmptyCompletion`, so
/// an unusable answer never reaches statement extraction as an empty string.
pub(crate) fn parse_completion(kind: ProviderKind, body_text: &str) -> Result<String, LlmError> {
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        if let Some(err) = v.get("error") {
            return Err(embedded_error(err));
        }
    }

    let content = match kind {
        ProviderKind::Ollama => {
            let parsed: OllamaResponse =
                serde_json::from_str(body_text).map_err(|e| deserialization(e, body_text))?;
            parsed.message.and_then(|m| m.content)
        }
        ProviderKind::OpenAiCompatible => {
            let parsed: OpenAiResponse =
                serde_json::from_str(body_text).map_err(|e| deserialization(e, body_text))?;
            // Prefer the first choice that carries text in either shape.
            parsed
                .choices
                .into_iter()
                .find_map(|choice| choice.message.and_then(|m| m.content).or(choice.text))
        }
    };

    match content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(LlmError::EmptyCompletion),
    }
}

fn deserialization(e: serde_json::Error, body_text: &str) -> LlmError {
    LlmError::Deserialization {
        message: e.to_string(),
        body_snippet: Some(truncate_for_error(body_text, ERROR_EXCERPT_LEN)),
    }
}

fn embedded_error(err: &Value) -> LlmError {
    // Ollama reports `{"error": "model not found"}`, OpenAI-style servers an object.
    let (msg, code) = match err {
        Value::String(s) => (s.clone(), None),
        obj => {
            let msg = obj
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown provider error")
                .to_string();
            let code = match obj.get("code") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };
            (msg, code)
        }
    };

    let status = err
        .get("status")
        .and_then(|s| s.as_u64())
        .and_then(|s| u16::try_from(s).ok())
        .unwrap_or(200);

    let message = match code {
        Some(code) => format!("{msg} (code: {code})"),
        None => msg,
    };
    LlmError::Api {
        status,
        message,
        url: None,
        body_snippet: None,
    }
}
