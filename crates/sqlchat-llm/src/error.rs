use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents errors that can occur during LLM interactions.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum LlmError {
    /// The provider could not be addressed with the given settings (bad URL, missing key).
    #[error("Invalid provider configuration: {0}")]
    Configuration(String),

    /// Error related to network connectivity or the HTTP request itself.
    #[error("Network request failed: {message}")]
    Request {
        message: String,
        /// Optional URL for additional context.
        url: Option<String>,
        is_timeout: bool,
    },

    /// The API provider returned a non-success status code, or an error object in a 200 body.
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        url: Option<String>,
        /// Truncated body snippet for diagnostics.
        body_snippet: Option<String>,
    },

    /// The request was rejected due to rate limiting.
    #[error("Rate limit exceeded. Please wait and try again.")]
    RateLimited,

    /// The request failed due to invalid credentials.
    #[error("Authentication failed. Please check your API key.")]
    Authentication,

    /// Failed to deserialize the API response.
    #[error("Failed to deserialize response data: {message}")]
    Deserialization {
        message: String,
        body_snippet: Option<String>,
    },

    /// The model answered, but with no text at all.
    #[error("The model returned an empty completion")]
    EmptyCompletion,
}

impl LlmError {
    pub(crate) fn from_reqwest(err: reqwest::Error, url: &url::Url) -> Self {
        LlmError::Request {
            message: err.to_string(),
            url: Some(url.to_string()),
            is_timeout: err.is_timeout(),
        }
    }

    /// Returns a diagnostic string with contextual fields for UI/log surfaces.
    pub fn diagnostic(&self) -> String {
        match self {
            LlmError::Request {
                message,
                url,
                is_timeout,
            } => {
                let mut msg = format!("Network request failed: {message}");
                if let Some(u) = url {
                    msg.push_str(&format!("\nurl: {u}"));
                }
                if *is_timeout {
                    msg.push_str("\ncontext: timed out");
                }
                msg
            }
            LlmError::Api {
                status,
                message,
                url,
                body_snippet,
            } => {
                let mut msg = format!("API error (status {status}): {message}");
                if let Some(u) = url {
                    msg.push_str(&format!("\nurl: {u}"));
                }
                if let Some(snippet) = body_snippet {
                    if !message.contains(snippet.as_str()) {
                        msg.push_str("\nbody excerpt: ");
                        msg.push_str(snippet);
                    }
                }
                msg
            }
            LlmError::Deserialization {
                message,
                body_snippet,
            } => {
                let mut msg = format!("Failed to deserialize response data: {message}");
                if let Some(snippet) = body_snippet {
                    msg.push_str("\nbody excerpt: ");
                    msg.push_str(snippet);
                }
                msg
            }
            other => other.to_string(),
        }
    }
}

impl From<LlmError> for sqlchat_error::Error {
    fn from(error: LlmError) -> Self {
        match error {
            LlmError::Configuration(message) => sqlchat_error::Error::Configuration(message),
            other => sqlchat_error::Error::Completion(other.diagnostic()),
        }
    }
}

/// Truncate large response bodies so error strings remain bounded.
pub(crate) fn truncate_for_error(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    // Keep a little of the tail too, it often holds the interesting part.
    let head_end = floor_char_boundary(s, max.saturating_sub(200));
    let tail_start = ceil_char_boundary(s, s.len().saturating_sub(200));
    format!("{}…<snip>…{}", &s[..head_end], &s[tail_start..])
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_maps_to_workspace_configuration() {
        let err: sqlchat_error::Error =
            LlmError::Configuration("OPENAI_API_KEY is not set".into()).into();
        assert!(matches!(err, sqlchat_error::Error::Configuration(_)));
    }

    #[test]
    fn transport_failures_map_to_completion() {
        let err: sqlchat_error::Error = LlmError::Request {
            message: "connection refused".into(),
            url: Some("http://localhost:11434/api/chat".into()),
            is_timeout: false,
        }
        .into();
        match err {
            sqlchat_error::Error::Completion(msg) => assert!(msg.contains("connection refused")),
            other => panic!("unexpected mapping {other:?}"),
        }
    }

    #[test]
    fn diagnostic_includes_url_and_timeout() {
        let err = LlmError::Request {
            message: "operation timed out".into(),
            url: Some("http://localhost:11434/api/chat".into()),
            is_timeout: true,
        };
        let diag = err.diagnostic();
        assert!(diag.contains("url: http://localhost:11434/api/chat"));
        assert!(diag.contains("context: timed out"));
    }

    #[test]
    fn workspace_error_carries_diagnostic_context() {
        let timeout: sqlchat_error::Error = LlmError::Request {
            message: "operation timed out".into(),
            url: Some("http://localhost:11434/api/chat".into()),
            is_timeout: true,
        }
        .into();
        let text = timeout.to_string();
        assert!(text.starts_with("Error generating SQL: Network request failed"));
        assert!(text.contains("url: http://localhost:11434/api/chat"));
        assert!(text.contains("context: timed out"));

        let api: sqlchat_error::Error = LlmError::Api {
            status: 502,
            message: "Bad Gateway".into(),
            url: None,
            body_snippet: Some("upstream model server unavailable".into()),
        }
        .into();
        assert!(
            api.to_string()
                .contains("body excerpt: upstream model server unavailable")
        );
    }

    #[test]
    fn truncation_keeps_head_and_tail() {
        let body = format!("{}{}", "a".repeat(3_000), "tail-marker");
        let out = truncate_for_error(&body, 1_000);
        assert!(out.len() < body.len());
        assert!(out.starts_with("aaaa"));
        assert!(out.ends_with("tail-marker"));
        assert!(out.contains("<snip>"));

        assert_eq!(truncate_for_error("short", 1_000), "short");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "é".repeat(2_000);
        let out = truncate_for_error(&body, 999);
        assert!(out.contains("<snip>"));
    }
}
