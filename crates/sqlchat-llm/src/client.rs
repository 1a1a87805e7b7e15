use tracing::{debug, instrument};

use crate::error::{LlmError, truncate_for_error};
use crate::manager::CompletionRequest;
use crate::provider::ProviderConfig;
use crate::response::parse_completion;

const BODY_SNIPPET_LEN: usize = 512;

/// The text-completion capability the SQL pipeline depends on.
///
/// Implementations return the assistant's raw text; any failure (network, auth, malformed
/// payload, empty answer) is an `Err`, never a silently empty string.
#[allow(async_fn_in_trait, reason = "callers await in place and never spawn the future")]
pub trait ChatCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// HTTP-backed [`ChatCompletion`] for a single configured provider.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    provider: ProviderConfig,
}

impl ChatClient {
    pub fn new(provider: ProviderConfig) -> Self {
        Self::with_client(reqwest::Client::new(), provider)
    }

    pub fn with_client(http: reqwest::Client, provider: ProviderConfig) -> Self {
        Self { http, provider }
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }
}

impl ChatCompletion for ChatClient {
    #[instrument(skip_all, fields(model = %request.model, provider = ?self.provider.kind))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = self.provider.completion_url()?;
        let body = self.provider.kind.request_body(request);

        let mut builder = self
            .http
            .post(url.clone())
            .header("Accept", "application/json")
            .json(&body);
        if let Some(key) = self.provider.resolve_api_key()? {
            builder = builder.bearer_auth(key);
        }
        if let Some(timeout) = self.provider.timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(e, &url))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| LlmError::from_reqwest(e, &url))?;
        debug!(status, bytes = text.len(), "completion response received");

        match status {
            401 | 403 => return Err(LlmError::Authentication),
            429 => return Err(LlmError::RateLimited),
            s if !(200..300).contains(&s) => {
                let reason = reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|code| code.canonical_reason())
                    .unwrap_or("request rejected");
                return Err(LlmError::Api {
                    status,
                    message: reason.to_string(),
                    url: Some(url.to_string()),
                    body_snippet: Some(truncate_for_error(&text, BODY_SNIPPET_LEN))
                        .filter(|s| !s.trim().is_empty()),
                });
            }
            _ => {}
        }

        parse_completion(self.provider.kind, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderKind;
    use httpmock::prelude::*;
    use serde_json::json;

    fn request() -> CompletionRequest {
        CompletionRequest::single_user("deepseek-r1:1.5b", "list tables".into())
    }

    fn ollama_client(server: &MockServer) -> ChatClient {
        ChatClient::new(ProviderConfig::new(ProviderKind::Ollama, &server.base_url()).unwrap())
    }

    #[tokio::test]
    async fn ollama_round_trip() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/api/chat")
                .json_body_partial(r#"{"model": "deepseek-r1:1.5b", "stream": false}"#);
            then.status(200).json_body(json!({
                "model": "deepseek-r1:1.5b",
                "message": {"role": "assistant", "content": "SELECT * FROM customers;"},
                "done": true
            }));
        });

        let text = ollama_client(&server).complete(&request()).await.unwrap();
        assert_eq!(text, "SELECT * FROM customers;");
        m.assert();
    }

    #[tokio::test]
    async fn openai_compatible_sends_bearer_key() {
        // Scoped to this test; no other test reads this variable.
        unsafe { std::env::set_var("SQLCHAT_LLM_CLIENT_TEST_KEY", "test-key") };

        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer test-key");
            then.status(200).json_body(json!({
                "choices": [{"message": {"role": "assistant", "content": "SELECT 1;"}}]
            }));
        });

        let provider =
            ProviderConfig::new(ProviderKind::OpenAiCompatible, &server.url("/v1"))
                .unwrap()
                .with_api_key_env("SQLCHAT_LLM_CLIENT_TEST_KEY");
        let text = ChatClient::new(provider).complete(&request()).await.unwrap();
        assert_eq!(text, "SELECT 1;");
        m.assert();
    }

    #[tokio::test]
    async fn maps_unauthorized() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/chat");
            then.status(401).body("unauthorized");
        });
        let err = ollama_client(&server).complete(&request()).await.unwrap_err();
        assert_eq!(err, LlmError::Authentication);
    }

    #[tokio::test]
    async fn maps_rate_limited() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/chat");
            then.status(429).body("too many");
        });
        let err = ollama_client(&server).complete(&request()).await.unwrap_err();
        assert_eq!(err, LlmError::RateLimited);
    }

    #[tokio::test]
    async fn maps_server_error_with_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/chat");
            then.status(500).body("model runner crashed");
        });
        match ollama_client(&server).complete(&request()).await {
            Err(LlmError::Api {
                status,
                message,
                body_snippet,
                ..
            }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
                assert_eq!(body_snippet.as_deref(), Some("model runner crashed"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn embedded_error_in_ok_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/chat");
            then.status(200)
                .json_body(json!({"error": "model 'deepseek-r1:1.5b' not found"}));
        });
        let err = ollama_client(&server).complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 200, .. }), "{err:?}");
    }

    #[tokio::test]
    async fn connection_refused_is_request_error() {
        // Nothing listens on port 9 on test hosts.
        let provider = ProviderConfig::new(ProviderKind::Ollama, "http://127.0.0.1:9").unwrap();
        let err = ChatClient::new(provider)
            .complete(&request())
            .await
            .unwrap_err();
        match &err {
            LlmError::Request { url, .. } => {
                assert_eq!(url.as_deref(), Some("http://127.0.0.1:9/api/chat"));
            }
            other => panic!("expected request error, got {other:?}"),
        }

        let surfaced: sqlchat_error::Error = err.into();
        assert!(
            surfaced.to_string().contains("url: http://127.0.0.1:9/api/chat"),
            "{surfaced}"
        );
    }
}
