use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::OLLAMA_BASE_URL;
use crate::error::LlmError;
use crate::manager::CompletionRequest;

/// Wire format spoken by the completion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Local Ollama server, `POST /api/chat`.
    #[default]
    Ollama,
    /// Any OpenAI-compatible server, `POST /chat/completions` with bearer auth.
    OpenAiCompatible,
}

impl ProviderKind {
    fn completion_path(self) -> &'static str {
        match self {
            ProviderKind::Ollama => "api/chat",
            ProviderKind::OpenAiCompatible => "chat/completions",
        }
    }

    /// Serialize a request in this provider's body shape.
    pub fn request_body(self, req: &CompletionRequest) -> serde_json::Value {
        match self {
            ProviderKind::Ollama => json!({
                "model": req.model,
                "messages": req.messages,
                "stream": false,
            }),
            ProviderKind::OpenAiCompatible => json!({
                "model": req.model,
                "messages": req.messages,
            }),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            "openai" | "openai_compatible" | "openai-compatible" => {
                Ok(ProviderKind::OpenAiCompatible)
            }
            other => Err(LlmError::Configuration(format!(
                "unknown provider '{other}', expected 'ollama' or 'openai_compatible'"
            ))),
        }
    }
}

/// Where and how to reach the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub base_url: Url,
    /// Name of the environment variable holding the API key, if the endpoint needs one.
    pub api_key_env: Option<String>,
    /// Per-request timeout; `None` leaves it to the HTTP client's defaults.
    pub timeout: Option<Duration>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Ollama,
            base_url: Url::parse(OLLAMA_BASE_URL).expect("static Ollama URL is valid"),
            api_key_env: None,
            timeout: None,
        }
    }
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind, base_url: &str) -> Result<Self, LlmError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| LlmError::Configuration(format!("invalid base url '{base_url}': {e}")))?;
        Ok(Self {
            kind,
            base_url,
            api_key_env: None,
            timeout: None,
        })
    }

    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = Some(var.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Full completion URL. The base path is treated as a directory so that
    /// `https://host/v1` resolves to `https://host/v1/chat/completions`.
    pub fn completion_url(&self) -> Result<Url, LlmError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        base.join(self.kind.completion_path())
            .map_err(|e| LlmError::Configuration(format!("invalid completion url: {e}")))
    }

    /// Reads the API key from the configured variable. A configured but unset or blank
    /// variable is a configuration error; no variable means no auth header.
    pub fn resolve_api_key(&self) -> Result<Option<String>, LlmError> {
        let Some(var) = self.api_key_env.as_deref() else {
            return Ok(None);
        };
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(Some(key)),
            _ => Err(LlmError::Configuration(format!(
                "{var} environment variable is missing."
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::RequestMessage;

    #[test]
    fn default_targets_local_ollama() {
        let cfg = ProviderConfig::default();
        assert_eq!(cfg.kind, ProviderKind::Ollama);
        assert_eq!(
            cfg.completion_url().unwrap().as_str(),
            "http://localhost:11434/api/chat"
        );
    }

    #[test]
    fn versioned_base_keeps_its_path() {
        let cfg = ProviderConfig::new(ProviderKind::OpenAiCompatible, "https://api.example.com/v1")
            .unwrap();
        assert_eq!(
            cfg.completion_url().unwrap().as_str(),
            "https://api.example.com/v1/chat/completions"
        );

        let cfg =
            ProviderConfig::new(ProviderKind::OpenAiCompatible, "https://api.example.com/v1/")
                .unwrap();
        assert_eq!(
            cfg.completion_url().unwrap().as_str(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn invalid_base_url_is_configuration_error() {
        let err = ProviderConfig::new(ProviderKind::Ollama, "not a url").unwrap_err();
        assert!(matches!(err, LlmError::Configuration(_)));
    }

    #[test]
    fn provider_kind_parses_aliases() {
        assert_eq!("Ollama".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert_eq!(
            "openai".parse::<ProviderKind>().unwrap(),
            ProviderKind::OpenAiCompatible
        );
        assert!("bedrock".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn ollama_body_disables_streaming() {
        let req = CompletionRequest::new(
            "deepseek-r1:1.5b",
            vec![RequestMessage::new_user("hello".into())],
        );
        let body = ProviderKind::Ollama.request_body(&req);
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "user");

        let body = ProviderKind::OpenAiCompatible.request_body(&req);
        assert!(body.get("stream").is_none());
        assert_eq!(body["model"], "deepseek-r1:1.5b");
    }

    #[test]
    fn missing_key_variable_is_configuration_error() {
        let cfg = ProviderConfig::default().with_api_key_env("SQLCHAT_TEST_KEY_THAT_IS_NEVER_SET");
        assert!(matches!(
            cfg.resolve_api_key(),
            Err(LlmError::Configuration(_))
        ));
        assert_eq!(ProviderConfig::default().resolve_api_key(), Ok(None));
    }
}
