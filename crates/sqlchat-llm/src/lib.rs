//! Chat-completion client used to turn prompts into model text.
//!
//! The crate exposes a single seam, [`ChatCompletion`], so callers can swap the HTTP-backed
//! [`ChatClient`] for a scripted fake in tests.

pub mod client;
pub mod error;
pub mod manager;
pub mod provider;
pub mod response;

pub use client::{ChatClient, ChatCompletion};
pub use error::LlmError;
pub use manager::{CompletionRequest, RequestMessage, Role};
pub use provider::{ProviderConfig, ProviderKind};

/// Default model, a small reasoning model served by a local Ollama.
pub const DEFAULT_MODEL: &str = "deepseek-r1:1.5b";

/// Default base URL of a local Ollama server.
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";
