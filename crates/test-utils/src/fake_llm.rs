use std::collections::VecDeque;
use std::sync::Mutex;

use sqlchat_llm::{ChatCompletion, CompletionRequest, LlmError};

/// A [`ChatCompletion`] that answers from a queue and remembers what it was asked.
///
/// When the queue runs dry every further call fails with a request error, which makes an
/// unexpected extra call visible in the test instead of hanging.
#[derive(Debug, Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fake that answers once with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new().then_reply(text)
    }

    /// A fake that fails once with `err`.
    pub fn failing(err: LlmError) -> Self {
        Self::new().then_fail(err)
    }

    pub fn then_reply(self, text: impl Into<String>) -> Self {
        self.replies
            .lock()
            .expect("scripted replies poisoned")
            .push_back(Ok(text.into()));
        self
    }

    pub fn then_fail(self, err: LlmError) -> Self {
        self.replies
            .lock()
            .expect("scripted replies poisoned")
            .push_back(Err(err));
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .expect("scripted requests poisoned")
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("scripted requests poisoned").len()
    }
}

impl ChatCompletion for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests
            .lock()
            .expect("scripted requests poisoned")
            .push(request.clone());
        self.replies
            .lock()
            .expect("scripted replies poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Request {
                    message: "no scripted reply left".into(),
                    url: None,
                    is_timeout: false,
                })
            })
    }
}
