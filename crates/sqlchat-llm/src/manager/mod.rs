use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RequestMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl RequestMessage {
    pub fn new_system(content: String) -> Self {
        Self {
            role: Role::System,
            content,
        }
    }

    pub fn new_user(content: String) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    pub fn new_assistant(content: String) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }
}

/// One non-streaming chat request: a model identifier and the ordered conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<RequestMessage>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<RequestMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
        }
    }

    /// A request carrying a single user message, the shape the SQL prompt is sent in.
    pub fn single_user(model: impl Into<String>, content: String) -> Self {
        Self::new(model, vec![RequestMessage::new_user(content)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let serialized = serde_json::to_string(&Role::System).unwrap();
        assert_eq!(serialized, "\"system\"");

        let deserialized: Role = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(deserialized, Role::Assistant);
    }

    #[test]
    fn user_message_serialization() {
        let msg = RequestMessage::new_user("show all customers".to_string());
        let parsed: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&msg).unwrap()).unwrap();
        assert_eq!(parsed["role"], "user");
        assert_eq!(parsed["content"], "show all customers");
    }

    #[test]
    fn single_user_request_has_one_message() {
        let req = CompletionRequest::single_user("deepseek-r1:1.5b", "prompt".into());
        assert_eq!(req.model, "deepseek-r1:1.5b");
        assert_eq!(req.messages, vec![RequestMessage::new_user("prompt".into())]);
    }
}
