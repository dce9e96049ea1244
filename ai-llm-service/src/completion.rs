//! Provider-agnostic completion contract.
//!
//! A conversation is an ordered list of role-tagged messages; a completion is
//! the generated text plus usage metering. [`CompletionRequester`] is the seam
//! between question answering and the concrete HTTP client, so callers can be
//! exercised with an in-process fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error_handler::AiLlmError;

/// Author of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Conversation sent to the provider. Model and decoding parameters come from
/// the requester's own configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
}

/// Token metering reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub input_tokens: u32,
    /// Input tokens served from the provider's prompt cache (0 when the
    /// provider does not report it).
    pub cached_input_tokens: u32,
    pub output_tokens: u32,
}

/// Successful completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    /// Model that actually served the request, as reported by the provider.
    pub model: String,
    pub usage: Usage,
}

/// Anything that can turn a conversation into a completion.
#[async_trait]
pub trait CompletionRequester: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, AiLlmError>;
}
