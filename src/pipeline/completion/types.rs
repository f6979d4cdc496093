use serde::{Deserialize, Serialize};

use super::credential::ApiCredential;
use super::TransportError;
use crate::pipeline::request::GenerationRequest;

/// Chat-completion transport. One call, no retries.
///
/// The production implementation posts over HTTPS; tests substitute
/// scripted responses.
pub trait CompletionTransport {
    fn send(
        &self,
        request: &GenerationRequest,
        credential: &ApiCredential,
    ) -> Result<ChatCompletionResponse, TransportError>;
}

/// Provider response envelope. Only the fields read downstream are modelled;
/// everything is optional so partial envelopes still decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Provider error envelope: `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

/// Outcome of a completed call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    /// First choice text; empty when the provider returned none.
    pub content: String,
    pub usage: Option<TokenUsage>,
    /// May differ from the requested model after a fallback.
    pub model_actually_used: String,
}

impl GenerationResult {
    pub fn from_response(response: ChatCompletionResponse, model: String) -> Self {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();
        Self {
            content,
            usage: response.usage,
            model_actually_used: model,
        }
    }
}
