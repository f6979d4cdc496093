//! Request builder: turns a resolved document type and its formatted user
//! instruction into the chat-completion payload, and provides the advisory
//! token and cost estimates surfaced in result metadata.

use serde::{Deserialize, Serialize};

use super::registry::{resolve, DocumentTypeConfig, PRIMARY_MODEL};
use super::GenerationError;
use crate::models::MessageRole;

/// Average characters per token used for estimation.
pub const CHARS_PER_TOKEN: f64 = 3.75;

/// USD price per 1K tokens: (model, input, output).
const PRICE_TABLE: &[(&str, f64, f64)] = &[
    ("gpt-4o", 0.005, 0.015),
    ("gpt-4o-mini", 0.00015, 0.0006),
];

/// Pricing used for models missing from the table.
const DEFAULT_PRICING_MODEL: &str = PRIMARY_MODEL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseFormat {
    pub fn text() -> Self {
        Self {
            kind: "text".to_string(),
        }
    }
}

/// Chat-completion payload. Serializes to the provider's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub response_format: ResponseFormat,
}

impl GenerationRequest {
    /// All message text joined by single spaces, as used for input estimation.
    pub fn input_text(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Estimated prompt size and worst-case cost (full token budget spent).
    pub fn preflight_estimate(&self) -> (u64, f64) {
        let input_tokens = estimate_tokens(&self.input_text());
        let cost = estimate_cost(&self.model, input_tokens, u64::from(self.max_tokens));
        (input_tokens, cost)
    }
}

/// Build the payload for a document type id.
pub fn build(
    document_type_id: &str,
    formatted_user_text: &str,
    max_tokens_override: Option<u32>,
) -> Result<GenerationRequest, GenerationError> {
    let (config, _) = resolve(document_type_id)?;
    Ok(build_for(config, formatted_user_text, max_tokens_override))
}

/// Build the payload from an already-resolved config.
///
/// The override only changes the token budget; model and sampling
/// parameters always come from the config. A zero override is ignored.
pub fn build_for(
    config: &DocumentTypeConfig,
    formatted_user_text: &str,
    max_tokens_override: Option<u32>,
) -> GenerationRequest {
    GenerationRequest {
        model: config.model.to_string(),
        messages: vec![
            ChatMessage {
                role: MessageRole::System,
                content: config.system_instruction.to_string(),
            },
            ChatMessage {
                role: MessageRole::User,
                content: formatted_user_text.to_string(),
            },
        ],
        max_tokens: max_tokens_override
            .filter(|n| *n > 0)
            .unwrap_or(config.max_tokens),
        temperature: config.temperature,
        top_p: config.top_p,
        frequency_penalty: config.frequency_penalty,
        presence_penalty: config.presence_penalty,
        response_format: ResponseFormat::text(),
    }
}

/// Approximate token count: characters / [`CHARS_PER_TOKEN`], rounded up.
pub fn estimate_tokens(text: &str) -> u64 {
    let chars = text.chars().count() as f64;
    (chars / CHARS_PER_TOKEN).ceil() as u64
}

/// Estimated USD cost. Unknown models are priced as the default model.
pub fn estimate_cost(model: &str, input_tokens: u64, output_tokens: u64) -> f64 {
    let (input_price, output_price) = pricing(model);
    (input_tokens as f64 / 1000.0) * input_price + (output_tokens as f64 / 1000.0) * output_price
}

fn pricing(model: &str) -> (f64, f64) {
    let lookup = |name: &str| {
        PRICE_TABLE
            .iter()
            .find(|(m, _, _)| *m == name)
            .map(|&(_, input, output)| (input, output))
    };
    lookup(model)
        .or_else(|| lookup(DEFAULT_PRICING_MODEL))
        .unwrap_or((0.0, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;
    use crate::pipeline::registry::{resolve_type, FALLBACK_MODEL};

    #[test]
    fn builds_two_message_conversation() {
        let req = build("medical_report", "PATIENT DATA: Karen Griffin", None).unwrap();
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, MessageRole::System);
        assert_eq!(req.messages[1].role, MessageRole::User);
        assert_eq!(req.messages[1].content, "PATIENT DATA: Karen Griffin");
        assert_eq!(req.model, "gpt-4o");
        assert_eq!(req.max_tokens, 4500);
    }

    #[test]
    fn override_changes_budget_not_model() {
        let (config, _) = resolve_type(DocumentType::MedicalReport);
        let req = build_for(config, "x", Some(1200));
        assert_eq!(req.max_tokens, 1200);
        assert_eq!(req.model, config.model);
        assert!((req.temperature - config.temperature).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_override_ignored() {
        let (config, _) = resolve_type(DocumentType::ProviderDeclaration);
        assert_eq!(build_for(config, "x", Some(0)).max_tokens, 2500);
    }

    #[test]
    fn unknown_type_rejected() {
        assert!(matches!(
            build("cover_letter", "x", None),
            Err(GenerationError::UnknownDocumentType(_))
        ));
    }

    #[test]
    fn serializes_wire_format() {
        let (config, _) = resolve_type(DocumentType::UndueDelayLetter);
        let json = serde_json::to_value(build_for(config, "data", None)).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["max_tokens"], 3500);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "data");
        assert_eq!(json["response_format"]["type"], "text");
        assert!(json.get("top_p").is_some());
        assert!(json.get("frequency_penalty").is_some());
        assert!(json.get("presence_penalty").is_some());
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abcd"), 2);
        assert_eq!(estimate_tokens(&"x".repeat(375)), 100);
    }

    #[test]
    fn token_estimate_is_monotonic() {
        let mut previous = 0;
        let mut text = String::new();
        for _ in 0..200 {
            text.push('é');
            let estimate = estimate_tokens(&text);
            assert!(estimate >= previous);
            previous = estimate;
        }
    }

    #[test]
    fn zero_tokens_cost_nothing() {
        for (model, _, _) in PRICE_TABLE {
            assert_eq!(estimate_cost(model, 0, 0), 0.0);
        }
        assert_eq!(estimate_cost("some-future-model", 0, 0), 0.0);
    }

    #[test]
    fn unknown_model_priced_as_default() {
        assert_eq!(
            estimate_cost("some-future-model", 1000, 1000),
            estimate_cost(PRIMARY_MODEL, 1000, 1000)
        );
    }

    #[test]
    fn cost_per_thousand_tokens() {
        assert!((estimate_cost("gpt-4o", 1000, 1000) - 0.02).abs() < 1e-12);
        assert!((estimate_cost(FALLBACK_MODEL, 2000, 1000) - 0.0009).abs() < 1e-12);
    }

    #[test]
    fn preflight_uses_full_budget() {
        let (config, _) = resolve_type(DocumentType::MedicalReport);
        let req = build_for(config, "", None);
        let (input, cost) = req.preflight_estimate();
        assert_eq!(input, estimate_tokens(&req.input_text()));
        assert!((cost - estimate_cost("gpt-4o", input, 4500)).abs() < 1e-12);
    }
}
