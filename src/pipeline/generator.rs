//! Document generation orchestrator.
//!
//! resolve type → parse record → format → build request → complete →
//! validate → assemble metadata. Stateless per call; one generator is
//! shared by every request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::completion::{ApiCredential, CompletionClient, GenerationResult};
use super::formatter::format_for;
use super::registry::resolve;
use super::request::{build_for, estimate_cost};
use super::validator::{validate_with, ValidationReport};
use super::GenerationError;
use crate::config::PROMPT_VERSION;
use crate::models::{DocumentType, PatientRecord};

/// Inbound generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub document_type: String,
    #[serde(default)]
    pub patient_data: Value,
    #[serde(default)]
    pub treatment_date: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub request_id: Uuid,
    pub document_type: DocumentType,
    pub generated_at: DateTime<Utc>,
    pub prompt_version: &'static str,
    /// Model that produced the text, after any fallback.
    pub model: String,
    pub tokens_used: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub estimated_cost: f64,
    pub validation: ValidationReport,
    pub patient_id: String,
    pub missing_patient_fields: Vec<&'static str>,
    pub generation: GenerationParams,
}

/// Generated text with its metadata. `success` mirrors `validation.is_valid`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocument {
    pub content: String,
    pub metadata: GenerationMetadata,
    pub document_type: DocumentType,
    pub success: bool,
    pub warnings: Vec<String>,
}

pub struct DocumentGenerator {
    client: CompletionClient,
}

impl DocumentGenerator {
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    /// Run the full pipeline. Blocks for the duration of the completion call.
    ///
    /// Input problems (unknown type, unusable record, bad credential) are
    /// rejected before any network traffic.
    pub fn generate(
        &self,
        request: &DocumentRequest,
        credential: Option<&str>,
    ) -> Result<GeneratedDocument, GenerationError> {
        self.generate_at(request, credential, Utc::now())
    }

    pub(crate) fn generate_at(
        &self,
        request: &DocumentRequest,
        credential: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<GeneratedDocument, GenerationError> {
        let (config, rule) = resolve(&request.document_type)?;
        let request_id = Uuid::new_v4();
        let _span = tracing::info_span!(
            "generate_document",
            document_type = %config.id,
            request_id = %request_id,
        )
        .entered();

        let record = PatientRecord::from_value(&request.patient_data)?.with_defaults();
        let credential = credential
            .and_then(ApiCredential::parse)
            .ok_or(GenerationError::MissingCredential)?;

        let user_text = format_for(
            config.id,
            &record,
            request.treatment_date.as_deref(),
            now.date_naive(),
        );
        let payload = build_for(config, &user_text, request.max_tokens);

        let (estimated_input, preflight_cost) = payload.preflight_estimate();
        tracing::info!(
            model = %payload.model,
            max_tokens = payload.max_tokens,
            estimated_input_tokens = estimated_input,
            estimated_cost = %format!("{preflight_cost:.4}"),
            "Requesting completion"
        );

        let start = std::time::Instant::now();
        let GenerationResult {
            content,
            usage,
            model_actually_used,
        } = self.client.complete(&payload, &credential)?;

        let validation = validate_with(&content, rule);

        let usage = usage.unwrap_or_default();
        let input_tokens = if usage.prompt_tokens > 0 {
            usage.prompt_tokens
        } else {
            estimated_input
        };
        let output_tokens = usage.completion_tokens;
        let estimated_cost = estimate_cost(&model_actually_used, input_tokens, output_tokens);

        tracing::info!(
            model = %model_actually_used,
            elapsed_ms = %start.elapsed().as_millis(),
            input_tokens,
            output_tokens,
            word_count = validation.word_count,
            valid = validation.is_valid,
            warnings = validation.warnings.len(),
            "Document generated"
        );

        let metadata = GenerationMetadata {
            request_id,
            document_type: config.id,
            generated_at: now,
            prompt_version: PROMPT_VERSION,
            model: model_actually_used,
            tokens_used: usage.total_tokens,
            input_tokens,
            output_tokens,
            estimated_cost,
            validation: validation.clone(),
            patient_id: record.patient_id(),
            missing_patient_fields: record.missing_core_fields(),
            generation: GenerationParams {
                temperature: payload.temperature,
                max_tokens: payload.max_tokens,
                top_p: payload.top_p,
            },
        };

        Ok(GeneratedDocument {
            content,
            metadata,
            document_type: config.id,
            success: validation.is_valid,
            warnings: validation.warnings,
        })
    }
}
