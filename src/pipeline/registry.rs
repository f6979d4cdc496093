//! Template registry: generation parameters, prompts and acceptance rules
//! for every supported document type.
//!
//! Tables are built once on first access and never mutated, so concurrent
//! readers need no synchronisation.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::Serialize;

use super::prompts::{system_instruction, user_instruction_template};
use super::GenerationError;
use crate::models::DocumentType;

/// Model requested by default for long-form documents.
pub const PRIMARY_MODEL: &str = "gpt-4o";
/// Substituted when the primary model is reported unavailable.
pub const FALLBACK_MODEL: &str = "gpt-4o-mini";

/// Generation parameters and prompts for one document type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentTypeConfig {
    pub id: DocumentType,
    pub model: &'static str,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    #[serde(skip)]
    pub system_instruction: &'static str,
    #[serde(skip)]
    pub user_instruction_template: &'static str,
}

/// Acceptance checklist applied to generated text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationRule {
    pub required_section_labels: &'static [&'static str],
    pub min_word_count: usize,
    pub must_include_terms: &'static [&'static str],
}

#[derive(Debug)]
struct RegistryEntry {
    config: DocumentTypeConfig,
    rule: ValidationRule,
}

static REGISTRY: LazyLock<HashMap<DocumentType, RegistryEntry>> = LazyLock::new(|| {
    DocumentType::all()
        .iter()
        .map(|doc| {
            (
                *doc,
                RegistryEntry {
                    config: config_for(*doc),
                    rule: rule_for(*doc),
                },
            )
        })
        .collect()
});

/// Resolve a document type identifier. Unknown ids are rejected outright.
pub fn resolve(
    document_type_id: &str,
) -> Result<(&'static DocumentTypeConfig, &'static ValidationRule), GenerationError> {
    let doc = DocumentType::from_str(document_type_id)
        .map_err(|_| GenerationError::UnknownDocumentType(document_type_id.to_string()))?;
    Ok(resolve_type(doc))
}

/// Resolve an already-parsed document type.
pub fn resolve_type(doc: DocumentType) -> (&'static DocumentTypeConfig, &'static ValidationRule) {
    let entry = REGISTRY
        .get(&doc)
        .unwrap_or_else(|| unreachable!("registry is built from DocumentType::all()"));
    (&entry.config, &entry.rule)
}

/// Comma-separated list of supported ids, for error messages.
pub fn supported_ids() -> String {
    DocumentType::all()
        .iter()
        .map(DocumentType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn config_for(doc: DocumentType) -> DocumentTypeConfig {
    // (model, max_tokens, temperature, top_p, frequency_penalty, presence_penalty)
    let (model, max_tokens, temperature, top_p, frequency_penalty, presence_penalty) = match doc {
        DocumentType::MedicalReport => (PRIMARY_MODEL, 4500, 0.15, 0.95, 0.0, 0.05),
        DocumentType::UndueDelayLetter => (PRIMARY_MODEL, 3500, 0.2, 0.9, 0.1, 0.1),
        DocumentType::ProviderDeclaration => (FALLBACK_MODEL, 2500, 0.1, 0.95, 0.0, 0.0),
        DocumentType::S2ApplicationForm => (PRIMARY_MODEL, 3000, 0.05, 0.9, 0.0, 0.0),
        DocumentType::LegalJustificationLetter => (PRIMARY_MODEL, 5000, 0.25, 0.95, 0.1, 0.15),
    };
    DocumentTypeConfig {
        id: doc,
        model,
        max_tokens,
        temperature,
        top_p,
        frequency_penalty,
        presence_penalty,
        system_instruction: system_instruction(doc),
        user_instruction_template: user_instruction_template(doc),
    }
}

fn rule_for(doc: DocumentType) -> ValidationRule {
    match doc {
        DocumentType::MedicalReport => ValidationRule {
            required_section_labels: &[
                "Patient Identification",
                "Clinical Data",
                "Comorbidities",
                "Current Medications",
                "NICE Eligibility Criteria",
                "Surgical Indication",
                "Receiving Hospital",
                "Treatment Schedule",
                "Narrative Summary",
                "Medical Justification for Urgency",
                "Conclusion",
            ],
            min_word_count: 1500,
            must_include_terms: &[
                "BMI",
                "NICE",
                "sleeve gastrectomy",
                "comorbidities",
                "undue delay",
            ],
        },
        DocumentType::UndueDelayLetter => ValidationRule {
            required_section_labels: &[
                "Professional Header",
                "Subject Line",
                "Patient Background",
                "Risks of Undue Delay",
                "Evidence from Literature",
                "Quantified Risks",
                "Conclusion",
            ],
            min_word_count: 1200,
            must_include_terms: &["undue delay", "mortality risk", "cardiovascular", "JAMA", "NEJM"],
        },
        DocumentType::ProviderDeclaration => ValidationRule {
            required_section_labels: &[
                "Patient Details",
                "Treatment Description",
                "Provider Confirmations",
                "Cost Breakdown",
                "Signatures",
            ],
            min_word_count: 800,
            must_include_terms: &["S2", "state funded", "co-payment", "Hôpital de La Tour"],
        },
        DocumentType::S2ApplicationForm => ValidationRule {
            required_section_labels: &[
                "S2 Funding Route",
                "Patient and GP Details",
                "Nationality Switzerland",
                "Treating Clinician",
                "Diagnosis/Treatment",
                "Application Checklist",
            ],
            min_word_count: 1000,
            must_include_terms: &["Switzerland", "sleeve gastrectomy", "NHS number"],
        },
        DocumentType::LegalJustificationLetter => ValidationRule {
            required_section_labels: &[
                "Legal Framework",
                "CJEU Jurisprudence",
                "NHS Guidance",
                "Factual Evidence",
                "Bariatric Surgery Data",
                "Medical Situation",
                "Legal Conclusion",
            ],
            min_word_count: 2000,
            must_include_terms: &[
                "Article 20",
                "Watts",
                "Petru",
                "undue delay",
                "Regulation 883/2004",
            ],
        },
    }
}
