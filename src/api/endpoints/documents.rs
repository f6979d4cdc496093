//! Document catalogue and standard (template-only) rendering.
//!
//! `GET /api/document-types` lists what can be generated.
//! `POST /api/render-document` renders a standard document without calling
//! the completion API.

use std::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::ApiError;
use crate::models::{DocumentType, PatientRecord, StandardDocument};
use crate::pipeline::registry::resolve_type;
use crate::pipeline::standard::render_standard;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTypeSummary {
    pub id: DocumentType,
    pub title: &'static str,
    pub model: &'static str,
    pub max_tokens: u32,
    pub temperature: f32,
    pub min_word_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTypesResponse {
    pub generated: Vec<DocumentTypeSummary>,
    pub standard: Vec<StandardDocument>,
}

/// `GET /api/document-types`
pub async fn list() -> Json<DocumentTypesResponse> {
    let generated = DocumentType::all()
        .iter()
        .map(|doc| {
            let (config, rule) = resolve_type(*doc);
            DocumentTypeSummary {
                id: *doc,
                title: doc.title(),
                model: config.model,
                max_tokens: config.max_tokens,
                temperature: config.temperature,
                min_word_count: rule.min_word_count,
            }
        })
        .collect();

    Json(DocumentTypesResponse {
        generated,
        standard: StandardDocument::all().to_vec(),
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub document_type: String,
    #[serde(default)]
    pub patient_data: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    pub document_type: StandardDocument,
    pub content: String,
}

/// `POST /api/render-document`
pub async fn render(
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Json<RenderResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let kind = StandardDocument::from_str(&request.document_type).map_err(|_| {
        ApiError::BadRequest(format!(
            "Unsupported standard document: {}. Supported types: {}",
            request.document_type,
            StandardDocument::all()
                .iter()
                .map(StandardDocument::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })?;
    let record = PatientRecord::from_value(&request.patient_data)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
        .with_defaults();

    let content = render_standard(kind, &record, chrono::Utc::now().date_naive());
    tracing::info!(document_type = %kind, chars = content.len(), "Standard document rendered");

    Ok(Json(RenderResponse {
        document_type: kind,
        content,
    }))
}
