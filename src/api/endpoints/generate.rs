//! `POST /api/generate-document`: AI-assisted document generation.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::{DocumentRequest, GeneratedDocument};

/// Runs the generation pipeline on the blocking pool. The completion call
/// and its backoff sleeps block the worker thread, never the runtime.
pub async fn generate(
    State(ctx): State<ApiContext>,
    payload: Result<Json<DocumentRequest>, JsonRejection>,
) -> Result<Json<GeneratedDocument>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let generator = ctx.generator.clone();
    let settings = ctx.settings.clone();
    let document = tokio::task::spawn_blocking(move || {
        generator.generate(&request, settings.api_key.as_deref())
    })
    .await
    .map_err(|e| ApiError::Internal(format!("generation task failed: {e}")))??;

    Ok(Json(document))
}
