//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::pipeline::completion::ApiCredential;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub credential_configured: bool,
}

/// `GET /api/health`: liveness plus whether generation can run.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    let credential_configured = ctx
        .settings
        .api_key
        .as_deref()
        .and_then(ApiCredential::parse)
        .is_some();

    Json(HealthResponse {
        status: "ok",
        service: crate::config::APP_NAME,
        version: crate::config::APP_VERSION,
        credential_configured,
    })
}
