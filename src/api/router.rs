//! HTTP router. All routes are nested under `/api/`.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the document API router.
pub fn docgen_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/document-types", get(endpoints::documents::list))
        .route("/render-document", post(endpoints::documents::render))
        .route("/generate-document", post(endpoints::generate::generate))
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
}
