//! Axum router construction for the query API.
//!
//! Assembles the health and pool log routes with CORS and correlation-id
//! middleware. CORS is permissive; restrict origins in production.

use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::correlation;
use crate::api::handlers;
use crate::api::state::AppState;

/// Build the complete router for the query API.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/v1/api/pool/health", get(handlers::health))
        .route("/v1/api/pool/{pool_id}", get(handlers::get_pool_log))
        .route(
            "/v1/api/pool/{pool_id}/historic",
            get(handlers::get_pool_log_history),
        )
        .layer(middleware::from_fn(correlation::correlation_id))
        .layer(cors)
        .with_state(state)
}
