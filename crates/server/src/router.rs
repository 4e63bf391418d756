//! HTTP router construction.
//!
//! Assembles all Axum routes, middleware, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/health", get(api::health))
        .route("/config", get(api::config_summary))
        // /latest and /failed/{date} are static prefixes and win over /{date}
        .route("/job-status/latest", get(api::job_status_latest))
        .route("/job-status/failed/{date}", get(api::job_status_failed))
        .route(
            "/job-status/partner/{partner_id}/{date}",
            get(api::job_status_for_partner),
        )
        .route("/job-status/{date}", get(api::job_status_by_date))
        .route("/polling/run", post(api::polling_run))
        .route("/polling/run/{partner_id}", post(api::polling_run_partner))
        .route(
            "/polling/run/{partner_id}/{entity_type}",
            post(api::polling_run_entity),
        )
        .layer(cors)
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            warn!(origin = %origin, "invalid CORS_ORIGIN, allowing any origin");
            CorsLayer::permissive()
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
