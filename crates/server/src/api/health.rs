//! Liveness and effective-configuration endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// `postgres` or `memory`.
    pub store: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        store: if state.pg_pool.is_some() { "postgres" } else { "memory" },
    })
}

#[utoipa::path(
    get,
    path = "/config",
    tag = "Health",
    responses(
        (status = 200, description = "Effective configuration without secrets", body = Object)
    )
)]
pub async fn config_summary(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(state.config.redacted_summary())
}
