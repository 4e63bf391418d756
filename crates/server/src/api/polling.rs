//! Manual polling triggers. Each runs synchronously and returns what it did.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use tracing::info;

use tms_core::{today, EntityType};
use tms_ingest::{AttemptReport, RunSummary};

use super::{ingest_err, ApiError};
use crate::state::AppState;

/// POST /polling/run
#[utoipa::path(
    post,
    path = "/polling/run",
    tag = "Polling",
    responses(
        (status = 200, description = "Run summary, one attempt per partner and entity type", body = Object),
        (status = 500, description = "Active partners could not be listed")
    )
)]
pub async fn polling_run(State(state): State<Arc<AppState>>) -> Result<Json<RunSummary>, ApiError> {
    info!(trigger = "manual", "polling run requested");
    let summary = state.orchestrator.run_daily_poll().await.map_err(ingest_err)?;
    Ok(Json(summary))
}

/// POST /polling/run/{partnerId}
#[utoipa::path(
    post,
    path = "/polling/run/{partnerId}",
    tag = "Polling",
    params(("partnerId" = String, Path, description = "Active partner identifier")),
    responses(
        (status = 200, description = "Run summary for the partner", body = Object),
        (status = 404, description = "Partner not found or not active"),
        (status = 500, description = "Registry error")
    )
)]
pub async fn polling_run_partner(
    State(state): State<Arc<AppState>>,
    Path(partner_id): Path<String>,
) -> Result<Json<RunSummary>, ApiError> {
    info!(trigger = "manual", partner_id = %partner_id, "partner polling run requested");
    let summary = state
        .orchestrator
        .run_partner(&partner_id, today())
        .await
        .map_err(ingest_err)?;
    Ok(Json(summary))
}

/// POST /polling/run/{partnerId}/{entityType}
#[utoipa::path(
    post,
    path = "/polling/run/{partnerId}/{entityType}",
    tag = "Polling",
    params(
        ("partnerId" = String, Path, description = "Active partner identifier"),
        ("entityType" = String, Path, description = "THEATRE, HALL or SHOW (case-insensitive)")
    ),
    responses(
        (status = 200, description = "Report for the single attempt", body = Object),
        (status = 400, description = "Unknown entity type"),
        (status = 404, description = "Partner not found or not active")
    )
)]
pub async fn polling_run_entity(
    State(state): State<Arc<AppState>>,
    Path((partner_id, entity_type)): Path<(String, String)>,
) -> Result<Json<AttemptReport>, ApiError> {
    let entity_type: EntityType = entity_type
        .parse()
        .map_err(|e: tms_core::UnknownEntityType| {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
        })?;
    info!(trigger = "manual", partner_id = %partner_id, entity_type = %entity_type, "single attempt requested");
    let report = state
        .orchestrator
        .run_entity(&partner_id, entity_type, today())
        .await
        .map_err(ingest_err)?;
    Ok(Json(report))
}
