//! Job status reporting. Every response is recomputed from the stored
//! job executions; nothing here writes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use tms_core::{JobExecution, JobStatusResponse};

use super::{ingest_err, parse_date, ApiError};
use crate::state::AppState;

/// GET /job-status/latest
#[utoipa::path(
    get,
    path = "/job-status/latest",
    tag = "Job Status",
    responses(
        (status = 200, description = "Status for the most recent job date, or an empty report dated today", body = JobStatusResponse),
        (status = 500, description = "Store error")
    )
)]
pub async fn job_status_latest(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let report = state.status.latest().await.map_err(ingest_err)?;
    Ok(Json(report))
}

/// GET /job-status/{date}
#[utoipa::path(
    get,
    path = "/job-status/{date}",
    tag = "Job Status",
    params(("date" = String, Path, description = "Job date, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Per-partner status for the date", body = JobStatusResponse),
        (status = 400, description = "Unparsable date"),
        (status = 500, description = "Store error")
    )
)]
pub async fn job_status_by_date(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let date = parse_date(&date)?;
    let report = state.status.for_date(date).await.map_err(ingest_err)?;
    Ok(Json(report))
}

/// GET /job-status/failed/{date}
#[utoipa::path(
    get,
    path = "/job-status/failed/{date}",
    tag = "Job Status",
    params(("date" = String, Path, description = "Job date, YYYY-MM-DD")),
    responses(
        (status = 200, description = "FAILED job executions for the date, newest first", body = Vec<JobExecution>),
        (status = 400, description = "Unparsable date"),
        (status = 500, description = "Store error")
    )
)]
pub async fn job_status_failed(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<Json<Vec<JobExecution>>, ApiError> {
    let date = parse_date(&date)?;
    let rows = state.status.failed_on(date).await.map_err(ingest_err)?;
    Ok(Json(rows))
}

/// GET /job-status/partner/{partnerId}/{date}
#[utoipa::path(
    get,
    path = "/job-status/partner/{partnerId}/{date}",
    tag = "Job Status",
    params(
        ("partnerId" = String, Path, description = "Partner identifier"),
        ("date" = String, Path, description = "Job date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Status for one partner on the date", body = JobStatusResponse),
        (status = 400, description = "Unparsable date"),
        (status = 500, description = "Store error")
    )
)]
pub async fn job_status_for_partner(
    State(state): State<Arc<AppState>>,
    Path((partner_id, date)): Path<(String, String)>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let date = parse_date(&date)?;
    let report = state
        .status
        .for_partner_on(&partner_id, date)
        .await
        .map_err(ingest_err)?;
    Ok(Json(report))
}
