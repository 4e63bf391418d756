//! HTTP handlers, grouped by concern.
//!
//! Shared error mapping lives here: every handler fails with
//! `(StatusCode, Json<{"error": ...}>)`.

pub mod doc;
mod health;
mod job_status;
mod polling;

use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde_json::{json, Value};

use tms_core::IngestError;

pub use health::{config_summary, health};
pub use job_status::{job_status_by_date, job_status_failed, job_status_for_partner, job_status_latest};
pub use polling::{polling_run, polling_run_entity, polling_run_partner};

pub(crate) type ApiError = (StatusCode, Json<Value>);

/// Parse an ISO `YYYY-MM-DD` path segment, or 400.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("invalid date '{}': expected YYYY-MM-DD", raw) })),
        )
    })
}

/// Map a pipeline error to an HTTP response.
pub(crate) fn ingest_err(e: IngestError) -> ApiError {
    let status = match e {
        IngestError::PartnerNotFound(_) | IngestError::PartnerInactive(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string(), "kind": e.kind() })))
}
