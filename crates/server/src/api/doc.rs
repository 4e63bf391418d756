//! OpenAPI documentation aggregator.
//!
//! Collects all `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single OpenAPI spec, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "tms-adapter API",
        version = "0.1.0",
        description = "Partner ingestion, normalization, staging and job status tracking.",
    ),
    tags(
        (name = "Health", description = "Liveness and effective configuration"),
        (name = "Job Status", description = "Per-partner job status aggregated from job executions"),
        (name = "Polling", description = "Manual polling triggers"),
    ),
    paths(
        // Health
        crate::api::health::health,
        crate::api::health::config_summary,
        // Job Status
        crate::api::job_status::job_status_latest,
        crate::api::job_status::job_status_by_date,
        crate::api::job_status::job_status_failed,
        crate::api::job_status::job_status_for_partner,
        // Polling
        crate::api::polling::polling_run,
        crate::api::polling::polling_run_partner,
        crate::api::polling::polling_run_entity,
    ),
    components(schemas(
        crate::api::health::HealthResponse,
        tms_core::JobStatusResponse,
        tms_core::PartnerJobStatus,
        tms_core::JobExecution,
        tms_core::EntityType,
        tms_core::ExecutionStatus,
        tms_core::OverallStatus,
    ))
)]
pub struct ApiDoc;
