//! Plain value records shared by the pipeline, the stores, and the API.
//!
//! Records are immutable once persisted; stores only ever append.

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::EntityType;

/// Current local calendar date, used as the job date of a run.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ── Registry types (read-only) ────────────────────────────────

/// Partner endpoint configuration served by the config registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartnerConfig {
    pub partner_id: String,
    pub base_url: String,
    #[serde(default)]
    pub active: bool,
    /// Logical endpoint key (e.g. "theatres") to relative path (e.g. "/v1/theatres").
    #[serde(default)]
    pub endpoints: HashMap<String, String>,
}

impl PartnerConfig {
    pub fn endpoint(&self, entity_type: EntityType) -> Option<&str> {
        self.endpoints.get(entity_type.endpoint_key()).map(String::as_str)
    }
}

/// One source→target field rule for a (partner, entity type) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub partner_id: String,
    pub entity_type: EntityType,
    pub source_field: String,
    pub target_field: String,
    #[serde(default, alias = "isRequired")]
    pub required: bool,
}

// ── Staging ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StagingStatus {
    Pending,
    Failed,
}

impl StagingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StagingStatus::Pending => "PENDING",
            StagingStatus::Failed => "FAILED",
        }
    }
}

impl std::str::FromStr for StagingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(StagingStatus::Pending),
            "FAILED" => Ok(StagingStatus::Failed),
            other => Err(format!("unknown staging status '{}'", other)),
        }
    }
}

/// Insert payload for a staging record; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewStagingRecord {
    pub partner_id: String,
    pub entity_type: EntityType,
    pub external_id: Option<String>,
    pub raw_data: String,
    /// `None` when normalization failed.
    pub normalized_data: Option<String>,
    pub status: StagingStatus,
    pub batch_id: Uuid,
    pub received_at: DateTime<Utc>,
}

/// One fetch attempt's raw and normalized payloads, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StagingRecord {
    pub id: i64,
    pub partner_id: String,
    pub entity_type: EntityType,
    pub external_id: Option<String>,
    pub raw_data: String,
    pub normalized_data: Option<String>,
    pub status: StagingStatus,
    pub batch_id: Uuid,
    pub received_at: DateTime<Utc>,
}

impl StagingRecord {
    pub fn from_new(id: i64, new: NewStagingRecord) -> Self {
        Self {
            id,
            partner_id: new.partner_id,
            entity_type: new.entity_type,
            external_id: new.external_id,
            raw_data: new.raw_data,
            normalized_data: new.normalized_data,
            status: new.status,
            batch_id: new.batch_id,
            received_at: new.received_at,
        }
    }
}

// ── Job executions ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Success,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Success => "SUCCESS",
            ExecutionStatus::Failed => "FAILED",
        }
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(ExecutionStatus::Success),
            "FAILED" => Ok(ExecutionStatus::Failed),
            other => Err(format!("unknown execution status '{}'", other)),
        }
    }
}

/// Insert payload for a job execution row.
#[derive(Debug, Clone)]
pub struct NewJobExecution {
    pub job_date: NaiveDate,
    pub partner_id: String,
    pub entity_type: EntityType,
    pub status: ExecutionStatus,
    pub records_processed: i32,
    pub error_message: Option<String>,
    pub execution_time: DateTime<Utc>,
    pub duration_ms: i64,
}

/// Outcome of one (partner, entity type, day) attempt.
///
/// The set of rows for a job date is the only input to status reporting.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobExecution {
    pub id: i64,
    pub job_date: NaiveDate,
    pub partner_id: String,
    pub entity_type: EntityType,
    pub status: ExecutionStatus,
    pub records_processed: i32,
    pub error_message: Option<String>,
    pub execution_time: DateTime<Utc>,
    pub duration_ms: i64,
}

impl JobExecution {
    pub fn from_new(id: i64, new: NewJobExecution) -> Self {
        Self {
            id,
            job_date: new.job_date,
            partner_id: new.partner_id,
            entity_type: new.entity_type,
            status: new.status,
            records_processed: new.records_processed,
            error_message: new.error_message,
            execution_time: new.execution_time,
            duration_ms: new.duration_ms,
        }
    }
}

// ── Status reporting (derived, never stored) ──────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Success,
    Partial,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerJobStatus {
    pub partner_id: String,
    pub successful_entities: u32,
    pub failed_entities: u32,
    /// Failed entity types in the order they were encountered.
    pub failed_entity_types: Vec<EntityType>,
    pub overall_status: OverallStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job_date: NaiveDate,
    pub total_partners: u32,
    pub successful_partners: u32,
    pub failed_partners: u32,
    pub partner_statuses: Vec<PartnerJobStatus>,
}

impl JobStatusResponse {
    /// Zero-valued response for a date with no executions.
    pub fn empty(job_date: NaiveDate) -> Self {
        Self {
            job_date,
            total_partners: 0,
            successful_partners: 0,
            failed_partners: 0,
            partner_statuses: Vec::new(),
        }
    }
}
