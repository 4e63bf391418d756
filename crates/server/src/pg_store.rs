//! PostgreSQL-backed repositories for `staging_records` and `job_executions`.
//!
//! Both tables are append-only: the stores only INSERT and SELECT. Rows are
//! read into flat `FromRow` structs and converted into the core value types,
//! so an unknown enum string in the database surfaces as a persistence error.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use tms_core::{
    EntityType, ExecutionStatus, IngestError, JobExecution, NewJobExecution, NewStagingRecord,
    StagingRecord, StagingStatus,
};
use tms_ingest::{JobExecutionStore, StagingStore};

fn db_err(e: sqlx::Error) -> IngestError {
    IngestError::Persistence(format!("database error: {}", e))
}

fn parse_entity(value: &str) -> Result<EntityType, IngestError> {
    value
        .parse()
        .map_err(|e: tms_core::UnknownEntityType| IngestError::Persistence(e.to_string()))
}

// ── Staging records ──────────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
struct StagingRecordRow {
    id: i64,
    partner_id: String,
    entity_type: String,
    external_id: Option<String>,
    raw_data: String,
    normalized_data: Option<String>,
    status: String,
    batch_id: Uuid,
    received_at: DateTime<Utc>,
}

impl TryFrom<StagingRecordRow> for StagingRecord {
    type Error = IngestError;

    fn try_from(row: StagingRecordRow) -> Result<Self, Self::Error> {
        Ok(StagingRecord {
            id: row.id,
            partner_id: row.partner_id,
            entity_type: parse_entity(&row.entity_type)?,
            external_id: row.external_id,
            raw_data: row.raw_data,
            normalized_data: row.normalized_data,
            status: row
                .status
                .parse::<StagingStatus>()
                .map_err(IngestError::Persistence)?,
            batch_id: row.batch_id,
            received_at: row.received_at,
        })
    }
}

/// Append-only store for `staging_records`.
#[derive(Clone)]
pub struct PgStagingStore {
    pool: PgPool,
}

impl PgStagingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StagingStore for PgStagingStore {
    async fn insert(&self, record: NewStagingRecord) -> Result<StagingRecord, IngestError> {
        let row = sqlx::query_as::<_, StagingRecordRow>(
            "INSERT INTO staging_records
                (partner_id, entity_type, external_id, raw_data, normalized_data, status, batch_id, received_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, partner_id, entity_type, external_id, raw_data,
                       normalized_data, status, batch_id, received_at",
        )
        .bind(&record.partner_id)
        .bind(record.entity_type.as_str())
        .bind(&record.external_id)
        .bind(&record.raw_data)
        .bind(&record.normalized_data)
        .bind(record.status.as_str())
        .bind(record.batch_id)
        .bind(record.received_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        row.try_into()
    }
}

// ── Job executions ───────────────────────────────────────────────────

const EXECUTION_COLUMNS: &str = "id, job_date, partner_id, entity_type, status, records_processed,
    error_message, execution_time, duration_ms";

#[derive(Debug, sqlx::FromRow)]
struct JobExecutionRow {
    id: i64,
    job_date: NaiveDate,
    partner_id: String,
    entity_type: String,
    status: String,
    records_processed: i32,
    error_message: Option<String>,
    execution_time: DateTime<Utc>,
    duration_ms: i64,
}

impl TryFrom<JobExecutionRow> for JobExecution {
    type Error = IngestError;

    fn try_from(row: JobExecutionRow) -> Result<Self, Self::Error> {
        Ok(JobExecution {
            id: row.id,
            job_date: row.job_date,
            partner_id: row.partner_id,
            entity_type: parse_entity(&row.entity_type)?,
            status: row
                .status
                .parse::<ExecutionStatus>()
                .map_err(IngestError::Persistence)?,
            records_processed: row.records_processed,
            error_message: row.error_message,
            execution_time: row.execution_time,
            duration_ms: row.duration_ms,
        })
    }
}

fn into_executions(rows: Vec<JobExecutionRow>) -> Result<Vec<JobExecution>, IngestError> {
    rows.into_iter().map(JobExecution::try_from).collect()
}

/// Append-only store for `job_executions`. Every query returns newest first.
#[derive(Clone)]
pub struct PgJobExecutionStore {
    pool: PgPool,
}

impl PgJobExecutionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobExecutionStore for PgJobExecutionStore {
    async fn insert(&self, execution: NewJobExecution) -> Result<JobExecution, IngestError> {
        let sql = format!(
            "INSERT INTO job_executions
                (job_date, partner_id, entity_type, status, records_processed,
                 error_message, execution_time, duration_ms)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            EXECUTION_COLUMNS
        );
        let row = sqlx::query_as::<_, JobExecutionRow>(&sql)
            .bind(execution.job_date)
            .bind(&execution.partner_id)
            .bind(execution.entity_type.as_str())
            .bind(execution.status.as_str())
            .bind(execution.records_processed)
            .bind(&execution.error_message)
            .bind(execution.execution_time)
            .bind(execution.duration_ms)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        row.try_into()
    }

    async fn for_date(&self, job_date: NaiveDate) -> Result<Vec<JobExecution>, IngestError> {
        let sql = format!(
            "SELECT {} FROM job_executions
             WHERE job_date = $1
             ORDER BY execution_time DESC, id DESC",
            EXECUTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, JobExecutionRow>(&sql)
            .bind(job_date)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        into_executions(rows)
    }

    async fn for_partner_on(
        &self,
        partner_id: &str,
        job_date: NaiveDate,
    ) -> Result<Vec<JobExecution>, IngestError> {
        let sql = format!(
            "SELECT {} FROM job_executions
             WHERE partner_id = $1 AND job_date = $2
             ORDER BY execution_time DESC, id DESC",
            EXECUTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, JobExecutionRow>(&sql)
            .bind(partner_id)
            .bind(job_date)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        into_executions(rows)
    }

    async fn latest(&self) -> Result<Vec<JobExecution>, IngestError> {
        let sql = format!(
            "SELECT {} FROM job_executions
             WHERE job_date = (SELECT MAX(job_date) FROM job_executions)
             ORDER BY execution_time DESC, id DESC",
            EXECUTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, JobExecutionRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        into_executions(rows)
    }

    async fn failed_on(&self, job_date: NaiveDate) -> Result<Vec<JobExecution>, IngestError> {
        let sql = format!(
            "SELECT {} FROM job_executions
             WHERE job_date = $1 AND status = 'FAILED'
             ORDER BY execution_time DESC, id DESC",
            EXECUTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, JobExecutionRow>(&sql)
            .bind(job_date)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        into_executions(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn execution_row(entity_type: &str, status: &str) -> JobExecutionRow {
        JobExecutionRow {
            id: 7,
            job_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            partner_id: "INOX".to_string(),
            entity_type: entity_type.to_string(),
            status: status.to_string(),
            records_processed: 0,
            error_message: Some("boom".to_string()),
            execution_time: Utc::now(),
            duration_ms: 42,
        }
    }

    #[test]
    fn test_execution_row_converts() {
        let execution = JobExecution::try_from(execution_row("HALL", "FAILED")).unwrap();
        assert_eq!(execution.entity_type, EntityType::Hall);
        assert_eq!(execution.status, ExecutionStatus::Failed);
        assert_eq!(execution.duration_ms, 42);
    }

    #[test]
    fn test_unknown_entity_type_is_persistence_error() {
        let err = JobExecution::try_from(execution_row("PRICE", "SUCCESS")).unwrap_err();
        assert_eq!(err.kind(), "persistence_failure");
        assert!(err.to_string().contains("PRICE"));
    }

    #[test]
    fn test_unknown_status_is_persistence_error() {
        let err = JobExecution::try_from(execution_row("SHOW", "RUNNING")).unwrap_err();
        assert_eq!(err.kind(), "persistence_failure");
    }

    #[test]
    fn test_staging_row_converts() {
        let row = StagingRecordRow {
            id: 1,
            partner_id: "PVR".to_string(),
            entity_type: "THEATRE".to_string(),
            external_id: None,
            raw_data: "{}".to_string(),
            normalized_data: None,
            status: "FAILED".to_string(),
            batch_id: Uuid::new_v4(),
            received_at: Utc::now(),
        };
        let record = StagingRecord::try_from(row).unwrap();
        assert_eq!(record.status, StagingStatus::Failed);
        assert_eq!(record.entity_type, EntityType::Theatre);
    }
}
