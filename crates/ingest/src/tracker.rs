//! Job execution tracker. Appends one outcome row per attempt.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use tms_core::{EntityType, ExecutionStatus, IngestError, JobExecution, NewJobExecution};

use crate::store::JobExecutionStore;

/// Writes one [`JobExecution`] per attempt and serves the status queries.
#[derive(Clone)]
pub struct JobExecutionTracker {
    store: Arc<dyn JobExecutionStore>,
}

impl JobExecutionTracker {
    pub fn new(store: Arc<dyn JobExecutionStore>) -> Self {
        Self { store }
    }

    /// Append a new execution row. Existing rows are never touched.
    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        &self,
        partner_id: &str,
        entity_type: EntityType,
        job_date: NaiveDate,
        status: ExecutionStatus,
        records_processed: i32,
        error_message: Option<String>,
        duration_ms: i64,
    ) -> Result<JobExecution, IngestError> {
        self.store
            .insert(NewJobExecution {
                job_date,
                partner_id: partner_id.to_string(),
                entity_type,
                status,
                records_processed,
                error_message,
                execution_time: Utc::now(),
                duration_ms,
            })
            .await
    }

    pub async fn for_date(&self, job_date: NaiveDate) -> Result<Vec<JobExecution>, IngestError> {
        self.store.for_date(job_date).await
    }

    pub async fn for_partner_on(
        &self,
        partner_id: &str,
        job_date: NaiveDate,
    ) -> Result<Vec<JobExecution>, IngestError> {
        self.store.for_partner_on(partner_id, job_date).await
    }

    pub async fn latest(&self) -> Result<Vec<JobExecution>, IngestError> {
        self.store.latest().await
    }

    pub async fn failed_on(&self, job_date: NaiveDate) -> Result<Vec<JobExecution>, IngestError> {
        self.store.failed_on(job_date).await
    }
}
