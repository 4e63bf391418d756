//! Append-only repositories for staging records and job executions.
//!
//! Only the query shapes the tracker and status reporting need are exposed;
//! nothing here updates or deletes a row.

pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;

use tms_core::{IngestError, JobExecution, NewJobExecution, NewStagingRecord, StagingRecord};

pub use memory::MemoryStore;

/// Persistence for staging records.
#[async_trait]
pub trait StagingStore: Send + Sync {
    async fn insert(&self, record: NewStagingRecord) -> Result<StagingRecord, IngestError>;
}

/// Persistence and queries for job execution rows.
///
/// Every list is ordered by execution time, newest first.
#[async_trait]
pub trait JobExecutionStore: Send + Sync {
    async fn insert(&self, execution: NewJobExecution) -> Result<JobExecution, IngestError>;

    async fn for_date(&self, job_date: NaiveDate) -> Result<Vec<JobExecution>, IngestError>;

    async fn for_partner_on(
        &self,
        partner_id: &str,
        job_date: NaiveDate,
    ) -> Result<Vec<JobExecution>, IngestError>;

    /// Rows of the most recent job date that has any executions.
    async fn latest(&self) -> Result<Vec<JobExecution>, IngestError>;

    async fn failed_on(&self, job_date: NaiveDate) -> Result<Vec<JobExecution>, IngestError>;
}
