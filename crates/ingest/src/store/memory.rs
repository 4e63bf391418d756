use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;

use tms_core::{
    ExecutionStatus, IngestError, JobExecution, NewJobExecution, NewStagingRecord, StagingRecord,
};

use super::{JobExecutionStore, StagingStore};

/// In-process store used for tests and when PostgreSQL is not configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    staging: RwLock<Vec<StagingRecord>>,
    executions: RwLock<Vec<JobExecution>>,
    next_staging_id: AtomicI64,
    next_execution_id: AtomicI64,
}

fn poisoned() -> IngestError {
    IngestError::Persistence("memory store lock poisoned".to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every staging record, in insertion order.
    pub fn staging_records(&self) -> Vec<StagingRecord> {
        self.staging.read().map(|rows| rows.clone()).unwrap_or_default()
    }

    /// Snapshot of every job execution, in insertion order.
    pub fn executions(&self) -> Vec<JobExecution> {
        self.executions.read().map(|rows| rows.clone()).unwrap_or_default()
    }

    fn select<F>(&self, keep: F) -> Result<Vec<JobExecution>, IngestError>
    where
        F: Fn(&JobExecution) -> bool,
    {
        let rows = self.executions.read().map_err(|_| poisoned())?;
        let mut selected: Vec<JobExecution> = rows.iter().filter(|e| keep(e)).cloned().collect();
        // Newest first; ids break ties between rows written in the same instant.
        selected.sort_by(|a, b| {
            b.execution_time
                .cmp(&a.execution_time)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(selected)
    }
}

#[async_trait]
impl StagingStore for MemoryStore {
    async fn insert(&self, record: NewStagingRecord) -> Result<StagingRecord, IngestError> {
        let id = self.next_staging_id.fetch_add(1, Ordering::Relaxed) + 1;
        let row = StagingRecord::from_new(id, record);
        self.staging.write().map_err(|_| poisoned())?.push(row.clone());
        Ok(row)
    }
}

#[async_trait]
impl JobExecutionStore for MemoryStore {
    async fn insert(&self, execution: NewJobExecution) -> Result<JobExecution, IngestError> {
        let id = self.next_execution_id.fetch_add(1, Ordering::Relaxed) + 1;
        let row = JobExecution::from_new(id, execution);
        self.executions.write().map_err(|_| poisoned())?.push(row.clone());
        Ok(row)
    }

    async fn for_date(&self, job_date: NaiveDate) -> Result<Vec<JobExecution>, IngestError> {
        self.select(|e| e.job_date == job_date)
    }

    async fn for_partner_on(
        &self,
        partner_id: &str,
        job_date: NaiveDate,
    ) -> Result<Vec<JobExecution>, IngestError> {
        self.select(|e| e.partner_id == partner_id && e.job_date == job_date)
    }

    async fn latest(&self) -> Result<Vec<JobExecution>, IngestError> {
        let latest_date = {
            let rows = self.executions.read().map_err(|_| poisoned())?;
            rows.iter().map(|e| e.job_date).max()
        };
        match latest_date {
            Some(date) => self.select(|e| e.job_date == date),
            None => Ok(Vec::new()),
        }
    }

    async fn failed_on(&self, job_date: NaiveDate) -> Result<Vec<JobExecution>, IngestError> {
        self.select(|e| e.job_date == job_date && e.status == ExecutionStatus::Failed)
    }
}
