//! Status queries answered from persisted job executions.

use chrono::NaiveDate;

use tms_core::{today, IngestError, JobExecution, JobStatusResponse};

use crate::aggregate::aggregate;
use crate::tracker::JobExecutionTracker;

/// Read-only reporting over the tracker; results are recomputed on every call.
#[derive(Clone)]
pub struct StatusService {
    tracker: JobExecutionTracker,
}

impl StatusService {
    pub fn new(tracker: JobExecutionTracker) -> Self {
        Self { tracker }
    }

    /// Report for the most recent job date, or today's empty report.
    pub async fn latest(&self) -> Result<JobStatusResponse, IngestError> {
        let executions = self.tracker.latest().await?;
        match executions.first() {
            Some(first) => Ok(aggregate(first.job_date, &executions)),
            None => Ok(JobStatusResponse::empty(today())),
        }
    }

    pub async fn for_date(&self, job_date: NaiveDate) -> Result<JobStatusResponse, IngestError> {
        let executions = self.tracker.for_date(job_date).await?;
        Ok(aggregate(job_date, &executions))
    }

    pub async fn for_partner_on(
        &self,
        partner_id: &str,
        job_date: NaiveDate,
    ) -> Result<JobStatusResponse, IngestError> {
        let executions = self.tracker.for_partner_on(partner_id, job_date).await?;
        Ok(aggregate(job_date, &executions))
    }

    /// Raw FAILED rows for a date, not aggregated.
    pub async fn failed_on(&self, job_date: NaiveDate) -> Result<Vec<JobExecution>, IngestError> {
        self.tracker.failed_on(job_date).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tms_core::{EntityType, ExecutionStatus, OverallStatus};

    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_latest_on_empty_history_is_today() {
        let service = StatusService::new(JobExecutionTracker::new(Arc::new(MemoryStore::new())));
        let resp = service.latest().await.unwrap();
        assert_eq!(resp.job_date, today());
        assert_eq!(resp.total_partners, 0);
        assert!(resp.partner_statuses.is_empty());
    }

    #[tokio::test]
    async fn test_for_date_without_rows_keeps_requested_date() {
        let service = StatusService::new(JobExecutionTracker::new(Arc::new(MemoryStore::new())));
        let asked = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let resp = service.for_date(asked).await.unwrap();
        assert_eq!(resp.job_date, asked);
        assert_eq!(resp.total_partners, 0);
        assert_eq!(resp.successful_partners, 0);
        assert_eq!(resp.failed_partners, 0);
        assert!(resp.partner_statuses.is_empty());
    }

    #[tokio::test]
    async fn test_latest_uses_most_recent_date() {
        let tracker = JobExecutionTracker::new(Arc::new(MemoryStore::new()));
        let old = NaiveDate::from_ymd_opt(2024, 1, 14).unwrap();
        let new = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        tracker
            .record("P1", EntityType::Theatre, old, ExecutionStatus::Failed, 0, Some("x".into()), 1)
            .await
            .unwrap();
        tracker
            .record("P1", EntityType::Theatre, new, ExecutionStatus::Success, 1, None, 1)
            .await
            .unwrap();

        let service = StatusService::new(tracker);
        let resp = service.latest().await.unwrap();
        assert_eq!(resp.job_date, new);
        assert_eq!(resp.partner_statuses[0].overall_status, OverallStatus::Success);
    }
}
