//! Polling orchestrator: fetch, normalize, stage, then record each attempt.
//!
//! One attempt covers a single (partner, entity type, day). Attempts are
//! isolated from each other: any failure is caught at the attempt boundary
//! and recorded as a FAILED [`JobExecution`](tms_core::JobExecution), so it
//! never stops sibling entity types or other partners.
//!
//! Attempts run through a bounded stream of `concurrency` workers; with
//! `concurrency = 1` the run is fully sequential. Each attempt owns its
//! timer and error, and only appends partner-scoped rows.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use tms_core::{
    today, EntityType, ExecutionStatus, IngestError, NormalizeError, PartnerConfig, PollingConfig,
};

use crate::fetch::PartnerFetcher;
use crate::normalize::normalize;
use crate::registry::ConfigRegistry;
use crate::staging::StagingWriter;
use crate::tracker::JobExecutionTracker;

/// Working phase of an attempt.
///
/// An attempt moves `Fetching → Normalizing → Staging` and ends as SUCCESS
/// or FAILED; a failure in any phase ends it immediately, with no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptPhase {
    Fetching,
    Normalizing,
    Staging,
}

/// Outcome of one attempt, as returned to callers of a run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptReport {
    pub partner_id: String,
    pub entity_type: EntityType,
    pub status: ExecutionStatus,
    /// Phase that was running when the attempt failed.
    pub failed_phase: Option<AttemptPhase>,
    pub error_kind: Option<&'static str>,
    pub error_message: Option<String>,
    /// Batch id of the staging record written, if any.
    pub batch_id: Option<Uuid>,
    pub duration_ms: i64,
    /// False if the job execution row itself could not be written.
    pub recorded: bool,
}

/// Every attempt of one run, in partner then entity-type order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub job_date: NaiveDate,
    pub attempts: Vec<AttemptReport>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.status == ExecutionStatus::Success)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.attempts.len() - self.succeeded()
    }
}

/// Failure captured inside an attempt, with the phase it happened in.
struct AttemptFailure {
    phase: AttemptPhase,
    error: IngestError,
    batch_id: Option<Uuid>,
}

impl AttemptFailure {
    fn new(phase: AttemptPhase, error: IngestError) -> Self {
        Self { phase, error, batch_id: None }
    }
}

/// Drives every active partner through every entity type.
pub struct PollingOrchestrator {
    registry: Arc<dyn ConfigRegistry>,
    fetcher: PartnerFetcher,
    staging: StagingWriter,
    tracker: JobExecutionTracker,
    concurrency: usize,
    attempt_timeout: Duration,
}

impl PollingOrchestrator {
    pub fn new(
        registry: Arc<dyn ConfigRegistry>,
        fetcher: PartnerFetcher,
        staging: StagingWriter,
        tracker: JobExecutionTracker,
        polling: &PollingConfig,
    ) -> Self {
        Self {
            registry,
            fetcher,
            staging,
            tracker,
            concurrency: polling.concurrency.max(1),
            attempt_timeout: polling.attempt_timeout(),
        }
    }

    pub fn registry(&self) -> &Arc<dyn ConfigRegistry> {
        &self.registry
    }

    /// Entry point for the daily trigger: poll everything for today.
    pub async fn run_daily_poll(&self) -> Result<RunSummary, IngestError> {
        self.run_for_date(today()).await
    }

    /// Poll every active partner for every entity type, recording under `job_date`.
    ///
    /// Only a failure to list partners aborts the run; attempt failures are
    /// recorded and reported.
    pub async fn run_for_date(&self, job_date: NaiveDate) -> Result<RunSummary, IngestError> {
        let partners = self.registry.list_active_partners().await.map_err(|e| {
            error!(error = %e, "could not list active partners, skipping run");
            e
        })?;

        info!(
            job_date = %job_date,
            partners = partners.len(),
            concurrency = self.concurrency,
            "starting partner polling run"
        );

        let summary = self.run_partners(&partners, job_date).await;

        info!(
            job_date = %job_date,
            attempts = summary.attempts.len(),
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "partner polling run finished"
        );
        Ok(summary)
    }

    /// Poll a single partner (resolved through the registry) for all entity types.
    pub async fn run_partner(&self, partner_id: &str, job_date: NaiveDate) -> Result<RunSummary, IngestError> {
        let partner = self.registry.find_partner(partner_id).await?;
        Ok(self.run_partners(std::slice::from_ref(&partner), job_date).await)
    }

    /// Run exactly one attempt for a registry-resolved partner.
    pub async fn run_entity(
        &self,
        partner_id: &str,
        entity_type: EntityType,
        job_date: NaiveDate,
    ) -> Result<AttemptReport, IngestError> {
        let partner = self.registry.find_partner(partner_id).await?;
        Ok(self.poll_entity(&partner, entity_type, job_date).await)
    }

    async fn run_partners(&self, partners: &[PartnerConfig], job_date: NaiveDate) -> RunSummary {
        let jobs: Vec<(PartnerConfig, EntityType)> = partners
            .iter()
            .flat_map(|p| EntityType::ALL.iter().map(move |e| (p.clone(), *e)))
            .collect();

        // `buffered` keeps output in input order while running up to N at once.
        let attempts: Vec<AttemptReport> = stream::iter(jobs)
            .map(|(partner, entity_type)| async move {
                self.poll_entity(&partner, entity_type, job_date).await
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        for partner in partners {
            self.log_partner_summary(&partner.partner_id, job_date).await;
        }

        RunSummary { job_date, attempts }
    }

    /// One fully isolated attempt. Never returns an error: every failure ends
    /// up in the FAILED job execution and the returned report.
    pub async fn poll_entity(
        &self,
        partner: &PartnerConfig,
        entity_type: EntityType,
        job_date: NaiveDate,
    ) -> AttemptReport {
        let partner_id = partner.partner_id.as_str();
        info!(partner_id = %partner_id, entity_type = %entity_type, "starting attempt");

        let started = Instant::now();
        let outcome = self.attempt(partner, entity_type).await;
        let duration_ms = started.elapsed().as_millis() as i64;

        match outcome {
            Ok(batch_id) => {
                let recorded = self
                    .tracker
                    .record(partner_id, entity_type, job_date, ExecutionStatus::Success, 1, None, duration_ms)
                    .await;
                let recorded = check_recorded(partner_id, entity_type, recorded);
                info!(
                    partner_id = %partner_id,
                    entity_type = %entity_type,
                    batch_id = %batch_id,
                    duration_ms = duration_ms,
                    "attempt succeeded"
                );
                AttemptReport {
                    partner_id: partner_id.to_string(),
                    entity_type,
                    status: ExecutionStatus::Success,
                    failed_phase: None,
                    error_kind: None,
                    error_message: None,
                    batch_id: Some(batch_id),
                    duration_ms,
                    recorded,
                }
            }
            Err(failure) => {
                let message = failure.error.to_string();
                let recorded = self
                    .tracker
                    .record(
                        partner_id,
                        entity_type,
                        job_date,
                        ExecutionStatus::Failed,
                        0,
                        Some(message.clone()),
                        duration_ms,
                    )
                    .await;
                let recorded = check_recorded(partner_id, entity_type, recorded);
                error!(
                    partner_id = %partner_id,
                    entity_type = %entity_type,
                    phase = ?failure.phase,
                    kind = failure.error.kind(),
                    error = %message,
                    duration_ms = duration_ms,
                    "attempt failed"
                );
                AttemptReport {
                    partner_id: partner_id.to_string(),
                    entity_type,
                    status: ExecutionStatus::Failed,
                    failed_phase: Some(failure.phase),
                    error_kind: Some(failure.error.kind()),
                    error_message: Some(message),
                    batch_id: failure.batch_id,
                    duration_ms,
                    recorded,
                }
            }
        }
    }

    /// Fetch, normalize, and stage. Returns the batch id of the PENDING record.
    async fn attempt(&self, partner: &PartnerConfig, entity_type: EntityType) -> Result<Uuid, AttemptFailure> {
        let partner_id = partner.partner_id.as_str();

        // Fetching: no raw payload means no staging record.
        let raw = match tokio::time::timeout(self.attempt_timeout, self.fetcher.fetch(partner, entity_type)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(AttemptFailure::new(AttemptPhase::Fetching, e)),
            Err(_) => {
                return Err(AttemptFailure::new(
                    AttemptPhase::Fetching,
                    IngestError::Transport(format!(
                        "fetch timed out after {}ms",
                        self.attempt_timeout.as_millis()
                    )),
                ))
            }
        };

        // Normalizing
        let mappings = match self.registry.get_field_mappings(partner_id, entity_type).await {
            Ok(mappings) => mappings,
            Err(e) => {
                warn!(
                    partner_id = %partner_id,
                    entity_type = %entity_type,
                    error = %e,
                    "could not fetch field mappings, validating raw data only"
                );
                Vec::new()
            }
        };

        let normalized = match normalize(&raw, &mappings).and_then(|value| {
            serde_json::to_string(&value).map_err(|e| {
                NormalizeError::MalformedPayload(format!("cannot serialize normalized data: {}", e))
            })
        }) {
            Ok(normalized) => normalized,
            Err(e) => {
                let batch_id = self.stage_failed(partner_id, entity_type, &raw).await;
                return Err(AttemptFailure {
                    phase: AttemptPhase::Normalizing,
                    error: e.into(),
                    batch_id,
                });
            }
        };

        // Staging
        match self
            .staging
            .stage_normalized(partner_id, entity_type, &raw, normalized)
            .await
        {
            Ok(record) => Ok(record.batch_id),
            Err(e) => {
                let batch_id = self.stage_failed(partner_id, entity_type, &raw).await;
                Err(AttemptFailure {
                    phase: AttemptPhase::Staging,
                    error: e,
                    batch_id,
                })
            }
        }
    }

    /// Best-effort FAILED staging write so the raw payload is never lost.
    async fn stage_failed(&self, partner_id: &str, entity_type: EntityType, raw: &str) -> Option<Uuid> {
        match self.staging.stage_failed(partner_id, entity_type, raw).await {
            Ok(record) => Some(record.batch_id),
            Err(e) => {
                error!(
                    partner_id = %partner_id,
                    entity_type = %entity_type,
                    error = %e,
                    "could not save FAILED staging record"
                );
                None
            }
        }
    }

    async fn log_partner_summary(&self, partner_id: &str, job_date: NaiveDate) {
        match self.tracker.for_partner_on(partner_id, job_date).await {
            Ok(rows) => {
                let success = rows.iter().filter(|r| r.status == ExecutionStatus::Success).count();
                let failure = rows.len() - success;
                info!(
                    partner_id = %partner_id,
                    "Partner {} daily summary: {} success, {} failures",
                    partner_id, success, failure
                );
            }
            Err(e) => warn!(partner_id = %partner_id, error = %e, "could not load partner summary"),
        }
    }
}

/// Log a failed job execution write; the attempt itself is already decided.
fn check_recorded<T>(
    partner_id: &str,
    entity_type: EntityType,
    result: Result<T, IngestError>,
) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            error!(
                partner_id = %partner_id,
                entity_type = %entity_type,
                error = %e,
                "could not record job execution"
            );
            false
        }
    }
}
