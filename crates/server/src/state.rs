use std::sync::Arc;

use sqlx::PgPool;

use tms_core::Config;
use tms_ingest::{
    ConfigRegistry, JobExecutionStore, JobExecutionTracker, PartnerFetcher, PollingOrchestrator,
    StagingStore, StagingWriter, StatusService, Transport,
};

pub struct AppState {
    pub config: Config,
    pub orchestrator: PollingOrchestrator,
    pub status: StatusService,
    /// None when PostgreSQL is not configured (in-memory stores).
    pub pg_pool: Option<PgPool>,
}

impl AppState {
    /// Wire the pipeline from its collaborators.
    pub fn assemble(
        config: Config,
        registry: Arc<dyn ConfigRegistry>,
        transport: Arc<dyn Transport>,
        staging: Arc<dyn StagingStore>,
        executions: Arc<dyn JobExecutionStore>,
        pg_pool: Option<PgPool>,
    ) -> Self {
        let tracker = JobExecutionTracker::new(executions);
        let orchestrator = PollingOrchestrator::new(
            registry,
            PartnerFetcher::new(transport),
            StagingWriter::new(staging),
            tracker.clone(),
            &config.polling,
        );
        Self {
            orchestrator,
            status: StatusService::new(tracker),
            pg_pool,
            config,
        }
    }
}
