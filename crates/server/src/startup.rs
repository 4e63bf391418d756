//! Server startup: pick the store and registry backends from config and
//! build the shared state.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use tms_core::Config;
use tms_ingest::{
    ConfigRegistry, HttpConfigRegistry, HttpTransport, JobExecutionStore, MemoryStore,
    StagingStore, StaticConfigRegistry,
};

use crate::db;
use crate::pg_store::{PgJobExecutionStore, PgStagingStore};
use crate::state::AppState;

/// Build `AppState` from configuration.
///
/// Falls back to the in-memory store when PostgreSQL is unavailable; a
/// registry file that cannot be loaded is a startup error.
pub async fn build_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let registry = build_registry(&config)?;
    let transport = Arc::new(HttpTransport::new(config.partner_http.timeout()));

    let pg_pool = db::init_pg_pool(&config.postgres).await;
    let (staging, executions): (Arc<dyn StagingStore>, Arc<dyn JobExecutionStore>) = match &pg_pool {
        Some(pool) => (
            Arc::new(PgStagingStore::new(pool.clone())),
            Arc::new(PgJobExecutionStore::new(pool.clone())),
        ),
        None => {
            warn!("Using in-memory staging and job execution store, history is lost on restart");
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        }
    };

    Ok(Arc::new(AppState::assemble(
        config, registry, transport, staging, executions, pg_pool,
    )))
}

fn build_registry(config: &Config) -> anyhow::Result<Arc<dyn ConfigRegistry>> {
    match &config.config_service.registry_file {
        Some(path) => {
            let registry = StaticConfigRegistry::from_yaml_file(path)
                .with_context(|| format!("failed to load partner registry {}", path.display()))?;
            info!("Partner registry loaded from {}", path.display());
            Ok(Arc::new(registry))
        }
        None => {
            info!("Partner registry: config service at {}", config.config_service.url);
            Ok(Arc::new(HttpConfigRegistry::new(
                config.config_service.url.clone(),
                config.config_service.timeout(),
            )))
        }
    }
}
