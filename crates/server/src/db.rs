use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

use tms_core::config::PostgresConfig;

/// Create a PostgreSQL connection pool and run migrations.
/// Returns None if PG_USERNAME is not configured or the database is unreachable.
pub async fn init_pg_pool(config: &PostgresConfig) -> Option<PgPool> {
    if !config.is_configured() {
        warn!("PG_USERNAME not configured, job history is kept in memory only");
        return None;
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await;

    match pool {
        Ok(pool) => {
            info!("PostgreSQL connected: {}/{}", config.host, config.database);
            match sqlx::migrate!("../../migrations").run(&pool).await {
                Ok(_) => {
                    info!("Database migrations applied successfully");
                    Some(pool)
                }
                Err(e) => {
                    warn!("Failed to run migrations: {}, falling back to in-memory store", e);
                    None
                }
            }
        }
        Err(e) => {
            warn!("Failed to connect to PostgreSQL: {}, falling back to in-memory store", e);
            None
        }
    }
}
