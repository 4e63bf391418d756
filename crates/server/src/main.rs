mod api;
mod cli;
mod db;
mod pg_store;
mod router;
mod scheduler;
mod startup;
mod state;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tms_core::{today, Config};

use crate::cli::{CliArgs, Command};

fn load_config() -> Config {
    tms_core::config::load_dotenv();
    Config::from_env()
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config.log_summary();
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let port = config.server.port;

    let state = startup::build_app_state(config).await?;
    tokio::spawn(scheduler::run_poll_scheduler(state.clone()));

    let app = router::build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://localhost:{}", port);
    info!("API docs at http://localhost:{}/docs", port);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn poll(config: Config, partner: Option<&str>) -> anyhow::Result<()> {
    let state = startup::build_app_state(config).await?;
    let summary = match partner {
        Some(partner_id) => state.orchestrator.run_partner(partner_id, today()).await?,
        None => state.orchestrator.run_daily_poll().await?,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn status(config: Config, date: Option<chrono::NaiveDate>) -> anyhow::Result<()> {
    let state = startup::build_app_state(config).await?;
    let report = match date {
        Some(date) => state.status.for_date(date).await?,
        None => state.status.latest().await?,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let config = load_config();

    match args.command() {
        Command::Serve => serve(config).await,
        Command::Poll { partner } => poll(config, partner.as_deref()).await,
        Command::Status { date } => status(config, date).await,
    }
}
