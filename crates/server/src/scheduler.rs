//! Cron-based daily trigger for the polling run.
//!
//! Sleeps until the next fire time of `POLL_CRON`, then calls
//! [`PollingOrchestrator::run_daily_poll`](tms_ingest::PollingOrchestrator::run_daily_poll).
//! A failed run is logged and the loop waits for the next fire time.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Local};
use cron::Schedule;
use tracing::{error, info, warn};

use crate::state::AppState;

/// Run the daily trigger until the process exits.
pub async fn run_poll_scheduler(state: Arc<AppState>) {
    let expr = state.config.polling.cron.clone();
    let schedule = match parse_cron(&expr) {
        Ok(s) => s,
        Err(e) => {
            error!(cron = %expr, error = %e, "scheduler: invalid POLL_CRON, daily polling disabled");
            return;
        }
    };

    info!(cron = %expr, "poll scheduler started");

    loop {
        let Some(next) = next_fire(&schedule, Local::now()) else {
            warn!(cron = %expr, "scheduler: no upcoming fire time, stopping");
            return;
        };
        info!(next_run = %next, "scheduler: next daily poll");

        let wait = (next - Local::now()).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        info!(trigger = "scheduled", "scheduler: starting daily poll");
        match state.orchestrator.run_daily_poll().await {
            Ok(summary) => info!(
                job_date = %summary.job_date,
                succeeded = summary.succeeded(),
                failed = summary.failed(),
                "scheduler: daily poll finished"
            ),
            Err(e) => error!(error = %e, "scheduler: daily poll aborted"),
        }
    }
}

/// Next fire time strictly after `after`, in local time.
fn next_fire(schedule: &Schedule, after: DateTime<Local>) -> Option<DateTime<Local>> {
    schedule.after(&after).next()
}

/// Parse a cron expression, auto-prepending "0 " for 5-field expressions.
///
/// The `cron` crate requires 6 fields (sec min hr dom mon dow), but users
/// typically write 5-field cron (min hr dom mon dow).
fn parse_cron(expr: &str) -> Result<Schedule, cron::error::Error> {
    let parts: Vec<&str> = expr.split_whitespace().collect();
    if parts.len() == 5 {
        let six_field = format!("0 {}", expr);
        Schedule::from_str(&six_field)
    } else {
        Schedule::from_str(expr)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
