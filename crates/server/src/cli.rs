//! CLI argument parsing.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Partner ingestion and job tracking service.
///
/// Polls partner APIs for theatres, halls and shows, normalizes and stages
/// the payloads, and reports per-partner job status.
#[derive(Parser, Debug)]
#[command(name = "tms-server", about = "Partner ingestion and job tracking service")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start the HTTP API and the daily poll scheduler (default)
    Serve,
    /// Run one polling pass now and print the run summary as JSON
    Poll {
        /// Poll only this partner
        #[arg(long)]
        partner: Option<String>,
    },
    /// Print the job status report as JSON
    Status {
        /// Job date (YYYY-MM-DD); the most recent date when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

impl CliArgs {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}
