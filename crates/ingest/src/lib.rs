//! Partner ingestion pipeline: fetch, normalize, stage, and track daily
//! partner data, and roll the tracked outcomes up into status reports.

pub mod aggregate;
pub mod fetch;
pub mod normalize;
pub mod orchestrator;
pub mod registry;
pub mod staging;
pub mod status;
pub mod store;
pub mod tracker;

pub use aggregate::aggregate;
pub use fetch::{HttpTransport, PartnerFetcher, Transport};
pub use normalize::normalize;
pub use orchestrator::{AttemptPhase, AttemptReport, PollingOrchestrator, RunSummary};
pub use registry::{ConfigRegistry, HttpConfigRegistry, StaticConfigRegistry};
pub use staging::StagingWriter;
pub use status::StatusService;
pub use store::{JobExecutionStore, MemoryStore, StagingStore};
pub use tracker::JobExecutionTracker;
