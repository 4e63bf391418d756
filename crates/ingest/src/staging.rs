//! Staging writer. Each fetch attempt leaves one immutable record.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use tms_core::{EntityType, IngestError, NewStagingRecord, StagingRecord, StagingStatus};

use crate::store::StagingStore;

/// Persists raw (and, on success, normalized) payloads under a fresh batch id.
#[derive(Clone)]
pub struct StagingWriter {
    store: Arc<dyn StagingStore>,
}

impl StagingWriter {
    pub fn new(store: Arc<dyn StagingStore>) -> Self {
        Self { store }
    }

    /// Stage a successfully normalized payload with status PENDING.
    pub async fn stage_normalized(
        &self,
        partner_id: &str,
        entity_type: EntityType,
        raw_data: &str,
        normalized_data: String,
    ) -> Result<StagingRecord, IngestError> {
        self.write(partner_id, entity_type, raw_data, Some(normalized_data), StagingStatus::Pending)
            .await
    }

    /// Stage a raw payload that could not be normalized, with status FAILED.
    pub async fn stage_failed(
        &self,
        partner_id: &str,
        entity_type: EntityType,
        raw_data: &str,
    ) -> Result<StagingRecord, IngestError> {
        self.write(partner_id, entity_type, raw_data, None, StagingStatus::Failed)
            .await
    }

    async fn write(
        &self,
        partner_id: &str,
        entity_type: EntityType,
        raw_data: &str,
        normalized_data: Option<String>,
        status: StagingStatus,
    ) -> Result<StagingRecord, IngestError> {
        let record = NewStagingRecord {
            partner_id: partner_id.to_string(),
            entity_type,
            external_id: None,
            raw_data: raw_data.to_string(),
            normalized_data,
            status,
            batch_id: Uuid::new_v4(),
            received_at: Utc::now(),
        };
        let saved = self.store.insert(record).await?;
        info!(
            partner_id = %partner_id,
            entity_type = %entity_type,
            batch_id = %saved.batch_id,
            status = saved.status.as_str(),
            "saved staging record"
        );
        Ok(saved)
    }
}
