//! Partner configuration and field-mapping registry.
//!
//! [`ConfigRegistry`] is the lookup service the pipeline consumes. Two backends:
//! - [`HttpConfigRegistry`]: the remote config service (JSON, camelCase)
//! - [`StaticConfigRegistry`]: an in-process list, usually loaded from YAML

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use tms_core::{EntityType, FieldMapping, IngestError, PartnerConfig};

/// Lookup service for active partners and their mapping rules.
#[async_trait]
pub trait ConfigRegistry: Send + Sync {
    /// All partners currently marked active.
    async fn list_active_partners(&self) -> Result<Vec<PartnerConfig>, IngestError>;

    /// Ordered mapping rules for a (partner, entity type) pair.
    ///
    /// An empty list is a valid answer meaning "no mapping configured".
    async fn get_field_mappings(
        &self,
        partner_id: &str,
        entity_type: EntityType,
    ) -> Result<Vec<FieldMapping>, IngestError>;

    /// Resolve one active partner by id.
    async fn find_partner(&self, partner_id: &str) -> Result<PartnerConfig, IngestError> {
        self.list_active_partners()
            .await?
            .into_iter()
            .find(|p| p.partner_id == partner_id)
            .ok_or_else(|| IngestError::PartnerNotFound(partner_id.to_string()))
    }
}

// ── HTTP config service ──────────────────────────────────────────────

/// Client for the remote config service.
pub struct HttpConfigRegistry {
    client: Client,
    base_url: String,
}

impl HttpConfigRegistry {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|e| {
                    warn!(error = %e, "could not build config service client with timeout, using defaults");
                    Client::new()
                }),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, IngestError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| IngestError::Registry(format!("GET {}: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::Registry(format!("GET {}: {status}: {body}", url)));
        }

        response
            .json()
            .await
            .map_err(|e| IngestError::Registry(format!("GET {}: invalid body: {}", url, e)))
    }
}

#[async_trait]
impl ConfigRegistry for HttpConfigRegistry {
    async fn list_active_partners(&self) -> Result<Vec<PartnerConfig>, IngestError> {
        self.get_json("/partners/active").await
    }

    async fn get_field_mappings(
        &self,
        partner_id: &str,
        entity_type: EntityType,
    ) -> Result<Vec<FieldMapping>, IngestError> {
        self.get_json(&format!(
            "/integration/partners/{}/mappings/{}",
            partner_id, entity_type
        ))
        .await
    }
}

// ── Static registry ──────────────────────────────────────────────────

/// File layout accepted by [`StaticConfigRegistry::from_yaml_str`].
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    partners: Vec<PartnerConfig>,
    #[serde(default)]
    mappings: Vec<FieldMapping>,
}

/// Fixed partner and mapping lists held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigRegistry {
    partners: Vec<PartnerConfig>,
    mappings: Vec<FieldMapping>,
}

impl StaticConfigRegistry {
    pub fn new(partners: Vec<PartnerConfig>, mappings: Vec<FieldMapping>) -> Self {
        Self { partners, mappings }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, IngestError> {
        let file: RegistryFile = serde_yaml::from_str(yaml)
            .map_err(|e| IngestError::Registry(format!("invalid registry YAML: {}", e)))?;
        Ok(Self::new(file.partners, file.mappings))
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, IngestError> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| IngestError::Registry(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&yaml)
    }
}

#[async_trait]
impl ConfigRegistry for StaticConfigRegistry {
    async fn list_active_partners(&self) -> Result<Vec<PartnerConfig>, IngestError> {
        Ok(self.partners.iter().filter(|p| p.active).cloned().collect())
    }

    async fn get_field_mappings(
        &self,
        partner_id: &str,
        entity_type: EntityType,
    ) -> Result<Vec<FieldMapping>, IngestError> {
        Ok(self
            .mappings
            .iter()
            .filter(|m| m.partner_id == partner_id && m.entity_type == entity_type)
            .cloned()
            .collect())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
