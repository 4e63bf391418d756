//! Partner data fetcher: "get raw data for partner X, entity type Y".
//!
//! Endpoint resolution is a pure configuration lookup on [`PartnerConfig`];
//! the network exchange goes through an injected [`Transport`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info, warn};

use tms_core::{EntityType, IngestError, PartnerConfig};

use crate::registry::ConfigRegistry;

/// Single-attempt GET of a partner URL, returning the body text.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, IngestError>;
}

/// reqwest-backed transport with a per-request timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|e| {
                    warn!(error = %e, "could not build partner transport with timeout, using defaults");
                    Client::new()
                }),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<String, IngestError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IngestError::Transport(format!("GET {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Transport(format!("HTTP {} from {}", status, url)));
        }

        response
            .text()
            .await
            .map_err(|e| IngestError::Transport(format!("reading body from {}: {}", url, e)))
    }
}

/// Build the absolute URL for an endpoint path under a partner's base URL.
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Resolves partner endpoints and fetches raw payloads through a [`Transport`].
#[derive(Clone)]
pub struct PartnerFetcher {
    transport: Arc<dyn Transport>,
}

impl PartnerFetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// URL for `entity_type` on `partner`, or the configuration error that prevents it.
    pub fn resolve(partner: &PartnerConfig, entity_type: EntityType) -> Result<String, IngestError> {
        if !partner.active {
            return Err(IngestError::PartnerInactive(partner.partner_id.clone()));
        }
        let path = partner
            .endpoint(entity_type)
            .ok_or_else(|| IngestError::EndpointNotConfigured {
                partner_id: partner.partner_id.clone(),
                endpoint: entity_type.endpoint_key().to_string(),
            })?;
        Ok(endpoint_url(&partner.base_url, path))
    }

    /// Fetch the raw payload for one entity type of a known partner.
    pub async fn fetch(&self, partner: &PartnerConfig, entity_type: EntityType) -> Result<String, IngestError> {
        let url = Self::resolve(partner, entity_type)?;
        info!(partner_id = %partner.partner_id, entity_type = %entity_type, url = %url, "fetching partner data");

        match self.transport.fetch(&url).await {
            Ok(body) => {
                info!(partner_id = %partner.partner_id, entity_type = %entity_type, bytes = body.len(), "fetched partner data");
                Ok(body)
            }
            Err(e) => {
                error!(partner_id = %partner.partner_id, entity_type = %entity_type, error = %e, "partner fetch failed");
                Err(e)
            }
        }
    }

    /// Resolve the partner through the registry, then fetch.
    pub async fn fetch_by_id(
        &self,
        registry: &dyn ConfigRegistry,
        partner_id: &str,
        entity_type: EntityType,
    ) -> Result<String, IngestError> {
        let partner = registry.find_partner(partner_id).await?;
        self.fetch(&partner, entity_type).await
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::registry::StaticConfigRegistry;

    /// Records requested URLs and answers every call with a fixed body.
    struct EchoTransport {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for EchoTransport {
        async fn fetch(&self, url: &str) -> Result<String, IngestError> {
            self.calls.lock().unwrap().push(url.to_string());
            Ok(r#"{"ok":true}"#.to_string())
        }
    }

    fn partner(active: bool) -> PartnerConfig {
        let mut endpoints = HashMap::new();
        endpoints.insert("theatres".to_string(), "/v1/theatres".to_string());
        endpoints.insert("halls".to_string(), "v1/halls".to_string());
        PartnerConfig {
            partner_id: "INOX".to_string(),
            base_url: "http://partner.test/".to_string(),
            active,
            endpoints,
        }
    }

    fn fetcher() -> (PartnerFetcher, Arc<EchoTransport>) {
        let transport = Arc::new(EchoTransport { calls: Mutex::new(Vec::new()) });
        (PartnerFetcher::new(transport.clone()), transport)
    }

    #[test]
    fn test_endpoint_url_joins_slashes() {
        assert_eq!(endpoint_url("http://a/", "/x"), "http://a/x");
        assert_eq!(endpoint_url("http://a", "x"), "http://a/x");
        assert_eq!(endpoint_url("http://a", "/api/v2/theatres"), "http://a/api/v2/theatres");
    }

    #[tokio::test]
    async fn test_fetch_uses_resolved_url() {
        let (fetcher, transport) = fetcher();
        let body = fetcher.fetch(&partner(true), EntityType::Hall).await.unwrap();
        assert_eq!(body, r#"{"ok":true}"#);
        assert_eq!(*transport.calls.lock().unwrap(), vec!["http://partner.test/v1/halls".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_configuration_error() {
        let (fetcher, transport) = fetcher();
        let err = fetcher.fetch(&partner(true), EntityType::Show).await.unwrap_err();
        assert!(matches!(err, IngestError::EndpointNotConfigured { ref endpoint, .. } if endpoint == "shows"));
        assert!(transport.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_inactive_partner_is_rejected() {
        let (fetcher, _) = fetcher();
        let err = fetcher.fetch(&partner(false), EntityType::Theatre).await.unwrap_err();
        assert!(matches!(err, IngestError::PartnerInactive(_)));
    }

    #[tokio::test]
    async fn test_fetch_by_id_unknown_partner() {
        let (fetcher, _) = fetcher();
        let registry = StaticConfigRegistry::new(vec![partner(true)], vec![]);
        let err = fetcher
            .fetch_by_id(&registry, "PVR", EntityType::Theatre)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::PartnerNotFound(ref id) if id == "PVR"));

        let ok = fetcher.fetch_by_id(&registry, "INOX", EntityType::Theatre).await;
        assert!(ok.is_ok());
    }
}
