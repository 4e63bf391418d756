use thiserror::Error;

use crate::entity::EntityType;

/// Normalization-time failures. A FAILED staging record is still written
/// for these, with the raw payload preserved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Required field '{field}' missing in {entity_type} data from partner {partner_id}")]
    RequiredFieldMissing {
        field: String,
        entity_type: EntityType,
        partner_id: String,
    },
}

/// Every way a single (partner, entity type) attempt can fail.
///
/// All variants are caught at the entity-type boundary and turned into a
/// FAILED job execution; none abort sibling attempts.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Partner not found: {0}")]
    PartnerNotFound(String),

    #[error("Partner is not active: {0}")]
    PartnerInactive(String),

    #[error("Endpoint not configured for {endpoint} in partner {partner_id}")]
    EndpointNotConfigured { partner_id: String, endpoint: String },

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Data normalization failed: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Config registry error: {0}")]
    Registry(String),
}

impl IngestError {
    /// Stable label for logs and attempt reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PartnerNotFound(_) => "partner_not_found",
            Self::PartnerInactive(_) => "partner_inactive",
            Self::EndpointNotConfigured { .. } => "endpoint_not_configured",
            Self::Transport(_) => "transport_failure",
            Self::Normalize(NormalizeError::MalformedPayload(_)) => "malformed_payload",
            Self::Normalize(NormalizeError::RequiredFieldMissing { .. }) => "required_field_missing",
            Self::Persistence(_) => "persistence_failure",
            Self::Registry(_) => "registry_failure",
        }
    }

    /// Configuration-collaborator mismatch rather than a data or I/O problem.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::PartnerNotFound(_) | Self::PartnerInactive(_) | Self::EndpointNotConfigured { .. }
        )
    }
}
