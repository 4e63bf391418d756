use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Category of data polled from a partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Theatre,
    Hall,
    Show,
}

impl EntityType {
    /// Every entity type polled per partner, in polling order.
    pub const ALL: [EntityType; 3] = [EntityType::Theatre, EntityType::Hall, EntityType::Show];

    /// Upper-case wire name (`THEATRE`, `HALL`, `SHOW`).
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Theatre => "THEATRE",
            EntityType::Hall => "HALL",
            EntityType::Show => "SHOW",
        }
    }

    /// Key into `PartnerConfig::endpoints` for this entity type.
    pub fn endpoint_key(&self) -> &'static str {
        match self {
            EntityType::Theatre => "theatres",
            EntityType::Hall => "halls",
            EntityType::Show => "shows",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known entity type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown entity type: {0}")]
pub struct UnknownEntityType(pub String);

impl std::str::FromStr for EntityType {
    type Err = UnknownEntityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "THEATRE" => Ok(EntityType::Theatre),
            "HALL" => Ok(EntityType::Hall),
            "SHOW" => Ok(EntityType::Show),
            _ => Err(UnknownEntityType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_parse_case_insensitive() {
        assert_eq!("THEATRE".parse::<EntityType>().unwrap(), EntityType::Theatre);
        assert_eq!("hall".parse::<EntityType>().unwrap(), EntityType::Hall);
        assert_eq!("Show".parse::<EntityType>().unwrap(), EntityType::Show);
    }

    #[test]
    fn test_entity_type_unknown_is_error() {
        let err = "PRICE".parse::<EntityType>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown entity type: PRICE");
    }

    #[test]
    fn test_entity_type_serde_upper_case() {
        let json = serde_json::to_string(&EntityType::Theatre).unwrap();
        assert_eq!(json, r#""THEATRE""#);
        let parsed: EntityType = serde_json::from_str(r#""SHOW""#).unwrap();
        assert_eq!(parsed, EntityType::Show);
    }

    #[test]
    fn test_endpoint_keys() {
        let keys: Vec<&str> = EntityType::ALL.iter().map(|e| e.endpoint_key()).collect();
        assert_eq!(keys, vec!["theatres", "halls", "shows"]);
    }
}
