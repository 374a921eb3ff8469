//! Identity types for PRISM records

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Backend row identifier.
pub type EntityId = Uuid;

/// Agent (data source) identifier. Correlation endpoints reference these.
pub type AgentId = Uuid;

pub type CorrelationId = Uuid;

pub type SemanticEntityId = Uuid;

/// Identifier of the agent data record a semantic entity was extracted from.
pub type DataRecordId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Short display form of an id: the first 8 hex characters.
pub fn short_id(id: &EntityId) -> String {
    id.simple().to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_is_eight_chars() {
        let id = Uuid::from_u128(0x1234_5678_9abc_def0_1234_5678_9abc_def0);
        assert_eq!(short_id(&id), "12345678");
    }
}
