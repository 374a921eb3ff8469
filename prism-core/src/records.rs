//! Records as fetched from the backend collections.
//!
//! All records are immutable once fetched. A refresh replaces the whole
//! list; nothing here is ever patched in place.

use crate::identity::{AgentId, CorrelationId, DataRecordId, SemanticEntityId, Timestamp};
use serde::{Deserialize, Serialize};

/// A pre-computed relationship between two agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRecord {
    pub id: CorrelationId,
    pub source_agent_id: AgentId,
    pub target_agent_id: AgentId,
    /// Free-form category, e.g. "temporal" or "spatial".
    pub correlation_type: String,
    /// Expected in 0.0..=1.0 but not enforced by the backend.
    pub strength: f64,
    /// Opaque payload produced by the analysis process.
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub discovered_at: Timestamp,
}

/// Row of the agents collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub name: String,
}

/// Agent joined with the number of data records attributed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: AgentId,
    pub name: String,
    pub data_count: u64,
}

impl AgentSummary {
    pub fn new(agent: AgentRecord, data_count: u64) -> Self {
        Self {
            id: agent.id,
            name: agent.name,
            data_count,
        }
    }
}

/// A pre-extracted entity attributed to one agent data record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticEntityRecord {
    pub id: SemanticEntityId,
    pub entity_type: String,
    pub entity_value: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub source_field: Option<String>,
    pub created_at: Timestamp,
    pub data_id: DataRecordId,
}
