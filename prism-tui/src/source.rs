//! Read-only access to the backend collections.

use crate::api_client::FetchError;
use async_trait::async_trait;
use prism_core::{AgentId, AgentRecord, CorrelationRecord, SemanticEntityRecord};

/// The four reads the dashboard performs.
///
/// Implemented by [`crate::api_client::RestClient`]; tests provide in-memory
/// sources.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// All correlations, strongest first.
    async fn list_correlations(&self) -> Result<Vec<CorrelationRecord>, FetchError>;

    async fn list_agents(&self) -> Result<Vec<AgentRecord>, FetchError>;

    /// Number of data records attributed to one agent.
    async fn count_agent_data(&self, agent_id: AgentId) -> Result<u64, FetchError>;

    /// Most recent entities, newest first, at most `limit`.
    async fn list_semantic_entities(
        &self,
        limit: usize,
    ) -> Result<Vec<SemanticEntityRecord>, FetchError>;
}
