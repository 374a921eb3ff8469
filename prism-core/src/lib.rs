//! PRISM Core - Records and Aggregation
//!
//! Record types fetched from the backend plus the pure functions that turn
//! them into chart-ready and graph-ready shapes. No I/O lives here.

pub mod correlation;
pub mod entity;
pub mod error;
pub mod graph;
pub mod identity;
pub mod lifecycle;
pub mod records;

pub use correlation::{
    distinct_types, filter_correlations, CorrelationFilter, CorrelationStats, StrengthTier,
    TypeFilter,
};
pub use entity::{
    aggregate_by_type, confidence_histogram, entity_types, filter_entities, ConfidenceBucket,
    ConfidenceHistogram, EntityTypeAggregate,
};
pub use error::{PrismError, PrismResult};
pub use graph::{build_graph, CorrelationGraph, GraphEdge, GraphLayout, GraphNode};
pub use identity::{AgentId, CorrelationId, DataRecordId, EntityId, SemanticEntityId, Timestamp};
pub use lifecycle::{LoadState, ViewSnapshot};
pub use records::{AgentRecord, AgentSummary, CorrelationRecord, SemanticEntityRecord};
