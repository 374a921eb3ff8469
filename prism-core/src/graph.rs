//! Circular graph layout for the correlation view.
//!
//! Nodes are the distinct endpoints of the filtered correlations, placed
//! evenly on a circle in first-seen order. Edges carry the display
//! attributes the renderer needs (label, width, tier, animation flag).
//! Every call builds a fresh graph; there is no incremental diffing.

use crate::correlation::{StrengthTier, STRONG_THRESHOLD};
use crate::error::{PrismError, PrismResult};
use crate::identity::{short_id, AgentId, CorrelationId};
use crate::records::{AgentSummary, CorrelationRecord};
use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

/// Edge width per unit of strength.
pub const EDGE_WIDTH_SCALE: f64 = 5.0;

/// Minimum visible edge width.
pub const MIN_EDGE_WIDTH: f64 = 1.0;

/// Width of a full-strength edge. Strength is not range-checked by the
/// backend, so wider values are clamped here.
pub const MAX_EDGE_WIDTH: f64 = EDGE_WIDTH_SCALE;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphLayout {
    pub radius: f64,
}

impl GraphLayout {
    pub const DEFAULT_RADIUS: f64 = 300.0;

    pub fn new(radius: f64) -> PrismResult<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(PrismError::InvalidValue {
                field: "radius",
                value: radius,
                reason: "must be a positive finite number",
            });
        }
        Ok(Self { radius })
    }
}

impl Default for GraphLayout {
    fn default() -> Self {
        Self {
            radius: Self::DEFAULT_RADIUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: AgentId,
    pub label: String,
    /// Angle in radians, in `[0, 2π)`.
    pub angle: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub correlation_id: CorrelationId,
    pub source: AgentId,
    pub target: AgentId,
    pub label: String,
    pub width: f64,
    pub tier: StrengthTier,
    pub animated: bool,
}

impl GraphEdge {
    fn from_record(record: &CorrelationRecord) -> Self {
        Self {
            correlation_id: record.id,
            source: record.source_agent_id,
            target: record.target_agent_id,
            label: format!("{} ({:.2})", record.correlation_type, record.strength),
            width: edge_width(record.strength),
            tier: StrengthTier::classify(record.strength),
            animated: record.strength > STRONG_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CorrelationGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl CorrelationGraph {
    pub fn node(&self, id: &AgentId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Build the graph for an already-filtered correlation subset.
///
/// `agents` resolves display names; endpoints without a matching agent get
/// the short form of their id.
pub fn build_graph(
    filtered: &[&CorrelationRecord],
    agents: &[AgentSummary],
    layout: GraphLayout,
) -> CorrelationGraph {
    let endpoints = endpoint_order(filtered);
    let names: HashMap<AgentId, &str> = agents.iter().map(|a| (a.id, a.name.as_str())).collect();

    let count = endpoints.len();
    let nodes = endpoints
        .into_iter()
        .enumerate()
        .map(|(index, id)| {
            let angle = TAU * index as f64 / count as f64;
            GraphNode {
                id,
                label: names
                    .get(&id)
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| short_id(&id)),
                angle,
                x: layout.radius * angle.cos(),
                y: layout.radius * angle.sin(),
            }
        })
        .collect();

    let edges = filtered.iter().map(|r| GraphEdge::from_record(r)).collect();

    CorrelationGraph { nodes, edges }
}

/// `strength * 5`, kept within `MIN_EDGE_WIDTH..=MAX_EDGE_WIDTH`. NaN maps
/// to the minimum.
pub fn edge_width(strength: f64) -> f64 {
    (strength * EDGE_WIDTH_SCALE)
        .max(MIN_EDGE_WIDTH)
        .min(MAX_EDGE_WIDTH)
}

/// Distinct endpoints in first-seen order (source before target per record).
fn endpoint_order(filtered: &[&CorrelationRecord]) -> Vec<AgentId> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for record in filtered {
        for id in [record.source_agent_id, record.target_agent_id] {
            if seen.insert(id) {
                order.push(id);
            }
        }
    }
    order
}
