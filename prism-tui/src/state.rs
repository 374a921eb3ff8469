//! Application state and view state definitions.

use crate::api_client::FetchError;
use crate::config::TuiConfig;
use crate::fetch::{FetchKind, FetchOutcome};
use crate::nav::View;
use crate::notifications::{Notification, NotificationLevel};
use crate::persistence::PersistedState;
use crate::source::RecordSource;
use crate::theme::SynthBruteTheme;
use chrono::{DateTime, Utc};
use prism_core::identity::short_id;
use prism_core::{
    aggregate_by_type, build_graph, confidence_histogram, distinct_types, entity_types,
    filter_correlations, filter_entities, AgentId, AgentSummary, ConfidenceHistogram,
    CorrelationFilter, CorrelationGraph, CorrelationRecord, CorrelationStats, EntityTypeAggregate,
    GraphLayout, SemanticEntityRecord, TypeFilter, ViewSnapshot,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Step applied to the minimum-strength threshold by `+` / `-`.
pub const MIN_STRENGTH_STEP: f64 = 0.1;

#[derive(Clone)]
pub struct App {
    pub config: TuiConfig,
    pub theme: SynthBruteTheme,
    pub source: Arc<dyn RecordSource>,
    pub active_view: View,

    pub correlation_view: CorrelationViewState,
    pub entity_view: EntityViewState,
    pub agent_view: AgentViewState,

    pub notifications: Vec<Notification>,
    pub modal: Option<Modal>,
    /// Render ticks since start; drives edge animation.
    pub tick: u64,
    /// Incremented on every mount.
    epoch: u64,
    /// Epoch of the current mount, per view index.
    mount_epochs: [u64; 3],
}

impl App {
    pub fn new(config: TuiConfig, source: Arc<dyn RecordSource>) -> Self {
        let layout = GraphLayout::new(config.graph.radius).unwrap_or_default();
        let filter = CorrelationFilter::new(TypeFilter::All, config.graph.default_min_strength)
            .unwrap_or_default();
        Self {
            config,
            theme: SynthBruteTheme::synthbrute(),
            source,
            active_view: View::Correlations,
            correlation_view: CorrelationViewState::new(layout, filter),
            entity_view: EntityViewState::new(),
            agent_view: AgentViewState::new(),
            notifications: Vec::new(),
            modal: None,
            tick: 0,
            epoch: 0,
            mount_epochs: [0; 3],
        }
    }

    pub fn restore(&mut self, state: PersistedState) {
        self.active_view = state.active_view;
        let mut filter = state.correlation_filter;
        filter.adjust_min_strength(0.0);
        self.correlation_view.filter = filter;
        self.entity_view.filter = state.entity_filter;
    }

    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            active_view: self.active_view,
            correlation_filter: self.correlation_view.filter.clone(),
            entity_filter: self.entity_view.filter.clone(),
        }
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    pub fn prune_notifications(&mut self, now: DateTime<Utc>) {
        self.notifications.retain(|n| !n.is_expired(now));
    }

    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    /// Mount `view` with fresh local state; returns the fetches to start.
    /// Fetches still in flight from an earlier mount of `view` are ignored
    /// when they complete.
    pub fn mount(&mut self, view: View) -> Vec<FetchKind> {
        self.epoch += 1;
        self.mount_epochs[view.index()] = self.epoch;
        match view {
            View::Correlations => self.correlation_view.reset(),
            View::Entities => self.entity_view.reset(),
            View::Agents => self.agent_view.reset(),
        }
        fetches_for(view)
    }

    /// Re-enter `Loading` for the active view, keeping its records visible.
    pub fn refresh(&mut self) -> Vec<FetchKind> {
        match self.active_view {
            View::Correlations => {
                self.correlation_view.correlations.begin_refresh();
                self.correlation_view.agents.begin_refresh();
            }
            View::Entities => self.entity_view.entities.begin_refresh(),
            View::Agents => self.agent_view.agents.begin_refresh(),
        }
        fetches_for(self.active_view)
    }

    /// Switch to `view`, mounting it if it is not already active.
    pub fn switch_view(&mut self, view: View) -> Vec<FetchKind> {
        if view == self.active_view {
            return Vec::new();
        }
        self.active_view = view;
        self.mount(view)
    }

    pub fn is_loading(&self) -> bool {
        match self.active_view {
            View::Correlations => self.correlation_view.is_loading(),
            View::Entities => self.entity_view.entities.is_loading(),
            View::Agents => self.agent_view.agents.is_loading(),
        }
    }

    /// Epoch to tag fetches for `view` with.
    pub fn epoch_for(&self, view: View) -> u64 {
        self.mount_epochs[view.index()]
    }

    /// Apply `outcome` if it belongs to the current mount of its view.
    /// Returns whether it was applied.
    pub fn accept_fetch(&mut self, epoch: u64, outcome: FetchOutcome) -> bool {
        let kind = outcome.kind();
        if epoch != self.epoch_for(kind.view()) {
            tracing::debug!(?kind, epoch, "dropping fetch from an earlier mount");
            return false;
        }
        self.apply_fetch(outcome);
        true
    }

    pub fn apply_fetch(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Correlations(result) => {
                let result = self.correlation_view.correlations.complete(result);
                self.correlation_view.recompute();
                self.report("correlations", result);
            }
            FetchOutcome::CorrelationAgents(result) => {
                let result = self.correlation_view.agents.complete(result);
                self.correlation_view.recompute();
                self.report("agents", result);
            }
            FetchOutcome::AgentDirectory(result) => {
                let result = self.agent_view.agents.complete(result);
                self.agent_view.retain_selection();
                self.report("agents", result);
            }
            FetchOutcome::Entities(result) => {
                let result = self.entity_view.entities.complete(result);
                self.entity_view.recompute();
                self.report("semantic entities", result);
            }
        }
    }

    fn report(&mut self, collection: &str, result: Result<usize, FetchError>) {
        if let Err(err) = result {
            tracing::error!(collection, error = %err, "fetch failed");
            self.notify(
                NotificationLevel::Error,
                format!("Failed to load {}: {}", collection, err),
            );
        }
    }

    pub fn select_next(&mut self) {
        self.move_selection(next_id);
    }

    pub fn select_previous(&mut self) {
        self.move_selection(prev_id);
    }

    fn move_selection(&mut self, step: fn(&[Uuid], Option<Uuid>) -> Option<Uuid>) {
        match self.active_view {
            View::Correlations => {
                let ids = ids_of(&self.correlation_view.filtered());
                self.correlation_view.selected = step(&ids, self.correlation_view.selected);
            }
            View::Entities => {
                let ids = ids_of(&self.entity_view.visible());
                self.entity_view.selected = step(&ids, self.entity_view.selected);
            }
            View::Agents => {
                let ids = ids_of(self.agent_view.agents.records());
                self.agent_view.selected = step(&ids, self.agent_view.selected);
            }
        }
    }

    pub fn cycle_type_filter(&mut self) {
        match self.active_view {
            View::Correlations => self.correlation_view.cycle_type_filter(),
            View::Entities => self.entity_view.cycle_type_filter(),
            View::Agents => {}
        }
    }

    pub fn adjust_min_strength(&mut self, delta: f64) {
        if self.active_view == View::Correlations {
            self.correlation_view.adjust_min_strength(delta);
        }
    }
}

fn fetches_for(view: View) -> Vec<FetchKind> {
    match view {
        View::Correlations => vec![FetchKind::Correlations, FetchKind::CorrelationAgents],
        View::Entities => vec![FetchKind::Entities],
        View::Agents => vec![FetchKind::AgentDirectory],
    }
}

fn next_id(ids: &[Uuid], selected: Option<Uuid>) -> Option<Uuid> {
    if ids.is_empty() {
        return None;
    }
    let next = selected
        .and_then(|id| ids.iter().position(|candidate| *candidate == id))
        .map(|index| (index + 1) % ids.len())
        .unwrap_or(0);
    Some(ids[next])
}

fn prev_id(ids: &[Uuid], selected: Option<Uuid>) -> Option<Uuid> {
    if ids.is_empty() {
        return None;
    }
    let index = selected
        .and_then(|id| ids.iter().position(|candidate| *candidate == id))
        .unwrap_or(0);
    let prev = if index == 0 { ids.len() - 1 } else { index - 1 };
    Some(ids[prev])
}

fn ids_of<T: HasEntityId>(items: &[T]) -> Vec<Uuid> {
    items.iter().map(|item| item.entity_id()).collect()
}

trait HasEntityId {
    fn entity_id(&self) -> Uuid;
}

impl<T: HasEntityId> HasEntityId for &T {
    fn entity_id(&self) -> Uuid {
        (**self).entity_id()
    }
}

impl HasEntityId for CorrelationRecord {
    fn entity_id(&self) -> Uuid {
        self.id
    }
}

impl HasEntityId for SemanticEntityRecord {
    fn entity_id(&self) -> Uuid {
        self.id
    }
}

impl HasEntityId for AgentSummary {
    fn entity_id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone)]
pub struct Modal {
    pub title: String,
    pub message: String,
}

// ============================================================================
// VIEW STATE DEFINITIONS
// ============================================================================

#[derive(Debug, Clone)]
pub struct CorrelationViewState {
    pub correlations: ViewSnapshot<CorrelationRecord>,
    /// Agent names for endpoint labels.
    pub agents: ViewSnapshot<AgentSummary>,
    pub filter: CorrelationFilter,
    pub layout: GraphLayout,
    /// Derived from the snapshots and filter by `recompute`.
    pub graph: CorrelationGraph,
    pub types: Vec<String>,
    pub selected: Option<Uuid>,
}

impl CorrelationViewState {
    pub fn new(layout: GraphLayout, filter: CorrelationFilter) -> Self {
        Self {
            correlations: ViewSnapshot::new(),
            agents: ViewSnapshot::new(),
            filter,
            layout,
            graph: CorrelationGraph::default(),
            types: Vec::new(),
            selected: None,
        }
    }

    pub fn reset(&mut self) {
        self.correlations = ViewSnapshot::new();
        self.agents = ViewSnapshot::new();
        self.graph = CorrelationGraph::default();
        self.types.clear();
        self.selected = None;
    }

    pub fn is_loading(&self) -> bool {
        self.correlations.is_loading() || self.agents.is_loading()
    }

    pub fn filtered(&self) -> Vec<&CorrelationRecord> {
        filter_correlations(self.correlations.records(), &self.filter)
    }

    /// Summary over the unfiltered set, independent of the graph filter.
    pub fn stats(&self) -> CorrelationStats {
        CorrelationStats::from_records(self.correlations.records())
    }

    /// Rebuild the graph from the current snapshots and filter.
    pub fn recompute(&mut self) {
        self.types = distinct_types(self.correlations.records());
        let graph = {
            let filtered = self.filtered();
            build_graph(&filtered, self.agents.records(), self.layout)
        };
        self.graph = graph;
        let still_visible = self
            .graph
            .edges
            .iter()
            .any(|edge| Some(edge.correlation_id) == self.selected);
        if !still_visible {
            self.selected = None;
        }
    }

    pub fn agent_name(&self, id: &AgentId) -> String {
        self.agents
            .records()
            .iter()
            .find(|agent| &agent.id == id)
            .map(|agent| agent.name.clone())
            .unwrap_or_else(|| short_id(id))
    }

    pub fn selected_record(&self) -> Option<&CorrelationRecord> {
        let selected = self.selected?;
        self.correlations
            .records()
            .iter()
            .find(|record| record.id == selected)
    }

    pub fn cycle_type_filter(&mut self) {
        self.filter.correlation_type = self.filter.correlation_type.cycle(&self.types);
        self.recompute();
    }

    pub fn adjust_min_strength(&mut self, delta: f64) {
        self.filter.adjust_min_strength(delta);
        self.recompute();
    }
}

#[derive(Debug, Clone)]
pub struct EntityViewState {
    pub entities: ViewSnapshot<SemanticEntityRecord>,
    /// Restricts the entity list; aggregates always cover every record.
    pub filter: TypeFilter,
    pub aggregates: BTreeMap<String, EntityTypeAggregate>,
    pub histogram: ConfidenceHistogram,
    pub types: Vec<String>,
    pub selected: Option<Uuid>,
}

impl EntityViewState {
    pub fn new() -> Self {
        Self {
            entities: ViewSnapshot::new(),
            filter: TypeFilter::All,
            aggregates: BTreeMap::new(),
            histogram: ConfidenceHistogram::default(),
            types: Vec::new(),
            selected: None,
        }
    }

    pub fn reset(&mut self) {
        self.entities = ViewSnapshot::new();
        self.aggregates.clear();
        self.histogram = ConfidenceHistogram::default();
        self.types.clear();
        self.selected = None;
    }

    pub fn recompute(&mut self) {
        let records = self.entities.records();
        self.aggregates = aggregate_by_type(records);
        self.histogram = confidence_histogram(records);
        self.types = entity_types(records);
        self.retain_selection();
    }

    pub fn visible(&self) -> Vec<&SemanticEntityRecord> {
        filter_entities(self.entities.records(), &self.filter)
    }

    pub fn selected_record(&self) -> Option<&SemanticEntityRecord> {
        let selected = self.selected?;
        self.entities
            .records()
            .iter()
            .find(|record| record.id == selected)
    }

    pub fn cycle_type_filter(&mut self) {
        self.filter = self.filter.cycle(&self.types);
        self.retain_selection();
    }

    fn retain_selection(&mut self) {
        if let Some(selected) = self.selected {
            if !self.visible().iter().any(|e| e.id == selected) {
                self.selected = None;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentViewState {
    pub agents: ViewSnapshot<AgentSummary>,
    pub selected: Option<Uuid>,
}

impl AgentViewState {
    pub fn new() -> Self {
        Self {
            agents: ViewSnapshot::new(),
            selected: None,
        }
    }

    pub fn reset(&mut self) {
        self.agents = ViewSnapshot::new();
        self.selected = None;
    }

    pub fn total_records(&self) -> u64 {
        self.agents.records().iter().map(|a| a.data_count).sum()
    }

    pub fn selected_agent(&self) -> Option<&AgentSummary> {
        let selected = self.selected?;
        self.agents.records().iter().find(|a| a.id == selected)
    }

    fn retain_selection(&mut self) {
        if self.selected_agent().is_none() {
            self.selected = None;
        }
    }
}

impl Default for EntityViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for AgentViewState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::config::{AuthConfig, FetchConfig, GraphConfig, ThemeConfig};
    use crate::fanout::CountFailurePolicy;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use prism_core::AgentRecord;

    pub struct EmptySource;

    #[async_trait]
    impl RecordSource for EmptySource {
        async fn list_correlations(&self) -> Result<Vec<CorrelationRecord>, FetchError> {
            Ok(Vec::new())
        }

        async fn list_agents(&self) -> Result<Vec<AgentRecord>, FetchError> {
            Ok(Vec::new())
        }

        async fn count_agent_data(&self, _agent_id: AgentId) -> Result<u64, FetchError> {
            Ok(0)
        }

        async fn list_semantic_entities(
            &self,
            _limit: usize,
        ) -> Result<Vec<SemanticEntityRecord>, FetchError> {
            Ok(Vec::new())
        }
    }

    pub fn test_config() -> TuiConfig {
        TuiConfig {
            api_base_url: "http://localhost:54321".to_string(),
            auth: AuthConfig {
                api_key: Some("test-key".to_string()),
                jwt: None,
            },
            request_timeout_ms: 5_000,
            refresh_interval_ms: 250,
            persistence_path: "tmp/prism-state.json".into(),
            error_log_path: "tmp/prism.log".into(),
            theme: ThemeConfig {
                name: "synthbrute".to_string(),
            },
            fetch: FetchConfig {
                entity_limit: 500,
                agent_count_concurrency: 4,
                count_failure_policy: CountFailurePolicy::Abort,
            },
            graph: GraphConfig {
                radius: 300.0,
                default_min_strength: 0.0,
            },
        }
    }

    pub fn test_app() -> App {
        App::new(test_config(), Arc::new(EmptySource))
    }

    pub fn correlation(id: u128, source: u128, target: u128, kind: &str, strength: f64) -> CorrelationRecord {
        CorrelationRecord {
            id: Uuid::from_u128(id),
            source_agent_id: Uuid::from_u128(source),
            target_agent_id: Uuid::from_u128(target),
            correlation_type: kind.to_string(),
            strength,
            metadata: serde_json::json!({ "window": "1h" }),
            discovered_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    pub fn entity(id: u128, kind: &str, confidence: Option<f64>) -> SemanticEntityRecord {
        SemanticEntityRecord {
            id: Uuid::from_u128(id),
            entity_type: kind.to_string(),
            entity_value: format!("value-{}", id),
            confidence,
            source_field: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            data_id: Uuid::from_u128(500 + id),
        }
    }

    pub fn agent(id: u128, name: &str, data_count: u64) -> AgentSummary {
        AgentSummary {
            id: Uuid::from_u128(id),
            name: name.to_string(),
            data_count,
        }
    }

    pub fn unavailable() -> FetchError {
        FetchError::Status {
            status: 503,
            body: "unavailable".to_string(),
        }
    }
}


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::fixtures::*;
    use super::*;
    use proptest::prelude::*;

    fn arb_view() -> impl Strategy<Value = View> {
        prop_oneof![
            Just(View::Correlations),
            Just(View::Entities),
            Just(View::Agents),
        ]
    }

    fn arb_agents() -> impl Strategy<Value = Vec<AgentSummary>> {
        prop::collection::vec(0u64..1000, 0..20).prop_map(|counts| {
            counts
                .into_iter()
                .enumerate()
                .map(|(i, count)| agent(i as u128 + 1, "agent", count))
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Navigation never selects an id outside the list.
        #[test]
        fn prop_selection_stays_in_list(agents in arb_agents(), moves in prop::collection::vec(any::<bool>(), 0..30)) {
            let ids = ids_of(&agents);
            let mut selected = None;
            for forward in moves {
                selected = if forward {
                    next_id(&ids, selected)
                } else {
                    prev_id(&ids, selected)
                };
                match selected {
                    Some(id) => prop_assert!(ids.contains(&id)),
                    None => prop_assert!(ids.is_empty()),
                }
            }
        }

        /// Each completion moves Loading to Ready exactly once.
        #[test]
        fn prop_refresh_cycles_loading_ready(view in arb_view(), refreshes in 1usize..5) {
            let mut app = test_app();
            app.active_view = view;
            for _ in 0..refreshes {
                let kinds = app.refresh();
                prop_assert!(app.is_loading());
                for kind in kinds {
                    let outcome = match kind {
                        FetchKind::Correlations => FetchOutcome::Correlations(Ok(vec![])),
                        FetchKind::CorrelationAgents => FetchOutcome::CorrelationAgents(Ok(vec![])),
                        FetchKind::AgentDirectory => FetchOutcome::AgentDirectory(Ok(vec![])),
                        FetchKind::Entities => FetchOutcome::Entities(Ok(vec![])),
                    };
                    app.apply_fetch(outcome);
                }
                prop_assert!(!app.is_loading());
            }
        }

        /// Threshold stays on the 0.1 grid within 0..=1.
        #[test]
        fn prop_min_strength_stays_clamped(steps in prop::collection::vec(any::<bool>(), 0..40)) {
            let mut app = test_app();
            for up in steps {
                let delta = if up { MIN_STRENGTH_STEP } else { -MIN_STRENGTH_STEP };
                app.adjust_min_strength(delta);
                let value = app.correlation_view.filter.min_strength;
                prop_assert!((0.0..=1.0).contains(&value));
                prop_assert!(((value * 10.0).round() - value * 10.0).abs() < 1e-9);
            }
        }

        #[test]
        fn prop_view_next_prev_inverse(view in arb_view()) {
            prop_assert_eq!(view.next().previous(), view);
            prop_assert_eq!(View::from_index(view.index()), Some(view));
        }
    }
}
