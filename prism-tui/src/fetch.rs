//! Per-view fetchers.
//!
//! Each fetch runs on its own task and reports back to the event loop as a
//! [`FetchOutcome`]. Fetches are independent: no ordering is imposed between
//! the correlation and agent reads of the correlation view.

use crate::api_client::FetchError;
use crate::config::FetchConfig;
use crate::events::TuiEvent;
use crate::fanout::summarize_agents;
use crate::nav::View;
use crate::source::RecordSource;
use prism_core::{AgentSummary, CorrelationRecord, SemanticEntityRecord};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Which read to perform, and which view receives the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Correlations,
    /// Agent names and counts for the correlation view.
    CorrelationAgents,
    /// Agent names and counts for the agent directory.
    AgentDirectory,
    Entities,
}

impl FetchKind {
    /// View whose snapshot receives this fetch.
    pub fn view(&self) -> View {
        match self {
            FetchKind::Correlations | FetchKind::CorrelationAgents => View::Correlations,
            FetchKind::AgentDirectory => View::Agents,
            FetchKind::Entities => View::Entities,
        }
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    Correlations(Result<Vec<CorrelationRecord>, FetchError>),
    CorrelationAgents(Result<Vec<AgentSummary>, FetchError>),
    AgentDirectory(Result<Vec<AgentSummary>, FetchError>),
    Entities(Result<Vec<SemanticEntityRecord>, FetchError>),
}

impl FetchOutcome {
    pub fn kind(&self) -> FetchKind {
        match self {
            FetchOutcome::Correlations(_) => FetchKind::Correlations,
            FetchOutcome::CorrelationAgents(_) => FetchKind::CorrelationAgents,
            FetchOutcome::AgentDirectory(_) => FetchKind::AgentDirectory,
            FetchOutcome::Entities(_) => FetchKind::Entities,
        }
    }
}

pub async fn fetch_correlations<S>(source: &S) -> Result<Vec<CorrelationRecord>, FetchError>
where
    S: RecordSource + ?Sized,
{
    tracing::debug!("fetching correlations");
    let records = source.list_correlations().await?;
    tracing::info!(count = records.len(), "correlations loaded");
    Ok(records)
}

/// Agents joined with their data counts.
pub async fn fetch_agent_summaries<S>(
    source: &S,
    config: &FetchConfig,
) -> Result<Vec<AgentSummary>, FetchError>
where
    S: RecordSource + ?Sized,
{
    tracing::debug!("fetching agents");
    let agents = source.list_agents().await?;
    let summaries = summarize_agents(
        source,
        agents,
        config.agent_count_concurrency,
        config.count_failure_policy,
    )
    .await?;
    tracing::info!(count = summaries.len(), "agent summaries loaded");
    Ok(summaries)
}

pub async fn fetch_entities<S>(
    source: &S,
    limit: usize,
) -> Result<Vec<SemanticEntityRecord>, FetchError>
where
    S: RecordSource + ?Sized,
{
    tracing::debug!(limit, "fetching semantic entities");
    let records = source.list_semantic_entities(limit).await?;
    tracing::info!(count = records.len(), "semantic entities loaded");
    Ok(records)
}

pub async fn run_fetch(
    kind: FetchKind,
    source: &dyn RecordSource,
    config: &FetchConfig,
) -> FetchOutcome {
    match kind {
        FetchKind::Correlations => FetchOutcome::Correlations(fetch_correlations(source).await),
        FetchKind::CorrelationAgents => {
            FetchOutcome::CorrelationAgents(fetch_agent_summaries(source, config).await)
        }
        FetchKind::AgentDirectory => {
            FetchOutcome::AgentDirectory(fetch_agent_summaries(source, config).await)
        }
        FetchKind::Entities => {
            FetchOutcome::Entities(fetch_entities(source, config.entity_limit).await)
        }
    }
}

/// Run `kind` on a background task; the outcome arrives as
/// [`TuiEvent::Fetched`] tagged with the mount `epoch` it was started for.
pub fn spawn_fetch(
    kind: FetchKind,
    epoch: u64,
    source: Arc<dyn RecordSource>,
    config: FetchConfig,
    sender: mpsc::Sender<TuiEvent>,
) {
    tokio::spawn(async move {
        let outcome = run_fetch(kind, source.as_ref(), &config).await;
        if sender
            .send(TuiEvent::Fetched { epoch, outcome })
            .await
            .is_err()
        {
            tracing::debug!(?kind, "event loop closed before fetch completed");
        }
    });
}
