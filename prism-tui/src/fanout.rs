//! Bounded-concurrency fan-out of per-agent data counts.
//!
//! One count request per agent, at most `concurrency` in flight, joined
//! once all complete. Results keep agent order.

use crate::api_client::FetchError;
use crate::source::RecordSource;
use futures_util::{stream, StreamExt, TryStreamExt};
use prism_core::{AgentRecord, AgentSummary};
use serde::Deserialize;

/// What to do when a single count request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountFailurePolicy {
    /// Fail the whole aggregate.
    Abort,
    /// Log the failure and record a count of zero for that agent.
    Zero,
}

pub async fn summarize_agents<S>(
    source: &S,
    agents: Vec<AgentRecord>,
    concurrency: usize,
    policy: CountFailurePolicy,
) -> Result<Vec<AgentSummary>, FetchError>
where
    S: RecordSource + ?Sized,
{
    let limit = concurrency.max(1);
    // Futures are created up front but stay idle until `buffered` polls them.
    let pending: Vec<_> = agents
        .iter()
        .map(|agent| source.count_agent_data(agent.id))
        .collect();
    let requests = stream::iter(pending).buffered(limit);

    let counts: Vec<u64> = match policy {
        CountFailurePolicy::Abort => requests.try_collect().await?,
        CountFailurePolicy::Zero => {
            let results: Vec<Result<u64, FetchError>> = requests.collect().await;
            results
                .into_iter()
                .zip(agents.iter())
                .map(|(result, agent)| {
                    result.unwrap_or_else(|err| {
                        tracing::warn!(
                            agent_id = %agent.id,
                            error = %err,
                            "agent data count failed, recording zero"
                        );
                        0
                    })
                })
                .collect()
        }
    };

    Ok(agents
        .into_iter()
        .zip(counts)
        .map(|(agent, count)| AgentSummary::new(agent, count))
        .collect())
}
