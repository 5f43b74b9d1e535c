//! Fork-join execution of the extraction strategies
//!
//! One blocking task per strategy, joined before merging. Each task is
//! wrapped in a timeout; a strategy that times out, errors, or panics
//! contributes an empty candidate set and its failure is recorded with
//! its identity - never propagated to fail the whole run.

use linnaeus_domain::traits::{EmbeddingProvider, ExtractionStrategy};
use linnaeus_domain::{ConceptCandidate, StrategyKind, TextUnit};
use linnaeus_strategies::{EmbeddingStrategy, RuleBasedStrategy, StatisticalStrategy};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, warn};

/// Joined candidate sets, keyed by the strategy that produced them
pub type CandidatesByStrategy = BTreeMap<StrategyKind, Vec<ConceptCandidate>>;

/// Outcome of a fork-join round
#[derive(Debug)]
pub struct StrategyRunReport {
    /// Candidates per strategy; a failed strategy maps to an empty set
    pub candidates: CandidatesByStrategy,

    /// Failures recorded with strategy identity
    pub failures: Vec<(StrategyKind, String)>,
}

impl StrategyRunReport {
    /// Strategies that contributed at least one candidate
    pub fn contributing_strategies(&self) -> usize {
        self.candidates.values().filter(|c| !c.is_empty()).count()
    }
}

/// Run all three strategies concurrently and join their results
///
/// Strategies execute on blocking tasks since they are CPU-bound (the
/// embedding strategy blocks on its provider internally). The join is
/// the pipeline's single synchronization point; no locks are involved
/// because each task owns its inputs and returns fresh candidates.
pub async fn run_strategies<P>(
    rule_based: RuleBasedStrategy,
    statistical: StatisticalStrategy,
    embedding: EmbeddingStrategy<P>,
    units: Arc<Vec<TextUnit>>,
    per_strategy_timeout: Duration,
) -> StrategyRunReport
where
    P: EmbeddingProvider + Send + Sync + 'static,
{
    let rule_handle = spawn_strategy(rule_based, Arc::clone(&units));
    let statistical_handle = spawn_strategy(statistical, Arc::clone(&units));
    let embedding_handle = spawn_strategy(embedding, Arc::clone(&units));

    let (rule, statistical, embedding) = tokio::join!(
        join_strategy(StrategyKind::RuleBased, rule_handle, per_strategy_timeout),
        join_strategy(
            StrategyKind::Statistical,
            statistical_handle,
            per_strategy_timeout
        ),
        join_strategy(
            StrategyKind::Embedding,
            embedding_handle,
            per_strategy_timeout
        ),
    );

    let mut candidates = CandidatesByStrategy::new();
    let mut failures = Vec::new();

    for (kind, outcome) in [rule, statistical, embedding] {
        match outcome {
            Ok(found) => {
                info!("Strategy {} produced {} candidates", kind, found.len());
                candidates.insert(kind, found);
            }
            Err(reason) => {
                warn!("Strategy {} failed: {}", kind, reason);
                failures.push((kind, reason));
                candidates.insert(kind, Vec::new());
            }
        }
    }

    StrategyRunReport {
        candidates,
        failures,
    }
}

fn spawn_strategy<S>(
    strategy: S,
    units: Arc<Vec<TextUnit>>,
) -> JoinHandle<Result<Vec<ConceptCandidate>, String>>
where
    S: ExtractionStrategy + Send + 'static,
    S::Error: std::fmt::Display,
{
    tokio::task::spawn_blocking(move || {
        strategy.extract(&units).map_err(|e| e.to_string())
    })
}

async fn join_strategy(
    kind: StrategyKind,
    handle: JoinHandle<Result<Vec<ConceptCandidate>, String>>,
    deadline: Duration,
) -> (StrategyKind, Result<Vec<ConceptCandidate>, String>) {
    let outcome = match timeout(deadline, handle).await {
        Err(_) => Err(format!("timed out after {:?}", deadline)),
        Ok(Err(join_error)) => Err(format!("task failed: {}", join_error)),
        Ok(Ok(Err(strategy_error))) => Err(strategy_error),
        Ok(Ok(Ok(found))) => Ok(found),
    };
    (kind, outcome)
}
