//! Core pipeline implementation

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use linnaeus_coordinator::{attach_embeddings, run_strategies, StrategyCoordinator};
use linnaeus_domain::traits::EmbeddingProvider;
use linnaeus_domain::{ConceptHierarchy, StrategyKind, TextUnit};
use linnaeus_hierarchy::{HierarchyBuilder, HierarchyInput};
use linnaeus_preprocess::{Document, PreprocessError, TextPreprocessor};
use linnaeus_quality::{QualityAssessor, QualityMetrics};
use linnaeus_strategies::{EmbeddingStrategy, RuleBasedStrategy, StatisticalStrategy};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{info, warn};

/// What happened during a pipeline run
#[derive(Debug)]
pub enum RunOutcome {
    /// Preprocessing yielded zero text units (no documents, or all of
    /// them skipped); hierarchy construction was never attempted
    NoInput {
        /// Documents skipped as too short
        documents_skipped: usize,
    },

    /// The run completed with a valid hierarchy
    Completed(Box<RunReport>),
}

/// A completed run: the hierarchy plus its measurements
#[derive(Debug)]
pub struct RunReport {
    /// The built hierarchy, quality metrics attached to its metadata
    pub hierarchy: ConceptHierarchy,

    /// Quality metrics, also flattened into the hierarchy metadata
    pub metrics: QualityMetrics,

    /// Operational details of the run
    pub metadata: RunMetadata,
}

/// Operational details of one run
#[derive(Debug, Clone)]
pub struct RunMetadata {
    /// Documents that entered preprocessing
    pub documents_in: usize,

    /// Documents skipped as too short
    pub documents_skipped: usize,

    /// Text units extracted across all documents
    pub text_units: usize,

    /// Strategies that failed, with reasons
    pub strategy_failures: Vec<(StrategyKind, String)>,

    /// Embedding model identity used for this run
    pub embedding_model: String,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: u64,
}

/// The full extraction pipeline
///
/// Generic over the embedding provider so tests and offline runs can use
/// the deterministic mock while production points at a real service.
pub struct ConceptPipeline<P> {
    provider: Arc<P>,
    config: PipelineConfig,
}

impl<P> ConceptPipeline<P>
where
    P: EmbeddingProvider + Send + Sync + 'static,
{
    /// Create a pipeline, validating the whole configuration eagerly
    pub fn new(provider: Arc<P>, config: PipelineConfig) -> Result<Self, PipelineError> {
        config
            .validate()
            .map_err(PipelineError::InvalidConfiguration)?;
        Ok(Self { provider, config })
    }

    /// Run the pipeline over a document collection
    ///
    /// Too-short documents are skipped with a warning and the run
    /// continues; strategy failures degrade coverage rather than
    /// aborting. The only fatal condition after input validation is an
    /// empty concept set, surfaced as
    /// [`HierarchyError::EmptyHierarchy`](linnaeus_hierarchy::HierarchyError::EmptyHierarchy).
    pub async fn run(&self, documents: &[Document]) -> Result<RunOutcome, PipelineError> {
        let started = SystemTime::now();
        info!("Starting pipeline run over {} documents", documents.len());

        // Preprocess, skipping documents that reject
        let preprocessor = TextPreprocessor::new(self.config.preprocess.clone())
            .map_err(|e| PipelineError::InvalidConfiguration(e.to_string()))?;

        let mut units: Vec<TextUnit> = Vec::new();
        let mut skipped = 0usize;
        for document in documents {
            match preprocessor.preprocess(document) {
                Ok(mut document_units) => units.append(&mut document_units),
                Err(PreprocessError::ContentTooShort { actual, required }) => {
                    warn!(
                        "Skipping document '{}': {} usable chars (min {})",
                        document.id, actual, required
                    );
                    skipped += 1;
                }
                Err(e) => {
                    warn!("Skipping document '{}': {}", document.id, e);
                    skipped += 1;
                }
            }
        }

        if units.is_empty() {
            info!("No usable input; returning early without building a hierarchy");
            return Ok(RunOutcome::NoInput {
                documents_skipped: skipped,
            });
        }

        // Fork-join the three strategies
        let rule_based = RuleBasedStrategy::new(self.config.rule_based.clone())
            .map_err(|e| PipelineError::InvalidConfiguration(e.to_string()))?;
        let statistical = StatisticalStrategy::new(self.config.statistical.clone())
            .map_err(|e| PipelineError::InvalidConfiguration(e.to_string()))?;
        let embedding =
            EmbeddingStrategy::new(Arc::clone(&self.provider), self.config.embedding.clone())
                .map_err(|e| PipelineError::InvalidConfiguration(e.to_string()))?;

        let shared_units = Arc::new(units);
        let report = run_strategies(
            rule_based,
            statistical,
            embedding,
            Arc::clone(&shared_units),
            self.config.coordinator.strategy_timeout(),
        )
        .await;

        let strategies_configured = StrategyKind::all().len();
        let strategies_contributed = report.contributing_strategies();

        // Merge into concepts; embeddings attached first so similar
        // surface forms can merge across strategies
        let mut candidates = report.candidates;
        attach_embeddings(&mut candidates, self.provider.as_ref());

        let coordinator = StrategyCoordinator::new(self.config.coordinator.clone())
            .map_err(|e| PipelineError::InvalidConfiguration(e.to_string()))?;
        let merged = coordinator.merge(candidates);

        // Build and assess
        let builder = HierarchyBuilder::new(self.config.hierarchy.clone())?;
        let hierarchy = builder.build(HierarchyInput {
            concepts: merged.concepts,
            embeddings: merged.embeddings,
            parent_hints: merged.parent_hints,
        })?;

        let document_ids: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();
        let metrics = QualityAssessor::new().assess(
            &hierarchy,
            &document_ids,
            strategies_configured,
            strategies_contributed,
        );
        let hierarchy = hierarchy.with_quality(metrics.to_map());

        let processing_time_ms = started
            .elapsed()
            .unwrap_or_default()
            .as_millis() as u64;

        info!(
            "Pipeline run complete: {} concepts, {} roots, {} strategy failures, {} ms",
            hierarchy.len(),
            hierarchy.roots().len(),
            report.failures.len(),
            processing_time_ms
        );

        Ok(RunOutcome::Completed(Box::new(RunReport {
            hierarchy,
            metrics,
            metadata: RunMetadata {
                documents_in: documents.len(),
                documents_skipped: skipped,
                text_units: shared_units.len(),
                strategy_failures: report.failures,
                embedding_model: self.provider.model_identity(),
                processing_time_ms,
            },
        })))
    }
}
