//! Linnaeus Quality Assessment
//!
//! Read-only coverage and consistency metrics over a built hierarchy.
//! Quality scores are for monitoring and alerting - a low score is
//! reported, never treated as a pipeline failure, and assessment never
//! blocks pipeline completion. The strategy-coverage metric is what lets
//! operators spot a run that silently degraded to two of three
//! strategies.

#![warn(missing_docs)]

use linnaeus_domain::ConceptHierarchy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use tracing::debug;

/// Quality measurements over one extraction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Fraction of input documents with at least one evidence link in
    /// the final hierarchy, in [0, 1]
    pub coverage: f64,

    /// Mean combined confidence across all concepts
    pub avg_confidence: f64,

    /// Deepest level present in the forest
    pub max_depth: usize,

    /// Concepts per input document
    pub concept_density: f64,

    /// Fraction of configured strategies that contributed candidates,
    /// in [0, 1]; below 1.0 signals a degraded run
    pub strategy_coverage: f64,
}

impl QualityMetrics {
    /// Generate a summary report of the metrics
    pub fn summary(&self) -> String {
        let lines = vec![
            "Quality Metrics Summary".to_string(),
            "=======================".to_string(),
            format!("Document coverage:  {:.1}%", self.coverage * 100.0),
            format!("Avg confidence:     {:.3}", self.avg_confidence),
            format!("Max depth:          {}", self.max_depth),
            format!("Concept density:    {:.2} concepts/document", self.concept_density),
            format!("Strategy coverage:  {:.1}%", self.strategy_coverage * 100.0),
        ];
        lines.join("\n")
    }

    /// Flatten into the hierarchy metadata's quality map
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        map.insert("coverage".to_string(), self.coverage);
        map.insert("avg_confidence".to_string(), self.avg_confidence);
        map.insert("max_depth".to_string(), self.max_depth as f64);
        map.insert("concept_density".to_string(), self.concept_density);
        map.insert("strategy_coverage".to_string(), self.strategy_coverage);
        map
    }
}

/// Computes quality metrics over a built hierarchy
pub struct QualityAssessor;

impl QualityAssessor {
    /// Create an assessor
    pub fn new() -> Self {
        Self
    }

    /// Assess a hierarchy against the documents that produced it
    ///
    /// `strategies_configured` / `strategies_contributed` come from the
    /// fork-join report; together they expose degraded runs.
    pub fn assess(
        &self,
        hierarchy: &ConceptHierarchy,
        document_ids: &[String],
        strategies_configured: usize,
        strategies_contributed: usize,
    ) -> QualityMetrics {
        let concepts = hierarchy.concepts();

        let covered: BTreeSet<&str> = concepts
            .values()
            .flat_map(|c| c.evidence.iter())
            .map(|e| e.unit.document_id.as_str())
            .collect();
        let coverage = if document_ids.is_empty() {
            0.0
        } else {
            let hits = document_ids
                .iter()
                .filter(|id| covered.contains(id.as_str()))
                .count();
            hits as f64 / document_ids.len() as f64
        };

        let avg_confidence = if concepts.is_empty() {
            0.0
        } else {
            concepts.values().map(|c| c.confidence).sum::<f64>() / concepts.len() as f64
        };

        let concept_density = if document_ids.is_empty() {
            0.0
        } else {
            concepts.len() as f64 / document_ids.len() as f64
        };

        let strategy_coverage = if strategies_configured == 0 {
            0.0
        } else {
            strategies_contributed as f64 / strategies_configured as f64
        };

        let metrics = QualityMetrics {
            coverage,
            avg_confidence,
            max_depth: hierarchy.max_depth(),
            concept_density,
            strategy_coverage,
        };
        debug!("Assessed hierarchy:\n{}", metrics.summary());
        metrics
    }
}

impl Default for QualityAssessor {
    fn default() -> Self {
        Self::new()
    }
}
