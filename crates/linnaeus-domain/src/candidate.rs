//! Strategy-local concept candidates (per ADR-001)

use crate::text_unit::TextUnit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metadata key under which rule-based extraction records the matched
/// pattern name. Every rule-based candidate carries this key.
pub const META_PATTERN: &str = "pattern";

/// Metadata key for a suggested parent comparison key emitted by
/// hierarchical-relation patterns ("X is a kind of Y"). A hint, not a
/// binding edge - hierarchy construction weighs it against the other
/// specificity signals.
pub const META_PARENT_HINT: &str = "parent_hint";

/// The closed set of extraction strategies
///
/// The merge step dispatches over this enum; confidence combination and
/// evidence merging are otherwise strategy-agnostic, so adding a strategy
/// means adding a variant here and nothing else downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Pattern/grammar-driven extraction, fully explainable
    RuleBased,
    /// Corpus-relative term-importance ranking
    Statistical,
    /// Semantic clustering over embedding vectors
    Embedding,
}

impl StrategyKind {
    /// Stable lowercase name, used in logs and run metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::RuleBased => "rule_based",
            StrategyKind::Statistical => "statistical",
            StrategyKind::Embedding => "embedding",
        }
    }

    /// All strategy kinds, in canonical order
    pub fn all() -> [StrategyKind; 3] {
        [
            StrategyKind::RuleBased,
            StrategyKind::Statistical,
            StrategyKind::Embedding,
        ]
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An unverified, strategy-local proposal for a concept
///
/// Produced by exactly one strategy, consumed only by the merge step,
/// never persisted standalone.
#[derive(Debug, Clone, PartialEq)]
pub struct ConceptCandidate {
    /// The form as it appeared in the source text
    pub surface_form: String,

    /// Normalized comparison key (see [`crate::comparison_key`])
    pub normalized_form: String,

    /// The strategy that produced this candidate
    pub strategy: StrategyKind,

    /// Strategy-local confidence in [0, 1]
    pub local_confidence: f64,

    /// Supporting sentences; must be a non-empty subset of the input units
    pub evidence: Vec<TextUnit>,

    /// Optional embedding of the surface form, when the strategy computed
    /// one; enables similarity-based merging beyond exact key matches
    pub embedding: Option<Vec<f32>>,

    /// Strategy-specific annotations (matched pattern, rank, cluster size).
    /// BTreeMap so iteration order is deterministic.
    pub metadata: BTreeMap<String, String>,
}

impl ConceptCandidate {
    /// Create a new candidate with its comparison key derived from the
    /// surface form
    pub fn new(
        surface_form: impl Into<String>,
        strategy: StrategyKind,
        local_confidence: f64,
        evidence: Vec<TextUnit>,
    ) -> Self {
        let surface_form = surface_form.into();
        let normalized_form = crate::normalize::comparison_key(&surface_form);
        Self {
            surface_form,
            normalized_form,
            strategy,
            local_confidence,
            evidence,
            embedding: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach an embedding vector
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Validate that the candidate is well-formed
    pub fn validate(&self) -> Result<(), String> {
        if self.surface_form.trim().is_empty() {
            return Err("surface_form is empty".to_string());
        }
        if self.normalized_form.is_empty() {
            return Err("normalized_form is empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.local_confidence) {
            return Err(format!(
                "local_confidence {} out of range [0.0, 1.0]",
                self.local_confidence
            ));
        }
        if self.evidence.is_empty() {
            return Err("evidence is empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> TextUnit {
        TextUnit::new("doc1", 0, 1, "Neural networks are universal approximators.")
    }

    #[test]
    fn test_candidate_derives_comparison_key() {
        let candidate =
            ConceptCandidate::new("Neural Networks", StrategyKind::RuleBased, 0.7, vec![unit()]);
        assert_eq!(candidate.normalized_form, "neural network");
        assert!(candidate.validate().is_ok());
    }

    #[test]
    fn test_empty_surface_form_rejected() {
        let candidate = ConceptCandidate::new("   ", StrategyKind::Statistical, 0.5, vec![unit()]);
        assert!(candidate.validate().is_err());
    }

    #[test]
    fn test_empty_evidence_rejected() {
        let candidate = ConceptCandidate::new("neural network", StrategyKind::RuleBased, 0.7, vec![]);
        assert!(candidate.validate().is_err());
    }

    #[test]
    fn test_confidence_out_of_bounds_rejected() {
        let candidate =
            ConceptCandidate::new("neural network", StrategyKind::RuleBased, 1.2, vec![unit()]);
        assert!(candidate.validate().is_err());
    }

    #[test]
    fn test_metadata_builder() {
        let candidate =
            ConceptCandidate::new("neural network", StrategyKind::RuleBased, 0.9, vec![unit()])
                .with_metadata(META_PATTERN, "is_a_kind_of")
                .with_metadata(META_PARENT_HINT, "machine learning model");

        assert_eq!(
            candidate.metadata.get(META_PATTERN).map(String::as_str),
            Some("is_a_kind_of")
        );
    }

    #[test]
    fn test_strategy_kind_display() {
        assert_eq!(StrategyKind::RuleBased.to_string(), "rule_based");
        assert_eq!(StrategyKind::all().len(), 3);
    }
}
