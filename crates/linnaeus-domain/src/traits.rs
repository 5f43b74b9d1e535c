//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and
//! infrastructure. Infrastructure implementations live in other crates.

use crate::candidate::{ConceptCandidate, StrategyKind};
use crate::text_unit::TextUnit;

/// Trait for extraction strategies (per ADR-001, ADR-005)
///
/// Implementations must be total over well-formed input - a valid unit
/// sequence never raises - and deterministic given identical input and
/// configuration. Each returned candidate's evidence must be a non-empty
/// subset of the input units.
///
/// Strategies are synchronous; the fork-join boundary supplies the
/// concurrency (per ADR-005).
pub trait ExtractionStrategy {
    /// Error type for strategy execution
    type Error;

    /// Which member of the closed strategy set this is
    fn kind(&self) -> StrategyKind;

    /// Extract concept candidates from preprocessed text units
    fn extract(&self, units: &[TextUnit]) -> Result<Vec<ConceptCandidate>, Self::Error>;
}

/// Trait for embedding model operations
///
/// Implemented by the infrastructure layer (linnaeus-embedding). Callers
/// must treat every method as fallible and degrade gracefully
/// (per ADR-006); providers may be unavailable, rate-limited, or reject
/// input.
pub trait EmbeddingProvider {
    /// Error type for embedding operations
    type Error;

    /// Generate an embedding vector for the given text
    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error>;

    /// Generate embeddings for a batch of texts, in input order
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, Self::Error>;

    /// Dimension of the vectors this provider produces
    fn dimension(&self) -> usize;

    /// Model identity (name and dimension) for validation and run metadata
    fn model_identity(&self) -> String;
}
