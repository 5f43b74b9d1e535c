//! Linnaeus Concept Pipeline
//!
//! End-to-end orchestration: documents are preprocessed into text units,
//! the three extraction strategies run as a fork-join, their candidates
//! merge into confidence-scored concepts, the hierarchy is built and
//! assessed. One pipeline run over an immutable document set produces
//! one hierarchy; re-runs produce new hierarchies.
//!
//! The pipeline is idempotent and side-effect-free apart from the
//! embedding-service calls, and every partial failure short of an empty
//! concept set degrades the run instead of aborting it: too-short
//! documents are skipped, a failing strategy contributes nothing, and a
//! dead embedding provider leaves a key-match-only merge.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::{ConceptPipeline, RunMetadata, RunOutcome, RunReport};
