//! Linnaeus Extraction Strategies
//!
//! The three implementations of
//! [`ExtractionStrategy`](linnaeus_domain::traits::ExtractionStrategy)
//! (per ADR-001):
//!
//! - [`RuleBasedStrategy`]: pattern/grammar-driven, fully explainable -
//!   every candidate carries the matched pattern name
//! - [`StatisticalStrategy`]: corpus-relative TF-IDF plus co-occurrence
//!   graph ranking for multi-word phrases
//! - [`EmbeddingStrategy`]: semantic clustering over embedding vectors,
//!   degrading to an empty candidate set when the provider is down
//!   (per ADR-006)
//!
//! Each strategy is deterministic given identical input and configuration,
//! and synchronous by design - concurrency lives at the fork-join
//! boundary (per ADR-005).

#![warn(missing_docs)]

pub mod embedding;
pub mod rule_based;
pub mod statistical;
pub mod term;

pub use embedding::{EmbeddingStrategy, EmbeddingStrategyConfig};
pub use rule_based::{RuleBasedConfig, RuleBasedStrategy};
pub use statistical::{StatisticalConfig, StatisticalStrategy};

use thiserror::Error;

/// Errors that can occur constructing or executing a strategy
#[derive(Error, Debug)]
pub enum StrategyError {
    /// Configuration rejected at construction time
    #[error("Configuration error: {0}")]
    InvalidConfiguration(String),

    /// A relation pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Strategy execution failed in a way the strategy could not absorb
    #[error("Execution error: {0}")]
    Execution(String),
}
