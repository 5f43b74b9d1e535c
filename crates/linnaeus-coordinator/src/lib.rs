//! Linnaeus Strategy Coordinator
//!
//! The single synchronization point of the extraction pipeline. Runs the
//! three strategies as a fork-join (per ADR-005) - one blocking task per
//! strategy, each wrapped in a timeout, with any failure isolated to the
//! failing strategy - then merges the joined candidate sets into
//! deduplicated, confidence-combined concepts.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod merge;
pub mod runner;

pub use config::CoordinatorConfig;
pub use error::CoordinatorError;
pub use merge::{attach_embeddings, MergeOutput, StrategyCoordinator};
pub use runner::{run_strategies, CandidatesByStrategy, StrategyRunReport};
