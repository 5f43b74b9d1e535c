//! Error types for the pipeline

use linnaeus_hierarchy::HierarchyError;
use thiserror::Error;

/// Errors that can occur during a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Hierarchy construction failed; an empty concept set after merging
    /// surfaces here as [`HierarchyError::EmptyHierarchy`], which callers
    /// may answer by retrying with the lenient preset
    #[error("Hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),

    /// Configuration rejected at construction time
    #[error("Configuration error: {0}")]
    InvalidConfiguration(String),
}
