//! Error types for hierarchy construction

use linnaeus_domain::HierarchyViolation;
use thiserror::Error;

/// Errors that can occur building a hierarchy
#[derive(Error, Debug)]
pub enum HierarchyError {
    /// The concept set was empty; an empty hierarchy is never a valid
    /// output, so the caller must decide between loosening thresholds
    /// and reporting that no concepts were found
    #[error("Cannot build a hierarchy from zero concepts")]
    EmptyHierarchy,

    /// The assembled forest failed structural validation; construction
    /// from a strict specificity order makes this unreachable in
    /// practice, but it is fatal if it ever fires
    #[error("Structural invariant violated: {0}")]
    Invalid(HierarchyViolation),

    /// Configuration rejected at construction time
    #[error("Configuration error: {0}")]
    InvalidConfiguration(String),
}
