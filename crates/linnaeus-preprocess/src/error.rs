//! Error types for preprocessing

use thiserror::Error;

/// Errors that can occur during preprocessing
#[derive(Error, Debug)]
pub enum PreprocessError {
    /// Document lacks sufficient usable text; callers skip the document
    /// and continue the run
    #[error("Content too short: {actual} usable chars (min: {required})")]
    ContentTooShort {
        /// Usable character count found
        actual: usize,
        /// Configured minimum
        required: usize,
    },

    /// Structural metadata is inconsistent with the text
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
