//! Error types for the coordinator

use thiserror::Error;

/// Errors that can occur in the coordinator
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// Configuration rejected at construction time
    #[error("Configuration error: {0}")]
    InvalidConfiguration(String),
}
