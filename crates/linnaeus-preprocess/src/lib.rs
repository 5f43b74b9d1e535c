//! Linnaeus Text Preprocessing Layer
//!
//! Turns raw document text plus structural metadata into the ordered,
//! sentence-bounded [`TextUnit`](linnaeus_domain::TextUnit) sequence the
//! extraction strategies consume. A pure transform: no I/O, no side
//! effects, original ordering and page/section attribution preserved
//! losslessly.

#![warn(missing_docs)]

pub mod config;
pub mod document;
pub mod error;
pub mod preprocessor;
mod segment;

pub use config::PreprocessConfig;
pub use document::{Document, SectionBreak};
pub use error::PreprocessError;
pub use preprocessor::TextPreprocessor;
