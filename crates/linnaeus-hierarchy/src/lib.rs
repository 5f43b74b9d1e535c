//! Linnaeus Hierarchy Construction
//!
//! Organizes merged concepts into a multi-level forest. Specificity
//! scores orient the edges: within each similarity-connected component
//! the most general concept becomes a root, and every other concept
//! attaches beneath the nearest more-general concept it is most similar
//! to. Structural invariants (level ordering, acyclicity, no orphans)
//! are re-validated on the assembled forest even though the construction
//! order makes violations impossible by design.

#![warn(missing_docs)]

pub mod builder;
pub mod config;
pub mod error;
pub mod specificity;

pub use builder::{HierarchyBuilder, HierarchyInput};
pub use config::{HierarchyConfig, SpecificityWeights};
pub use error::HierarchyError;
