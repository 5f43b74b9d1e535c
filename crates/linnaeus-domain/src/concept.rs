//! Concept module - the durable, merged unit of the concept graph

use crate::candidate::StrategyKind;
use crate::text_unit::TextUnit;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// Unique identifier for a concept based on UUIDv7 (per ADR-003)
///
/// UUIDv7 provides:
/// - Chronological sortability, which doubles as a deterministic
///   last-resort tie-break during merging
/// - 128-bit uniqueness with no coordination between pipeline runs
/// - RFC 9562-standard format with broad ecosystem support
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConceptId(u128);

impl ConceptId {
    /// Generate a new UUIDv7-based ConceptId
    ///
    /// # Examples
    ///
    /// ```
    /// use linnaeus_domain::ConceptId;
    ///
    /// let id = ConceptId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a ConceptId from a raw u128 value
    ///
    /// This is primarily for consumers deserializing a stored hierarchy.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a ConceptId from a UUIDv7 string
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid UUIDv7 string: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for ConceptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

// Serialized as the hyphenated UUID string so the hierarchy stays readable
// in JSON and portable to formats without native u128 support.
impl Serialize for ConceptId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ConceptId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_string(&s).map_err(D::Error::custom)
    }
}

/// A traceability record tying a concept to a supporting sentence
///
/// A single sentence may support multiple concepts and a concept may be
/// supported by many sentences; the links form a many-to-many relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceLink {
    /// The supporting sentence, carried by value for serializability
    pub unit: TextUnit,

    /// Confidence that this sentence supports the concept, in [0, 1]
    pub confidence: f64,
}

impl EvidenceLink {
    /// Create a new evidence link
    pub fn new(unit: TextUnit, confidence: f64) -> Self {
        Self { unit, confidence }
    }
}

/// A merged, confidence-scored concept
///
/// Concepts are created by the merge step, refined (level and parent
/// fields) by hierarchy construction, and read-only thereafter. They are
/// owned exclusively by the [`ConceptHierarchy`](crate::ConceptHierarchy)
/// that contains them.
///
/// Invariants:
/// - `level == 0` iff `parent_id.is_none()`
/// - `level` is strictly greater than the parent's `level`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    /// Unique identifier
    pub id: ConceptId,

    /// Display name chosen among the aliases
    pub canonical_label: String,

    /// Other surface forms observed for this concept
    pub aliases: BTreeSet<String>,

    /// Combined confidence in [0, 1] (per ADR-002)
    pub confidence: f64,

    /// Strategies that contributed a candidate to this concept
    pub supporting_strategies: BTreeSet<StrategyKind>,

    /// Supporting sentences, ordered by (document, sentence position)
    pub evidence: Vec<EvidenceLink>,

    /// Depth in the hierarchy; 0 for roots
    pub level: usize,

    /// Parent concept, if any
    pub parent_id: Option<ConceptId>,

    /// Child concepts
    pub children_ids: BTreeSet<ConceptId>,
}

impl Concept {
    /// Create a new root-level concept with no hierarchy placement yet
    pub fn new(
        id: ConceptId,
        canonical_label: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id,
            canonical_label: canonical_label.into(),
            aliases: BTreeSet::new(),
            confidence,
            supporting_strategies: BTreeSet::new(),
            evidence: Vec::new(),
            level: 0,
            parent_id: None,
            children_ids: BTreeSet::new(),
        }
    }

    /// Whether this concept sits at the top of its tree
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check the local level/parent consistency invariant
    pub fn level_invariant_holds(&self) -> bool {
        (self.level == 0) == self.parent_id.is_none()
    }

    /// Number of distinct supporting sentences
    pub fn evidence_count(&self) -> usize {
        self.evidence.len()
    }
}
