//! The concept hierarchy - an id-arena forest (per ADR-004)
//!
//! Concepts reference their parent and children by [`ConceptId`], not by
//! pointer, which sidesteps ownership cycles and makes the forest
//! trivially serializable for downstream visualization and storage
//! consumers.

use crate::concept::{Concept, ConceptId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A suggested parent-child orientation emitted during extraction
///
/// Hints come from hierarchical-relation patterns ("X is a kind of Y").
/// They survive the merge as a side channel rather than as concept fields
/// because they orient edges during hierarchy construction and carry no
/// meaning afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentHint {
    /// The concept suggested to sit beneath the parent
    pub child: ConceptId,
    /// Comparison key of the suggested parent concept
    pub parent_key: String,
}

/// Structural invariant violations detectable on a hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyViolation {
    /// The hierarchy contains no concepts
    Empty,
    /// A parent or child reference does not resolve within the arena
    DanglingReference {
        /// The concept holding the reference
        from: ConceptId,
        /// The unresolved reference
        to: ConceptId,
    },
    /// Following parent links from this concept revisits it
    Cycle {
        /// A concept on the cycle
        at: ConceptId,
    },
    /// A concept's level does not exceed its parent's level
    LevelOrder {
        /// The offending concept
        concept: ConceptId,
    },
    /// `level == 0` and `parent_id` disagree about rootness
    RootLevel {
        /// The offending concept
        concept: ConceptId,
    },
    /// A child's parent_id does not point back at the parent listing it
    AsymmetricEdge {
        /// The parent listing the child
        parent: ConceptId,
        /// The child whose parent_id disagrees
        child: ConceptId,
    },
    /// A root listed in `roots` has a parent, or a parentless concept is
    /// missing from `roots`
    RootListing {
        /// The offending concept
        concept: ConceptId,
    },
}

impl fmt::Display for HierarchyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyViolation::Empty => write!(f, "hierarchy contains no concepts"),
            HierarchyViolation::DanglingReference { from, to } => {
                write!(f, "concept {} references missing concept {}", from, to)
            }
            HierarchyViolation::Cycle { at } => {
                write!(f, "parent chain through {} forms a cycle", at)
            }
            HierarchyViolation::LevelOrder { concept } => {
                write!(f, "concept {} does not sit strictly below its parent", concept)
            }
            HierarchyViolation::RootLevel { concept } => {
                write!(f, "concept {} has inconsistent level/parent rootness", concept)
            }
            HierarchyViolation::AsymmetricEdge { parent, child } => {
                write!(f, "edge {} -> {} is not mirrored by the child", parent, child)
            }
            HierarchyViolation::RootListing { concept } => {
                write!(f, "root listing disagrees with parent field for {}", concept)
            }
        }
    }
}

/// Parameters and provenance of a hierarchy build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyMetadata {
    /// Unix timestamp (seconds) of generation
    pub generated_at: u64,

    /// Echo of the algorithm parameters that produced this hierarchy
    pub parameters: BTreeMap<String, String>,

    /// Quality measurements attached after assessment
    pub quality: BTreeMap<String, f64>,
}

/// An immutable forest of merged concepts
///
/// Built once per extraction run; a re-run produces a new hierarchy.
/// Construction enforces non-emptiness and referential integrity - use
/// [`ConceptHierarchy::new`] rather than assembling the fields by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptHierarchy {
    roots: Vec<ConceptId>,
    concepts: BTreeMap<ConceptId, Concept>,
    /// Build parameters and attached quality measurements
    pub metadata: HierarchyMetadata,
}

impl ConceptHierarchy {
    /// Assemble a hierarchy, verifying every structural invariant
    ///
    /// Returns the first violation found. An empty concept map is itself
    /// a violation - an empty hierarchy is never a valid value.
    pub fn new(
        roots: Vec<ConceptId>,
        concepts: BTreeMap<ConceptId, Concept>,
        metadata: HierarchyMetadata,
    ) -> Result<Self, HierarchyViolation> {
        let hierarchy = Self {
            roots,
            concepts,
            metadata,
        };
        hierarchy.validate()?;
        Ok(hierarchy)
    }

    /// Re-check all structural invariants
    pub fn validate(&self) -> Result<(), HierarchyViolation> {
        if self.concepts.is_empty() {
            return Err(HierarchyViolation::Empty);
        }

        let root_set: BTreeSet<ConceptId> = self.roots.iter().copied().collect();

        for (id, concept) in &self.concepts {
            if !concept.level_invariant_holds() {
                return Err(HierarchyViolation::RootLevel { concept: *id });
            }

            if concept.is_root() != root_set.contains(id) {
                return Err(HierarchyViolation::RootListing { concept: *id });
            }

            if let Some(parent_id) = concept.parent_id {
                let parent = self.concepts.get(&parent_id).ok_or(
                    HierarchyViolation::DanglingReference {
                        from: *id,
                        to: parent_id,
                    },
                )?;
                if concept.level <= parent.level {
                    return Err(HierarchyViolation::LevelOrder { concept: *id });
                }
                if !parent.children_ids.contains(id) {
                    return Err(HierarchyViolation::AsymmetricEdge {
                        parent: parent_id,
                        child: *id,
                    });
                }
            }

            for child_id in &concept.children_ids {
                let child = self.concepts.get(child_id).ok_or(
                    HierarchyViolation::DanglingReference {
                        from: *id,
                        to: *child_id,
                    },
                )?;
                if child.parent_id != Some(*id) {
                    return Err(HierarchyViolation::AsymmetricEdge {
                        parent: *id,
                        child: *child_id,
                    });
                }
            }
        }

        self.check_acyclic()?;
        Ok(())
    }

    // Walk parent chains; any walk longer than the arena means a cycle.
    fn check_acyclic(&self) -> Result<(), HierarchyViolation> {
        for (id, _) in &self.concepts {
            let mut steps = 0usize;
            let mut cursor = *id;
            while let Some(parent_id) = self.concepts.get(&cursor).and_then(|c| c.parent_id) {
                steps += 1;
                if steps > self.concepts.len() {
                    return Err(HierarchyViolation::Cycle { at: *id });
                }
                cursor = parent_id;
            }
        }
        Ok(())
    }

    /// Root concepts in build order
    pub fn roots(&self) -> &[ConceptId] {
        &self.roots
    }

    /// Look up a concept by id
    pub fn get(&self, id: ConceptId) -> Option<&Concept> {
        self.concepts.get(&id)
    }

    /// All concepts, keyed by id
    pub fn concepts(&self) -> &BTreeMap<ConceptId, Concept> {
        &self.concepts
    }

    /// Number of concepts in the forest
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// A validated hierarchy is never empty, so this is always false;
    /// kept for API symmetry with collection types
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Deepest level present in the forest
    pub fn max_depth(&self) -> usize {
        self.concepts.values().map(|c| c.level).max().unwrap_or(0)
    }

    /// Iterate concepts in depth-first order from the roots
    pub fn iter_depth_first(&self) -> impl Iterator<Item = &Concept> {
        let mut ordered = Vec::with_capacity(self.concepts.len());
        let mut stack: Vec<ConceptId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(concept) = self.concepts.get(&id) {
                ordered.push(concept);
                // BTreeSet iterates ascending; reverse so pop order is ascending
                stack.extend(concept.children_ids.iter().rev().copied());
            }
        }
        ordered.into_iter()
    }

    /// Attach quality measurements after assessment
    pub fn with_quality(mut self, quality: BTreeMap<String, f64>) -> Self {
        self.metadata.quality = quality;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::Concept;

    fn concept(id: u128, label: &str) -> Concept {
        Concept::new(ConceptId::from_value(id), label, 0.8)
    }

    fn two_level_fixture() -> (Vec<ConceptId>, BTreeMap<ConceptId, Concept>) {
        let mut parent = concept(1, "deep neural network");
        let mut child = concept(2, "convolutional neural network");

        child.parent_id = Some(parent.id);
        child.level = 1;
        parent.children_ids.insert(child.id);

        let roots = vec![parent.id];
        let mut map = BTreeMap::new();
        map.insert(parent.id, parent);
        map.insert(child.id, child);
        (roots, map)
    }

    #[test]
    fn test_valid_two_level_hierarchy() {
        let (roots, map) = two_level_fixture();
        let hierarchy = ConceptHierarchy::new(roots, map, HierarchyMetadata::default()).unwrap();

        assert_eq!(hierarchy.len(), 2);
        assert_eq!(hierarchy.max_depth(), 1);
        assert_eq!(hierarchy.roots().len(), 1);
    }

    #[test]
    fn test_empty_rejected() {
        let result =
            ConceptHierarchy::new(Vec::new(), BTreeMap::new(), HierarchyMetadata::default());
        assert_eq!(result.unwrap_err(), HierarchyViolation::Empty);
    }

    #[test]
    fn test_dangling_parent_rejected() {
        let (roots, mut map) = two_level_fixture();
        let child_id = ConceptId::from_value(2);
        map.get_mut(&child_id).unwrap().parent_id = Some(ConceptId::from_value(99));

        let result = ConceptHierarchy::new(roots, map, HierarchyMetadata::default());
        assert!(matches!(
            result.unwrap_err(),
            HierarchyViolation::DanglingReference { .. }
        ));
    }

    #[test]
    fn test_level_order_violation_rejected() {
        let (roots, mut map) = two_level_fixture();
        let parent_id = ConceptId::from_value(1);
        // Parent claims the same level as its child
        map.get_mut(&parent_id).unwrap().level = 1;

        let result = ConceptHierarchy::new(roots, map, HierarchyMetadata::default());
        // Parent at level 1 with no parent_id trips the rootness check first
        assert!(matches!(
            result.unwrap_err(),
            HierarchyViolation::RootLevel { .. }
        ));
    }

    #[test]
    fn test_cycle_rejected() {
        let (roots, mut map) = two_level_fixture();
        let parent_id = ConceptId::from_value(1);
        let child_id = ConceptId::from_value(2);

        // Close the loop: parent's parent is the child
        {
            let parent = map.get_mut(&parent_id).unwrap();
            parent.parent_id = Some(child_id);
            parent.level = 2;
        }
        map.get_mut(&child_id).unwrap().children_ids.insert(parent_id);

        let result = ConceptHierarchy::new(roots, map, HierarchyMetadata::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_asymmetric_edge_rejected() {
        let (roots, mut map) = two_level_fixture();
        let parent_id = ConceptId::from_value(1);
        let child_id = ConceptId::from_value(2);
        map.get_mut(&parent_id).unwrap().children_ids.remove(&child_id);

        let result = ConceptHierarchy::new(roots, map, HierarchyMetadata::default());
        assert!(matches!(
            result.unwrap_err(),
            HierarchyViolation::AsymmetricEdge { .. }
        ));
    }

    #[test]
    fn test_depth_first_order() {
        let (roots, map) = two_level_fixture();
        let hierarchy = ConceptHierarchy::new(roots, map, HierarchyMetadata::default()).unwrap();

        let labels: Vec<&str> = hierarchy
            .iter_depth_first()
            .map(|c| c.canonical_label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec!["deep neural network", "convolutional neural network"]
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let (roots, map) = two_level_fixture();
        let hierarchy = ConceptHierarchy::new(roots, map, HierarchyMetadata::default()).unwrap();

        let json = serde_json::to_string(&hierarchy).unwrap();
        let back: ConceptHierarchy = serde_json::from_str(&json).unwrap();

        assert_eq!(hierarchy, back);
        assert!(back.validate().is_ok());
    }
}
