//! Specificity scoring
//!
//! Specificity orients parent-child edges: lower scores read as more
//! general. Three signals combine under configurable weights:
//!
//! 1. **Relation hints** - a concept named as the parent in a "kind of"
//!    pattern is pulled general-ward, the child pushed specific-ward
//! 2. **Neighborhood density** - a concept similar to many others is a
//!    hub, and hubs read as general
//! 3. **Phrase length** - "convolutional neural network" is more
//!    specific than "network"; modifier count saturates at four tokens

use crate::config::HierarchyConfig;
use linnaeus_domain::{comparison_key, Concept, ParentHint};
use std::collections::BTreeSet;

// Per-hint nudge applied to the hint term, starting from a neutral 0.5.
const HINT_STEP: f64 = 0.25;

/// Token set of a concept's comparison keys (canonical label plus
/// aliases), used for lexical similarity and hint matching
pub(crate) fn key_tokens(concept: &Concept) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    for label in std::iter::once(&concept.canonical_label).chain(concept.aliases.iter()) {
        for token in comparison_key(label).split_whitespace() {
            tokens.insert(token.to_string());
        }
    }
    tokens
}

/// Whether a concept answers to the given comparison key
pub(crate) fn matches_key(concept: &Concept, key: &str) -> bool {
    if comparison_key(&concept.canonical_label) == key {
        return true;
    }
    concept.aliases.iter().any(|a| comparison_key(a) == key)
}

/// Compute specificity per concept, aligned with the input slice
///
/// `similarity` is the symmetric pairwise similarity matrix over the
/// same indices.
pub(crate) fn specificity_scores(
    concepts: &[Concept],
    similarity: &[Vec<f64>],
    hints: &[ParentHint],
    config: &HierarchyConfig,
) -> Vec<f64> {
    let n = concepts.len();

    // Signal 1: relation hints
    let mut hint_terms = vec![0.5f64; n];
    for hint in hints {
        if let Some(child_index) = concepts.iter().position(|c| c.id == hint.child) {
            hint_terms[child_index] = (hint_terms[child_index] + HINT_STEP).min(1.0);
        }
        for (index, concept) in concepts.iter().enumerate() {
            if matches_key(concept, &hint.parent_key) {
                hint_terms[index] = (hint_terms[index] - HINT_STEP).max(0.0);
            }
        }
    }

    // Signal 2: neighborhood density (inverted: dense = general)
    let k = config.density_neighbors.min(n.saturating_sub(1));
    let density_terms: Vec<f64> = (0..n)
        .map(|i| {
            if k == 0 {
                return 0.5;
            }
            let mut neighbor_similarities: Vec<f64> = (0..n)
                .filter(|j| *j != i)
                .map(|j| similarity[i][j])
                .collect();
            neighbor_similarities
                .sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
            let density =
                neighbor_similarities.iter().take(k).sum::<f64>() / k as f64;
            1.0 - density.clamp(0.0, 1.0)
        })
        .collect();

    // Signal 3: phrase length, saturating at four tokens
    let length_terms: Vec<f64> = concepts
        .iter()
        .map(|c| {
            let tokens = comparison_key(&c.canonical_label)
                .split_whitespace()
                .count();
            (tokens.min(4) as f64) / 4.0
        })
        .collect();

    let weights = &config.specificity;
    let total = weights.hint + weights.density + weights.length;
    (0..n)
        .map(|i| {
            (weights.hint * hint_terms[i]
                + weights.density * density_terms[i]
                + weights.length * length_terms[i])
                / total
        })
        .collect()
}
