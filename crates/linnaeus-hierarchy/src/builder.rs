//! Core hierarchy builder

use crate::config::HierarchyConfig;
use crate::error::HierarchyError;
use crate::specificity::{key_tokens, matches_key, specificity_scores};
use linnaeus_domain::{
    Concept, ConceptHierarchy, ConceptId, HierarchyMetadata, ParentHint,
};
use linnaeus_embedding::cosine_similarity;
use std::collections::{BTreeMap, BTreeSet};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Input to a hierarchy build: merged concepts plus the side channels
/// the merge step collected
#[derive(Debug, Default)]
pub struct HierarchyInput {
    /// Concepts with hierarchy fields still at their defaults
    pub concepts: Vec<Concept>,

    /// Centroid embedding per concept, where available
    pub embeddings: BTreeMap<ConceptId, Vec<f32>>,

    /// Parent suggestions from rule-based relation patterns
    pub parent_hints: Vec<ParentHint>,
}

/// Builds a concept forest oriented by specificity
///
/// A concept with no more-general concept to attach to becomes a root;
/// every other concept attaches beneath the nearest more-general concept
/// it is most similar to, with relation-pattern hints taking precedence
/// over similarity. Orphans are therefore impossible by construction -
/// a concept that finds no parent is promoted to a root, never left
/// unattached.
pub struct HierarchyBuilder {
    config: HierarchyConfig,
}

impl HierarchyBuilder {
    /// Create a builder, validating the configuration eagerly
    pub fn new(config: HierarchyConfig) -> Result<Self, HierarchyError> {
        config
            .validate()
            .map_err(HierarchyError::InvalidConfiguration)?;
        Ok(Self { config })
    }

    /// Create a builder with default configuration
    pub fn default_config() -> Self {
        Self {
            config: HierarchyConfig::default(),
        }
    }

    /// Build a hierarchy from merged concepts
    ///
    /// # Errors
    ///
    /// [`HierarchyError::EmptyHierarchy`] when `input.concepts` is empty;
    /// [`HierarchyError::Invalid`] if the assembled forest fails
    /// structural validation.
    pub fn build(&self, input: HierarchyInput) -> Result<ConceptHierarchy, HierarchyError> {
        let HierarchyInput {
            mut concepts,
            embeddings,
            parent_hints,
        } = input;

        if concepts.is_empty() {
            return Err(HierarchyError::EmptyHierarchy);
        }
        let n = concepts.len();

        // Pairwise similarity: embedding cosine when both sides have
        // vectors, floored by lexical token overlap so concepts sharing
        // a head noun stay connected even when embeddings are missing
        let token_sets: Vec<BTreeSet<String>> = concepts.iter().map(key_tokens).collect();
        let mut similarity = vec![vec![0.0f64; n]; n];
        for i in 0..n {
            similarity[i][i] = 1.0;
            for j in (i + 1)..n {
                let lexical = jaccard(&token_sets[i], &token_sets[j]);
                let semantic = match (
                    embeddings.get(&concepts[i].id),
                    embeddings.get(&concepts[j].id),
                ) {
                    (Some(a), Some(b)) => f64::from(cosine_similarity(a, b)).max(0.0),
                    _ => 0.0,
                };
                let value = lexical.max(semantic);
                similarity[i][j] = value;
                similarity[j][i] = value;
            }
        }

        let specificity = specificity_scores(&concepts, &similarity, &parent_hints, &self.config);

        // Similarity-connected components scope non-hinted parent search
        let component = components(&similarity, self.config.component_threshold);

        // Hints per child index, resolved against canonical labels and
        // aliases
        let mut hinted_parents: Vec<Vec<usize>> = vec![Vec::new(); n];
        for hint in &parent_hints {
            let Some(child) = concepts.iter().position(|c| c.id == hint.child) else {
                continue;
            };
            for (index, concept) in concepts.iter().enumerate() {
                if index != child && matches_key(concept, &hint.parent_key) {
                    hinted_parents[child].push(index);
                }
            }
        }

        // Parent choice per concept. A hinted parent may live outside the
        // component - the pattern text is stronger evidence than the
        // similarity graph - but must still be strictly more general.
        let margin = self.config.specificity_margin;
        let mut parent_of: Vec<Option<usize>> = vec![None; n];
        for i in 0..n {
            let hinted = hinted_parents[i]
                .iter()
                .copied()
                .filter(|j| specificity[*j] + margin < specificity[i])
                .max_by(|a, b| order_candidates(i, *a, *b, &similarity, &specificity, &concepts));

            let chosen = match hinted {
                Some(j) => Some(j),
                None => (0..n)
                    .filter(|j| *j != i && component[*j] == component[i])
                    .filter(|j| specificity[*j] + margin < specificity[i])
                    .max_by(|a, b| order_candidates(i, *a, *b, &similarity, &specificity, &concepts)),
            };
            parent_of[i] = chosen;
        }

        // Levels in specificity order: every parent is strictly more
        // general, so it is already leveled when its child comes up
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|a, b| {
            specificity[*a]
                .partial_cmp(&specificity[*b])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| concepts[*a].canonical_label.cmp(&concepts[*b].canonical_label))
        });

        let mut levels = vec![0usize; n];
        for &i in &order {
            if let Some(parent) = parent_of[i] {
                levels[i] = levels[parent] + 1;
            }
        }

        // Assemble the arena
        let ids: Vec<ConceptId> = concepts.iter().map(|c| c.id).collect();
        let mut roots = Vec::new();
        for &i in &order {
            match parent_of[i] {
                Some(parent) => {
                    concepts[i].parent_id = Some(ids[parent]);
                    concepts[i].level = levels[i];
                }
                None => {
                    concepts[i].parent_id = None;
                    concepts[i].level = 0;
                    roots.push(ids[i]);
                }
            }
        }
        for i in 0..n {
            if let Some(parent) = parent_of[i] {
                let child_id = ids[i];
                concepts[parent].children_ids.insert(child_id);
            }
        }

        let max_level = levels.iter().max().copied().unwrap_or(0);
        info!(
            "Built hierarchy: {} concepts, {} roots, max depth {}",
            n,
            roots.len(),
            max_level
        );

        let metadata = self.metadata();
        let arena: BTreeMap<ConceptId, Concept> =
            concepts.into_iter().map(|c| (c.id, c)).collect();

        debug!("Validating structural invariants");
        ConceptHierarchy::new(roots, arena, metadata).map_err(HierarchyError::Invalid)
    }

    fn metadata(&self) -> HierarchyMetadata {
        let mut parameters = BTreeMap::new();
        parameters.insert(
            "specificity_weights".to_string(),
            format!(
                "hint={},density={},length={}",
                self.config.specificity.hint,
                self.config.specificity.density,
                self.config.specificity.length
            ),
        );
        parameters.insert(
            "component_threshold".to_string(),
            self.config.component_threshold.to_string(),
        );
        parameters.insert(
            "density_neighbors".to_string(),
            self.config.density_neighbors.to_string(),
        );

        HierarchyMetadata {
            generated_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            parameters,
            quality: BTreeMap::new(),
        }
    }
}

// Candidate ordering for parent selection: most similar wins, then the
// smallest specificity gap (attach to the nearest more-general concept,
// not the most general), then label for determinism. Returns Greater
// when `a` is the better candidate.
fn order_candidates(
    child: usize,
    a: usize,
    b: usize,
    similarity: &[Vec<f64>],
    specificity: &[f64],
    concepts: &[Concept],
) -> std::cmp::Ordering {
    let by_similarity = similarity[child][a]
        .partial_cmp(&similarity[child][b])
        .unwrap_or(std::cmp::Ordering::Equal);
    let gap_a = specificity[child] - specificity[a];
    let gap_b = specificity[child] - specificity[b];
    // Smaller gap is better, so compare reversed
    let by_gap = gap_b
        .partial_cmp(&gap_a)
        .unwrap_or(std::cmp::Ordering::Equal);
    by_similarity.then(by_gap).then_with(|| {
        concepts[b]
            .canonical_label
            .cmp(&concepts[a].canonical_label)
    })
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

// Union-find over indices; pairs at or above the threshold share a
// component.
fn components(similarity: &[Vec<f64>], threshold: f64) -> Vec<usize> {
    let n = similarity.len();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut Vec<usize>, i: usize) -> usize {
        if parent[i] != i {
            let root = find(parent, parent[i]);
            parent[i] = root;
        }
        parent[i]
    }

    for i in 0..n {
        for j in (i + 1)..n {
            if similarity[i][j] >= threshold {
                let root_i = find(&mut parent, i);
                let root_j = find(&mut parent, j);
                if root_i != root_j {
                    let (low, high) = if root_i < root_j {
                        (root_i, root_j)
                    } else {
                        (root_j, root_i)
                    };
                    parent[high] = low;
                }
            }
        }
    }

    (0..n).map(|i| find(&mut parent, i)).collect()
}
