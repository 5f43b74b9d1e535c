//! Cross-strategy candidate merging
//!
//! Candidates from different strategies describing the same concept are
//! grouped two ways: by identical comparison key, and - when both sides
//! carry embeddings - by embedding similarity above the merge threshold,
//! which lets "neural net" and "neural network" collapse even without
//! matching keys. Each surviving group becomes one concept whose combined
//! confidence is the probabilistic OR of its contributing strategies'
//! best scores (per ADR-002).

use crate::config::CoordinatorConfig;
use crate::error::CoordinatorError;
use crate::runner::CandidatesByStrategy;
use linnaeus_domain::traits::EmbeddingProvider;
use linnaeus_domain::{
    combine_confidences, comparison_key, Concept, ConceptCandidate, ConceptId, EvidenceLink,
    ParentHint, StrategyKind, META_PARENT_HINT,
};
use linnaeus_embedding::{centroid, cosine_similarity};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Result of a merge: concepts plus the side channels hierarchy
/// construction needs
#[derive(Debug)]
pub struct MergeOutput {
    /// Merged concepts, sorted by canonical label; hierarchy fields
    /// (level, parent, children) are still at their defaults
    pub concepts: Vec<Concept>,

    /// Centroid embedding per concept, where any member candidate
    /// carried one
    pub embeddings: BTreeMap<ConceptId, Vec<f32>>,

    /// Parent suggestions collected from rule-based relation patterns
    pub parent_hints: Vec<ParentHint>,
}

/// Merges strategy-local candidates into confidence-scored concepts
pub struct StrategyCoordinator {
    config: CoordinatorConfig,
}

// One group of candidates believed to denote the same concept.
struct CandidateGroup {
    members: Vec<ConceptCandidate>,
}

impl CandidateGroup {
    fn embedding(&self) -> Option<Vec<f32>> {
        let vectors: Vec<&[f32]> = self
            .members
            .iter()
            .filter_map(|m| m.embedding.as_deref())
            .collect();
        if vectors.is_empty() {
            None
        } else {
            centroid(&vectors)
        }
    }
}

impl StrategyCoordinator {
    /// Create a coordinator, validating the configuration eagerly
    pub fn new(config: CoordinatorConfig) -> Result<Self, CoordinatorError> {
        config
            .validate()
            .map_err(CoordinatorError::InvalidConfiguration)?;
        Ok(Self { config })
    }

    /// Create a coordinator with default configuration
    pub fn default_config() -> Self {
        Self {
            config: CoordinatorConfig::default(),
        }
    }

    /// Merge joined candidate sets into concepts
    ///
    /// Candidates failing their own validation are skipped with a
    /// warning rather than poisoning the merge.
    pub fn merge(&self, candidates_by_strategy: CandidatesByStrategy) -> MergeOutput {
        // 1. Group by comparison key
        let mut by_key: BTreeMap<String, CandidateGroup> = BTreeMap::new();
        let mut skipped = 0usize;

        for (_, candidates) in candidates_by_strategy {
            for candidate in candidates {
                if let Err(reason) = candidate.validate() {
                    warn!("Skipping malformed candidate: {}", reason);
                    skipped += 1;
                    continue;
                }
                let key = if candidate.normalized_form.is_empty() {
                    comparison_key(&candidate.surface_form)
                } else {
                    candidate.normalized_form.clone()
                };
                by_key
                    .entry(key)
                    .or_insert_with(|| CandidateGroup {
                        members: Vec::new(),
                    })
                    .members
                    .push(candidate);
            }
        }
        if skipped > 0 {
            debug!("Skipped {} malformed candidates", skipped);
        }

        // 2. Union groups whose embeddings agree beyond the merge
        // threshold. Groups without embeddings only merge by key.
        // BTreeMap order keeps the group indices deterministic.
        let groups: Vec<CandidateGroup> = by_key.into_values().collect();
        let group_embeddings: Vec<Option<Vec<f32>>> =
            groups.iter().map(|g| g.embedding()).collect();

        let mut union = UnionFind::new(groups.len());
        for i in 0..groups.len() {
            let Some(a) = group_embeddings[i].as_deref() else {
                continue;
            };
            for j in (i + 1)..groups.len() {
                let Some(b) = group_embeddings[j].as_deref() else {
                    continue;
                };
                let similarity = f64::from(cosine_similarity(a, b));
                if similarity >= self.config.merge_similarity_threshold {
                    union.join(i, j);
                }
            }
        }

        let mut merged: BTreeMap<usize, Vec<ConceptCandidate>> = BTreeMap::new();
        for (index, group) in groups.into_iter().enumerate() {
            merged
                .entry(union.find(index))
                .or_default()
                .extend(group.members);
        }

        // 3-5. Synthesize one concept per group, combine confidences,
        // filter below the acceptance threshold
        let mut synthesized: Vec<(Concept, Option<Vec<f32>>, Vec<String>)> = Vec::new();
        let mut discarded = 0usize;

        for (_, members) in merged {
            let (concept, embedding, hints) = synthesize(&members);
            if concept.confidence < self.config.acceptance_threshold {
                discarded += 1;
                continue;
            }
            synthesized.push((concept, embedding, hints));
        }
        if discarded > 0 {
            debug!(
                "Discarded {} concepts below acceptance threshold {}",
                discarded, self.config.acceptance_threshold
            );
        }

        // Tie-break identical canonical labels: more supporting
        // strategies wins, then higher combined confidence, then the
        // smaller id
        let mut by_label: BTreeMap<String, (Concept, Option<Vec<f32>>, Vec<String>)> =
            BTreeMap::new();
        for entry in synthesized {
            let label = entry.0.canonical_label.clone();
            let replace = match by_label.get(&label) {
                Some(existing) => beats(&entry.0, &existing.0),
                None => true,
            };
            if replace {
                by_label.insert(label, entry);
            }
        }

        let mut concepts = Vec::with_capacity(by_label.len());
        let mut embeddings = BTreeMap::new();
        let mut parent_hints = Vec::new();

        for (_, (concept, embedding, hints)) in by_label {
            if let Some(vector) = embedding {
                embeddings.insert(concept.id, vector);
            }
            for parent_key in hints {
                parent_hints.push(ParentHint {
                    child: concept.id,
                    parent_key,
                });
            }
            concepts.push(concept);
        }

        debug!("Merge produced {} concepts", concepts.len());
        MergeOutput {
            concepts,
            embeddings,
            parent_hints,
        }
    }
}

// True when `challenger` should replace `incumbent` for the same label.
fn beats(challenger: &Concept, incumbent: &Concept) -> bool {
    let by_strategies = challenger
        .supporting_strategies
        .len()
        .cmp(&incumbent.supporting_strategies.len());
    let by_confidence = challenger
        .confidence
        .partial_cmp(&incumbent.confidence)
        .unwrap_or(std::cmp::Ordering::Equal);
    by_strategies
        .then(by_confidence)
        .then(incumbent.id.cmp(&challenger.id))
        .is_gt()
}

// Build one concept from a group of candidates.
fn synthesize(members: &[ConceptCandidate]) -> (Concept, Option<Vec<f32>>, Vec<String>) {
    // Canonical label: surface form of the highest-confidence member,
    // ties to the lexicographically smaller surface
    let best = members
        .iter()
        .max_by(|a, b| {
            a.local_confidence
                .partial_cmp(&b.local_confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.surface_form.cmp(&a.surface_form))
        })
        .expect("groups are never empty");

    let mut concept = Concept::new(ConceptId::new(), best.surface_form.clone(), 0.0);

    for member in members {
        if member.surface_form != concept.canonical_label {
            concept.aliases.insert(member.surface_form.clone());
        }
        concept.supporting_strategies.insert(member.strategy);
    }

    // Best local confidence per contributing strategy
    let mut best_per_strategy: BTreeMap<StrategyKind, f64> = BTreeMap::new();
    for member in members {
        let entry = best_per_strategy.entry(member.strategy).or_insert(0.0);
        *entry = entry.max(member.local_confidence);
    }
    let scores: Vec<f64> = best_per_strategy.values().copied().collect();
    concept.confidence = combine_confidences(&scores);

    // Evidence union, deduplicated by unit identity, each sentence
    // keeping the best confidence any member assigned it
    let mut evidence: BTreeMap<(String, usize), EvidenceLink> = BTreeMap::new();
    for member in members {
        for unit in &member.evidence {
            let key = (unit.document_id.clone(), unit.sentence_index);
            match evidence.get_mut(&key) {
                Some(link) => {
                    link.confidence = link.confidence.max(member.local_confidence);
                }
                None => {
                    evidence.insert(
                        key,
                        EvidenceLink::new(unit.clone(), member.local_confidence),
                    );
                }
            }
        }
    }
    concept.evidence = evidence.into_values().collect();

    // Centroid over whatever members carried vectors
    let vectors: Vec<&[f32]> = members
        .iter()
        .filter_map(|m| m.embedding.as_deref())
        .collect();
    let embedding = if vectors.is_empty() {
        None
    } else {
        centroid(&vectors)
    };

    let hints: Vec<String> = members
        .iter()
        .filter_map(|m| m.metadata.get(META_PARENT_HINT).cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    (concept, embedding, hints)
}

/// Attach embeddings to candidates that lack them, enabling
/// similarity-based merging across strategies
///
/// Provider failures leave the affected candidates without vectors (they
/// still merge by key) rather than failing the merge.
pub fn attach_embeddings<P: EmbeddingProvider>(
    candidates_by_strategy: &mut CandidatesByStrategy,
    provider: &P,
) {
    let mut pending: Vec<&mut ConceptCandidate> = candidates_by_strategy
        .values_mut()
        .flatten()
        .filter(|c| c.embedding.is_none())
        .collect();
    if pending.is_empty() {
        return;
    }

    let texts: Vec<String> = pending.iter().map(|c| c.surface_form.clone()).collect();
    match provider.embed_batch(&texts) {
        Ok(vectors) => {
            for (candidate, vector) in pending.iter_mut().zip(vectors) {
                candidate.embedding = Some(vector);
            }
        }
        Err(_) => {
            warn!("Embedding provider unavailable; merging by comparison key only");
        }
    }
}

// Path-compressed union-find over group indices.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, index: usize) -> usize {
        if self.parent[index] != index {
            let root = self.find(self.parent[index]);
            self.parent[index] = root;
        }
        self.parent[index]
    }

    fn join(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            // Smaller root wins so group order stays deterministic
            let (low, high) = if root_a < root_b {
                (root_a, root_b)
            } else {
                (root_b, root_a)
            };
            self.parent[high] = low;
        }
    }
}
