//! Embedding-based extraction strategy
//!
//! Mines candidate phrases from the text, embeds them through the
//! external provider, and clusters the vectors with a greedy centroid
//! method: a phrase joins the first cluster whose centroid it is
//! sufficiently similar to, otherwise it opens a new one. The phrase
//! closest to the final centroid becomes the cluster's surface form and
//! the mean member-to-centroid similarity becomes its confidence.
//!
//! Provider failures degrade this strategy to an empty candidate set
//! (per ADR-006); they never fail the surrounding pipeline.

use crate::term;
use crate::StrategyError;
use linnaeus_domain::traits::{EmbeddingProvider, ExtractionStrategy};
use linnaeus_domain::{comparison_key, ConceptCandidate, StrategyKind, TextUnit};
use linnaeus_embedding::{centroid, cosine_similarity, normalize};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration for [`EmbeddingStrategy`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingStrategyConfig {
    /// Minimum cosine similarity to a cluster centroid for a phrase to
    /// join the cluster, in [0, 1]
    pub similarity_threshold: f64,

    /// Clusters smaller than this never become candidates; the default
    /// of 2 means a phrase must have at least one semantic neighbor
    pub min_cluster_size: usize,

    /// Cap on distinct phrases sent to the provider per run
    pub max_phrases: usize,

    /// Phrases per embedding request
    pub batch_size: usize,

    /// Maximum words in a mined phrase
    pub max_phrase_words: usize,
}

impl Default for EmbeddingStrategyConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
            min_cluster_size: 2,
            max_phrases: 256,
            batch_size: 32,
            max_phrase_words: 6,
        }
    }
}

impl EmbeddingStrategyConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(format!(
                "similarity_threshold {} out of range [0.0, 1.0]",
                self.similarity_threshold
            ));
        }
        if self.min_cluster_size == 0 {
            return Err("min_cluster_size must be greater than 0".to_string());
        }
        if self.batch_size == 0 {
            return Err("batch_size must be greater than 0".to_string());
        }
        if self.max_phrases == 0 {
            return Err("max_phrases must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Semantic clustering over phrase embeddings
pub struct EmbeddingStrategy<P> {
    provider: Arc<P>,
    config: EmbeddingStrategyConfig,
    stopwords: HashSet<String>,
}

// A mined phrase awaiting clustering
struct MinedPhrase {
    surface: String,
    key: String,
    evidence: Vec<TextUnit>,
    vector: Vec<f32>,
}

struct Cluster {
    members: Vec<usize>,
    centroid: Vec<f32>,
}

impl<P: EmbeddingProvider> EmbeddingStrategy<P> {
    /// Create a strategy, validating the configuration eagerly
    pub fn new(provider: Arc<P>, config: EmbeddingStrategyConfig) -> Result<Self, StrategyError> {
        config
            .validate()
            .map_err(StrategyError::InvalidConfiguration)?;
        Ok(Self {
            provider,
            config,
            stopwords: term::stopword_set(),
        })
    }

    // Distinct phrases with their supporting units, in deterministic
    // (comparison key) order.
    fn mine_phrases(&self, units: &[TextUnit]) -> Vec<(String, String, Vec<TextUnit>)> {
        let mut seen: BTreeMap<String, (String, Vec<TextUnit>)> = BTreeMap::new();

        for unit in units {
            for phrase in
                term::phrase_spans(&unit.text, &self.stopwords, 2, self.config.max_phrase_words)
            {
                let key = comparison_key(&phrase);
                if key.is_empty() {
                    continue;
                }
                let entry = seen.entry(key).or_insert_with(|| (phrase, Vec::new()));
                if !entry.1.iter().any(|u| u.key() == unit.key()) {
                    entry.1.push(unit.clone());
                }
            }
        }

        let total = seen.len();
        let mut phrases: Vec<(String, String, Vec<TextUnit>)> = seen
            .into_iter()
            .map(|(key, (surface, evidence))| (key, surface, evidence))
            .collect();
        if phrases.len() > self.config.max_phrases {
            debug!(
                "Truncating {} mined phrases to {}",
                total, self.config.max_phrases
            );
            phrases.truncate(self.config.max_phrases);
        }
        phrases
    }

    // Greedy centroid clustering; deterministic because phrases arrive in
    // key order and ties go to the lowest-index cluster.
    fn cluster(&self, phrases: &[MinedPhrase]) -> Vec<Cluster> {
        let mut clusters: Vec<Cluster> = Vec::new();

        for (index, phrase) in phrases.iter().enumerate() {
            let mut best: Option<(usize, f32)> = None;
            for (cluster_index, cluster) in clusters.iter().enumerate() {
                let similarity = cosine_similarity(&phrase.vector, &cluster.centroid);
                if best.map(|(_, s)| similarity > s).unwrap_or(true) {
                    best = Some((cluster_index, similarity));
                }
            }

            match best {
                Some((cluster_index, similarity))
                    if f64::from(similarity) >= self.config.similarity_threshold =>
                {
                    let cluster = &mut clusters[cluster_index];
                    cluster.members.push(index);
                    let vectors: Vec<&[f32]> = cluster
                        .members
                        .iter()
                        .map(|i| phrases[*i].vector.as_slice())
                        .collect();
                    if let Some(mean) = centroid(&vectors) {
                        cluster.centroid = mean;
                    }
                }
                _ => {
                    let mut vector = phrase.vector.clone();
                    normalize(&mut vector);
                    clusters.push(Cluster {
                        members: vec![index],
                        centroid: vector,
                    });
                }
            }
        }

        clusters
    }
}

impl<P: EmbeddingProvider> ExtractionStrategy for EmbeddingStrategy<P> {
    type Error = StrategyError;

    fn kind(&self) -> StrategyKind {
        StrategyKind::Embedding
    }

    fn extract(&self, units: &[TextUnit]) -> Result<Vec<ConceptCandidate>, Self::Error> {
        let mined = self.mine_phrases(units);
        if mined.is_empty() {
            return Ok(Vec::new());
        }

        // Embed in batches; any provider failure degrades the whole
        // strategy rather than the pipeline
        let mut phrases: Vec<MinedPhrase> = Vec::with_capacity(mined.len());
        for chunk in mined.chunks(self.config.batch_size) {
            let texts: Vec<String> = chunk.iter().map(|(_, s, _)| s.clone()).collect();
            let vectors = match self.provider.embed_batch(&texts) {
                Ok(vectors) => vectors,
                Err(_) => {
                    warn!("Embedding provider unavailable; embedding strategy degraded to empty output");
                    return Ok(Vec::new());
                }
            };
            for ((key, surface, evidence), vector) in chunk.iter().cloned().zip(vectors) {
                phrases.push(MinedPhrase {
                    surface,
                    key,
                    evidence,
                    vector,
                });
            }
        }

        let clusters = self.cluster(&phrases);

        let mut candidates = Vec::new();
        for cluster in clusters {
            if cluster.members.len() < self.config.min_cluster_size {
                continue;
            }

            // Representative: member closest to the centroid, ties to the
            // lexicographically smaller key
            let mut representative = cluster.members[0];
            let mut best_similarity = f32::MIN;
            let mut similarity_sum = 0.0f64;
            for &member in &cluster.members {
                let similarity = cosine_similarity(&phrases[member].vector, &cluster.centroid);
                similarity_sum += f64::from(similarity);
                let closer = similarity > best_similarity
                    || (similarity == best_similarity
                        && phrases[member].key < phrases[representative].key);
                if closer {
                    best_similarity = similarity;
                    representative = member;
                }
            }
            let confidence =
                (similarity_sum / cluster.members.len() as f64).clamp(0.0, 1.0);

            let mut evidence: Vec<TextUnit> = Vec::new();
            for &member in &cluster.members {
                for unit in &phrases[member].evidence {
                    if !evidence.iter().any(|u| u.key() == unit.key()) {
                        evidence.push(unit.clone());
                    }
                }
            }

            candidates.push(
                ConceptCandidate::new(
                    phrases[representative].surface.clone(),
                    StrategyKind::Embedding,
                    confidence,
                    evidence,
                )
                .with_embedding(cluster.centroid.clone())
                .with_metadata("cluster_size", cluster.members.len().to_string())
                .with_metadata("mean_similarity", format!("{:.4}", confidence)),
            );
        }

        debug!(
            "Embedding strategy produced {} candidates from {} phrases",
            candidates.len(),
            phrases.len()
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linnaeus_embedding::MockEmbeddingModel;

    fn unit(index: usize, text: &str) -> TextUnit {
        TextUnit::new("doc1", index, 1, text)
    }

    // Pin every mined phrase so clustering is fully under test control:
    // "neural net" and "neural network" are near-identical, the rest are
    // orthogonal.
    fn pinned_model() -> MockEmbeddingModel {
        MockEmbeddingModel::new(4)
            .with_response("neural net", vec![1.0, 0.05, 0.0, 0.0])
            .with_response("neural network", vec![1.0, 0.0, 0.05, 0.0])
            .with_response("stochastic gradient descent", vec![0.0, 0.0, 0.1, 1.0])
            .with_response("held-out data", vec![0.0, 1.0, 0.0, 0.0])
    }

    fn units() -> Vec<TextUnit> {
        vec![
            unit(0, "Every neural net is trained from scratch."),
            unit(1, "The neural network is evaluated on held-out data."),
            unit(2, "We rely on stochastic gradient descent for convergence."),
        ]
    }

    fn strategy(model: MockEmbeddingModel) -> EmbeddingStrategy<MockEmbeddingModel> {
        EmbeddingStrategy::new(Arc::new(model), EmbeddingStrategyConfig::default()).unwrap()
    }

    #[test]
    fn test_similar_phrases_cluster_together() {
        let candidates = strategy(pinned_model()).extract(&units()).unwrap();

        assert_eq!(candidates.len(), 1);
        let merged = &candidates[0];
        // Two members joined; the singleton gradient-descent cluster is
        // below min_cluster_size
        assert_eq!(
            merged.metadata.get("cluster_size").map(String::as_str),
            Some("2")
        );
        assert!(merged.normalized_form.starts_with("neural net"));
        assert_eq!(merged.evidence.len(), 2);
        assert!(merged.embedding.is_some());
    }

    #[test]
    fn test_confidence_is_mean_intra_cluster_similarity() {
        let candidates = strategy(pinned_model()).extract(&units()).unwrap();
        let merged = &candidates[0];

        assert!(merged.local_confidence > 0.9);
        assert!(merged.local_confidence <= 1.0);
    }

    #[test]
    fn test_singletons_allowed_when_configured() {
        let mut config = EmbeddingStrategyConfig::default();
        config.min_cluster_size = 1;
        let strategy =
            EmbeddingStrategy::new(Arc::new(pinned_model()), config).unwrap();

        let candidates = strategy.extract(&units()).unwrap();
        assert!(candidates
            .iter()
            .any(|c| c.normalized_form == "stochastic gradient descent"));
    }

    #[test]
    fn test_provider_failure_degrades_to_empty() {
        let strategy = strategy(MockEmbeddingModel::new(4).failing());

        let candidates = strategy.extract(&units()).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let candidates = strategy(pinned_model()).extract(&[]).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let model = pinned_model();
        let strategy =
            EmbeddingStrategy::new(Arc::new(model), EmbeddingStrategyConfig::default()).unwrap();

        let a = strategy.extract(&units()).unwrap();
        let b = strategy.extract(&units()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut config = EmbeddingStrategyConfig::default();
        config.similarity_threshold = 1.5;
        assert!(EmbeddingStrategy::new(Arc::new(MockEmbeddingModel::new(4)), config).is_err());
    }

    #[test]
    fn test_candidates_validate() {
        for candidate in strategy(pinned_model()).extract(&units()).unwrap() {
            assert!(candidate.validate().is_ok());
        }
    }
}
