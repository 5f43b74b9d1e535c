//! Statistical extraction strategy
//!
//! Two complementary scorers over the document corpus:
//!
//! 1. **TF-IDF** for single terms - rewards terms frequent in one
//!    document but rare across the corpus. A single-document corpus has
//!    no usable inverse-frequency signal, so scoring degrades to plain
//!    term frequency (a documented fallback, not an error).
//! 2. **Co-occurrence graph ranking** for multi-word phrases - tokens
//!    co-occurring within a fixed window form a weighted graph; the
//!    stationary distribution of a random walk ranks them, and phrases
//!    score as the mean of their member tokens.
//!
//! Scores are normalized per document (top-ranked candidate = 1.0,
//! linear decay), which is what makes confidences comparable across
//! documents of very different lengths.

use crate::term;
use crate::StrategyError;
use linnaeus_domain::traits::ExtractionStrategy;
use linnaeus_domain::{comparison_key, ConceptCandidate, StrategyKind, TextUnit};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

/// Configuration for [`StatisticalStrategy`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticalConfig {
    /// Candidates kept per document, ranked by score
    pub top_k_per_document: usize,

    /// Token window within which co-occurrence edges are added
    pub cooccurrence_window: usize,

    /// Random-walk damping factor, in (0, 1)
    pub damping: f64,

    /// Maximum power-iteration rounds
    pub max_iterations: usize,

    /// Convergence threshold on the largest per-node delta
    pub convergence_epsilon: f64,

    /// Maximum words in a ranked phrase
    pub max_phrase_words: usize,
}

impl Default for StatisticalConfig {
    fn default() -> Self {
        Self {
            top_k_per_document: 15,
            cooccurrence_window: 4,
            damping: 0.85,
            max_iterations: 50,
            convergence_epsilon: 1e-6,
            max_phrase_words: 6,
        }
    }
}

impl StatisticalConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k_per_document == 0 {
            return Err("top_k_per_document must be greater than 0".to_string());
        }
        if self.cooccurrence_window < 2 {
            return Err("cooccurrence_window must be at least 2".to_string());
        }
        if !(0.0..1.0).contains(&self.damping) || self.damping == 0.0 {
            return Err(format!("damping {} out of range (0, 1)", self.damping));
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Corpus-relative term-importance extraction
pub struct StatisticalStrategy {
    config: StatisticalConfig,
    stopwords: HashSet<String>,
}

impl StatisticalStrategy {
    /// Create a strategy, validating the configuration eagerly
    pub fn new(config: StatisticalConfig) -> Result<Self, StrategyError> {
        config
            .validate()
            .map_err(StrategyError::InvalidConfiguration)?;
        Ok(Self {
            config,
            stopwords: term::stopword_set(),
        })
    }

    /// Create a strategy with default configuration
    pub fn default_config() -> Self {
        Self::new(StatisticalConfig::default()).expect("default configuration is valid")
    }

    // TF-IDF over single tokens. `document_frequencies` counts, per
    // token, how many corpus documents contain it.
    fn tfidf_scores(
        &self,
        tokens: &[String],
        document_frequencies: &BTreeMap<String, usize>,
        total_documents: usize,
    ) -> BTreeMap<String, f64> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for token in tokens {
            *counts.entry(token.clone()).or_insert(0) += 1;
        }
        let total_terms = tokens.len().max(1) as f64;

        counts
            .into_iter()
            .map(|(token, count)| {
                let tf = count as f64 / total_terms;
                let score = if total_documents > 1 {
                    let df = document_frequencies.get(&token).copied().unwrap_or(1);
                    let idf = (total_documents as f64 / df as f64).ln().max(0.0);
                    tf * idf
                } else {
                    // Frequency-only fallback for single-document corpora
                    tf
                };
                (token, score)
            })
            .collect()
    }

    // Stationary distribution of a random walk over the token
    // co-occurrence graph: score = (1-d)/n + d * sum(w_ji / W_j * score_j).
    fn cooccurrence_rank(&self, tokens: &[String]) -> BTreeMap<String, f64> {
        let vocabulary: BTreeSet<String> = tokens.iter().cloned().collect();
        let n = vocabulary.len();
        if n == 0 {
            return BTreeMap::new();
        }

        let mut edges: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for (i, a) in tokens.iter().enumerate() {
            let window_end = (i + self.config.cooccurrence_window).min(tokens.len());
            for b in &tokens[i + 1..window_end] {
                if a == b {
                    continue;
                }
                *edges
                    .entry(a.clone())
                    .or_default()
                    .entry(b.clone())
                    .or_insert(0.0) += 1.0;
                *edges
                    .entry(b.clone())
                    .or_default()
                    .entry(a.clone())
                    .or_insert(0.0) += 1.0;
            }
        }

        let weight_sums: BTreeMap<&String, f64> = edges
            .iter()
            .map(|(node, targets)| (node, targets.values().sum()))
            .collect();

        let base = (1.0 - self.config.damping) / n as f64;
        let mut scores: BTreeMap<String, f64> = vocabulary
            .iter()
            .map(|t| (t.clone(), 1.0 / n as f64))
            .collect();

        for _ in 0..self.config.max_iterations {
            let mut next: BTreeMap<String, f64> = BTreeMap::new();
            for node in &vocabulary {
                let mut incoming = 0.0;
                if let Some(targets) = edges.get(node) {
                    for (neighbor, weight) in targets {
                        let neighbor_total = weight_sums.get(neighbor).copied().unwrap_or(1.0);
                        if neighbor_total > 0.0 {
                            incoming += weight / neighbor_total * scores[neighbor];
                        }
                    }
                }
                next.insert(node.clone(), base + self.config.damping * incoming);
            }

            let max_delta = vocabulary
                .iter()
                .map(|t| (next[t] - scores[t]).abs())
                .fold(0.0, f64::max);
            scores = next;
            if max_delta < self.config.convergence_epsilon {
                break;
            }
        }

        scores
    }

    fn extract_document(
        &self,
        units: &[&TextUnit],
        document_frequencies: &BTreeMap<String, usize>,
        total_documents: usize,
    ) -> Vec<ConceptCandidate> {
        let token_stream: Vec<String> = units
            .iter()
            .flat_map(|u| term::content_tokens(&u.text, &self.stopwords))
            .collect();
        if token_stream.is_empty() {
            return Vec::new();
        }

        let tfidf = self.tfidf_scores(&token_stream, document_frequencies, total_documents);
        let walk = self.cooccurrence_rank(&token_stream);

        // Keyword selection: the top third of the vocabulary by walk
        // score (at least five tokens). Phrases are then rebuilt from
        // adjacent selected keywords in sentence order, so a verb between
        // two noun phrases breaks the run.
        let mut by_walk: Vec<(&String, f64)> = walk.iter().map(|(t, s)| (t, *s)).collect();
        by_walk.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        let keyword_count = (walk.len() / 3).max(5).min(walk.len());
        let selected: HashSet<&String> = by_walk[..keyword_count].iter().map(|(t, _)| *t).collect();

        // Scored entries keyed by comparison key: single tokens score by
        // TF-IDF, phrases by the summed walk score of their members (plus
        // mean TF-IDF so corpus-rare phrases outrank corpus-common ones).
        let mut scored: BTreeMap<String, (String, f64)> = BTreeMap::new();

        for (token, score) in &tfidf {
            let key = comparison_key(token);
            if key.is_empty() {
                continue;
            }
            let entry = scored.entry(key).or_insert_with(|| (token.clone(), 0.0));
            entry.1 = entry.1.max(*score);
        }

        for unit in units {
            let mut run: Vec<&str> = Vec::new();
            let sentence_words = term::words(&unit.text);
            for &word in sentence_words.iter().chain(std::iter::once(&"")) {
                let lower = word.to_lowercase();
                if !lower.is_empty() && selected.contains(&lower) {
                    run.push(word);
                    continue;
                }
                if run.len() >= 2 {
                    let take = run.len().min(self.config.max_phrase_words);
                    let phrase = run[..take].join(" ");
                    let members: Vec<String> =
                        run[..take].iter().map(|w| w.to_lowercase()).collect();
                    let walk_sum: f64 = members
                        .iter()
                        .map(|m| walk.get(m).copied().unwrap_or(0.0))
                        .sum();
                    let mean_tfidf: f64 = members
                        .iter()
                        .map(|m| tfidf.get(m).copied().unwrap_or(0.0))
                        .sum::<f64>()
                        / members.len().max(1) as f64;
                    let score = walk_sum + mean_tfidf;

                    let key = comparison_key(&phrase);
                    if !key.is_empty() {
                        let entry = scored.entry(key).or_insert_with(|| (phrase.clone(), 0.0));
                        entry.1 = entry.1.max(score);
                    }
                }
                run.clear();
            }
        }

        // Rank descending; ties break lexicographically for determinism.
        // Zero-score entries carry no signal (e.g. every token shared by
        // every document) and never become candidates.
        let mut ranked: Vec<(String, String, f64)> = scored
            .into_iter()
            .filter(|(_, (_, score))| *score > 1e-12)
            .map(|(key, (surface, score))| (key, surface, score))
            .collect();
        ranked.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(self.config.top_k_per_document);

        let n = ranked.len() as f64;
        ranked
            .into_iter()
            .enumerate()
            .filter_map(|(rank, (key, surface, score))| {
                let evidence: Vec<TextUnit> = units
                    .iter()
                    .filter(|u| comparison_key(&u.text).contains(&key))
                    .map(|u| (*u).clone())
                    .collect();
                if evidence.is_empty() {
                    return None;
                }

                // Linear decay: top-ranked candidate gets 1.0
                let confidence = 1.0 - rank as f64 / n;
                Some(
                    ConceptCandidate::new(surface, StrategyKind::Statistical, confidence, evidence)
                        .with_metadata("rank", (rank + 1).to_string())
                        .with_metadata("raw_score", format!("{:.6}", score)),
                )
            })
            .collect()
    }
}

impl ExtractionStrategy for StatisticalStrategy {
    type Error = StrategyError;

    fn kind(&self) -> StrategyKind {
        StrategyKind::Statistical
    }

    fn extract(&self, units: &[TextUnit]) -> Result<Vec<ConceptCandidate>, Self::Error> {
        // Group units per document, preserving sentence order
        let mut by_document: BTreeMap<&str, Vec<&TextUnit>> = BTreeMap::new();
        for unit in units {
            by_document.entry(&unit.document_id).or_default().push(unit);
        }
        let total_documents = by_document.len();

        // Document frequencies over single tokens
        let mut document_frequencies: BTreeMap<String, usize> = BTreeMap::new();
        for doc_units in by_document.values() {
            let unique: BTreeSet<String> = doc_units
                .iter()
                .flat_map(|u| term::content_tokens(&u.text, &self.stopwords))
                .collect();
            for token in unique {
                *document_frequencies.entry(token).or_insert(0) += 1;
            }
        }

        if total_documents == 1 {
            debug!("Single-document corpus; TF-IDF degrades to term frequency");
        }

        // Candidates from different documents sharing a comparison key
        // collapse into one, keeping the best confidence
        let mut merged: BTreeMap<String, ConceptCandidate> = BTreeMap::new();
        for doc_units in by_document.values() {
            for candidate in
                self.extract_document(doc_units, &document_frequencies, total_documents)
            {
                match merged.get_mut(&candidate.normalized_form) {
                    Some(existing) => {
                        if candidate.local_confidence > existing.local_confidence {
                            existing.local_confidence = candidate.local_confidence;
                            existing.surface_form = candidate.surface_form.clone();
                        }
                        for unit in candidate.evidence {
                            if !existing.evidence.iter().any(|u| u.key() == unit.key()) {
                                existing.evidence.push(unit);
                            }
                        }
                    }
                    None => {
                        merged.insert(candidate.normalized_form.clone(), candidate);
                    }
                }
            }
        }

        let candidates: Vec<ConceptCandidate> = merged.into_values().collect();
        debug!(
            "Statistical strategy produced {} candidates across {} documents",
            candidates.len(),
            total_documents
        );
        Ok(candidates)
    }
}
