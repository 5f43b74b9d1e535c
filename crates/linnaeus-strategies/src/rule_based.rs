//! Rule-based extraction strategy
//!
//! Pattern-driven and fully explainable: every candidate records which
//! pattern produced it. Hierarchical-relation patterns additionally emit
//! a suggested parent as a non-binding hint for hierarchy construction.
//!
//! Pattern specificity orders the confidence scale: an exact hierarchical
//! relation beats a bare noun phrase, which beats the capitalization
//! heuristics. All scores live in [0.5, 1.0].

use crate::term;
use crate::StrategyError;
use linnaeus_domain::traits::ExtractionStrategy;
use linnaeus_domain::{
    comparison_key, ConceptCandidate, StrategyKind, TextUnit, META_PARENT_HINT, META_PATTERN,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Configuration for [`RuleBasedStrategy`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleBasedConfig {
    /// Generic terms filtered from the output, compared by normalized form
    pub stoplist: Vec<String>,

    /// Confidence for candidates matched by a hierarchical relation
    /// pattern, in [0.5, 1.0]
    pub hierarchy_confidence: f64,

    /// Confidence for bare noun-phrase candidates, in [0.5, 1.0]
    pub noun_phrase_confidence: f64,

    /// Confidence for acronym/capitalization candidates, in [0.5, 1.0]
    pub term_heuristic_confidence: f64,

    /// Maximum words in an extracted phrase
    pub max_phrase_words: usize,
}

impl Default for RuleBasedConfig {
    fn default() -> Self {
        Self {
            stoplist: vec![
                "approach".to_string(),
                "method".to_string(),
                "system".to_string(),
                "technique".to_string(),
                "framework".to_string(),
                "paper".to_string(),
                "result".to_string(),
                "study".to_string(),
            ],
            hierarchy_confidence: 0.9,
            noun_phrase_confidence: 0.7,
            term_heuristic_confidence: 0.55,
            max_phrase_words: 6,
        }
    }
}

impl RuleBasedConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("hierarchy_confidence", self.hierarchy_confidence),
            ("noun_phrase_confidence", self.noun_phrase_confidence),
            ("term_heuristic_confidence", self.term_heuristic_confidence),
        ] {
            if !(0.5..=1.0).contains(&value) {
                return Err(format!("{} {} out of range [0.5, 1.0]", name, value));
            }
        }
        if self.max_phrase_words == 0 {
            return Err("max_phrase_words must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Pattern/grammar-driven concept extraction
pub struct RuleBasedStrategy {
    config: RuleBasedConfig,
    stopwords: HashSet<String>,
    stoplist: HashSet<String>,
    is_a_pattern: Regex,
    such_as_pattern: Regex,
    acronym_pattern: Regex,
}

impl RuleBasedStrategy {
    /// Create a strategy, validating the configuration eagerly
    pub fn new(config: RuleBasedConfig) -> Result<Self, StrategyError> {
        config
            .validate()
            .map_err(StrategyError::InvalidConfiguration)?;

        // "X is a (kind|type|form|class) of Y"
        let is_a_pattern = Regex::new(
            r"(?i)([A-Za-z][A-Za-z0-9 \-]{2,60}?)\s+(?:is|are)\s+(?:a|an)\s+(?:(?:kind|type|form|class|family)\s+of\s+)?([A-Za-z][A-Za-z0-9 \-]{2,60})",
        )
        .map_err(|e| StrategyError::Pattern(e.to_string()))?;

        // "Y, such as X1, X2 and X3"
        let such_as_pattern = Regex::new(
            r"(?i)([A-Za-z][A-Za-z0-9 \-]{2,60}?),?\s+such\s+as\s+([A-Za-z][A-Za-z0-9, \-]{2,90})",
        )
        .map_err(|e| StrategyError::Pattern(e.to_string()))?;

        // 2-8 uppercase letters/digits, e.g. CNN, BERT, TF-IDF
        let acronym_pattern = Regex::new(r"^[A-Z][A-Z0-9\-]{1,7}$")
            .map_err(|e| StrategyError::Pattern(e.to_string()))?;

        let stoplist = config
            .stoplist
            .iter()
            .map(|t| comparison_key(t))
            .collect();

        Ok(Self {
            stopwords: term::stopword_set(),
            stoplist,
            config,
            is_a_pattern,
            such_as_pattern,
            acronym_pattern,
        })
    }

    /// Create a strategy with default configuration
    pub fn default_config() -> Self {
        // Default config always validates and the patterns are literals,
        // so construction cannot fail here
        Self::new(RuleBasedConfig::default()).expect("default configuration is valid")
    }

    // Hierarchical-relation patterns: emit both endpoints, with a parent
    // hint on the child.
    fn extract_relations(&self, unit: &TextUnit, sink: &mut CandidateSink) {
        for captures in self.is_a_pattern.captures_iter(&unit.text) {
            let child_span = captures.get(1).map(|m| m.as_str()).unwrap_or("");
            let parent_span = captures.get(2).map(|m| m.as_str()).unwrap_or("");

            // The relation only counts when the copula is qualified
            // ("a type of", "a kind of"); a bare "X is a Y" with no
            // qualifier still matches the regex, so require the marker
            let full = captures.get(0).map(|m| m.as_str()).unwrap_or("");
            let qualified = full.to_lowercase().contains(" of ");

            let child = term::trailing_phrase(child_span, &self.stopwords, self.config.max_phrase_words);
            let parent = term::leading_phrase(parent_span, &self.stopwords, self.config.max_phrase_words);

            if let (Some(child), Some(parent), true) = (child, parent, qualified) {
                let parent_key = comparison_key(&parent);
                sink.add(
                    &child,
                    self.config.hierarchy_confidence,
                    unit,
                    "is_a_kind_of",
                    Some(parent_key),
                );
                sink.add(&parent, self.config.hierarchy_confidence, unit, "is_a_kind_of", None);
            }
        }

        for captures in self.such_as_pattern.captures_iter(&unit.text) {
            let parent_span = captures.get(1).map(|m| m.as_str()).unwrap_or("");
            let children_span = captures.get(2).map(|m| m.as_str()).unwrap_or("");

            let parent = term::trailing_phrase(parent_span, &self.stopwords, self.config.max_phrase_words);
            let Some(parent) = parent else { continue };
            let parent_key = comparison_key(&parent);

            sink.add(&parent, self.config.hierarchy_confidence, unit, "such_as", None);

            // An "and" marks the final list element; whatever follows the
            // next comma is the resuming clause, not another example
            for segment in children_span.split([',', ';']) {
                let segment = segment.trim();
                let is_final = segment.starts_with("and ") || segment.contains(" and ");
                for part in segment.trim_start_matches("and ").split(" and ") {
                    if let Some(child) =
                        term::leading_phrase(part, &self.stopwords, self.config.max_phrase_words)
                    {
                        sink.add(
                            &child,
                            self.config.hierarchy_confidence,
                            unit,
                            "such_as",
                            Some(parent_key.clone()),
                        );
                    }
                }
                if is_final {
                    break;
                }
            }
        }
    }

    // Bare noun-phrase chunks: maximal content-word runs of two or more
    // words.
    fn extract_noun_phrases(&self, unit: &TextUnit, sink: &mut CandidateSink) {
        for phrase in term::phrase_spans(&unit.text, &self.stopwords, 2, self.config.max_phrase_words)
        {
            sink.add(&phrase, self.config.noun_phrase_confidence, unit, "noun_phrase", None);
        }
    }

    // Capitalization heuristics: acronyms anywhere, capitalized technical
    // terms away from sentence start.
    fn extract_technical_terms(&self, unit: &TextUnit, sink: &mut CandidateSink) {
        for (position, word) in term::words(&unit.text).into_iter().enumerate() {
            if self.acronym_pattern.is_match(word) {
                sink.add(word, self.config.term_heuristic_confidence, unit, "acronym", None);
            } else if position > 0
                && word.chars().count() >= 4
                && word.chars().next().map(char::is_uppercase).unwrap_or(false)
                && word.chars().skip(1).all(|c| c.is_lowercase())
            {
                sink.add(
                    word,
                    self.config.term_heuristic_confidence,
                    unit,
                    "capitalized_term",
                    None,
                );
            }
        }
    }
}

impl ExtractionStrategy for RuleBasedStrategy {
    type Error = StrategyError;

    fn kind(&self) -> StrategyKind {
        StrategyKind::RuleBased
    }

    fn extract(&self, units: &[TextUnit]) -> Result<Vec<ConceptCandidate>, Self::Error> {
        let mut sink = CandidateSink::new();

        for unit in units {
            self.extract_relations(unit, &mut sink);
            self.extract_noun_phrases(unit, &mut sink);
            self.extract_technical_terms(unit, &mut sink);
        }

        let candidates = sink.into_candidates(&self.stoplist);
        debug!("Rule-based strategy produced {} candidates", candidates.len());
        Ok(candidates)
    }
}

// Accumulates raw matches and folds duplicates by comparison key: highest
// confidence wins, evidence is unioned, the most specific pattern name is
// kept.
struct CandidateSink {
    entries: BTreeMap<String, SinkEntry>,
}

struct SinkEntry {
    surface: String,
    confidence: f64,
    pattern: String,
    parent_hint: Option<String>,
    evidence: Vec<TextUnit>,
}

impl CandidateSink {
    fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    fn add(
        &mut self,
        surface: &str,
        confidence: f64,
        unit: &TextUnit,
        pattern: &str,
        parent_hint: Option<String>,
    ) {
        let key = comparison_key(surface);
        if key.is_empty() {
            return;
        }

        let entry = self.entries.entry(key).or_insert_with(|| SinkEntry {
            surface: surface.to_string(),
            confidence,
            pattern: pattern.to_string(),
            parent_hint: None,
            evidence: Vec::new(),
        });

        if confidence > entry.confidence {
            entry.confidence = confidence;
            entry.surface = surface.to_string();
            entry.pattern = pattern.to_string();
        }
        if entry.parent_hint.is_none() {
            entry.parent_hint = parent_hint;
        }
        if !entry.evidence.iter().any(|u| u.key() == unit.key()) {
            entry.evidence.push(unit.clone());
        }
    }

    fn into_candidates(self, stoplist: &HashSet<String>) -> Vec<ConceptCandidate> {
        self.entries
            .into_iter()
            .filter(|(key, _)| !stoplist.contains(key))
            .map(|(_, entry)| {
                let mut candidate = ConceptCandidate::new(
                    entry.surface,
                    StrategyKind::RuleBased,
                    entry.confidence,
                    entry.evidence,
                )
                .with_metadata(META_PATTERN, entry.pattern);
                if let Some(hint) = entry.parent_hint {
                    candidate = candidate.with_metadata(META_PARENT_HINT, hint);
                }
                candidate
            })
            .collect()
    }
}
