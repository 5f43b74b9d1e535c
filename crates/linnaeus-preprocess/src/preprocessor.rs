//! Core preprocessor implementation

use crate::config::PreprocessConfig;
use crate::document::Document;
use crate::error::PreprocessError;
use crate::segment::split_sentences;
use linnaeus_domain::TextUnit;
use tracing::debug;

/// Converts raw documents into ordered, attributed text units
///
/// The transform is pure and lossless with respect to usable content:
/// units come out in source order, each carrying the page number and
/// section (when structural metadata was provided) of its first byte.
pub struct TextPreprocessor {
    config: PreprocessConfig,
}

impl TextPreprocessor {
    /// Create a preprocessor, validating the configuration eagerly
    pub fn new(config: PreprocessConfig) -> Result<Self, PreprocessError> {
        config.validate().map_err(PreprocessError::Config)?;
        Ok(Self { config })
    }

    /// Create a preprocessor with default configuration
    pub fn default_config() -> Self {
        Self {
            config: PreprocessConfig::default(),
        }
    }

    /// Preprocess one document into its text units
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::ContentTooShort`] when the document's
    /// usable content falls below the configured minimum. Callers skip
    /// the document and continue with the rest of the collection.
    pub fn preprocess(&self, document: &Document) -> Result<Vec<TextUnit>, PreprocessError> {
        let usable: usize = document
            .raw_text
            .split_whitespace()
            .map(|w| w.chars().count())
            .sum();

        if usable < self.config.min_content_chars {
            return Err(PreprocessError::ContentTooShort {
                actual: usable,
                required: self.config.min_content_chars,
            });
        }

        let spans = split_sentences(&document.raw_text, &self.config.abbreviations);

        // Fold fragments shorter than the minimum into their predecessor
        // so stray headings don't become standalone evidence sentences.
        let mut merged: Vec<(usize, String)> = Vec::with_capacity(spans.len());
        for span in spans {
            let words = span.text.split_whitespace().count();
            match merged.last_mut() {
                Some((_, prev)) if words < self.config.min_sentence_words => {
                    prev.push(' ');
                    prev.push_str(&span.text);
                }
                _ => merged.push((span.offset, span.text)),
            }
        }

        let units: Vec<TextUnit> = merged
            .into_iter()
            .enumerate()
            .map(|(index, (offset, text))| {
                let mut unit =
                    TextUnit::new(document.id.clone(), index, document.page_at(offset), text);
                if let Some(section) = document.section_at(offset) {
                    unit = unit.with_section(section);
                }
                unit
            })
            .collect();

        debug!(
            "Preprocessed '{}' into {} units ({} usable chars)",
            document.id,
            units.len(),
            usable
        );

        Ok(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SectionBreak;

    const PAPER: &str = "Convolutional neural networks are a type of deep neural network. \
        They excel at image classification tasks across many benchmark datasets. \
        Recent work applies attention mechanisms to further improve accuracy.";

    #[test]
    fn test_orders_and_indexes_units() {
        let preprocessor = TextPreprocessor::default_config();
        let doc = Document::new("paper1", PAPER);

        let units = preprocessor.preprocess(&doc).unwrap();
        assert_eq!(units.len(), 3);
        for (i, unit) in units.iter().enumerate() {
            assert_eq!(unit.sentence_index, i);
            assert_eq!(unit.document_id, "paper1");
        }
        assert!(units[0].text.starts_with("Convolutional"));
    }

    #[test]
    fn test_short_document_rejected() {
        let preprocessor = TextPreprocessor::default_config();
        let doc = Document::new("tiny", "Ten short words do not make a usable document here.");

        let result = preprocessor.preprocess(&doc);
        assert!(matches!(
            result,
            Err(PreprocessError::ContentTooShort { .. })
        ));
    }

    #[test]
    fn test_page_attribution_flows_through() {
        let preprocessor = TextPreprocessor::default_config();
        // Second and third sentences fall past the page break
        let break_at = PAPER.find("They").unwrap();
        let doc = Document::new("paper1", PAPER).with_page_breaks(vec![break_at]);

        let units = preprocessor.preprocess(&doc).unwrap();
        assert_eq!(units[0].page_number, 1);
        assert_eq!(units[1].page_number, 2);
        assert_eq!(units[2].page_number, 2);
    }

    #[test]
    fn test_section_attribution_flows_through() {
        let preprocessor = TextPreprocessor::default_config();
        let break_at = PAPER.find("Recent").unwrap();
        let doc = Document::new("paper1", PAPER).with_section_breaks(vec![SectionBreak {
            offset: break_at,
            name: "2. Related Work".to_string(),
        }]);

        let units = preprocessor.preprocess(&doc).unwrap();
        assert_eq!(units[0].section_id, None);
        assert_eq!(units[2].section_id.as_deref(), Some("2. Related Work"));
    }

    #[test]
    fn test_short_fragments_folded() {
        let preprocessor = TextPreprocessor::default_config();
        let text = format!("{} Abstract. {}", PAPER, PAPER);
        let doc = Document::new("paper1", text);

        let units = preprocessor.preprocess(&doc).unwrap();
        // "Abstract." is glued to its predecessor rather than standing alone
        assert!(units.iter().all(|u| u.word_count() >= 3));
    }

    #[test]
    fn test_deterministic() {
        let preprocessor = TextPreprocessor::default_config();
        let doc = Document::new("paper1", PAPER);

        let a = preprocessor.preprocess(&doc).unwrap();
        let b = preprocessor.preprocess(&doc).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let mut config = PreprocessConfig::default();
        config.min_content_chars = 0;
        assert!(TextPreprocessor::new(config).is_err());
    }
}
