//! Text units - the atomic evidence currency of the pipeline

use serde::{Deserialize, Serialize};

/// A sentence-bounded span of a source document
///
/// TextUnits are produced once per document ingestion and never mutated.
/// Every character of usable document content maps to exactly one unit, so
/// any concept claim can be traced back to the sentence that supports it.
///
/// Units are owned by the originating document; evidence links reference
/// them by value but identity comparisons go through [`TextUnit::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextUnit {
    /// Identifier of the originating document
    pub document_id: String,

    /// Section the sentence falls in, if section metadata was available
    pub section_id: Option<String>,

    /// Zero-based sentence position within the document
    pub sentence_index: usize,

    /// One-based page number the sentence starts on
    pub page_number: usize,

    /// The sentence text, whitespace-normalized
    pub text: String,
}

/// Identity key for a text unit: (document, sentence position)
///
/// Two units with the same key refer to the same source sentence even if
/// they were carried through different strategies, which is what evidence
/// deduplication cares about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextUnitKey {
    /// Identifier of the originating document
    pub document_id: String,
    /// Zero-based sentence position within the document
    pub sentence_index: usize,
}

impl TextUnit {
    /// Create a new text unit
    pub fn new(
        document_id: impl Into<String>,
        sentence_index: usize,
        page_number: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            section_id: None,
            sentence_index,
            page_number,
            text: text.into(),
        }
    }

    /// Attach a section identifier
    pub fn with_section(mut self, section_id: impl Into<String>) -> Self {
        self.section_id = Some(section_id.into());
        self
    }

    /// Identity key used for evidence deduplication
    pub fn key(&self) -> TextUnitKey {
        TextUnitKey {
            document_id: self.document_id.clone(),
            sentence_index: self.sentence_index,
        }
    }

    /// Word count of the sentence text
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
