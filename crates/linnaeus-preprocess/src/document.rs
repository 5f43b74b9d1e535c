//! Input document representation

use serde::{Deserialize, Serialize};

/// A section boundary: byte offset into the raw text plus section name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionBreak {
    /// Byte offset where the section starts
    pub offset: usize,
    /// Section name, e.g. "2. Methods"
    pub name: String,
}

/// A raw document handed to the preprocessor
///
/// Page and section breaks are optional; when absent, every unit lands on
/// page 1 with no section attribution. Offsets are byte positions into
/// `raw_text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable document identifier
    pub id: String,

    /// The full extracted text
    pub raw_text: String,

    /// Byte offsets where a new page starts (page 1 starts implicitly
    /// at offset 0)
    pub page_breaks: Vec<usize>,

    /// Section boundaries, ascending by offset
    pub section_breaks: Vec<SectionBreak>,
}

impl Document {
    /// Create a document with no structural metadata
    pub fn new(id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            raw_text: raw_text.into(),
            page_breaks: Vec::new(),
            section_breaks: Vec::new(),
        }
    }

    /// Attach page break offsets
    pub fn with_page_breaks(mut self, page_breaks: Vec<usize>) -> Self {
        self.page_breaks = page_breaks;
        self
    }

    /// Attach section boundaries
    pub fn with_section_breaks(mut self, section_breaks: Vec<SectionBreak>) -> Self {
        self.section_breaks = section_breaks;
        self
    }

    /// Page number (1-based) containing the given byte offset
    pub fn page_at(&self, offset: usize) -> usize {
        1 + self.page_breaks.iter().filter(|b| **b <= offset).count()
    }

    /// Section name in effect at the given byte offset, if any
    pub fn section_at(&self, offset: usize) -> Option<&str> {
        self.section_breaks
            .iter()
            .take_while(|s| s.offset <= offset)
            .last()
            .map(|s| s.name.as_str())
    }
}
