use serde::{Deserialize, Serialize};

/// Provenance of a segment. `page` is zero-based and means page, row, slide or
/// sheet depending on `file_type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentMetadata {
    pub source_file: String,
    pub file_type: String,
    pub page: Option<u32>,
}

impl SegmentMetadata {
    #[must_use]
    pub fn new(source_file: impl Into<String>, file_type: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            file_type: file_type.into(),
            page: None,
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(u32::try_from(page).unwrap_or(u32::MAX));
        self
    }

    /// One-based page number for display.
    #[must_use]
    pub fn display_page(&self) -> Option<u32> {
        self.page.map(|p| p.saturating_add(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub metadata: SegmentMetadata,
}

impl Segment {
    #[must_use]
    pub fn new(text: impl Into<String>, metadata: SegmentMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub metadata: SegmentMetadata,
    pub chunk_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_page_is_one_based() {
        let meta = SegmentMetadata::new("a.pdf", "pdf").with_page(0);
        assert_eq!(meta.page, Some(0));
        assert_eq!(meta.display_page(), Some(1));
        assert_eq!(SegmentMetadata::new("b.md", "md").display_page(), None);
    }
}
