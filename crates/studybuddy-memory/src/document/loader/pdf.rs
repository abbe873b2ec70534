use std::path::Path;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, DocumentLoader, LoadCause, LoadFuture, Segment, decode_blocking,
    metadata_for, read_limited,
};

/// One segment per page with extractable text. `page` is the zero-based page index.
pub struct PdfLoader {
    pub max_file_size: u64,
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let bytes = read_limited(&path, max_size).await?;
            let pages = decode_blocking(&path, move || {
                pdf_extract::extract_text_from_mem_by_pages(&bytes)
                    .map_err(|e| LoadCause::Pdf(e.to_string()))
            })
            .await?;

            let base = metadata_for(&path);
            let segments: Vec<Segment> = pages
                .into_iter()
                .enumerate()
                .filter(|(_, text)| !text.trim().is_empty())
                .map(|(page, text)| Segment::new(text, base.clone().with_page(page)))
                .collect();
            tracing::debug!(file = %base.source_file, pages = segments.len(), "extracted PDF pages");
            Ok(segments)
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }
}
