use std::path::Path;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, DocumentLoader, LoadFuture, decode_blocking, read_limited,
    whole_document,
};
use super::ooxml;

/// Word documents, loaded as one segment with one line per paragraph.
pub struct DocxLoader {
    pub max_file_size: u64,
}

impl Default for DocxLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for DocxLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let bytes = read_limited(&path, max_size).await?;
            let text = decode_blocking(&path, move || {
                let mut archive = ooxml::open(bytes)?;
                let xml = ooxml::read_entry(&mut archive, "word/document.xml")?;
                ooxml::extract_text(&xml, &ooxml::WORDPROCESSING)
            })
            .await?;
            Ok(whole_document(&path, text))
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentError, LoadCause};

    #[tokio::test]
    async fn paragraphs_joined_by_newline() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("essay.docx");
        std::fs::write(
            &file,
            ooxml::fixtures::docx(&["Introduction", "The cell is the unit of life."]),
        )
        .unwrap();

        let segments = DocxLoader::default().load(&file).await.unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Introduction\nThe cell is the unit of life.");
        assert_eq!(segments[0].metadata.file_type, "docx");
        assert_eq!(segments[0].metadata.page, None);
    }

    #[tokio::test]
    async fn not_a_zip_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("fake.docx");
        std::fs::write(&file, "plain text pretending").unwrap();

        let err = DocxLoader::default().load(&file).await.unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Load {
                source: LoadCause::Archive(_),
                ..
            }
        ));
    }
}
