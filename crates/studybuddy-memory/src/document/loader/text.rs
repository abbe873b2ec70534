use std::path::Path;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, DocumentLoader, LoadFuture, decode_text, read_limited, whole_document,
};

/// Plain text and Markdown, loaded as one segment per file.
pub struct TextLoader {
    pub max_file_size: u64,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for TextLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let bytes = read_limited(&path, max_size).await?;
            Ok(whole_document(&path, decode_text(bytes)))
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md", "markdown"]
    }
}
