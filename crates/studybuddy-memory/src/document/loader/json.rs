use std::path::Path;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, DocumentError, DocumentLoader, LoadFuture, decode_text, read_limited,
    whole_document,
};

/// Whole JSON structure, pretty-printed with two-space indentation. No field
/// extraction.
pub struct JsonLoader {
    pub max_file_size: u64,
}

impl Default for JsonLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for JsonLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let text = decode_text(read_limited(&path, max_size).await?);
            let value: serde_json::Value =
                serde_json::from_str(&text).map_err(|e| DocumentError::load(&path, e))?;
            let pretty =
                serde_json::to_string_pretty(&value).map_err(|e| DocumentError::load(&path, e))?;
            Ok(whole_document(&path, pretty))
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }
}
