//! Explicit mapping from file extension to loader, populated once at startup.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::loader::{CsvLoader, JsonLoader, TextLoader};
#[cfg(feature = "office")]
use super::loader::{DocxLoader, PptxLoader, SpreadsheetLoader};
#[cfg(feature = "html")]
use super::loader::HtmlLoader;
#[cfg(feature = "pdf")]
use super::loader::PdfLoader;
use super::{DocumentError, DocumentLoader, Segment, extension_of};

#[derive(Clone, Default)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn DocumentLoader>>,
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("extensions", &self.supported_extensions())
            .finish()
    }
}

impl LoaderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every loader compiled into this build.
    ///
    /// PDF, Office and HTML support depend on the `pdf`, `office` and `html`
    /// features; an absent format is reported as unsupported.
    #[must_use]
    pub fn with_defaults(max_file_size: u64) -> Self {
        let mut registry = Self::new();
        registry.register(TextLoader { max_file_size });
        registry.register(JsonLoader { max_file_size });
        registry.register(CsvLoader { max_file_size });
        #[cfg(feature = "pdf")]
        registry.register(PdfLoader { max_file_size });
        #[cfg(feature = "office")]
        {
            registry.register(DocxLoader { max_file_size });
            registry.register(PptxLoader { max_file_size });
            registry.register(SpreadsheetLoader { max_file_size });
        }
        #[cfg(feature = "html")]
        registry.register(HtmlLoader { max_file_size });
        tracing::debug!(extensions = ?registry.supported_extensions(), "loader registry ready");
        registry
    }

    /// Register a loader for each of its extensions, replacing earlier entries.
    pub fn register<L: DocumentLoader + 'static>(&mut self, loader: L) {
        let loader: Arc<dyn DocumentLoader> = Arc::new(loader);
        for ext in loader.supported_extensions() {
            self.loaders.insert(ext.to_lowercase(), Arc::clone(&loader));
        }
    }

    #[must_use]
    pub fn is_supported(&self, extension: &str) -> bool {
        self.loaders
            .contains_key(extension.trim_start_matches('.').to_lowercase().as_str())
    }

    /// Registered extensions, sorted.
    #[must_use]
    pub fn supported_extensions(&self) -> Vec<String> {
        let mut exts: Vec<String> = self.loaders.keys().cloned().collect();
        exts.sort();
        exts
    }

    /// Load a file with the loader registered for its extension.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnsupportedFormat`] when no loader handles the
    /// extension, or the loader's own error.
    pub async fn load(&self, path: &Path) -> Result<Vec<Segment>, DocumentError> {
        let extension = extension_of(path);
        let loader = self
            .loaders
            .get(&extension)
            .ok_or_else(|| DocumentError::UnsupportedFormat {
                extension: extension.clone(),
                supported: self.supported_extensions(),
            })?;
        loader.load(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_registry_is_empty() {
        let registry = LoaderRegistry::new();
        assert!(registry.supported_extensions().is_empty());
        assert!(!registry.is_supported("txt"));
    }

    #[test]
    fn register_maps_every_extension() {
        let mut registry = LoaderRegistry::new();
        registry.register(TextLoader::default());
        assert_eq!(registry.supported_extensions(), vec!["markdown", "md", "txt"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let registry = LoaderRegistry::with_defaults(1024);
        assert!(registry.is_supported("TXT"));
        assert!(registry.is_supported(".md"));
        assert!(registry.is_supported("JSON"));
        assert!(!registry.is_supported("xyz"));
    }

    #[test]
    fn defaults_follow_features() {
        let exts = LoaderRegistry::with_defaults(1024).supported_extensions();
        for ext in ["csv", "json", "md", "markdown", "txt"] {
            assert!(exts.contains(&ext.to_owned()), "{ext} missing");
        }
        assert_eq!(exts.contains(&"pdf".to_owned()), cfg!(feature = "pdf"));
        assert_eq!(exts.contains(&"docx".to_owned()), cfg!(feature = "office"));
        assert_eq!(exts.contains(&"xls".to_owned()), cfg!(feature = "office"));
        assert_eq!(exts.contains(&"htm".to_owned()), cfg!(feature = "html"));
    }

    #[tokio::test]
    async fn unsupported_extension_names_supported_set() {
        let mut registry = LoaderRegistry::new();
        registry.register(JsonLoader::default());
        let err = registry.load(Path::new("notes.xyz")).await.unwrap_err();
        match err {
            DocumentError::UnsupportedFormat {
                extension,
                supported,
            } => {
                assert_eq!(extension, "xyz");
                assert_eq!(supported, vec!["json"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn load_dispatches_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.TXT");
        std::fs::write(&file, "upper-case extension").unwrap();

        let registry = LoaderRegistry::with_defaults(1024);
        let segments = registry.load(&file).await.unwrap();
        assert_eq!(segments[0].text, "upper-case extension");
        assert_eq!(segments[0].metadata.file_type, "txt");
    }
}
