//! Directory and file-list ingestion through the loader registry.

use std::fmt;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use futures::stream;

use super::registry::LoaderRegistry;
use super::{DocumentError, Segment, extension_of, file_name_of};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// No loader is registered for the extension.
    Unsupported,
    /// The loader failed.
    Load,
    /// The file loaded but contained no extractable text.
    Empty,
}

/// A file that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub file: String,
    pub kind: WarningKind,
    pub message: String,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped {}: {}", self.file, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorpusLoad {
    pub segments: Vec<Segment>,
    /// Base names of files that produced at least one segment, in load order.
    pub loaded_files: Vec<String>,
    pub warnings: Vec<LoadWarning>,
}

impl CorpusLoad {
    #[must_use]
    pub fn files_loaded(&self) -> usize {
        self.loaded_files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CorpusLoader {
    registry: LoaderRegistry,
    concurrency: usize,
}

impl CorpusLoader {
    #[must_use]
    pub fn new(registry: LoaderRegistry, concurrency: usize) -> Self {
        Self {
            registry,
            concurrency: concurrency.max(1),
        }
    }

    /// Load every regular, non-hidden file directly inside `dir`, in file-name
    /// order. Subdirectories are not descended into.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Load`] if the directory cannot be read. Per-file
    /// failures are reported as warnings instead.
    pub async fn load_directory(&self, dir: &Path) -> Result<CorpusLoad, DocumentError> {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| DocumentError::load(dir, e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DocumentError::load(dir, e))?
        {
            let path = entry.path();
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!("cannot stat {}: {e}", path.display()),
            }
        }
        files.sort_by_key(|p| p.file_name().map(std::ffi::OsStr::to_os_string));

        tracing::info!(dir = %dir.display(), files = files.len(), "loading corpus directory");
        Ok(self.load_files(&files).await)
    }

    /// Load an explicit list of files, preserving the given order.
    pub async fn load_files(&self, paths: &[PathBuf]) -> CorpusLoad {
        let registry = &self.registry;
        let results: Vec<(&PathBuf, Result<Vec<Segment>, DocumentError>)> = stream::iter(paths)
            .map(|path| async move { (path, registry.load(path).await) })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut corpus = CorpusLoad::default();
        for (path, result) in results {
            let file = file_name_of(path);
            match result {
                Ok(segments) if segments.is_empty() => {
                    tracing::warn!(file = %file, "no extractable text");
                    corpus.warnings.push(LoadWarning {
                        file,
                        kind: WarningKind::Empty,
                        message: "no extractable text".into(),
                    });
                }
                Ok(segments) => {
                    let file_type = extension_of(path);
                    tracing::debug!(file = %file, segments = segments.len(), "loaded");
                    corpus.segments.extend(segments.into_iter().map(|mut s| {
                        s.metadata.source_file.clone_from(&file);
                        s.metadata.file_type.clone_from(&file_type);
                        s
                    }));
                    corpus.loaded_files.push(file);
                }
                Err(e) => {
                    let kind = match &e {
                        DocumentError::UnsupportedFormat { .. } => WarningKind::Unsupported,
                        DocumentError::Load { .. } => WarningKind::Load,
                    };
                    tracing::warn!(file = %file, "skipping file: {e}");
                    corpus.warnings.push(LoadWarning {
                        file,
                        kind,
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            files = corpus.files_loaded(),
            segments = corpus.segments.len(),
            skipped = corpus.warnings.len(),
            "corpus loaded"
        );
        corpus
    }
}
