pub mod corpus;
pub mod error;
pub mod loader;
pub mod registry;
pub mod splitter;
pub mod types;

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

pub use corpus::{CorpusLoad, CorpusLoader, LoadWarning, WarningKind};
pub use error::{DocumentError, LoadCause};
pub use registry::LoaderRegistry;
pub use splitter::{SplitterConfig, TextSplitter};
pub use types::{Chunk, Segment, SegmentMetadata};

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

pub type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Segment>, DocumentError>> + Send + 'a>>;

pub trait DocumentLoader: Send + Sync {
    /// Extract ordered segments from one file. An empty result means the file had
    /// no extractable text.
    fn load(&self, path: &Path) -> LoadFuture<'_>;

    /// Lowercase extensions without the leading dot.
    fn supported_extensions(&self) -> &[&str];
}

/// Lowercase extension of `path`, or an empty string.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Base name of `path` as used for `source_file`.
pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn metadata_for(path: &Path) -> SegmentMetadata {
    SegmentMetadata::new(file_name_of(path), extension_of(path))
}

/// Read a whole file after checking it against the size limit.
pub(crate) async fn read_limited(path: &Path, max_size: u64) -> Result<Vec<u8>, DocumentError> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| DocumentError::load(path, e))?;
    if meta.len() > max_size {
        return Err(DocumentError::load(
            path,
            LoadCause::FileTooLarge {
                size: meta.len(),
                limit: max_size,
            },
        ));
    }
    tokio::fs::read(path)
        .await
        .map_err(|e| DocumentError::load(path, e))
}

/// Decode UTF-8 (stripping a BOM), falling back to ISO-8859-1.
pub(crate) fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_owned(),
            None => text,
        },
        Err(err) => {
            tracing::debug!("input is not valid UTF-8, decoding as Latin-1");
            err.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

/// Run a CPU-bound decoder off the async runtime.
#[cfg(any(feature = "pdf", feature = "office"))]
pub(crate) async fn decode_blocking<T, F>(path: &Path, f: F) -> Result<T, DocumentError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, LoadCause> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DocumentError::load(path, LoadCause::Task(e.to_string())))?
        .map_err(|e| DocumentError::load(path, e))
}

/// Wrap non-blank text as a single whole-document segment.
pub(crate) fn whole_document(path: &Path, text: String) -> Vec<Segment> {
    if text.trim().is_empty() {
        Vec::new()
    } else {
        vec![Segment::new(text, metadata_for(path))]
    }
}
