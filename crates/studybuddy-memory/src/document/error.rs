use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// A file (or the corpus directory) could not be read or decoded.
    #[error("failed to load {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: LoadCause,
    },

    #[error("unsupported format {extension:?} (supported: {})", .supported.join(", "))]
    UnsupportedFormat {
        extension: String,
        supported: Vec<String>,
    },
}

impl DocumentError {
    pub(crate) fn load(path: &Path, cause: impl Into<LoadCause>) -> Self {
        Self::Load {
            path: path.to_path_buf(),
            source: cause.into(),
        }
    }
}

/// Underlying reason a [`DocumentError::Load`] happened.
#[derive(Debug, thiserror::Error)]
pub enum LoadCause {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(String),

    #[cfg(feature = "office")]
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[cfg(feature = "office")]
    #[error("XML error: {0}")]
    Xml(String),

    #[cfg(feature = "office")]
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    #[cfg(feature = "html")]
    #[error("HTML error: {0}")]
    Html(String),

    #[error("decoder task failed: {0}")]
    Task(String),
}
