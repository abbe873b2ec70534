use std::fmt;

use studybuddy_llm::LlmError;
use studybuddy_llm::retry::Transient;
use studybuddy_memory::{ConfigError, DocumentError, IndexError, LoadWarning};

#[derive(Debug, thiserror::Error)]
pub enum StudyError {
    /// The corpus produced no segments. The previous index, if any, is kept.
    #[error("no documents could be loaded ({} file(s) skipped)", .warnings.len())]
    NoCorpusFound { warnings: Vec<LoadWarning> },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Index(IndexError),

    #[error(transparent)]
    Llm(LlmError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<IndexError> for StudyError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Embedding(e) => Self::Llm(e),
            IndexError::Config(e) => Self::Config(e),
            other => Self::Index(other),
        }
    }
}

impl From<LlmError> for StudyError {
    fn from(err: LlmError) -> Self {
        Self::Llm(err)
    }
}

/// Coarse classification for callers deciding how to react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Load,
    UnsupportedFormat,
    Config,
    EmptyCorpus,
    EmptyIndex,
    NoMatch,
    Service,
    InvalidInput,
    Timeout,
    Cancelled,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::UnsupportedFormat => "unsupported-format",
            Self::Config => "config",
            Self::EmptyCorpus => "empty-corpus",
            Self::EmptyIndex => "empty-index",
            Self::NoMatch => "no-match",
            Self::Service => "service",
            Self::InvalidInput => "invalid-input",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StudyError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoCorpusFound { .. } | Self::Index(IndexError::EmptyCorpus) => {
                ErrorKind::EmptyCorpus
            }
            Self::Document(DocumentError::Load { .. }) => ErrorKind::Load,
            Self::Document(DocumentError::UnsupportedFormat { .. }) => ErrorKind::UnsupportedFormat,
            Self::Index(IndexError::EmptyIndex) => ErrorKind::EmptyIndex,
            Self::Index(IndexError::NoMatch { .. }) => ErrorKind::NoMatch,
            Self::Config(_) | Self::Index(IndexError::Config(_)) => ErrorKind::Config,
            Self::Llm(e) | Self::Index(IndexError::Embedding(e)) => match e {
                LlmError::Timeout(_) => ErrorKind::Timeout,
                LlmError::Cancelled => ErrorKind::Cancelled,
                LlmError::Misconfigured { .. } => ErrorKind::Config,
                LlmError::InvalidInput(_) | LlmError::EmbedUnsupported { .. } => {
                    ErrorKind::InvalidInput
                }
                _ => ErrorKind::Service,
            },
        }
    }

    /// True when retrying the same operation later may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Llm(e) | Self::Index(IndexError::Embedding(e)) => e.is_transient(),
            _ => false,
        }
    }
}

impl Transient for StudyError {
    fn is_transient(&self) -> bool {
        StudyError::is_transient(self)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use studybuddy_memory::SearchFilter;

    use super::*;

    #[test]
    fn embedding_errors_are_lifted() {
        let err: StudyError = IndexError::Embedding(LlmError::RateLimited).into();
        assert!(matches!(err, StudyError::Llm(LlmError::RateLimited)));
        assert_eq!(err.kind(), ErrorKind::Service);
        assert!(err.is_transient());
    }

    #[test]
    fn kinds() {
        let no_match: StudyError = IndexError::NoMatch {
            filter: SearchFilter::source_file("x.pdf"),
        }
        .into();
        assert_eq!(no_match.kind(), ErrorKind::NoMatch);
        assert!(!no_match.is_transient());

        let empty: StudyError = IndexError::EmptyIndex.into();
        assert_eq!(empty.kind(), ErrorKind::EmptyIndex);

        let config: StudyError = IndexError::Config(ConfigError::ZeroTopK).into();
        assert!(matches!(config, StudyError::Config(_)));
        assert_eq!(config.kind(), ErrorKind::Config);

        let timeout = StudyError::from(LlmError::Timeout(Duration::from_secs(3)));
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert!(!timeout.is_transient());

        let none = StudyError::NoCorpusFound {
            warnings: Vec::new(),
        };
        assert_eq!(none.kind(), ErrorKind::EmptyCorpus);
        assert_eq!(none.kind().to_string(), "empty-corpus");
    }

    #[test]
    fn refused_credentials_are_config_errors() {
        let err = StudyError::from(LlmError::Misconfigured {
            provider: "compatible".into(),
            message: "embeddings request refused (status 401)".into(),
        });
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(!err.is_transient());
    }

    #[test]
    fn invalid_input_is_permanent() {
        let err = StudyError::from(LlmError::InvalidInput("too long".into()));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(!err.is_transient());
    }
}
