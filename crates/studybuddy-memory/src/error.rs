use studybuddy_llm::LlmError;

use crate::index::SearchFilter;

/// Invalid parameters. Never transient: fix the configuration instead of retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({size})")]
    OverlapTooLarge { overlap: usize, size: usize },

    #[error("top-k must be greater than zero")]
    ZeroTopK,

    #[error("candidate pool ({pool}) must be at least top-k ({k})")]
    PoolTooSmall { pool: usize, k: usize },

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Build was called with no chunks.
    #[error("nothing to index: the corpus produced no chunks")]
    EmptyCorpus,

    /// Search on an index without entries.
    #[error("the index is empty; load a corpus first")]
    EmptyIndex,

    /// Filtered search found no candidate satisfying the filter.
    #[error("no indexed content matches {filter}")]
    NoMatch { filter: SearchFilter },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("embedding failed: {0}")]
    Embedding(#[from] LlmError),
}

