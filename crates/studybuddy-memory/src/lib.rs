//! Document ingestion and retrieval: format loaders, corpus loading, chunking and an
//! in-memory embedding index with cosine search.

pub mod document;
pub mod error;
pub mod index;

pub use document::{
    Chunk, CorpusLoad, CorpusLoader, DocumentError, DocumentLoader, LoadCause, LoadWarning,
    LoaderRegistry, Segment, SegmentMetadata, SplitterConfig, TextSplitter, WarningKind,
};
pub use error::{ConfigError, IndexError};
pub use index::{
    BuildOptions, EmbedFailure, EmbeddingIndex, FailureReason, IndexBuild, SearchFilter, SearchHit,
};
