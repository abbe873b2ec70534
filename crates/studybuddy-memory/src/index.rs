//! In-memory embedding index with cosine-similarity search.
//!
//! Built once from a chunk sequence and read-only afterwards; share it behind an
//! `Arc` for concurrent searches.

use std::collections::BTreeSet;
use std::fmt;

use futures::StreamExt;
use futures::stream;
use studybuddy_llm::{CallScope, LlmError, LlmProvider};

use crate::document::{Chunk, SegmentMetadata};
use crate::error::{ConfigError, IndexError};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Maximum number of embedding requests in flight.
    pub concurrency: usize,
    pub scope: CallScope,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            scope: CallScope::unbounded(),
        }
    }
}

#[derive(Debug)]
pub enum FailureReason {
    Embedding(LlmError),
    EmptyVector,
    Dimension { expected: usize, actual: usize },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedding(e) => write!(f, "{e}"),
            Self::EmptyVector => f.write_str("provider returned an empty vector"),
            Self::Dimension { expected, actual } => {
                write!(f, "vector has {actual} dimensions, expected {expected}")
            }
        }
    }
}

/// A chunk that was left out of the index.
#[derive(Debug)]
pub struct EmbedFailure {
    /// Position of the chunk in the build input.
    pub position: usize,
    pub metadata: SegmentMetadata,
    pub reason: FailureReason,
}

#[derive(Debug)]
pub struct IndexBuild {
    pub index: EmbeddingIndex,
    pub failures: Vec<EmbedFailure>,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub chunk: Chunk,
    pub score: f32,
}

/// Metadata predicate for filtered search. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub source_file: Option<String>,
    pub file_type: Option<String>,
}

impl SearchFilter {
    #[must_use]
    pub fn source_file(name: impl Into<String>) -> Self {
        Self {
            source_file: Some(name.into()),
            file_type: None,
        }
    }

    #[must_use]
    pub fn matches(&self, metadata: &SegmentMetadata) -> bool {
        if let Some(source) = &self.source_file
            && *source != metadata.source_file
        {
            return false;
        }
        if let Some(file_type) = &self.file_type
            && !file_type.eq_ignore_ascii_case(&metadata.file_type)
        {
            return false;
        }
        true
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source_file, &self.file_type) {
            (Some(source), Some(ty)) => write!(f, "source file {source:?} of type {ty:?}"),
            (Some(source), None) => write!(f, "source file {source:?}"),
            (None, Some(ty)) => write!(f, "file type {ty:?}"),
            (None, None) => f.write_str("any content"),
        }
    }
}

#[derive(Debug, Clone)]
struct IndexedEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct EmbeddingIndex {
    entries: Vec<IndexedEntry>,
    dimensions: usize,
}

impl EmbeddingIndex {
    /// Embed every chunk and build an index from the ones that succeed.
    ///
    /// Chunks whose embedding fails, or whose vector dimensionality differs from
    /// the first vector, are reported in [`IndexBuild::failures`] and left out.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::EmptyCorpus`] for an empty input, the timeout or
    /// cancellation error as soon as one occurs, or the first chunk's error if no
    /// chunk could be embedded.
    pub async fn build<P: LlmProvider>(
        chunks: Vec<Chunk>,
        provider: &P,
        options: &BuildOptions,
    ) -> Result<IndexBuild, IndexError> {
        if chunks.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }
        let total = chunks.len();
        let scope = &options.scope;
        let started = std::time::Instant::now();

        let mut embedded = stream::iter(chunks.into_iter().enumerate())
            .map(|(position, chunk)| async move {
                let result = scope.run(provider.embed(&chunk.text)).await;
                (position, chunk, result)
            })
            .buffered(options.concurrency.max(1));

        let mut index = Self::default();
        let mut failures = Vec::new();
        while let Some((position, chunk, result)) = embedded.next().await {
            let reason = match result {
                Err(e) if e.is_timeout_or_cancelled() => return Err(IndexError::Embedding(e)),
                Err(e) => FailureReason::Embedding(e),
                Ok(vector) if vector.is_empty() => FailureReason::EmptyVector,
                Ok(vector) if index.entries.is_empty() || vector.len() == index.dimensions => {
                    index.dimensions = vector.len();
                    index.entries.push(IndexedEntry { chunk, vector });
                    continue;
                }
                Ok(vector) => FailureReason::Dimension {
                    expected: index.dimensions,
                    actual: vector.len(),
                },
            };
            tracing::warn!(
                file = %chunk.metadata.source_file,
                chunk = chunk.chunk_index,
                "excluding chunk from index: {reason}"
            );
            failures.push(EmbedFailure {
                position,
                metadata: chunk.metadata,
                reason,
            });
        }

        if index.entries.is_empty() {
            let first = failures.into_iter().next().map(|f| f.reason);
            return Err(IndexError::Embedding(match first {
                Some(FailureReason::Embedding(e)) => e,
                _ => LlmError::EmptyResponse {
                    provider: provider.name().to_owned(),
                },
            }));
        }

        tracing::info!(
            entries = index.entries.len(),
            failed = failures.len(),
            total,
            dimensions = index.dimensions,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "embedding index built"
        );
        Ok(IndexBuild { index, failures })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Distinct source files across all entries, sorted.
    #[must_use]
    pub fn list_source_files(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.chunk.metadata.source_file.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// The `k` entries most similar to `query`, best first. Equal scores keep
    /// insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::EmptyIndex`], a [`ConfigError`] for `k == 0`, or the
    /// query embedding error.
    pub async fn search<P: LlmProvider>(
        &self,
        provider: &P,
        query: &str,
        k: usize,
        scope: &CallScope,
    ) -> Result<Vec<SearchHit>, IndexError> {
        if k == 0 {
            return Err(ConfigError::ZeroTopK.into());
        }
        let query_vector = self.embed_query(provider, query, scope).await?;
        Ok(self
            .rank(&query_vector, k)
            .into_iter()
            .map(|(i, score)| self.hit(i, score))
            .collect())
    }

    /// Rank the top `pool` candidates, keep those matching `filter`, and return at
    /// most `k` of them.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NoMatch`] when no candidate in the pool matches, a
    /// [`ConfigError`] when `k == 0` or `pool < k`, plus the errors of
    /// [`search`](Self::search).
    pub async fn search_filtered<P: LlmProvider>(
        &self,
        provider: &P,
        query: &str,
        k: usize,
        pool: usize,
        filter: &SearchFilter,
        scope: &CallScope,
    ) -> Result<Vec<SearchHit>, IndexError> {
        if k == 0 {
            return Err(ConfigError::ZeroTopK.into());
        }
        if pool < k {
            return Err(ConfigError::PoolTooSmall { pool, k }.into());
        }
        let query_vector = self.embed_query(provider, query, scope).await?;
        let hits: Vec<SearchHit> = self
            .rank(&query_vector, pool)
            .into_iter()
            .filter(|(i, _)| filter.matches(&self.entries[*i].chunk.metadata))
            .take(k)
            .map(|(i, score)| self.hit(i, score))
            .collect();

        if hits.is_empty() {
            tracing::debug!(pool, "no candidates matched {filter}");
            return Err(IndexError::NoMatch {
                filter: filter.clone(),
            });
        }
        Ok(hits)
    }

    async fn embed_query<P: LlmProvider>(
        &self,
        provider: &P,
        query: &str,
        scope: &CallScope,
    ) -> Result<Vec<f32>, IndexError> {
        if self.entries.is_empty() {
            return Err(IndexError::EmptyIndex);
        }
        let vector = scope.run(provider.embed(query)).await?;
        if vector.len() != self.dimensions {
            return Err(IndexError::Embedding(LlmError::InvalidInput(format!(
                "query embedding has {} dimensions, index has {}",
                vector.len(),
                self.dimensions
            ))));
        }
        Ok(vector)
    }

    fn rank(&self, query: &[f32], limit: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(query, &e.vector)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        scored
    }

    fn hit(&self, i: usize, score: f32) -> SearchHit {
        SearchHit {
            chunk: self.entries[i].chunk.clone(),
            score,
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
