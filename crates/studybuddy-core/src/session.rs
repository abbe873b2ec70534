//! One study session: a provider, its settings and the currently installed index.

use std::path::PathBuf;
use std::sync::Arc;

use studybuddy_llm::{CallScope, LlmProvider};
use studybuddy_memory::{
    BuildOptions, CorpusLoader, EmbedFailure, EmbeddingIndex, IndexError, LoadWarning,
    LoaderRegistry, TextSplitter,
};

use crate::config::Settings;
use crate::error::StudyError;
use crate::generation::{GenerationContext, bounded};
use crate::qa::{self, Answer};
use crate::quiz::{self, Quiz, QuizRequest};

/// Where to read documents from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusSource {
    /// Every supported file directly inside the directory.
    Directory(PathBuf),
    /// Exactly these files, in this order.
    Files(Vec<PathBuf>),
}

/// What a successful [`Session::load_corpus`] did.
#[derive(Debug)]
pub struct LoadSummary {
    pub files_loaded: usize,
    pub segments: usize,
    pub chunks: usize,
    /// Chunks that made it into the index.
    pub indexed: usize,
    pub warnings: Vec<LoadWarning>,
    pub embed_failures: Vec<EmbedFailure>,
}

/// A built index that has not been installed yet.
#[derive(Debug)]
pub struct PreparedCorpus {
    index: EmbeddingIndex,
    summary: LoadSummary,
}

impl PreparedCorpus {
    #[must_use]
    pub fn summary(&self) -> &LoadSummary {
        &self.summary
    }
}

pub struct Session<P> {
    provider: P,
    settings: Settings,
    registry: LoaderRegistry,
    index: Option<Arc<EmbeddingIndex>>,
}

impl<P> std::fmt::Debug for Session<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("settings", &self.settings)
            .field("indexed", &self.index.as_ref().map(|i| i.len()))
            .finish_non_exhaustive()
    }
}

impl<P: LlmProvider> Session<P> {
    #[must_use]
    pub fn new(provider: P, settings: Settings) -> Self {
        let registry = LoaderRegistry::with_defaults(settings.corpus.max_file_size);
        Self {
            provider,
            settings,
            registry,
            index: None,
        }
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The installed index, if a corpus has been loaded.
    #[must_use]
    pub fn index(&self) -> Option<&Arc<EmbeddingIndex>> {
        self.index.as_ref()
    }

    /// Load, split and embed a corpus, then replace the installed index.
    ///
    /// On any error the previously installed index stays in place.
    ///
    /// # Errors
    ///
    /// See [`prepare_corpus`](Self::prepare_corpus).
    pub async fn load_corpus(
        &mut self,
        source: CorpusSource,
        scope: &CallScope,
    ) -> Result<LoadSummary, StudyError> {
        let prepared = self.prepare_corpus(&source, scope).await?;
        Ok(self.install(prepared))
    }

    /// Load, split and embed a corpus without touching the installed index.
    ///
    /// Takes `&self`, so a caller can retry it before committing the result with
    /// [`install`](Self::install).
    ///
    /// # Errors
    ///
    /// Returns [`StudyError::NoCorpusFound`] when no file produced text, a
    /// document error when the directory cannot be read, a config error for
    /// invalid chunking settings, or the embedding error that aborted the build.
    pub async fn prepare_corpus(
        &self,
        source: &CorpusSource,
        scope: &CallScope,
    ) -> Result<PreparedCorpus, StudyError> {
        let splitter = TextSplitter::new(self.settings.chunking)?;
        let loader = CorpusLoader::new(self.registry.clone(), self.settings.corpus.load_concurrency);

        let corpus = match source {
            CorpusSource::Directory(dir) => loader.load_directory(dir).await?,
            CorpusSource::Files(paths) => loader.load_files(paths).await,
        };
        if corpus.is_empty() {
            tracing::warn!(skipped = corpus.warnings.len(), "no documents could be loaded");
            return Err(StudyError::NoCorpusFound {
                warnings: corpus.warnings,
            });
        }

        let chunks = splitter.split_all(&corpus.segments);
        if chunks.is_empty() {
            return Err(StudyError::NoCorpusFound {
                warnings: corpus.warnings,
            });
        }
        let chunk_count = chunks.len();
        tracing::info!(
            segments = corpus.segments.len(),
            chunks = chunk_count,
            "corpus split"
        );

        let options = BuildOptions {
            concurrency: self.settings.retrieval.embed_concurrency,
            scope: bounded(scope, self.settings.timeouts.embedding()),
        };
        let build = EmbeddingIndex::build(chunks, &self.provider, &options).await?;

        let summary = LoadSummary {
            files_loaded: corpus.files_loaded(),
            segments: corpus.segments.len(),
            chunks: chunk_count,
            indexed: build.index.len(),
            warnings: corpus.warnings,
            embed_failures: build.failures,
        };
        Ok(PreparedCorpus {
            index: build.index,
            summary,
        })
    }

    /// Replace the installed index with a prepared one.
    pub fn install(&mut self, prepared: PreparedCorpus) -> LoadSummary {
        self.index = Some(Arc::new(prepared.index));
        prepared.summary
    }

    /// Distinct source files in the installed index, sorted. Empty before the
    /// first successful load.
    #[must_use]
    pub fn list_source_files(&self) -> Vec<String> {
        self.index
            .as_ref()
            .map(|index| index.list_source_files())
            .unwrap_or_default()
    }

    /// Indexed source files whose name contains `fragment`, ignoring case. An
    /// exact name match is returned alone.
    #[must_use]
    pub fn match_source_files(&self, fragment: &str) -> Vec<String> {
        let files = self.list_source_files();
        if let Some(exact) = files.iter().find(|f| f.as_str() == fragment) {
            return vec![exact.clone()];
        }
        let needle = fragment.to_lowercase();
        files
            .into_iter()
            .filter(|f| f.to_lowercase().contains(&needle))
            .collect()
    }

    /// # Errors
    ///
    /// Returns `EmptyIndex` before a corpus is loaded, otherwise the errors of
    /// [`qa::answer`].
    pub async fn answer(&self, question: &str, scope: &CallScope) -> Result<Answer, StudyError> {
        let index = self.require_index()?;
        let ctx = self.context(index, scope);
        qa::answer(&ctx, question, self.settings.retrieval.qa_top_k).await
    }

    /// # Errors
    ///
    /// Returns `EmptyIndex` before a corpus is loaded, otherwise the errors of
    /// [`quiz::generate`].
    pub async fn quiz(&self, request: &QuizRequest, scope: &CallScope) -> Result<Quiz, StudyError> {
        let index = self.require_index()?;
        let ctx = self.context(index, scope);
        let retrieval = &self.settings.retrieval;
        quiz::generate(
            &ctx,
            request,
            retrieval.quiz_top_k,
            retrieval.scoped_candidate_pool,
        )
        .await
    }

    fn require_index(&self) -> Result<&EmbeddingIndex, StudyError> {
        self.index
            .as_deref()
            .ok_or(StudyError::Index(IndexError::EmptyIndex))
    }

    fn context<'a>(&'a self, index: &'a EmbeddingIndex, scope: &CallScope) -> GenerationContext<'a, P> {
        GenerationContext::new(&self.provider, index)
            .with_options(self.settings.generation)
            .with_scope(
                scope,
                self.settings.timeouts.embedding(),
                self.settings.timeouts.llm(),
            )
    }
}
