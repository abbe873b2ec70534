use std::time::Duration;

use studybuddy_llm::{CallScope, GenerationOptions, LlmProvider};
use studybuddy_memory::EmbeddingIndex;

use crate::error::StudyError;

/// What the QA and quiz generators share: a provider, the index to retrieve from,
/// sampling options and the scopes bounding embedding and completion calls.
#[derive(Debug, Clone)]
pub struct GenerationContext<'a, P> {
    pub provider: &'a P,
    pub index: &'a EmbeddingIndex,
    pub options: GenerationOptions,
    pub retrieval_scope: CallScope,
    pub generation_scope: CallScope,
}

impl<'a, P: LlmProvider> GenerationContext<'a, P> {
    #[must_use]
    pub fn new(provider: &'a P, index: &'a EmbeddingIndex) -> Self {
        Self {
            provider,
            index,
            options: GenerationOptions::default(),
            retrieval_scope: CallScope::unbounded(),
            generation_scope: CallScope::unbounded(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Derive both scopes from one caller scope. A timeout already set on `scope`
    /// wins over the per-kind defaults.
    #[must_use]
    pub fn with_scope(mut self, scope: &CallScope, embedding: Duration, llm: Duration) -> Self {
        self.retrieval_scope = bounded(scope, embedding);
        self.generation_scope = bounded(scope, llm);
        self
    }

    pub(crate) async fn complete(&self, prompt: &str) -> Result<String, StudyError> {
        let started = std::time::Instant::now();
        let text = self
            .generation_scope
            .run(self.provider.complete(prompt, &self.options))
            .await?;
        tracing::debug!(
            provider = self.provider.name(),
            prompt_chars = prompt.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "completion finished"
        );
        Ok(text)
    }
}

pub(crate) fn bounded(scope: &CallScope, default: Duration) -> CallScope {
    if scope.timeout().is_some() {
        scope.clone()
    } else {
        scope.clone().with_timeout(default)
    }
}
