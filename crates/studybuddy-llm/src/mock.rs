//! Deterministic in-process provider for tests and offline runs.
//!
//! Embeddings are a hashed bag of words, so texts that share vocabulary score
//! higher under cosine similarity. Completions come from a script, then fall back
//! to `default_response`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::LlmError;
use crate::provider::{GenerationOptions, LlmProvider};

pub const DEFAULT_DIMENSIONS: usize = 64;

#[derive(Debug, Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    embed_calls: Arc<AtomicUsize>,
    complete_calls: Arc<AtomicUsize>,
    pub default_response: String,
    pub dimensions: usize,
    pub supports_embeddings: bool,
    pub fail_complete: bool,
    /// Number of leading `complete` calls that fail with a transient error.
    pub transient_failures: usize,
    /// Texts containing any of these markers are rejected by `embed`.
    pub reject_markers: Vec<String>,
    /// Texts containing this marker embed with a different dimensionality.
    pub odd_dimension_marker: Option<String>,
    /// Milliseconds to sleep before returning a response.
    pub delay_ms: u64,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            embed_calls: Arc::new(AtomicUsize::new(0)),
            complete_calls: Arc::new(AtomicUsize::new(0)),
            default_response: "mock response".into(),
            dimensions: DEFAULT_DIMENSIONS,
            supports_embeddings: true,
            fail_complete: false,
            transient_failures: 0,
            reject_markers: Vec::new(),
            odd_dimension_marker: None,
            delay_ms: 0,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_complete: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn without_embeddings() -> Self {
        Self {
            supports_embeddings: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    #[must_use]
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    #[must_use]
    pub fn with_transient_failures(mut self, count: usize) -> Self {
        self.transient_failures = count;
        self
    }

    #[must_use]
    pub fn rejecting(mut self, marker: impl Into<String>) -> Self {
        self.reject_markers.push(marker.into());
        self
    }

    #[must_use]
    pub fn with_odd_dimension_for(mut self, marker: impl Into<String>) -> Self {
        self.odd_dimension_marker = Some(marker.into());
        self
    }

    /// Every prompt passed to `complete`, in call order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
    }
}

impl LlmProvider for MockProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if !self.supports_embeddings {
            return Err(LlmError::EmbedUnsupported {
                provider: "mock".into(),
            });
        }
        if self.reject_markers.iter().any(|m| text.contains(m.as_str())) {
            return Err(LlmError::InvalidInput("mock rejected text".into()));
        }
        let dims = match &self.odd_dimension_marker {
            Some(marker) if text.contains(marker.as_str()) => self.dimensions + 1,
            _ => self.dimensions,
        };
        Ok(bag_of_words(text, dims))
    }

    async fn complete(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let call = self.complete_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_owned());
        self.pause().await;
        if self.fail_complete {
            return Err(LlmError::Service {
                provider: "mock".into(),
                message: "mock LLM error".into(),
            });
        }
        if call < self.transient_failures {
            return Err(LlmError::Unavailable);
        }
        let mut responses = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(responses
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone()))
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}

/// Hash each lowercase word into one of `dims` buckets (FNV-1a).
#[must_use]
pub fn bag_of_words(text: &str, dims: usize) -> Vec<f32> {
    let mut vector = vec![0.0_f32; dims];
    if dims == 0 {
        return vector;
    }
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in word.to_lowercase().bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        #[allow(clippy::cast_possible_truncation)]
        let slot = (hash % dims as u64) as usize;
        vector[slot] += 1.0;
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_responses_then_default() {
        let p = MockProvider::with_responses(vec!["first".into()]);
        let opts = GenerationOptions::default();
        assert_eq!(p.complete("a", &opts).await.unwrap(), "first");
        assert_eq!(p.complete("b", &opts).await.unwrap(), "mock response");
        assert_eq!(p.prompts(), vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(p.complete_calls(), 2);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let p = MockProvider::default();
        let clone = p.clone();
        clone.embed("x").await.unwrap();
        assert_eq!(p.embed_calls(), 1);
    }

    #[tokio::test]
    async fn embedding_is_deterministic_and_case_insensitive() {
        let p = MockProvider::default();
        let a = p.embed("Photosynthesis uses light").await.unwrap();
        let b = p.embed("photosynthesis USES light").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), DEFAULT_DIMENSIONS);
    }

    #[tokio::test]
    async fn reject_marker_is_permanent_error() {
        let p = MockProvider::default().rejecting("POISON");
        let err = p.embed("some POISON text").await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidInput(_)));
        assert!(p.embed("clean text").await.is_ok());
    }

    #[tokio::test]
    async fn odd_dimension_marker() {
        let p = MockProvider::default().with_dimensions(8).with_odd_dimension_for("WIDE");
        assert_eq!(p.embed("WIDE text").await.unwrap().len(), 9);
        assert_eq!(p.embed("text").await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn transient_failures_then_success() {
        let p = MockProvider::with_responses(vec!["ok".into()]).with_transient_failures(2);
        let opts = GenerationOptions::default();
        assert!(p.complete("q", &opts).await.unwrap_err().is_transient());
        assert!(p.complete("q", &opts).await.unwrap_err().is_transient());
        assert_eq!(p.complete("q", &opts).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn failing_and_unsupported() {
        let opts = GenerationOptions::default();
        assert!(MockProvider::failing().complete("q", &opts).await.is_err());
        let err = MockProvider::without_embeddings().embed("q").await.unwrap_err();
        assert!(matches!(err, LlmError::EmbedUnsupported { .. }));
    }

    #[test]
    fn bag_of_words_counts_repeats() {
        let v = bag_of_words("cell cell cell", 16);
        assert!((v.iter().sum::<f32>() - 3.0).abs() < f32::EPSILON);
        assert!(bag_of_words("", 16).iter().all(|x| *x == 0.0));
        assert!(bag_of_words("anything", 0).is_empty());
    }
}
