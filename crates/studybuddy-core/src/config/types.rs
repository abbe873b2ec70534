use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use studybuddy_llm::GenerationOptions;
use studybuddy_memory::SplitterConfig;
use studybuddy_memory::document::DEFAULT_MAX_FILE_SIZE;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub chunking: SplitterConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Ollama,
    Compatible,
    Mock,
}

impl ProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Compatible => "compatible",
            Self::Mock => "mock",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider() -> ProviderKind {
    ProviderKind::Ollama
}

fn default_base_url() -> String {
    "http://localhost:11434".into()
}

fn default_model() -> String {
    "mistral:7b".into()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".into()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl LlmConfig {
    #[must_use]
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorpusConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default = "default_load_concurrency")]
    pub load_concurrency: usize,
}

fn default_directory() -> PathBuf {
    PathBuf::from("files")
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_load_concurrency() -> usize {
    4
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            max_file_size: default_max_file_size(),
            load_concurrency: default_load_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_qa_top_k")]
    pub qa_top_k: usize,
    #[serde(default = "default_quiz_top_k")]
    pub quiz_top_k: usize,
    /// Candidates ranked before the source-file filter is applied.
    #[serde(default = "default_scoped_candidate_pool")]
    pub scoped_candidate_pool: usize,
    #[serde(default = "default_embed_concurrency")]
    pub embed_concurrency: usize,
}

fn default_qa_top_k() -> usize {
    4
}

fn default_quiz_top_k() -> usize {
    8
}

fn default_scoped_candidate_pool() -> usize {
    20
}

fn default_embed_concurrency() -> usize {
    4
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            qa_top_k: default_qa_top_k(),
            quiz_top_k: default_quiz_top_k(),
            scoped_candidate_pool: default_scoped_candidate_pool(),
            embed_concurrency: default_embed_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_llm_timeout")]
    pub llm_seconds: u64,
    #[serde(default = "default_embedding_timeout")]
    pub embedding_seconds: u64,
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_embedding_timeout() -> u64 {
    30
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            llm_seconds: default_llm_timeout(),
            embedding_seconds: default_embedding_timeout(),
        }
    }
}

impl TimeoutConfig {
    #[must_use]
    pub fn llm(&self) -> Duration {
        Duration::from_secs(self.llm_seconds)
    }

    #[must_use]
    pub fn embedding(&self) -> Duration {
        Duration::from_secs(self.embedding_seconds)
    }
}

/// Wrapper for sensitive strings with redacted Debug/Display.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Values that only ever come from the environment and are never serialized.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSecrets {
    pub llm_api_key: Option<Secret>,
}

/// The parts of [`Config`] a [`Session`](crate::Session) needs.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub corpus: CorpusConfig,
    pub chunking: SplitterConfig,
    pub retrieval: RetrievalConfig,
    pub generation: GenerationOptions,
    pub timeouts: TimeoutConfig,
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            corpus: config.corpus.clone(),
            chunking: config.chunking,
            retrieval: config.retrieval,
            generation: config.llm.generation_options(),
            timeouts: config.timeouts,
        }
    }
}
