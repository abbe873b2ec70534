mod env;
mod types;


pub use types::*;

use std::path::Path;

use anyhow::Context;
use studybuddy_memory::ConfigError;

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if the
    /// resulting values are inconsistent.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!("config file {} not found, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] for zero or inconsistent sizes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chunking.validate()?;
        if self.retrieval.qa_top_k == 0 || self.retrieval.quiz_top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        if self.retrieval.scoped_candidate_pool < self.retrieval.quiz_top_k {
            return Err(ConfigError::PoolTooSmall {
                pool: self.retrieval.scoped_candidate_pool,
                k: self.retrieval.quiz_top_k,
            });
        }
        if self.corpus.load_concurrency == 0 || self.retrieval.embed_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "concurrency limits must be greater than zero".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature {} is outside 0.0..=2.0",
                self.llm.temperature
            )));
        }
        if self.timeouts.llm_seconds == 0 || self.timeouts.embedding_seconds == 0 {
            return Err(ConfigError::Invalid("timeouts must be at least one second".into()));
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::Invalid("max_tokens must be greater than zero".into()));
        }
        Ok(())
    }
}
