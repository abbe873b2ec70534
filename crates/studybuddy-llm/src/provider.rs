use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Sampling options for a single completion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 1024,
        }
    }
}

pub trait LlmProvider: Send + Sync {
    /// Map text to a fixed-dimensionality vector.
    ///
    /// # Errors
    ///
    /// Returns a transient error when the service fails, or [`LlmError::InvalidInput`]
    /// when the text is rejected (for example because it is too long).
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send;

    /// Generate text for a prompt.
    ///
    /// # Errors
    ///
    /// Returns a transient error when the service fails, or a permanent error when
    /// the request itself is invalid.
    fn complete(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let opts = GenerationOptions::default();
        assert!((opts.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(opts.max_tokens, 1024);
    }

    #[test]
    fn options_roundtrip_through_toml_shape() {
        let json = serde_json::json!({"temperature": 0.7, "max_tokens": 256});
        let opts: GenerationOptions = serde_json::from_value(json).unwrap();
        assert_eq!(opts.max_tokens, 256);
    }
}
