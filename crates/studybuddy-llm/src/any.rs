use crate::compatible::CompatibleProvider;
use crate::error::LlmError;
#[cfg(feature = "mock")]
use crate::mock::MockProvider;
use crate::ollama::OllamaProvider;
use crate::provider::{GenerationOptions, LlmProvider};

/// Generates a match over all `AnyProvider` variants, binding the inner provider
/// and evaluating the given expression for each arm.
macro_rules! delegate_provider {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyProvider::Ollama($p) => $expr,
            AnyProvider::Compatible($p) => $expr,
            #[cfg(feature = "mock")]
            AnyProvider::Mock($p) => $expr,
        }
    };
}

#[derive(Debug, Clone)]
pub enum AnyProvider {
    Ollama(OllamaProvider),
    Compatible(CompatibleProvider),
    #[cfg(feature = "mock")]
    Mock(MockProvider),
}

impl LlmProvider for AnyProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        delegate_provider!(self, |p| p.embed(text).await)
    }

    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        delegate_provider!(self, |p| p.complete(prompt, options).await)
    }

    fn name(&self) -> &str {
        delegate_provider!(self, |p| p.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_delegates() {
        let ollama = AnyProvider::Ollama(OllamaProvider::new(
            "http://localhost:11434",
            "mistral".into(),
            "nomic".into(),
        ));
        assert_eq!(ollama.name(), "ollama");

        let compatible = AnyProvider::Compatible(CompatibleProvider::new(
            "lmstudio".into(),
            None,
            "http://localhost:1234/v1",
            "m".into(),
            None,
        ));
        assert_eq!(compatible.name(), "lmstudio");
    }

    #[cfg(feature = "mock")]
    #[tokio::test]
    async fn mock_variant_delegates_calls() {
        let mock = MockProvider::with_responses(vec!["hi".into()]);
        let any = AnyProvider::Mock(mock.clone());
        assert_eq!(
            any.complete("q", &GenerationOptions::default()).await.unwrap(),
            "hi"
        );
        assert!(any.embed("q").await.is_ok());
        assert_eq!(mock.embed_calls(), 1);
    }
}
