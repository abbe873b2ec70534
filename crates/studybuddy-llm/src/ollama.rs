use ollama_rs::Ollama;
use ollama_rs::generation::chat::ChatMessage;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};
use ollama_rs::models::ModelOptions;

use crate::error::LlmError;
use crate::provider::{GenerationOptions, LlmProvider};

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Ollama,
    model: String,
    embedding_model: String,
}

impl OllamaProvider {
    #[must_use]
    pub fn new(base_url: &str, model: String, embedding_model: String) -> Self {
        let (host, port) = parse_host_port(base_url);
        Self {
            client: Ollama::new(host, port),
            model,
            embedding_model,
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Check if Ollama is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection to Ollama fails.
    pub async fn health_check(&self) -> Result<(), LlmError> {
        self.client
            .list_local_models()
            .await
            .map_err(|e| service_error(format!("failed to connect to Ollama, is it running? {e}")))?;
        Ok(())
    }
}

impl LlmProvider for OllamaProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let request = GenerateEmbeddingsRequest::new(
            self.embedding_model.clone(),
            EmbeddingsInput::from(text),
        );
        let response = self
            .client
            .generate_embeddings(request)
            .await
            .map_err(|e| classify(&e.to_string(), "embedding"))?;

        response
            .embeddings
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or(LlmError::EmptyResponse {
                provider: "ollama".into(),
            })
    }

    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        let model_options = ModelOptions::default()
            .temperature(options.temperature)
            .num_predict(i32::try_from(options.max_tokens).unwrap_or(i32::MAX));
        let request =
            ChatMessageRequest::new(self.model.clone(), vec![ChatMessage::user(prompt.to_owned())])
                .options(model_options);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| classify(&e.to_string(), "chat"))?;

        if response.message.content.trim().is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: "ollama".into(),
            });
        }
        Ok(response.message.content)
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ollama"
    }
}

fn service_error(message: String) -> LlmError {
    LlmError::Service {
        provider: "ollama".into(),
        message,
    }
}

/// Ollama reports failures as plain error strings. Oversized inputs and unknown
/// models are permanent; everything else is treated as a service failure.
fn classify(message: &str, what: &str) -> LlmError {
    let lower = message.to_lowercase();
    if lower.contains("context length") || lower.contains("too long") {
        return LlmError::InvalidInput(format!("Ollama {what} rejected input: {message}"));
    }
    if (lower.contains("model") && lower.contains("not found"))
        || lower.contains("try pulling")
        || lower.contains("unauthorized")
        || lower.contains("forbidden")
    {
        return LlmError::Misconfigured {
            provider: "ollama".into(),
            message: format!("{what} request failed: {message}"),
        };
    }
    service_error(format!("Ollama {what} request failed: {message}"))
}

fn parse_host_port(url: &str) -> (String, u16) {
    let url = url.trim_end_matches('/');
    if let Some(colon_pos) = url.rfind(':') {
        let port_str = &url[colon_pos + 1..];
        if let Ok(port) = port_str.parse::<u16>() {
            let host = url[..colon_pos].to_string();
            return (host, port);
        }
    }
    (url.to_string(), 11434)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_ollama() {
        let provider = OllamaProvider::new("http://localhost:11434", "mistral".into(), "nomic".into());
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.model(), "mistral");
        assert_eq!(provider.embedding_model(), "nomic");
    }

    #[test]
    fn parse_host_port_with_port() {
        let (host, port) = parse_host_port("http://localhost:11434");
        assert_eq!(host, "http://localhost");
        assert_eq!(port, 11434);
    }

    #[test]
    fn parse_host_port_without_port() {
        let (host, port) = parse_host_port("http://localhost");
        assert_eq!(host, "http://localhost");
        assert_eq!(port, 11434);
    }

    #[test]
    fn parse_host_port_trailing_slash() {
        let (host, port) = parse_host_port("http://gpu-box:8080/");
        assert_eq!(host, "http://gpu-box");
        assert_eq!(port, 8080);
    }

    #[test]
    fn parse_host_port_invalid_port_falls_back() {
        let (host, port) = parse_host_port("http://localhost:notaport");
        assert_eq!(host, "http://localhost:notaport");
        assert_eq!(port, 11434);
    }

    #[test]
    fn oversized_input_is_permanent() {
        let err = classify("input exceeds context length", "embedding");
        assert!(matches!(err, LlmError::InvalidInput(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn missing_model_is_configuration_error() {
        let err = classify(
            "model \"llama9\" not found, try pulling it first",
            "chat",
        );
        assert!(matches!(err, LlmError::Misconfigured { .. }));
        assert!(!err.is_transient());

        let err = classify("401 Unauthorized", "embedding");
        assert!(matches!(err, LlmError::Misconfigured { .. }));
    }

    #[test]
    fn connection_failure_is_transient() {
        let err = classify("error sending request: connection refused", "chat");
        assert!(matches!(err, LlmError::Service { .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    #[ignore = "requires running Ollama instance"]
    async fn ollama_embed_live() {
        let provider = OllamaProvider::new(
            "http://localhost:11434",
            "mistral:7b".into(),
            "nomic-embed-text".into(),
        );
        let vector = provider.embed("photosynthesis").await.unwrap();
        assert!(!vector.is_empty());
    }
}
