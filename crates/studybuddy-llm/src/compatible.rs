//! Provider for any server exposing the OpenAI-style `/chat/completions` and
//! `/embeddings` endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::provider::{GenerationOptions, LlmProvider};

#[derive(Clone)]
pub struct CompatibleProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    embedding_model: Option<String>,
    provider_name: String,
}

impl fmt::Debug for CompatibleProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompatibleProvider")
            .field("provider_name", &self.provider_name)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl CompatibleProvider {
    #[must_use]
    pub fn new(
        provider_name: String,
        api_key: Option<String>,
        base_url: &str,
        model: String,
        embedding_model: Option<String>,
    ) -> Self {
        Self {
            client: crate::http::default_client(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_owned(),
            model,
            embedding_model,
            provider_name,
        }
    }

    async fn post<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<String, LlmError> {
        let mut request = self
            .client
            .post(format!("{}/{endpoint}", self.base_url))
            .header("Content-Type", "application/json")
            .json(body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await.map_err(LlmError::Http)?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(LlmError::Unavailable);
        }
        if status.is_server_error() {
            tracing::error!("{} API error {status}: {text}", self.provider_name);
            return Err(LlmError::Service {
                provider: self.provider_name.clone(),
                message: format!("{endpoint} request failed (status {status})"),
            });
        }
        if matches!(
            status,
            reqwest::StatusCode::UNAUTHORIZED
                | reqwest::StatusCode::FORBIDDEN
                | reqwest::StatusCode::NOT_FOUND
        ) {
            tracing::error!("{} refused {endpoint} request {status}: {text}", self.provider_name);
            return Err(LlmError::Misconfigured {
                provider: self.provider_name.clone(),
                message: format!(
                    "{endpoint} request refused (status {status}); check the API key and model names"
                ),
            });
        }
        if !status.is_success() {
            tracing::error!("{} API rejected request {status}: {text}", self.provider_name);
            return Err(LlmError::InvalidInput(format!(
                "{} rejected {endpoint} request (status {status})",
                self.provider_name
            )));
        }
        Ok(text)
    }
}

impl LlmProvider for CompatibleProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let model = self
            .embedding_model
            .as_deref()
            .ok_or_else(|| LlmError::EmbedUnsupported {
                provider: self.provider_name.clone(),
            })?;

        let body = EmbeddingRequest { input: text, model };
        let text = self.post("embeddings", &body).await?;
        let resp: EmbeddingResponse = serde_json::from_str(&text)?;

        resp.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| LlmError::EmptyResponse {
                provider: self.provider_name.clone(),
            })
    }

    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        let messages = [ApiMessage {
            role: "user",
            content: prompt,
        }];
        let body = ChatRequest {
            model: &self.model,
            messages: &messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };
        let text = self.post("chat/completions", &body).await?;
        let resp: ChatResponse = serde_json::from_str(&text)?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyResponse {
                provider: self.provider_name.clone(),
            })
    }

    fn name(&self) -> &str {
        &self.provider_name
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ApiMessage<'a>],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
