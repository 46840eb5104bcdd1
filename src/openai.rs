//! OpenAI-compatible embedding and generation providers.
//!
//! Both providers call the HTTP API directly with `reqwest` and work
//! against any OpenAI-compatible host via [`with_base_url`]. This module is
//! only available when the `openai` feature is enabled.
//!
//! [`with_base_url`]: OpenAiGenerationProvider::with_base_url

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::{MISSING_CREDENTIAL_HELP, QaConfig};
use crate::embedding::EmbeddingProvider;
use crate::error::{GenerationErrorKind, QaError, Result};
use crate::generation::GenerationProvider;

/// The default OpenAI API base URL.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// The default model for embeddings.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

/// Remediation message for a rejected credential.
const INVALID_CREDENTIAL_HELP: &str = "the endpoint rejected the API key; it may be expired or \
     rotated. Regenerate the key in your provider's dashboard and update the configuration.";

// ── Embedding provider ─────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the `/embeddings` endpoint.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-3-small`.
/// - `dimensions` – optional Matryoshka dimension override.
/// - `api_key` – from the constructor or the `OPENAI_API_KEY` environment
///   variable.
///
/// # Example
///
/// ```rust,ignore
/// use docqa::openai::OpenAiEmbeddingProvider;
///
/// let provider = OpenAiEmbeddingProvider::new("sk-...")?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    /// If set, passed to the API for Matryoshka dimension truncation.
    request_dimensions: Option<usize>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for OpenAiEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbeddingProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .field("request_dimensions", &self.request_dimensions)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiEmbeddingProvider {
    /// Create a new provider with the given API key.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Embedding`] if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(QaError::Embedding {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: OPENAI_BASE_URL.into(),
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
            request_dimensions: None,
            timeout: None,
        })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| QaError::Embedding {
            provider: "OpenAI".into(),
            message: "OPENAI_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Create a provider from a validated [`QaConfig`].
    pub fn from_config(config: &QaConfig) -> Result<Self> {
        Ok(Self::new(config.api_key.clone())?.with_timeout(config.timeout))
    }

    /// Set the model name (e.g. `text-embedding-3-large`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the output dimensions (Matryoshka support).
    ///
    /// When set, the API returns embeddings truncated to this size. This
    /// also updates the value reported by
    /// [`dimensions()`](EmbeddingProvider::dimensions).
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = Some(dims);
        self
    }

    /// Point the provider at an OpenAI-compatible host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Bound each embedding request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Pull the API's own error message out of a failure body, falling back to
/// the raw body text.
fn error_detail(body: String) -> String {
    serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body)
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "OpenAI", text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| QaError::Embedding {
            provider: "OpenAI".into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "OpenAI", batch_size = texts.len(), model = %self.model, "embedding batch");

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
            dimensions: self.request_dimensions,
        };

        let mut request = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "embedding request failed");
            QaError::Embedding {
                provider: "OpenAI".into(),
                message: format!("request failed: {e}"),
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response.text().await.unwrap_or_default());
            error!(provider = "OpenAI", %status, "embedding API error");
            return Err(QaError::Embedding {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse embedding response");
            QaError::Embedding {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        Ok(embedding_response.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "OpenAI"
    }
}

// ── Generation provider ────────────────────────────────────────────

/// A [`GenerationProvider`] backed by the `/chat/completions` endpoint.
///
/// Sends the formatted prompt as a single user message and returns the
/// first choice's content, non-streaming. HTTP failures are mapped to
/// [`QaError::Generation`] with a kind the caller can act on:
/// 401/403 → invalid credential, timeouts / connection errors / 429 / 5xx
/// → transient.
///
/// # Example
///
/// ```rust,ignore
/// use docqa::openai::OpenAiGenerationProvider;
///
/// let provider = OpenAiGenerationProvider::new("sk-...")?;
/// let answer = provider.generate("Say hello.").await?;
/// ```
pub struct OpenAiGenerationProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for OpenAiGenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGenerationProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiGenerationProvider {
    /// Create a new provider with the given API key.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Generation`] with
    /// [`GenerationErrorKind::MissingCredential`] if the key is empty, so
    /// a misconfigured deployment fails at construction rather than on the
    /// first question.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(QaError::Generation {
                kind: GenerationErrorKind::MissingCredential,
                message: MISSING_CREDENTIAL_HELP.to_string(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: OPENAI_BASE_URL.into(),
            model: crate::config::DEFAULT_MODEL.into(),
            temperature: 0.2,
            timeout: None,
        })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns the missing-credential generation error if the variable is
    /// unset.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| QaError::Generation {
            kind: GenerationErrorKind::MissingCredential,
            message: MISSING_CREDENTIAL_HELP.to_string(),
        })?;
        Self::new(api_key)
    }

    /// Create a provider from a validated [`QaConfig`], taking its model,
    /// temperature, and timeout.
    pub fn from_config(config: &QaConfig) -> Result<Self> {
        Ok(Self::new(config.api_key.clone())?
            .with_model(config.model.clone())
            .with_temperature(config.temperature)
            .with_timeout(config.timeout))
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Point the provider at an OpenAI-compatible host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Bound each generation request by `timeout`. Expiry surfaces as a
    /// transient generation error.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl GenerationProvider for OpenAiGenerationProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, prompt_len = prompt.len(), "sending generation request");

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
        };

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "generation request failed");
            let message = if e.is_timeout() {
                "the generation request timed out; try again later".to_string()
            } else if e.is_connect() {
                "could not reach the generation endpoint; check network connectivity".to_string()
            } else {
                format!("request failed: {e}")
            };
            QaError::Generation { kind: GenerationErrorKind::Transient, message }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response.text().await.unwrap_or_default());
            error!(%status, "generation API error");

            let (kind, message) = if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                (
                    GenerationErrorKind::InvalidCredential,
                    format!("API returned {status}: {INVALID_CREDENTIAL_HELP}"),
                )
            } else {
                (GenerationErrorKind::Transient, format!("API returned {status}: {detail}"))
            };
            return Err(QaError::Generation { kind, message });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(error = %e, "failed to parse generation response");
            QaError::Generation {
                kind: GenerationErrorKind::Transient,
                message: format!("failed to parse response: {e}"),
            }
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| QaError::Generation {
                kind: GenerationErrorKind::Transient,
                message: "API returned no completion choices".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_a_missing_credential_error() {
        let err = OpenAiGenerationProvider::new("").unwrap_err();
        assert!(matches!(
            err,
            QaError::Generation { kind: GenerationErrorKind::MissingCredential, .. }
        ));

        let err = OpenAiEmbeddingProvider::new("  ").unwrap_err();
        assert!(matches!(err, QaError::Embedding { .. }));
    }

    #[test]
    fn error_detail_prefers_the_api_message() {
        let body = r#"{"error":{"message":"Incorrect API key provided"}}"#.to_string();
        assert_eq!(error_detail(body), "Incorrect API key provided");
        assert_eq!(error_detail("plain failure".to_string()), "plain failure");
    }
}
