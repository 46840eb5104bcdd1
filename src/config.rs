//! Configuration for the question-answering pipeline.
//!
//! All tunables live in one explicit [`QaConfig`] object, validated once at
//! construction. The credential is validated here too, so a missing key
//! fails at startup rather than on the first query.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GenerationErrorKind, QaError, Result};

/// Default generation model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Remediation message for a missing credential.
pub(crate) const MISSING_CREDENTIAL_HELP: &str = "API key not found. Generate one in your \
     provider's dashboard, then pass it to the configuration builder or set the OPENAI_API_KEY \
     environment variable and restart the application.";

/// Configuration parameters for the question-answering pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaConfig {
    /// Credential for the remote embedding and generation endpoints.
    /// Never serialized.
    #[serde(skip)]
    pub api_key: String,
    /// Generation model identifier.
    pub model: String,
    /// Sampling temperature for generation, in `0.0..=2.0`.
    pub temperature: f32,
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of top results to retrieve per query.
    pub top_k: usize,
    /// Timeout applied to each remote call.
    pub timeout: Duration,
    /// Maximum number of recent query records kept per session.
    pub history_limit: usize,
}

impl QaConfig {
    /// Create a new builder for constructing a [`QaConfig`].
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`QaConfig`].
#[derive(Debug, Clone)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl Default for QaConfigBuilder {
    fn default() -> Self {
        Self {
            config: QaConfig {
                api_key: String::new(),
                model: DEFAULT_MODEL.to_string(),
                temperature: 0.2,
                chunk_size: 512,
                chunk_overlap: 100,
                top_k: 4,
                timeout: Duration::from_secs(30),
                history_limit: 10,
            },
        }
    }
}

impl QaConfigBuilder {
    /// Set the API key for the remote capabilities.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the generation model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of top results to retrieve per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the timeout applied to each remote call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum number of recent query records kept per session.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    /// Build the [`QaConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// - [`QaError::Generation`] with [`GenerationErrorKind::MissingCredential`]
    ///   if the API key is empty or whitespace.
    /// - [`QaError::Config`] if `chunk_overlap >= chunk_size`,
    ///   `chunk_size == 0`, `top_k == 0`, `history_limit == 0`, or the
    ///   temperature is outside `0.0..=2.0`.
    pub fn build(self) -> Result<QaConfig> {
        let config = self.config;
        if config.api_key.trim().is_empty() {
            return Err(QaError::Generation {
                kind: GenerationErrorKind::MissingCredential,
                message: MISSING_CREDENTIAL_HELP.to_string(),
            });
        }
        if config.chunk_size == 0 {
            return Err(QaError::Config("chunk_size must be greater than zero".to_string()));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(QaError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        if config.top_k == 0 {
            return Err(QaError::Config("top_k must be greater than zero".to_string()));
        }
        if config.history_limit == 0 {
            return Err(QaError::Config("history_limit must be greater than zero".to_string()));
        }
        if !(0.0..=2.0).contains(&config.temperature) {
            return Err(QaError::Config(format!(
                "temperature ({}) must be within 0.0..=2.0",
                config.temperature
            )));
        }
        Ok(config)
    }
}
