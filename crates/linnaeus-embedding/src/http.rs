//! HTTP Embedding Service Client
//!
//! Client for embedding services exposing a JSON `/embed` API, such as a
//! local text-embeddings-inference server.
//!
//! # Features
//!
//! - Async HTTP communication with the embedding API
//! - Configurable endpoint and model
//! - Retry logic with exponential backoff
//! - Timeout handling
//! - Batch endpoint support
//!
//! # Examples
//!
//! ```no_run
//! use linnaeus_embedding::HttpEmbeddingProvider;
//!
//! let provider = HttpEmbeddingProvider::new("http://localhost:8080", "bge-small-en-v1.5", 384);
//! ```

use crate::EmbeddingError;
use linnaeus_domain::traits::EmbeddingProvider as EmbeddingProviderTrait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default embedding API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

/// Default timeout for embedding requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// HTTP embedding API provider
///
/// Communicates with an embedding service to vectorize text. Expected
/// dimension is declared up front and checked against responses, so a
/// misconfigured endpoint fails loudly rather than contaminating
/// similarity math.
pub struct HttpEmbeddingProvider {
    endpoint: String,
    model: String,
    dimension: usize,
    client: reqwest::Client,
    max_retries: u32,
}

/// Request body for the embed API
#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    inputs: Vec<String>,
}

/// Response from the embed API
#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl HttpEmbeddingProvider {
    /// Create a new provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Embedding API endpoint (e.g., "http://localhost:8080")
    /// - `model`: Model to use (e.g., "bge-small-en-v1.5")
    /// - `dimension`: Expected vector dimension, validated per response
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap();

        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            dimension,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Create a provider against the default local endpoint
    pub fn default_endpoint(model: impl Into<String>, dimension: usize) -> Self {
        Self::new(DEFAULT_ENDPOINT, model, dimension)
    }

    /// Set the maximum number of retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Embed a batch of texts via the API
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The service is not running or unreachable
    /// - The model is not available
    /// - The service rate-limits the request past all retries
    /// - The response dimension disagrees with the configured one
    pub async fn embed_batch_async(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|t| t.is_empty()) {
            return Err(EmbeddingError::InvalidInput(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        let url = format!("{}/embed", self.endpoint);
        let request_body = EmbedRequest {
            model: self.model.clone(),
            inputs: texts.to_vec(),
        };

        // Retry with exponential backoff
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&url).json(&request_body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let parsed = response
                            .json::<EmbedResponse>()
                            .await
                            .map_err(|e| {
                                EmbeddingError::Other(format!("Failed to parse response: {}", e))
                            })?;
                        return self.validate_batch(texts.len(), parsed.embeddings);
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(EmbeddingError::ModelNotAvailable(self.model.clone()));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(EmbeddingError::RateLimitExceeded);
                    } else {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(EmbeddingError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(EmbeddingError::Communication(format!(
                        "Request failed: {}",
                        e
                    )));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| EmbeddingError::Communication("Max retries exceeded".to_string())))
    }

    fn validate_batch(
        &self,
        expected_count: usize,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if embeddings.len() != expected_count {
            return Err(EmbeddingError::Other(format!(
                "Service returned {} embeddings for {} inputs",
                embeddings.len(),
                expected_count
            )));
        }
        for embedding in &embeddings {
            if embedding.len() != self.dimension {
                return Err(EmbeddingError::Other(format!(
                    "Service returned dimension {} (expected {})",
                    embedding.len(),
                    self.dimension
                )));
            }
        }
        Ok(embeddings)
    }
}

impl EmbeddingProviderTrait for HttpEmbeddingProvider {
    type Error = EmbeddingError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        // Blocking wrapper for async function
        let mut batch = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(async { self.embed_batch_async(&[text.to_string()]).await })?;
        batch
            .pop()
            .ok_or_else(|| EmbeddingError::Other("Empty batch response".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, Self::Error> {
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(async { self.embed_batch_async(texts).await })
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_identity(&self) -> String {
        format!("{}/{}", self.model, self.dimension)
    }
}
