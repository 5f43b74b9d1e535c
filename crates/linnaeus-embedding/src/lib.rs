//! Linnaeus Embedding Provider Layer
//!
//! Pluggable embedding model implementations (per ADR-006).
//!
//! # Architecture
//!
//! This crate provides implementations of the `EmbeddingProvider` trait
//! from `linnaeus-domain`, plus the vector math shared by every consumer
//! of embeddings.
//!
//! # Providers
//!
//! - `MockEmbeddingModel`: Hash-based deterministic embeddings for tests
//!   and offline runs
//! - `HttpEmbeddingProvider`: Client for an embedding HTTP API
//!
//! # Examples
//!
//! ```
//! use linnaeus_embedding::MockEmbeddingModel;
//! use linnaeus_domain::traits::EmbeddingProvider;
//!
//! let model = MockEmbeddingModel::new(384);
//! let vector = model.embed("concept drift").unwrap();
//! assert_eq!(vector.len(), 384);
//!
//! // Same text always produces the same embedding
//! assert_eq!(vector, model.embed("concept drift").unwrap());
//! ```

#![warn(missing_docs)]

pub mod http;

use linnaeus_domain::traits::EmbeddingProvider;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub use http::HttpEmbeddingProvider;

/// Errors that can occur during embedding operations
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Service is up but refusing work
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Invalid input text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model not available at the endpoint
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("Embedding error: {0}")]
    Other(String),
}

/// Mock embedding model for deterministic testing
///
/// Generates embeddings by hashing the input text with per-dimension
/// seeds. The embeddings are:
///
/// - **Deterministic**: same text always produces the same vector
/// - **Normalized**: unit length, ready for cosine similarity
/// - **Diverse**: different texts produce different vectors
///
/// Hash-based vectors carry no semantics; tests that need "similar texts
/// get similar vectors" should use [`MockEmbeddingModel::with_response`]
/// to pin exact vectors per input.
#[derive(Debug, Clone)]
pub struct MockEmbeddingModel {
    dimension: usize,
    responses: Arc<std::sync::Mutex<std::collections::HashMap<String, Vec<f32>>>>,
    call_count: Arc<AtomicUsize>,
    always_fail: Arc<AtomicBool>,
}

impl MockEmbeddingModel {
    /// Create a new mock model producing vectors of the given dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            responses: Arc::new(std::sync::Mutex::new(std::collections::HashMap::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
            always_fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Pin an exact vector for a specific input text
    ///
    /// The vector is normalized on the way in so similarity math behaves
    /// the same as for generated vectors.
    pub fn with_response(self, text: impl Into<String>, mut vector: Vec<f32>) -> Self {
        normalize(&mut vector);
        self.responses.lock().unwrap().insert(text.into(), vector);
        self
    }

    /// Configure the model to fail every call, simulating an outage
    pub fn failing(self) -> Self {
        self.always_fail.store(true, Ordering::SeqCst);
        self
    }

    /// Number of embed calls made (batch items count individually)
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn hash_with_seed(text: &str, seed: u64) -> f32 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        seed.hash(&mut hasher);
        let hash_value = hasher.finish();

        // Map the hash onto [-1, 1]
        let normalized = (hash_value as f64 / u64::MAX as f64) * 2.0 - 1.0;
        normalized as f32
    }
}

impl EmbeddingProvider for MockEmbeddingModel {
    type Error = EmbeddingError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.always_fail.load(Ordering::SeqCst) {
            return Err(EmbeddingError::Communication(
                "mock provider configured to fail".to_string(),
            ));
        }
        if text.is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        if let Some(pinned) = self.responses.lock().unwrap().get(text) {
            return Ok(pinned.clone());
        }

        let mut embedding = Vec::with_capacity(self.dimension);
        for i in 0..self.dimension {
            embedding.push(Self::hash_with_seed(text, i as u64));
        }
        normalize(&mut embedding);
        Ok(embedding)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, Self::Error> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_identity(&self) -> String {
        format!("mock-hash/{}", self.dimension)
    }
}

/// Scale a vector to unit length in place; zero vectors are left as-is
pub fn normalize(vector: &mut [f32]) {
    let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }
}

/// Calculate cosine similarity between two embedding vectors
///
/// Returns a value in [-1, 1]: 1.0 for identical direction, 0.0 for
/// orthogonal, -1.0 for opposite. Mismatched or zero-magnitude inputs
/// yield 0.0 rather than panicking, since similarity consumers treat
/// "unknown" and "unrelated" the same way.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

/// Mean of a set of vectors, normalized to unit length
///
/// Returns `None` when the input is empty or dimensions disagree.
pub fn centroid(vectors: &[&[f32]]) -> Option<Vec<f32>> {
    let first = vectors.first()?;
    let dim = first.len();
    if vectors.iter().any(|v| v.len() != dim) {
        return None;
    }

    let mut mean = vec![0.0f32; dim];
    for vector in vectors {
        for (slot, value) in mean.iter_mut().zip(vector.iter()) {
            *slot += value;
        }
    }
    let n = vectors.len() as f32;
    for slot in mean.iter_mut() {
        *slot /= n;
    }
    normalize(&mut mean);
    Some(mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_embedding_deterministic() {
        let model = MockEmbeddingModel::new(384);

        let text = "graph neural network";
        let embedding1 = model.embed(text).unwrap();
        let embedding2 = model.embed(text).unwrap();

        assert_eq!(embedding1, embedding2);
    }

    #[test]
    fn test_mock_embedding_dimension() {
        let model = MockEmbeddingModel::new(128);

        let embedding = model.embed("test").unwrap();
        assert_eq!(embedding.len(), 128);
        assert_eq!(model.dimension(), 128);
    }

    #[test]
    fn test_mock_embedding_normalized() {
        let model = MockEmbeddingModel::new(384);

        let embedding = model.embed("test text").unwrap();
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_mock_embedding_different_texts() {
        let model = MockEmbeddingModel::new(384);

        let embedding1 = model.embed("hello world").unwrap();
        let embedding2 = model.embed("goodbye world").unwrap();

        assert_ne!(embedding1, embedding2);
    }

    #[test]
    fn test_mock_embedding_empty_text() {
        let model = MockEmbeddingModel::new(384);

        let result = model.embed("");
        assert!(result.is_err());
    }

    #[test]
    fn test_mock_pinned_response() {
        let model = MockEmbeddingModel::new(3).with_response("anchor", vec![1.0, 0.0, 0.0]);

        assert_eq!(model.embed("anchor").unwrap(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_mock_failing() {
        let model = MockEmbeddingModel::new(8).failing();

        assert!(model.embed("anything").is_err());
        assert!(model.embed_batch(&["a".to_string()]).is_err());
    }

    #[test]
    fn test_mock_call_count_shared_across_clones() {
        let model = MockEmbeddingModel::new(8);
        let clone = model.clone();

        model.embed("x").unwrap();
        clone.embed("y").unwrap();

        assert_eq!(model.call_count(), 2);
        assert_eq!(clone.call_count(), 2);
    }

    #[test]
    fn test_batch_preserves_order() {
        let model = MockEmbeddingModel::new(16);
        let texts = vec!["first".to_string(), "second".to_string()];

        let batch = model.embed_batch(&texts).unwrap();
        assert_eq!(batch[0], model.embed("first").unwrap());
        assert_eq!(batch[1], model.embed("second").unwrap());
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let vec = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&vec, &vec) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let vec1 = vec![1.0, 0.0, 0.0];
        let vec2 = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&vec1, &vec2).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let vec1 = vec![1.0, 0.0, 0.0];
        let vec2 = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&vec1, &vec2) + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_centroid() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        let c = centroid(&[&a, &b]).unwrap();

        // Mean direction is the diagonal, normalized
        assert!((c[0] - c[1]).abs() < 0.0001);
        let magnitude: f32 = c.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_centroid_empty() {
        assert!(centroid(&[]).is_none());
    }
}
