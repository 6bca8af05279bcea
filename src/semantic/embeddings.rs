//! Embedding model wrapper for fastembed.
//!
//! Provides the local [`EmbeddingProvider`] implementation:
//! - Model download into a configurable cache directory on first use
//! - Inference off the async runtime via `spawn_blocking`
//! - Native batch embedding for catalog indexing

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{InitOptions, TextEmbedding};

use crate::search::{EmbeddingError, EmbeddingProvider};

/// Wrapper around fastembed's TextEmbedding model.
/// Uses a Mutex because fastembed's embed() requires &mut self.
pub struct EmbeddingModel {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
    dimensions: usize,
}

impl EmbeddingModel {
    /// Create a new embedding model with the given name.
    ///
    /// The model will be downloaded on first use if not cached.
    /// Models are cached in the `models/` subdirectory of `cache_dir`.
    /// This blocks; call it before entering the async runtime.
    ///
    /// # Arguments
    /// * `model_name` - Name of the model (e.g., "all-MiniLM-L6-v2")
    /// * `cache_dir` - Directory to cache downloaded models
    pub fn new(model_name: &str, cache_dir: PathBuf) -> Result<Self, EmbeddingError> {
        let model_enum = Self::parse_model_name(model_name)?;

        // Ensure cache directory exists
        let models_dir = cache_dir.join("models");
        std::fs::create_dir_all(&models_dir).map_err(|e| {
            EmbeddingError::InitFailed(format!("Failed to create models directory: {}", e))
        })?;

        let options = InitOptions::new(model_enum)
            .with_cache_dir(models_dir)
            .with_show_download_progress(true);

        log::info!("Loading embedding model '{}'", model_name);

        let mut model = TextEmbedding::try_new(options)
            .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        // Get model dimensions by embedding a test string
        let dimensions = Self::probe_dimensions(&mut model)?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            model_name: model_name.to_string(),
            dimensions,
        })
    }

    /// Get the model name
    pub fn name(&self) -> &str {
        &self.model_name
    }

    fn embed_blocking(
        model: &Mutex<TextEmbedding>,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut model = model.lock().map_err(|e| {
            EmbeddingError::EmbeddingFailed(format!("Failed to acquire model lock: {}", e))
        })?;

        model
            .embed(texts, None)
            .map_err(|e| EmbeddingError::EmbeddingFailed(e.to_string()))
    }

    async fn run_blocking(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || Self::embed_blocking(&model, texts))
            .await
            .map_err(|e| EmbeddingError::EmbeddingFailed(format!("Embedding task failed: {}", e)))?
    }

    /// Parse model name string to fastembed enum.
    fn parse_model_name(
        name: &str,
    ) -> Result<fastembed::EmbeddingModel, EmbeddingError> {
        match name.to_lowercase().as_str() {
            "all-minilm-l6-v2" | "allminiml6v2" => {
                Ok(fastembed::EmbeddingModel::AllMiniLML6V2)
            }
            "all-minilm-l6-v2-q" | "allminiml6v2q" => {
                Ok(fastembed::EmbeddingModel::AllMiniLML6V2Q)
            }
            "bge-small-en-v1.5" | "bgesmallenv15" => {
                Ok(fastembed::EmbeddingModel::BGESmallENV15)
            }
            "bge-small-en-v1.5-q" | "bgesmallenv15q" => {
                Ok(fastembed::EmbeddingModel::BGESmallENV15Q)
            }
            "bge-base-en-v1.5" | "bgebaseenv15" => {
                Ok(fastembed::EmbeddingModel::BGEBaseENV15)
            }
            "bge-base-en-v1.5-q" | "bgebaseenv15q" => {
                Ok(fastembed::EmbeddingModel::BGEBaseENV15Q)
            }
            _ => Err(EmbeddingError::InvalidModel(format!(
                "Unknown model: {}. Supported models: all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5 (add -q suffix for quantized)",
                name
            ))),
        }
    }

    /// Probe the model to determine embedding dimensions.
    fn probe_dimensions(model: &mut TextEmbedding) -> Result<usize, EmbeddingError> {
        let test_embeddings = model
            .embed(vec!["test"], None)
            .map_err(|e| EmbeddingError::InitFailed(format!("Failed to probe dimensions: {}", e)))?;

        test_embeddings
            .first()
            .map(|v| v.len())
            .ok_or_else(|| EmbeddingError::InitFailed("Model returned no embedding".to_string()))
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingModel {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.run_blocking(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::EmbeddingFailed("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.run_blocking(texts.to_vec()).await
    }
}
