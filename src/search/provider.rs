//! Contracts for the external collaborators the core depends on.

use async_trait::async_trait;

use crate::search::errors::{EmbeddingError, IndexError};
use crate::search::types::{Candidate, Product, StructuredFilter};

/// Maps text to a fixed-dimension vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Length of every vector this provider returns.
    fn dimensions(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed several texts. Providers with a native batch call should
    /// override this.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Stored vector plus the metadata kept next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedProduct {
    pub vector: Vec<f32>,
    pub product: Product,
}

/// Vector store supporting similarity queries and lookup by id.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Up to `count` nearest candidates, most similar first.
    ///
    /// Scores must be non-negative: the ranker multiplies them by a boost
    /// factor of at least one. Distance-style metrics should be mapped onto
    /// a non-negative scale that keeps the order.
    ///
    /// `filter` is advisory: implementations may ignore some or all of it.
    async fn query(
        &self,
        vector: &[f32],
        count: usize,
        filter: Option<&StructuredFilter>,
    ) -> Result<Vec<Candidate>, IndexError>;

    /// Stored entry for `id`, or `None` when the index has no such product.
    async fn fetch_by_id(&self, id: &str) -> Result<Option<IndexedProduct>, IndexError>;
}
