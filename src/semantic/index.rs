//! In-memory vector index with cosine similarity search.
//!
//! Stores product embeddings next to their metadata and implements
//! [`VectorIndex`], evaluating the structured filter during the scan.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::search::{Candidate, IndexError, IndexedProduct, Product, StructuredFilter, VectorIndex};

/// An entry in the vector index.
#[derive(Debug, Clone)]
struct IndexEntry {
    embedding: Vec<f32>,
    /// Precomputed L2 norm of `embedding`
    norm: f32,
    product: Product,
}

/// In-memory vector index for product search.
///
/// Filled once while loading the catalog, then shared read-only.
pub struct MemoryIndex {
    /// Product ID -> entry
    entries: HashMap<String, IndexEntry>,
    /// Expected embedding dimensions
    dimensions: usize,
}

impl MemoryIndex {
    /// Create a new empty vector index with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self {
            entries: HashMap::new(),
            dimensions,
        }
    }

    /// Create an index with pre-allocated capacity.
    pub fn with_capacity(dimensions: usize, capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            dimensions,
        }
    }

    /// Get the expected embedding dimensions.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Get the number of entries in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a product with its embedding.
    ///
    /// Rejects wrong dimensions, zero-norm vectors and ids already present.
    pub fn insert(&mut self, product: Product, embedding: Vec<f32>) -> Result<(), IndexError> {
        self.check_dimensions(&embedding)?;

        let norm = l2_norm(&embedding);
        if norm < f32::EPSILON {
            return Err(IndexError::ZeroNormVector);
        }

        if self.entries.contains_key(&product.id) {
            return Err(IndexError::DuplicateId(product.id));
        }

        self.entries.insert(
            product.id.clone(),
            IndexEntry {
                embedding,
                norm,
                product,
            },
        );

        Ok(())
    }

    /// Check if an entry exists for the given ID.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Get a product by ID.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.entries.get(id).map(|entry| &entry.product)
    }

    /// Search for similar vectors using cosine similarity.
    ///
    /// # Arguments
    /// * `query` - The query embedding vector
    /// * `filter` - Optional metadata predicates entries must satisfy
    /// * `limit` - Maximum number of results to return
    ///
    /// # Returns
    /// Results sorted by similarity score (highest first), ties broken by id.
    /// Scores are cosine similarity rescaled to [0, 1].
    pub fn search(
        &self,
        query: &[f32],
        filter: Option<&StructuredFilter>,
        limit: usize,
    ) -> Result<Vec<Candidate>, IndexError> {
        self.check_dimensions(query)?;

        let query_norm = l2_norm(query);
        if query_norm < f32::EPSILON {
            return Err(IndexError::ZeroNormVector);
        }

        let mut results: Vec<Candidate> = self
            .entries
            .iter()
            .filter(|(id, entry)| filter.map(|f| f.matches(id, &entry.product)).unwrap_or(true))
            .map(|(id, entry)| Candidate {
                id: id.clone(),
                score: similarity_score(cosine_similarity(
                    query,
                    query_norm,
                    &entry.embedding,
                    entry.norm,
                )),
                product: entry.product.clone(),
            })
            .collect();

        // Sort by score descending; HashMap order is arbitrary so ties go by id
        results.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));

        // Apply limit
        results.truncate(limit);

        Ok(results)
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                got: vector.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn query(
        &self,
        vector: &[f32],
        count: usize,
        filter: Option<&StructuredFilter>,
    ) -> Result<Vec<Candidate>, IndexError> {
        self.search(vector, filter, count)
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<IndexedProduct>, IndexError> {
        Ok(self.entries.get(id).map(|entry| IndexedProduct {
            vector: entry.embedding.clone(),
            product: entry.product.clone(),
        }))
    }
}

/// Compute L2 norm of a vector.
fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Compute cosine similarity between two vectors with precomputed norms.
fn cosine_similarity(query: &[f32], query_norm: f32, target: &[f32], target_norm: f32) -> f32 {
    let dot_product: f32 = query.iter().zip(target.iter()).map(|(a, b)| a * b).sum();
    dot_product / (query_norm * target_norm)
}

/// Map cosine from [-1, 1] onto [0, 1], keeping the order.
///
/// The ranker multiplies scores by a boost factor, which only raises a
/// score when it is non-negative.
fn similarity_score(cosine: f32) -> f32 {
    ((cosine + 1.0) / 2.0).clamp(0.0, 1.0)
}
