//! Search service orchestrating extraction, embedding, retrieval and ranking.
//!
//! Every call is an independent unit of work. The only shared state is the
//! read-only lexicon, so one service value can serve concurrent requests.
//! Each external call runs under the configured timeout; dropping a returned
//! future cancels the pending call, and ranking never starts on a partial
//! candidate list.

use std::sync::Arc;

use crate::config::SearchConfig;
use crate::search::errors::{EmbeddingError, IndexError, SearchError};
use crate::search::extract::{FeatureExtractor, FeatureSet};
use crate::search::lexicon::FeatureLexicon;
use crate::search::provider::{EmbeddingProvider, IndexedProduct, VectorIndex};
use crate::search::ranker::Ranker;
use crate::search::types::{Candidate, Category, Match, Product, SearchQuery, StructuredFilter};

pub struct SearchService {
    config: SearchConfig,
    lexicon: Arc<FeatureLexicon>,
    extractor: FeatureExtractor,
    ranker: Ranker,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl SearchService {
    /// Create a service over the given collaborators.
    ///
    /// # Arguments
    /// * `config` - Oversampling factor and call timeout
    /// * `lexicon` - Feature lexicon shared with extraction and ranking
    /// * `embedder` - Query embedding provider
    /// * `index` - Vector index holding the catalog
    pub fn new(
        config: SearchConfig,
        lexicon: Arc<FeatureLexicon>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            extractor: FeatureExtractor::new(lexicon.clone()),
            ranker: Ranker::new(lexicon.clone()),
            config,
            lexicon,
            embedder,
            index,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &FeatureLexicon {
        &self.lexicon
    }

    /// Feature types the lexicon finds in `text` for `category`.
    pub fn extract_features(
        &self,
        text: &str,
        category: Option<&str>,
    ) -> Result<FeatureSet, SearchError> {
        let category = category.map(str::parse::<Category>).transpose()?;
        Ok(self.extractor.extract(text, category))
    }

    /// Ranked products for a free-text query.
    ///
    /// Validation happens before any external call. An empty result is a
    /// valid outcome, not an error.
    #[tracing::instrument(level = "debug", skip_all, fields(top_k = query.top_k))]
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Match>, SearchError> {
        let query = query.validate()?;

        let features = self.extractor.extract(&query.text, query.category);
        if !features.is_empty() {
            log::debug!("extracted features: {:?}", features);
        }

        let vector = self.embed(&query.text).await?;

        let filter = query.filter();
        let count = self.oversampled(query.top_k);
        let candidates = self.query_index(&vector, count, &filter).await?;

        Ok(self.ranker.rank(candidates, &filter, &features, query.top_k))
    }

    /// Products closest to a stored product's vector.
    ///
    /// No feature boosting and no price filtering: this is pure "more like
    /// this". The reference product is never part of the result.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn recommend_similar(
        &self,
        product_id: &str,
        category: Option<&str>,
        top_k: usize,
    ) -> Result<Vec<Match>, SearchError> {
        if product_id.trim().is_empty() {
            return Err(SearchError::InvalidQuery("product id is empty".to_string()));
        }
        if top_k == 0 {
            return Err(SearchError::InvalidQuery(
                "top_k must be greater than zero".to_string(),
            ));
        }
        let category = category.map(str::parse::<Category>).transpose()?;

        let reference = self
            .fetch(product_id)
            .await?
            .ok_or_else(|| SearchError::ProductNotFound(product_id.to_string()))?;

        let filter = StructuredFilter {
            category,
            exclude_id: Some(product_id.to_string()),
            ..Default::default()
        };

        // +1: the reference product is usually its own nearest neighbour
        let candidates = self
            .query_index(&reference.vector, top_k.saturating_add(1), &filter)
            .await?;

        Ok(self
            .ranker
            .rank(candidates, &filter, &FeatureSet::new(), top_k))
    }

    /// Metadata for a product id, `None` when the index doesn't have it.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_product(&self, product_id: &str) -> Result<Option<Product>, SearchError> {
        Ok(self.fetch(product_id).await?.map(|entry| entry.product))
    }

    /// Number of candidates requested from the index for `top_k` results.
    pub fn oversampled(&self, top_k: usize) -> usize {
        top_k.saturating_mul(self.config.oversample_factor.max(1))
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SearchError> {
        let timeout = self.config.call_timeout();

        let vector = tokio::time::timeout(timeout, self.embedder.embed(text))
            .await
            .unwrap_or_else(|_| Err(EmbeddingError::Timeout(timeout)))
            .map_err(|err| {
                log::warn!("embedding call failed: {}", err);
                SearchError::EmbeddingFailure(err)
            })?;

        let expected = self.embedder.dimensions();
        if vector.is_empty() || vector.len() != expected {
            log::warn!(
                "embedding provider returned {} dimensions, expected {}",
                vector.len(),
                expected
            );
            return Err(SearchError::EmbeddingFailure(EmbeddingError::Malformed {
                expected,
                got: vector.len(),
            }));
        }

        Ok(vector)
    }

    async fn query_index(
        &self,
        vector: &[f32],
        count: usize,
        filter: &StructuredFilter,
    ) -> Result<Vec<Candidate>, SearchError> {
        let timeout = self.config.call_timeout();
        let filter = (!filter.is_empty()).then_some(filter);

        log::debug!("querying index for {} candidates", count);

        let candidates = tokio::time::timeout(timeout, self.index.query(vector, count, filter))
            .await
            .unwrap_or_else(|_| Err(IndexError::Timeout(timeout)))
            .map_err(|source| {
                log::warn!("index query failed: {}", source);
                SearchError::IndexUnavailable {
                    operation: "query",
                    source,
                }
            })?;

        log::debug!("index returned {} candidates", candidates.len());
        Ok(candidates)
    }

    async fn fetch(&self, product_id: &str) -> Result<Option<IndexedProduct>, SearchError> {
        let timeout = self.config.call_timeout();

        tokio::time::timeout(timeout, self.index.fetch_by_id(product_id))
            .await
            .unwrap_or_else(|_| Err(IndexError::Timeout(timeout)))
            .map_err(|source| {
                log::warn!("index fetch for {} failed: {}", product_id, source);
                SearchError::IndexUnavailable {
                    operation: "fetch_by_id",
                    source,
                }
            })
    }
}
