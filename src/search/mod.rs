//! Product ranking core.
//!
//! Blends vector similarity with keyword feature matching:
//!
//! ```text
//! query text ──▶ FeatureExtractor ──────────────────────────┐
//!     │                                                      │
//!     ▼                                                      ▼
//! EmbeddingProvider ──▶ VectorIndex (oversampled) ──▶ Ranker (filter, boost, sort, truncate)
//! ```
//!
//! - `lexicon`: static category -> feature type -> synonyms table
//! - `extract`: feature types mentioned in a query
//! - `ranker`: hard filtering, multiplicative boosting, stable ordering
//! - `service`: validation and orchestration of the external calls
//! - `provider`: collaborator traits (embedding provider, vector index)
//! - `retry`: call-site retry policy for retryable failures

mod errors;
mod extract;
mod lexicon;
mod provider;
mod ranker;
mod retry;
mod service;
mod types;

pub use errors::{EmbeddingError, ErrorKind, IndexError, SearchError};
pub use extract::{FeatureExtractor, FeatureSet};
pub use lexicon::{FeatureLexicon, LexiconTable};
pub use provider::{EmbeddingProvider, IndexedProduct, VectorIndex};
pub use ranker::{Ranker, FEATURE_WEIGHT};
pub use retry::RetryPolicy;
pub use service::SearchService;
pub use types::{Candidate, Category, Match, Product, SearchQuery, StructuredFilter, DEFAULT_TOP_K};
