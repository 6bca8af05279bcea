//! Data model shared by the ranking core.
//!
//! `Product` is the catalog metadata snapshot carried by the vector index,
//! `Candidate` is a raw index hit and `Match` is the ranked output unit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::search::errors::SearchError;

/// Default number of results a caller asks for when it does not say.
pub const DEFAULT_TOP_K: usize = 5;

/// Closed set of catalog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Laptops,
    Smartphones,
    Tablets,
    Audio,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Laptops,
        Category::Smartphones,
        Category::Tablets,
        Category::Audio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Laptops => "laptops",
            Category::Smartphones => "smartphones",
            Category::Tablets => "tablets",
            Category::Audio => "audio",
        }
    }

    /// Comma separated list of every category name, for error messages.
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| SearchError::InvalidCategory(s.to_string()))
    }
}

/// Product metadata as stored alongside its vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category: Category,
    /// Short attribute strings, e.g. "Up to 12 hours battery life"
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
}

impl Product {
    /// Feature strings joined with a space and lowercased, the haystack
    /// used for feature-type matching.
    pub fn feature_text(&self) -> String {
        self.features.join(" ").to_lowercase()
    }
}

/// Raw hit returned by a vector index query.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    /// Similarity reported by the index, higher is more similar
    pub score: f32,
    pub product: Product,
}

/// Ranked result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub id: String,
    /// Combined score used for ordering
    pub score: f32,
    /// Similarity before feature boosting
    pub raw_score: f32,
    /// Feature types whose synonyms appear in this product's features
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matched_features: Vec<String>,
    #[serde(rename = "metadata")]
    pub product: Product,
}

/// A search request as received from the outer layer.
///
/// Category is kept as free text here; it is checked against the closed
/// category set during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: None,
            min_price: None,
            max_price: None,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_min_price(mut self, min_price: f64) -> Self {
        self.min_price = Some(min_price);
        self
    }

    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Check the request shape before anything leaves the process.
    pub(crate) fn validate(&self) -> Result<ValidatedQuery, SearchError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(SearchError::InvalidQuery("query text is empty".to_string()));
        }
        if self.top_k == 0 {
            return Err(SearchError::InvalidQuery(
                "top_k must be greater than zero".to_string(),
            ));
        }

        let category = self
            .category
            .as_deref()
            .map(Category::from_str)
            .transpose()?;

        for (name, price) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if let Some(price) = price {
                if !(price >= 0.0) {
                    return Err(SearchError::InvalidQuery(format!(
                        "{name} must be a non-negative number, got {price}"
                    )));
                }
            }
        }

        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(SearchError::InvalidPriceRange { min, max });
            }
        }

        Ok(ValidatedQuery {
            text: text.to_string(),
            category,
            min_price: self.min_price,
            max_price: self.max_price,
            top_k: self.top_k,
        })
    }
}

/// Query that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidatedQuery {
    pub text: String,
    pub category: Option<Category>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub top_k: usize,
}

impl ValidatedQuery {
    pub fn filter(&self) -> StructuredFilter {
        StructuredFilter {
            category: self.category,
            min_price: self.min_price,
            max_price: self.max_price,
            exclude_id: None,
        }
    }
}

/// Conjunction of metadata predicates pushed down to the index.
///
/// Indexes may honour it only partially, so the ranker evaluates the same
/// predicates again with [`StructuredFilter::matches`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredFilter {
    pub category: Option<Category>,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
    pub exclude_id: Option<String>,
}

impl StructuredFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.exclude_id.is_none()
    }

    pub fn matches(&self, id: &str, product: &Product) -> bool {
        if let Some(category) = self.category {
            if product.category != category {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        if let Some(excluded) = &self.exclude_id {
            if id == excluded || product.id == *excluded {
                return false;
            }
        }
        true
    }
}
