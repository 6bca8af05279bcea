//! Query feature extraction.
//!
//! Finds which feature types of a category are mentioned in a free-text
//! query. Matching is a case-insensitive substring test over the literal
//! lexicon keywords: no stemming, no tokenization.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::search::lexicon::FeatureLexicon;
use crate::search::types::Category;

/// Names of the feature types found in a query. Ordered for stable output.
pub type FeatureSet = BTreeSet<String>;

pub struct FeatureExtractor {
    lexicon: Arc<FeatureLexicon>,
}

impl FeatureExtractor {
    pub fn new(lexicon: Arc<FeatureLexicon>) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &FeatureLexicon {
        &self.lexicon
    }

    /// Feature types whose synonyms occur in `query`.
    ///
    /// Without a category, or for a category the lexicon has no entry for,
    /// the set is empty and boosting is effectively disabled. A feature type
    /// is reported once no matter how many of its synonyms occur.
    pub fn extract(&self, query: &str, category: Option<Category>) -> FeatureSet {
        let Some(category) = category else {
            return FeatureSet::new();
        };
        let Some(features) = self.lexicon.features(category) else {
            return FeatureSet::new();
        };

        let query = query.to_lowercase();

        features
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| query.contains(k.as_str())))
            .map(|(feature, _)| feature.clone())
            .collect()
    }
}
