//! Candidate ranking: hard filtering, feature boosting, ordering.
//!
//! The combined score is multiplicative:
//!
//!   combined = raw * (1 + feature_score)
//!
//! where `feature_score` adds [`FEATURE_WEIGHT`] for every feature type
//! extracted from the query that also appears in the candidate's feature
//! text. A candidate without feature matches keeps its raw similarity.

use std::sync::Arc;

use crate::search::extract::FeatureSet;
use crate::search::lexicon::FeatureLexicon;
use crate::search::types::{Candidate, Match, Product, StructuredFilter};

/// Contribution of one matched feature type. Synonyms of the same type do
/// not stack.
pub const FEATURE_WEIGHT: f32 = 1.0;

pub struct Ranker {
    lexicon: Arc<FeatureLexicon>,
}

impl Ranker {
    pub fn new(lexicon: Arc<FeatureLexicon>) -> Self {
        Self { lexicon }
    }

    /// Turn raw candidates into the final ordered list.
    ///
    /// # Arguments
    /// * `candidates` - Index hits in the order the index returned them
    /// * `filter` - Predicates every returned match must satisfy
    /// * `features` - Feature types extracted from the query (may be empty)
    /// * `top_k` - Maximum number of matches to return
    ///
    /// # Returns
    /// Matches sorted by combined score, highest first. Equal scores keep
    /// the incoming candidate order. Fewer than `top_k` survivors are
    /// returned as-is. Candidates with a NaN or infinite score are dropped.
    pub fn rank(
        &self,
        candidates: Vec<Candidate>,
        filter: &StructuredFilter,
        features: &FeatureSet,
        top_k: usize,
    ) -> Vec<Match> {
        let received = candidates.len();

        let mut matches: Vec<Match> = candidates
            .into_iter()
            .filter(|c| filter.matches(&c.id, &c.product))
            .filter(|c| {
                let finite = c.score.is_finite();
                if !finite {
                    log::warn!("dropping candidate {} with score {}", c.id, c.score);
                }
                finite
            })
            .map(|c| self.score(c, features))
            .collect();

        let survived = matches.len();

        // sort_by is stable, so ties stay in upstream similarity order
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);

        log::debug!(
            "ranked {} candidates: {} passed filters, returning {}",
            received,
            survived,
            matches.len()
        );

        matches
    }

    /// Feature types from `features` present in the product's feature text.
    pub fn matched_features(&self, features: &FeatureSet, product: &Product) -> Vec<String> {
        if features.is_empty() {
            return vec![];
        }

        let text = product.feature_text();
        features
            .iter()
            .filter(|feature| {
                self.lexicon
                    .feature_present(product.category, feature.as_str(), &text)
            })
            .cloned()
            .collect()
    }

    fn score(&self, candidate: Candidate, features: &FeatureSet) -> Match {
        let matched_features = self.matched_features(features, &candidate.product);
        let feature_score = matched_features.len() as f32 * FEATURE_WEIGHT;

        Match {
            id: candidate.id,
            score: candidate.score * (1.0 + feature_score),
            raw_score: candidate.score,
            matched_features,
            product: candidate.product,
        }
    }
}
