//! Feature lexicon: category -> feature type -> synonym keywords.
//!
//! Built once at startup and shared read-only behind an `Arc`. Keywords are
//! stored lowercased so matching only has to lowercase the haystack.

use std::collections::BTreeMap;

use crate::search::types::Category;

/// Serializable form of the lexicon, as found in `config.yaml`.
pub type LexiconTable = BTreeMap<Category, BTreeMap<String, Vec<String>>>;

/// Built-in keyword table.
const BUILTIN: &[(Category, &[(&str, &[&str])])] = &[
    (
        Category::Laptops,
        &[
            ("battery", &["battery life", "battery", "long battery", "battery duration"]),
            ("gaming", &["gaming", "gamer", "gpu", "graphics", "rtx", "nvidia", "amd"]),
            ("business", &["business", "professional", "work", "office"]),
            ("student", &["student", "college", "school", "education"]),
            ("creative", &["creative", "design", "art", "video editing", "photo editing"]),
            ("build", &["durable", "premium", "lightweight", "slim", "military-grade"]),
        ],
    ),
    (
        Category::Smartphones,
        &[
            ("camera", &["camera", "photo", "photography", "video", "night mode", "portrait"]),
            ("battery", &["battery", "battery life", "long battery", "battery capacity"]),
            ("display", &["display", "screen", "refresh rate", "hz", "amoled", "oled"]),
            ("5g", &["5g", "5g connectivity", "5g network"]),
            ("security", &["fingerprint", "face recognition", "security", "biometric"]),
        ],
    ),
    (
        Category::Tablets,
        &[
            ("art", &["art", "drawing", "digital art", "stylus", "pen"]),
            ("productivity", &["productivity", "work", "keyboard", "office"]),
            ("entertainment", &["entertainment", "media", "streaming", "gaming"]),
            ("battery", &["battery", "battery life", "long battery"]),
            ("display", &["display", "screen", "promotion", "hdr", "true tone"]),
        ],
    ),
    (
        Category::Audio,
        &[
            ("noise", &["noise cancelling", "noise cancellation", "quiet", "silence"]),
            ("battery", &["battery", "battery life", "long battery"]),
            ("sound", &["sound", "audio", "bass", "spatial", "hifi", "audiophile"]),
            ("comfort", &["comfort", "comfortable", "ergonomic", "lightweight"]),
            ("sports", &["sports", "workout", "running", "exercise", "gym"]),
        ],
    ),
];

/// Immutable keyword lexicon used for feature extraction and boosting.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLexicon {
    entries: LexiconTable,
}

impl FeatureLexicon {
    /// Build a lexicon from a table.
    ///
    /// Keywords are trimmed and lowercased; blank keywords are dropped and
    /// duplicates within a feature type are collapsed. Feature types left
    /// without keywords are removed.
    pub fn new(table: LexiconTable) -> Self {
        let entries = table
            .into_iter()
            .map(|(category, features)| {
                let features = features
                    .into_iter()
                    .filter_map(|(feature, keywords)| {
                        let mut keywords: Vec<String> = keywords
                            .iter()
                            .map(|k| k.trim().to_lowercase())
                            .filter(|k| !k.is_empty())
                            .collect();
                        keywords.sort();
                        keywords.dedup();

                        if keywords.is_empty() {
                            None
                        } else {
                            Some((feature, keywords))
                        }
                    })
                    .collect();
                (category, features)
            })
            .collect();

        Self { entries }
    }

    /// The built-in keyword table covering every category.
    pub fn builtin() -> Self {
        let table = BUILTIN
            .iter()
            .map(|(category, features)| {
                let features = features
                    .iter()
                    .map(|(name, keywords)| {
                        (
                            name.to_string(),
                            keywords.iter().map(|k| k.to_string()).collect(),
                        )
                    })
                    .collect();
                (*category, features)
            })
            .collect();

        Self::new(table)
    }

    /// Whether the lexicon has any feature types for `category`.
    pub fn contains_category(&self, category: Category) -> bool {
        self.entries.contains_key(&category)
    }

    /// Feature types configured for a category, keyed by name.
    pub fn features(&self, category: Category) -> Option<&BTreeMap<String, Vec<String>>> {
        self.entries.get(&category)
    }

    /// Lowercased synonyms for one feature type.
    pub fn synonyms(&self, category: Category, feature: &str) -> Option<&[String]> {
        self.entries
            .get(&category)
            .and_then(|features| features.get(feature))
            .map(Vec::as_slice)
    }

    /// True when any synonym of `feature` is a substring of `lowercase_text`.
    ///
    /// The haystack must already be lowercased.
    pub fn feature_present(&self, category: Category, feature: &str, lowercase_text: &str) -> bool {
        self.synonyms(category, feature)
            .map(|keywords| keywords.iter().any(|k| lowercase_text.contains(k.as_str())))
            .unwrap_or(false)
    }

    /// Copy of the normalized table.
    pub fn to_table(&self) -> LexiconTable {
        self.entries.clone()
    }
}

impl Default for FeatureLexicon {
    fn default() -> Self {
        Self::builtin()
    }
}
