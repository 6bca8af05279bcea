use std::path::{Path, PathBuf};
use std::time::Duration;

use homedir::my_home;
use serde::{Deserialize, Serialize};

use crate::search::{FeatureLexicon, LexiconTable};

const CONFIG_FILE: &str = "config.yaml";

/// Default number of results for `search`
const DEFAULT_TOP_K: usize = 5;
/// Default number of results for `similar`
const DEFAULT_SIMILAR_TOP_K: usize = 3;
/// Candidates requested from the index per wanted result. Filtering runs
/// after retrieval, so asking for exactly top_k could leave too few.
const DEFAULT_OVERSAMPLE_FACTOR: usize = 2;
/// Upper bound for a single embedding or index call
const DEFAULT_CALL_TIMEOUT_MS: u64 = 30_000;

/// Default embedding model name
const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 200;
const DEFAULT_RETRY_MAX_JITTER_MS: u64 = 100;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("couldn't find home dir")]
    NoHomeDir,

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config is malformed: {0}")]
    Malformed(#[from] serde_yml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables of the ranking core
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    #[serde(default = "default_similar_top_k")]
    pub default_similar_top_k: usize,

    /// Index request size is `top_k * oversample_factor`
    #[serde(default = "default_oversample_factor")]
    pub oversample_factor: usize,

    /// Timeout for each external call in milliseconds
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

impl SearchConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_k: DEFAULT_TOP_K,
            default_similar_top_k: DEFAULT_SIMILAR_TOP_K,
            oversample_factor: DEFAULT_OVERSAMPLE_FACTOR,
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
        }
    }
}

/// Configuration for the local embedding model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name for embeddings (e.g., "all-MiniLM-L6-v2")
    #[serde(default = "default_embedding_model")]
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }
}

/// Retry policy applied by the CLI around service calls
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_retry_max_jitter_ms")]
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            max_jitter_ms: DEFAULT_RETRY_MAX_JITTER_MS,
        }
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_similar_top_k() -> usize {
    DEFAULT_SIMILAR_TOP_K
}

fn default_oversample_factor() -> usize {
    DEFAULT_OVERSAMPLE_FACTOR
}

fn default_call_timeout_ms() -> u64 {
    DEFAULT_CALL_TIMEOUT_MS
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_retry_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

fn default_retry_base_delay_ms() -> u64 {
    DEFAULT_RETRY_BASE_DELAY_MS
}

fn default_retry_max_jitter_ms() -> u64 {
    DEFAULT_RETRY_MAX_JITTER_MS
}

fn default_catalog_path() -> String {
    "catalog.json".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retry: RetryConfig,

    /// Product catalog, relative paths resolve against the base path
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Replaces the built-in feature lexicon when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexicon: Option<LexiconTable>,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            embedding: EmbeddingConfig::default(),
            retry: RetryConfig::default(),
            catalog_path: default_catalog_path(),
            lexicon: None,
            base_path: PathBuf::new(),
        }
    }
}

/// Data directory: `PRODSEARCH_BASE_PATH` or `~/.local/share/prodsearch`.
pub fn base_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var("PRODSEARCH_BASE_PATH") {
        return Ok(PathBuf::from(path));
    }

    let home = my_home()
        .map_err(|_| ConfigError::NoHomeDir)?
        .ok_or(ConfigError::NoHomeDir)?;

    Ok(home.join(".local/share/prodsearch"))
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        let search = &self.search;
        if search.default_top_k == 0 || search.default_similar_top_k == 0 {
            return Err(ConfigError::Invalid(
                "search.default_top_k and search.default_similar_top_k must be greater than 0"
                    .to_string(),
            ));
        }
        if search.oversample_factor == 0 {
            return Err(ConfigError::Invalid(
                "search.oversample_factor must be greater than 0".to_string(),
            ));
        }
        if search.call_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "search.call_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.embedding.model.trim().is_empty() {
            return Err(ConfigError::Invalid("embedding.model is empty".to_string()));
        }

        if let Some(table) = &self.lexicon {
            for (category, features) in table {
                for (feature, keywords) in features {
                    if keywords.iter().all(|k| k.trim().is_empty()) {
                        return Err(ConfigError::Invalid(format!(
                            "lexicon.{category}.{feature} has no keywords"
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Load `config.yaml` from `base_path`, creating it with defaults when
    /// missing.
    pub fn load_with(base_path: &Path) -> Result<Self, ConfigError> {
        let config_path = base_path.join(CONFIG_FILE);

        // create new if does not exist
        if !config_path.exists() {
            std::fs::create_dir_all(base_path).map_err(|source| ConfigError::Io {
                path: base_path.to_path_buf(),
                source,
            })?;
            let default_str = serde_yml::to_string(&Self::default())?;
            write_file(&config_path, &default_str)?;
        }

        let config_str = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
            path: config_path.clone(),
            source,
        })?;
        let mut config: Self = serde_yml::from_str(&config_str)?;

        config.base_path = base_path.to_path_buf();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config_str = serde_yml::to_string(&self)?;
        write_file(&self.base_path.join(CONFIG_FILE), &config_str)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Absolute location of the product catalog.
    pub fn catalog_file(&self) -> PathBuf {
        let path = Path::new(&self.catalog_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    /// The configured lexicon, or the built-in one.
    pub fn feature_lexicon(&self) -> FeatureLexicon {
        match &self.lexicon {
            Some(table) => FeatureLexicon::new(table.clone()),
            None => FeatureLexicon::builtin(),
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ConfigError> {
    std::fs::write(path, contents).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
