//! Pipeline configuration
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! max_concurrency = 8
//! classifier_timeout_secs = 30
//! extensions = ["mediawiki", "md"]
//! include_mentions = false
//!
//! [reference]
//! id_prefix = "bip-"
//! mention_keyword = "BIP"
//!
//! [classifier]
//! enabled = true
//! base_url = "https://api.openai.com/v1"
//! model = "gpt-3.5-turbo"
//! api_key_env = "OPENAI_API_KEY"
//! ```

use crate::error::ConfigError;
use docgraph_refs::ReferenceSyntax;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Batch pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Documents processed at once
    pub max_concurrency: usize,
    /// Time bound for one classifier call
    pub classifier_timeout_secs: u64,
    /// Source document extensions, in lookup priority order
    pub extensions: Vec<String>,
    /// Reference syntax of the corpus
    pub reference: ReferenceSyntax,
    /// Dependency classifier
    pub classifier: ClassifierConfig,
    /// Whether the graph includes `mentions` edges
    pub include_mentions: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            classifier_timeout_secs: 30,
            extensions: vec!["mediawiki".to_string(), "md".to_string()],
            reference: ReferenceSyntax::default(),
            classifier: ClassifierConfig::default(),
            include_mentions: false,
        }
    }
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// [`ConfigError::Parse`] or [`ConfigError::Invalid`]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] naming the offending key
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::Invalid("max_concurrency must be at least 1".into()));
        }
        if self.classifier_timeout_secs == 0 {
            return Err(ConfigError::Invalid("classifier_timeout_secs must be at least 1".into()));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::Invalid("extensions must not be empty".into()));
        }
        if self.reference.mention_keyword.is_empty() {
            return Err(ConfigError::Invalid("reference.mention_keyword must not be empty".into()));
        }
        Ok(())
    }

    /// With max concurrency
    #[inline]
    #[must_use]
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// With classifier timeout
    #[inline]
    #[must_use]
    pub fn with_classifier_timeout_secs(mut self, secs: u64) -> Self {
        self.classifier_timeout_secs = secs;
        self
    }

    /// With source extensions
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// With reference syntax
    #[inline]
    #[must_use]
    pub fn with_reference(mut self, reference: ReferenceSyntax) -> Self {
        self.reference = reference;
        self
    }

    /// With classifier settings
    #[inline]
    #[must_use]
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// With or without `mentions` edges
    #[inline]
    #[must_use]
    pub fn with_mentions(mut self, include: bool) -> Self {
        self.include_mentions = include;
        self
    }

    /// Classifier time bound
    #[inline]
    #[must_use]
    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(self.classifier_timeout_secs)
    }
}

/// Chat-completions classifier settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Whether to call the classifier at all
    pub enabled: bool,
    /// API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl ClassifierConfig {
    /// API key from the configured environment variable, if set and non-empty
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
