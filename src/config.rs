//! Configuration loading and defaults.
//!
//! All settings have working defaults, so the binary runs with no config file
//! at all. An optional YAML file (passed with `--config` or the
//! `TITULARES_CONFIG` env var) overrides individual fields; sections and
//! fields not present in the file keep their defaults.
//!
//! ```yaml
//! source:
//!   url: "https://www.infobae.com/america/"
//!   rss_feeds:
//!     - "https://www.infobae.com/feeds/rss/"
//! analysis:
//!   top_words: 20
//!   extra_stopwords: ["video", "fotos"]
//! report:
//!   title: "Reporte de Análisis: Infobae América"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where headlines come from.
    #[serde(default)]
    pub source: SourceSettings,

    /// Text analysis tuning.
    #[serde(default)]
    pub analysis: AnalysisSettings,

    /// PDF report settings.
    #[serde(default)]
    pub report: ReportSettings,
}

impl AppConfig {
    /// Check the cross-field constraints a plain deserialize can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.source.url)
            .map_err(|e| ConfigError::Invalid(format!("source.url: {e}")))?;
        for feed in &self.source.rss_feeds {
            url::Url::parse(feed)
                .map_err(|e| ConfigError::Invalid(format!("source.rss_feeds `{feed}`: {e}")))?;
        }
        scraper::Selector::parse(&self.source.headline_selector).map_err(|e| {
            ConfigError::Invalid(format!("source.headline_selector: {e}"))
        })?;
        scraper::Selector::parse(&self.source.deck_selector)
            .map_err(|e| ConfigError::Invalid(format!("source.deck_selector: {e}")))?;
        if self.source.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "source.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.analysis.top_words == 0 {
            return Err(ConfigError::Invalid(
                "analysis.top_words must be at least 1".to_string(),
            ));
        }
        if self.analysis.max_cloud_words == 0 {
            return Err(ConfigError::Invalid(
                "analysis.max_cloud_words must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the headline sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Front page to scrape.
    #[serde(default = "default_url")]
    pub url: String,

    /// User-Agent header sent with every request. Infobae serves a reduced
    /// page to clients without a browser UA.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// CSS selector matching headline elements on the front page.
    #[serde(default = "default_headline_selector")]
    pub headline_selector: String,

    /// CSS selector matching the deck (subtitle) elements.
    #[serde(default = "default_deck_selector")]
    pub deck_selector: String,

    /// Additional RSS feeds to merge into the scrape. Empty by default.
    #[serde(default)]
    pub rss_feeds: Vec<String>,
}

fn default_url() -> String {
    "https://www.infobae.com/america/".to_string()
}

fn default_user_agent() -> String {
    // A browser UA. Infobae returns a stripped-down page to generic clients.
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_headline_selector() -> String {
    "h2.story-card-hl".to_string()
}

fn default_deck_selector() -> String {
    "h3.story-card-deck".to_string()
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            headline_selector: default_headline_selector(),
            deck_selector: default_deck_selector(),
            rss_feeds: Vec::new(),
        }
    }
}

/// Settings for word and entity analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// How many words the frequency bar chart shows.
    #[serde(default = "default_top_words")]
    pub top_words: usize,

    /// Minimum word length in characters. Shorter words are dropped along
    /// with stopwords.
    #[serde(default = "default_min_word_len")]
    pub min_word_len: usize,

    /// Cap on how many distinct words the word cloud tries to place.
    #[serde(default = "default_max_cloud_words")]
    pub max_cloud_words: usize,

    /// How many people and places the entity charts show.
    #[serde(default = "default_top_entities")]
    pub top_entities: usize,

    /// Stopwords added on top of the built-in Spanish list.
    #[serde(default)]
    pub extra_stopwords: Vec<String>,
}

fn default_top_words() -> usize {
    15
}

fn default_min_word_len() -> usize {
    4
}

fn default_max_cloud_words() -> usize {
    200
}

fn default_top_entities() -> usize {
    10
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            top_words: default_top_words(),
            min_word_len: default_min_word_len(),
            max_cloud_words: default_max_cloud_words(),
            top_entities: default_top_entities(),
            extra_stopwords: Vec::new(),
        }
    }
}

/// Settings for the PDF report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Cover page title.
    #[serde(default = "default_report_title")]
    pub title: String,
}

fn default_report_title() -> String {
    "Reporte de Análisis: Infobae América".to_string()
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: default_report_title(),
        }
    }
}

/// Load configuration from a YAML file and validate it.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load the config file if one was given, otherwise use defaults.
///
/// An explicitly named file that is missing or malformed is an error; silently
/// falling back to defaults would hide typos in the `--config` path.
pub fn load_or_default(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(p) => {
            let config = load_config(p)?;
            info!(path = %p.display(), "Loaded configuration");
            Ok(config)
        }
        None => {
            debug!("No config file given, using defaults");
            Ok(AppConfig::default())
        }
    }
}
