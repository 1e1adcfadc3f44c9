use crate::model::{CompareRequest, ConfigError};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

/// Longest accepted cache TTL (ten years).
pub const MAX_TTL_SECONDS: u64 = 315_360_000;

/// Which similarity strategy the scorer uses for the title signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityKind {
    #[default]
    Fuzzy,
    WordOverlap,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Brand words stripped from titles before comparison.
    pub brand_tokens: Vec<String>,
    /// Words marking a multi-unit package.
    pub bulk_keywords: Vec<String>,
    pub low_confidence_threshold: f64,
    /// A runner-up scoring above `best * runner_up_ratio` is reported as an alternative.
    pub runner_up_ratio: f64,
    pub similarity: SimilarityKind,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            brand_tokens: ["농심", "오뚜기", "삼양", "팔도", "nongshim", "ottogi", "samyang", "paldo"]
                .into_iter()
                .map(String::from)
                .collect(),
            bulk_keywords: ["세트", "박스", "묶음", "대용량", "업소용"]
                .into_iter()
                .map(String::from)
                .collect(),
            low_confidence_threshold: 30.0,
            runner_up_ratio: 0.9,
            similarity: SimilarityKind::Fuzzy,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub max_results: usize,
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub danawa_search_url: String,
    pub elevenst_api_url: String,
    pub elevenst_api_key: Option<String>,
    pub serpapi_url: String,
    pub serpapi_api_key: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            timeout_seconds: 20,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into(),
            danawa_search_url: "https://search.danawa.com/dsearch.php".into(),
            elevenst_api_url: "http://openapi.11st.co.kr/openapi/OpenApiService.tmall".into(),
            elevenst_api_key: None,
            serpapi_url: "https://serpapi.com/search".into(),
            serpapi_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub rate_limit_seconds: u64,
    pub max_entries: usize,
    /// Persistent SQLite cache; in-memory when absent.
    pub sqlite_path: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 900,
            rate_limit_seconds: 60,
            max_entries: 100,
            sqlite_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub matching: MatchConfig,
    pub sources: SourcesConfig,
    pub cache: CacheConfig,
    pub comparisons: Vec<CompareRequest>,
    pub check_interval_seconds: Option<u64>,
}

impl AppConfig {
    /// Applies `CACHE_TTL_SECONDS`, `RATE_LIMIT_SECONDS`, `SERPAPI_API_KEY`
    /// and `ELEVENST_API_KEY` from the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CACHE_TTL_SECONDS") {
            self.cache.ttl_seconds = parse_seconds("CACHE_TTL_SECONDS", &v)?;
        }
        if let Some(v) = lookup("RATE_LIMIT_SECONDS") {
            self.cache.rate_limit_seconds = parse_seconds("RATE_LIMIT_SECONDS", &v)?;
        }
        if let Some(v) = lookup("SERPAPI_API_KEY").filter(|v| !v.is_empty()) {
            self.sources.serpapi_api_key = Some(v);
        }
        if let Some(v) = lookup("ELEVENST_API_KEY").filter(|v| !v.is_empty()) {
            self.sources.elevenst_api_key = Some(v);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_seconds == 0 {
            return Err(ConfigError::Invalid("cache.ttl_seconds must be positive".into()));
        }
        if self.cache.ttl_seconds > MAX_TTL_SECONDS {
            return Err(ConfigError::Invalid(format!(
                "cache.ttl_seconds must not exceed {}",
                MAX_TTL_SECONDS
            )));
        }
        if self.sources.timeout_seconds == 0 {
            return Err(ConfigError::Invalid("sources.timeout_seconds must be positive".into()));
        }
        if self.sources.max_results == 0 {
            return Err(ConfigError::Invalid("sources.max_results must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.matching.runner_up_ratio) {
            return Err(ConfigError::Invalid("matching.runner_up_ratio must lie in [0, 1]".into()));
        }
        Ok(())
    }
}

fn parse_seconds(name: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{} is not a number of seconds: {}", name, value)))
}

/// Reads the JSON config, applies environment overrides and validates. A
/// missing file means built-in defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let mut config: AppConfig = match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("{} not found, using built-in defaults", path.display());
            AppConfig::default()
        }
        Err(e) => return Err(e.into()),
    };
    config.apply_env(|k| std::env::var(k).ok())?;
    config.validate()?;
    Ok(config)
}
