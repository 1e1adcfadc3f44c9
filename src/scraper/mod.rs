// Listing sources: one concrete fetcher per supported storefront.

pub mod danawa;
pub mod elevenst;
pub mod fetcher;
pub mod serpapi;
pub mod traits;

use crate::config::SourcesConfig;
use crate::model::ScraperError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use danawa::DanawaSource;
pub use elevenst::ElevenstSource;
pub use fetcher::HttpFetcher;
pub use serpapi::SerpApiSource;
pub use traits::ListingSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "danawa")]
    Danawa,
    #[serde(rename = "11st")]
    Elevenst,
    #[serde(rename = "naver_serpapi")]
    NaverSerpapi,
}

#[derive(Debug, Error, PartialEq)]
#[error("Unknown source: {0}")]
pub struct UnknownSource(pub String);

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Danawa, SourceKind::Elevenst, SourceKind::NaverSerpapi];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Danawa => "danawa",
            SourceKind::Elevenst => "11st",
            SourceKind::NaverSerpapi => "naver_serpapi",
        }
    }

    fn build(self, cfg: &SourcesConfig, http: &HttpFetcher) -> Result<Arc<dyn ListingSource>, ScraperError> {
        Ok(match self {
            SourceKind::Danawa => Arc::new(DanawaSource::new(http.clone(), &cfg.danawa_search_url)?),
            SourceKind::Elevenst => Arc::new(ElevenstSource::new(
                http.clone(),
                &cfg.elevenst_api_url,
                cfg.elevenst_api_key.clone(),
            )),
            SourceKind::NaverSerpapi => Arc::new(SerpApiSource::new(
                http.clone(),
                &cfg.serpapi_url,
                cfg.serpapi_api_key.clone(),
            )),
        })
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        SourceKind::ALL
            .into_iter()
            .find(|k| k.as_str() == name)
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}

/// Maps each supported source to its fetcher.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: HashMap<SourceKind, Arc<dyn ListingSource>>,
}

impl SourceRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &SourcesConfig) -> Result<Self, ScraperError> {
        let http = HttpFetcher::new(&cfg.user_agent, Duration::from_secs(cfg.timeout_seconds))?;
        let mut registry = Self::empty();
        for kind in SourceKind::ALL {
            registry = registry.register(kind, kind.build(cfg, &http)?);
        }
        Ok(registry)
    }

    pub fn register(mut self, kind: SourceKind, source: Arc<dyn ListingSource>) -> Self {
        self.sources.insert(kind, source);
        self
    }

    pub fn get(&self, kind: SourceKind) -> Option<Arc<dyn ListingSource>> {
        self.sources.get(&kind).cloned()
    }
}
