// Core structs: Listing, MatchScore, ProductSummary, Comparison, request/response and errors
use crate::utils::normalize_rating;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One candidate product record from one source for one search query.
///
/// Values are never mutated after construction; the `with_*` builders consume
/// the listing and hand back a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub source: String,
    pub title: String,
    pub url: String,
    /// Price in the minor currency unit (KRW has no subunit, so won).
    pub price: Option<i64>,
    /// Always on the 0-5 scale.
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
    pub image_url: Option<String>,
    /// ISO-8601 retrieval time.
    pub fetched_at: String,
}

impl Listing {
    pub fn new(
        source: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        fetched_at: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            url: url.into(),
            price: None,
            rating: None,
            review_count: None,
            image_url: None,
            fetched_at: fetched_at.into(),
        }
    }

    pub fn with_price(self, price: Option<i64>) -> Self {
        Self { price, ..self }
    }

    /// Sets the rating, clamped into [0, 5].
    pub fn with_rating(self, rating: Option<f64>) -> Self {
        Self {
            rating: normalize_rating(rating, 5.0),
            ..self
        }
    }

    pub fn with_review_count(self, review_count: Option<u64>) -> Self {
        Self {
            review_count,
            ..self
        }
    }

    pub fn with_image(self, image_url: Option<String>) -> Self {
        Self {
            image_url: image_url.filter(|u| !u.trim().is_empty()),
            ..self
        }
    }

    /// Merges detail-page data into a new listing. Missing values keep the
    /// listing's existing ones.
    pub fn with_details(self, rating: Option<f64>, review_count: Option<u64>) -> Self {
        let rating = rating.or(self.rating);
        let review_count = review_count.or(self.review_count);
        self.with_rating(rating).with_review_count(review_count)
    }
}

/// A scored listing plus the reasons behind the score, in evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchScore {
    pub listing: Listing,
    pub score: f64,
    pub reasons: Vec<String>,
}

/// Aggregated result for one (brand, query) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub brand: String,
    pub query: String,
    pub best_offer: Option<Listing>,
    /// Every listing, best first.
    #[serde(default)]
    pub offers: Vec<Listing>,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub evidence: Vec<String>,
}

impl ProductSummary {
    /// Summary with empty enrichment fields.
    pub fn new(
        brand: impl Into<String>,
        query: impl Into<String>,
        best_offer: Option<Listing>,
        offers: Vec<Listing>,
    ) -> Self {
        Self {
            brand: brand.into(),
            query: query.into(),
            best_offer,
            offers,
            key_features: Vec::new(),
            pros: Vec::new(),
            cons: Vec::new(),
            evidence: Vec::new(),
        }
    }
}

/// Differences between two products' best listings (A - B).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub rating_diff: Option<f64>,
    pub price_diff: Option<i64>,
    pub review_count_diff: Option<i64>,
}

fn default_brand_a() -> String {
    "농심".into()
}
fn default_product_a() -> String {
    "신라면".into()
}
fn default_brand_b() -> String {
    "오뚜기".into()
}
fn default_product_b() -> String {
    "진라면 매운맛".into()
}
fn default_sources() -> Vec<String> {
    vec!["danawa".into()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareRequest {
    #[serde(default = "default_brand_a")]
    pub brand_a: String,
    #[serde(default = "default_product_a")]
    pub product_a: String,
    #[serde(default = "default_brand_b")]
    pub brand_b: String,
    #[serde(default = "default_product_b")]
    pub product_b: String,
    /// Source names; unknown names surface as warnings.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    #[serde(default)]
    pub force_refresh: bool,
}

impl Default for CompareRequest {
    fn default() -> Self {
        Self {
            brand_a: default_brand_a(),
            product_a: default_product_a(),
            brand_b: default_brand_b(),
            product_b: default_product_b(),
            sources: default_sources(),
            force_refresh: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResponse {
    pub request_id: String,
    pub product_a: ProductSummary,
    pub product_b: ProductSummary,
    pub comparison: Comparison,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub cached: bool,
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected HTTP status {0}")]
    InvalidResponse(u16),
    #[error(transparent)]
    Parse(#[from] ParserError),
    #[error("{0} is not configured")]
    NotConfigured(String),
}

impl From<reqwest::Error> for ScraperError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ScraperError::Timeout
        } else {
            ScraperError::HttpError(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("HTML parse error: {0}")]
    HtmlParseError(String),
    #[error("XML parse error: {0}")]
    XmlParseError(String),
    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("cache lock poisoned")]
    Poisoned,
    #[error("cache ttl out of range")]
    TtlOutOfRange,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("rate limit exceeded, retry force refresh in {wait_seconds} seconds")]
    RateLimited { wait_seconds: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Listing {
        Listing::new("danawa", "농심 신라면 120g", "https://example.com/1", "2026-01-01T00:00:00")
    }

    #[test]
    fn with_rating_clamps_into_range() {
        assert_eq!(listing().with_rating(Some(7.3)).rating, Some(5.0));
        assert_eq!(listing().with_rating(Some(-1.0)).rating, Some(0.0));
        assert_eq!(listing().with_rating(Some(f64::NAN)).rating, None);
    }

    #[test]
    fn with_details_keeps_existing_values_when_missing() {
        let base = listing().with_rating(Some(4.2)).with_review_count(Some(10));
        let merged = base.clone().with_details(None, Some(250));
        assert_eq!(merged.rating, Some(4.2));
        assert_eq!(merged.review_count, Some(250));
        // base listing untouched
        assert_eq!(base.review_count, Some(10));
    }

    #[test]
    fn blank_image_is_dropped() {
        assert_eq!(listing().with_image(Some("  ".into())).image_url, None);
    }

    #[test]
    fn compare_request_defaults_fill_missing_fields() {
        let req: CompareRequest = serde_json::from_str(r#"{"product_a":"짜파게티"}"#).unwrap();
        assert_eq!(req.product_a, "짜파게티");
        assert_eq!(req.brand_a, "농심");
        assert_eq!(req.sources, vec!["danawa".to_string()]);
        assert!(!req.force_refresh);
    }
}
