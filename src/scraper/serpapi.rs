use crate::model::{Listing, ScraperError};
use crate::parser::{Parser, SerpApiParser};
use crate::scraper::fetcher::HttpFetcher;
use crate::scraper::traits::{ListingSource, search_query};

/// Naver Shopping results through SerpApi.
pub struct SerpApiSource {
    http: HttpFetcher,
    api_url: String,
    api_key: Option<String>,
}

impl SerpApiSource {
    pub fn new(http: HttpFetcher, api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl ListingSource for SerpApiSource {
    async fn fetch(
        &self,
        query: &str,
        brand: &str,
        max_results: usize,
    ) -> Result<Vec<Listing>, ScraperError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ScraperError::NotConfigured("SerpApi API key".into()))?;

        let params = [
            ("engine", "naver_shopping".to_string()),
            ("query", search_query(query, brand)),
            ("api_key", key.to_string()),
            ("num", max_results.to_string()),
        ];
        let body = self.http.get_text(&self.api_url, &params).await?;

        let mut offers = SerpApiParser.parse(&body)?;
        offers.truncate(max_results);
        Ok(offers)
    }
}
