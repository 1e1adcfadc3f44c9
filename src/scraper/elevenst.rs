use crate::model::{Listing, ScraperError};
use crate::parser::{ElevenstParser, Parser};
use crate::scraper::fetcher::HttpFetcher;
use crate::scraper::traits::{ListingSource, search_query};

/// 11st Open API product search.
pub struct ElevenstSource {
    http: HttpFetcher,
    api_url: String,
    api_key: Option<String>,
}

impl ElevenstSource {
    pub fn new(http: HttpFetcher, api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl ListingSource for ElevenstSource {
    async fn fetch(
        &self,
        query: &str,
        brand: &str,
        max_results: usize,
    ) -> Result<Vec<Listing>, ScraperError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ScraperError::NotConfigured("11st API key".into()))?;

        let params = [
            ("key", key.to_string()),
            ("apiCode", "ProductSearch".to_string()),
            ("keyword", search_query(query, brand)),
            ("pageSize", max_results.to_string()),
            ("pageNum", "1".to_string()),
            ("sortCd", "CP".to_string()),
        ];
        let xml = self.http.get_text(&self.api_url, &params).await?;

        let mut offers = ElevenstParser.parse(&xml)?;
        offers.truncate(max_results);
        Ok(offers)
    }
}
