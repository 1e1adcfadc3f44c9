use crate::model::{Listing, ScraperError};
use crate::parser::{DanawaDetail, DanawaParser, Parser};
use crate::scraper::fetcher::HttpFetcher;
use crate::scraper::traits::{ListingSource, search_query};
use tracing::{debug, info};

/// Danawa search-page scraper. No API key needed.
pub struct DanawaSource {
    http: HttpFetcher,
    search_url: String,
    parser: DanawaParser,
}

impl DanawaSource {
    pub fn new(http: HttpFetcher, search_url: impl Into<String>) -> Result<Self, ScraperError> {
        Ok(Self {
            http,
            search_url: search_url.into(),
            parser: DanawaParser::new()?,
        })
    }

    async fn fetch_detail(&self, url: &str) -> Result<DanawaDetail, ScraperError> {
        let html = self.http.get_text(url, &[]).await?;
        Ok(DanawaDetail::parse(&html)?)
    }
}

#[async_trait::async_trait]
impl ListingSource for DanawaSource {
    async fn fetch(
        &self,
        query: &str,
        brand: &str,
        max_results: usize,
    ) -> Result<Vec<Listing>, ScraperError> {
        let params = [
            ("keyword", search_query(query, brand)),
            ("module", "goods".to_string()),
            ("act", "dispMain".to_string()),
        ];
        let html = self.http.get_text(&self.search_url, &params).await?;

        let mut offers = self.parser.parse(&html)?;
        offers.truncate(max_results);
        info!("Danawa returned {} offers for '{}'", offers.len(), params[0].1);

        // Search results rarely carry rating/reviews; the top hit's detail page does.
        let first = offers.first().filter(|o| !o.url.is_empty()).cloned();
        if let Some(first) = first {
            let detail = self.fetch_detail(&first.url).await;
            match detail {
                Ok(detail) if !detail.is_empty() => {
                    offers[0] = first.with_details(detail.rating, detail.review_count);
                }
                Ok(_) => debug!("No rating/reviews on detail page {}", first.url),
                Err(e) => debug!("Detail lookup failed for {}: {}", first.url, e),
            }
        }

        Ok(offers)
    }
}
