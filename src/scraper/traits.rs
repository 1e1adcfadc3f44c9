use crate::model::{Listing, ScraperError};

/// A storefront that can be searched for candidate listings.
#[async_trait::async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch(
        &self,
        query: &str,
        brand: &str,
        max_results: usize,
    ) -> Result<Vec<Listing>, ScraperError>;
}

/// Storefront search text: brand first when present.
pub fn search_query(query: &str, brand: &str) -> String {
    let brand = brand.trim();
    if brand.is_empty() {
        query.trim().to_string()
    } else {
        format!("{} {}", brand, query.trim())
    }
}
