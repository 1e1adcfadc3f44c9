use crate::model::{CompareError, CompareRequest, CompareResponse};
use crate::service::aggregate::{Aggregator, compute_comparison};
use crate::service::enrich::{Enricher, enrich_summary};
use crate::storage::{RateLimiter, ResponseCache, Throttle, make_cache_key};
use crate::utils::generate_request_id;
use std::time::Duration;
use tracing::{info, warn};

/// Cached, rate-limited comparison of two products.
pub struct CompareService {
    aggregator: Aggregator,
    cache: Box<dyn ResponseCache>,
    limiter: RateLimiter,
    enricher: Box<dyn Enricher>,
    ttl: Duration,
}

impl CompareService {
    pub fn new(
        aggregator: Aggregator,
        cache: Box<dyn ResponseCache>,
        limiter: RateLimiter,
        enricher: Box<dyn Enricher>,
        ttl: Duration,
    ) -> Self {
        Self {
            aggregator,
            cache,
            limiter,
            enricher,
            ttl,
        }
    }

    /// Serves from cache unless `force_refresh` is set; forced refreshes are
    /// rate limited per cache key.
    pub async fn compare(&self, req: &CompareRequest) -> Result<CompareResponse, CompareError> {
        let key = make_cache_key(req);

        if req.force_refresh {
            if let Throttle::Wait(wait_seconds) = self.limiter.check_and_update(&key) {
                warn!("Force refresh throttled for {} ({}s left)", key, wait_seconds);
                return Err(CompareError::RateLimited { wait_seconds });
            }
        } else if let Some(hit) = self.cached(&key) {
            info!("Cache hit for {} vs {}", req.product_a, req.product_b);
            return Ok(hit);
        }

        let ((summary_a, warnings_a), (summary_b, warnings_b)) = tokio::join!(
            self.aggregator.aggregate(&req.product_a, &req.brand_a, &req.sources),
            self.aggregator.aggregate(&req.product_b, &req.brand_b, &req.sources),
        );

        let enricher = self.enricher.as_ref();
        let (product_a, product_b) = tokio::join!(
            enrich_summary(enricher, summary_a, &[]),
            enrich_summary(enricher, summary_b, &[]),
        );

        let mut warnings = warnings_a;
        warnings.extend(warnings_b);

        let response = CompareResponse {
            request_id: generate_request_id(),
            comparison: compute_comparison(&product_a, &product_b),
            product_a,
            product_b,
            warnings,
            cached: false,
        };

        self.store(&key, &response);
        Ok(response)
    }

    // Unreadable or corrupt entries count as a miss.
    fn cached(&self, key: &str) -> Option<CompareResponse> {
        let raw = match self.cache.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Cache read failed: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<CompareResponse>(&raw) {
            Ok(mut response) => {
                response.cached = true;
                Some(response)
            }
            Err(e) => {
                warn!("Discarding malformed cache entry {}: {}", key, e);
                None
            }
        }
    }

    fn store(&self, key: &str, response: &CompareResponse) {
        let payload = match serde_json::to_string(response) {
            Ok(p) => p,
            Err(e) => {
                warn!("Cannot serialize response {}: {}", response.request_id, e);
                return;
            }
        };
        if let Err(e) = self.cache.set(key, &payload, self.ttl) {
            warn!("Cache write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::matcher::OfferRanker;
    use crate::model::{Comparison, Listing, ScraperError, StorageError};
    use crate::scraper::{ListingSource, SourceKind, SourceRegistry};
    use crate::service::enrich::{ListingFactsEnricher, NOT_FOUND_FEATURE};
    use crate::storage::InMemoryCache;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl ListingSource for CountingSource {
        async fn fetch(&self, query: &str, brand: &str, _: usize) -> Result<Vec<Listing>, ScraperError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let listing = match query {
                "신라면" => Listing::new("danawa", format!("{} 신라면 120g", brand), "https://d/1", "t")
                    .with_price(Some(4500))
                    .with_rating(Some(4.5))
                    .with_review_count(Some(1000)),
                _ => Listing::new("danawa", format!("{} {}", brand, query), "https://d/2", "t")
                    .with_price(Some(4200))
                    .with_review_count(Some(800)),
            };
            Ok(vec![listing])
        }
    }

    struct BrokenCache;

    impl ResponseCache for BrokenCache {
        fn get(&self, _: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Poisoned)
        }
        fn set(&self, _: &str, _: &str, _: Duration) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    fn service_with(cache: Box<dyn ResponseCache>, calls: Arc<AtomicUsize>) -> CompareService {
        let registry = SourceRegistry::empty()
            .register(SourceKind::Danawa, Arc::new(CountingSource { calls }));
        let aggregator = Aggregator::new(
            registry,
            OfferRanker::from_config(&MatchConfig::default()),
            10,
            Duration::from_secs(1),
        );
        CompareService::new(
            aggregator,
            cache,
            RateLimiter::new(Duration::from_secs(60)),
            Box::new(ListingFactsEnricher),
            Duration::from_secs(900),
        )
    }

    fn service(calls: Arc<AtomicUsize>) -> CompareService {
        service_with(Box::new(InMemoryCache::new(10)), calls)
    }

    #[tokio::test]
    async fn fresh_compare_fills_everything() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resp = service(calls.clone())
            .compare(&CompareRequest::default())
            .await
            .unwrap();

        assert!(!resp.cached);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(resp.request_id.len(), 36);
        assert_eq!(resp.product_a.best_offer.as_ref().unwrap().title, "농심 신라면 120g");
        assert!(!resp.product_a.key_features.is_empty());
        assert_eq!(resp.comparison.price_diff, Some(300));
        assert_eq!(resp.comparison.review_count_diff, Some(200));
        assert_eq!(resp.comparison.rating_diff, None);
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let svc = service(calls.clone());
        let first = svc.compare(&CompareRequest::default()).await.unwrap();

        let mut again = CompareRequest::default();
        again.sources = vec![" DANAWA ".into()];
        let second = svc.compare(&again).await.unwrap();

        assert!(second.cached);
        assert_eq!(second.request_id, first.request_id);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn force_refresh_bypasses_cache_then_throttles() {
        let calls = Arc::new(AtomicUsize::new(0));
        let svc = service(calls.clone());
        svc.compare(&CompareRequest::default()).await.unwrap();

        let forced = CompareRequest {
            force_refresh: true,
            ..CompareRequest::default()
        };
        let refreshed = svc.compare(&forced).await.unwrap();
        assert!(!refreshed.cached);
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let err = svc.compare(&forced).await.unwrap_err();
        let CompareError::RateLimited { wait_seconds } = err;
        assert!((1..=60).contains(&wait_seconds));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn corrupt_cache_entry_is_recomputed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = InMemoryCache::new(10);
        let req = CompareRequest::default();
        cache
            .set(&make_cache_key(&req), "{not json", Duration::from_secs(60))
            .unwrap();

        let resp = service_with(Box::new(cache), calls.clone())
            .compare(&req)
            .await
            .unwrap();
        assert!(!resp.cached);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cache_failures_do_not_fail_the_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let svc = service_with(Box::new(BrokenCache), calls.clone());
        assert!(svc.compare(&CompareRequest::default()).await.is_ok());
        assert!(!svc.compare(&CompareRequest::default()).await.unwrap().cached);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn unknown_sources_only_warn() {
        let calls = Arc::new(AtomicUsize::new(0));
        let req = CompareRequest {
            sources: vec!["coupang".into()],
            ..CompareRequest::default()
        };
        let resp = service(calls.clone()).compare(&req).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(resp.product_a.best_offer.is_none());
        assert_eq!(resp.product_a.key_features, vec![NOT_FOUND_FEATURE.to_string()]);
        assert_eq!(resp.comparison, Comparison::default());
        assert_eq!(
            resp.warnings,
            vec![
                "Unknown source: coupang",
                "No offers available",
                "Unknown source: coupang",
                "No offers available",
            ]
        );
    }
}
