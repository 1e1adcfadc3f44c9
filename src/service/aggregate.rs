use crate::config::AppConfig;
use crate::matcher::OfferRanker;
use crate::model::{Comparison, Listing, ProductSummary, ScraperError};
use crate::scraper::{SourceKind, SourceRegistry};
use futures::future::join_all;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// What one source produced for one query.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    Fetched(Vec<Listing>),
    Failed(String),
}

/// Fans a product query out to the requested sources, merges what comes back
/// and ranks it.
pub struct Aggregator {
    registry: SourceRegistry,
    ranker: OfferRanker,
    max_results: usize,
    fetch_timeout: Duration,
}

impl Aggregator {
    pub fn new(
        registry: SourceRegistry,
        ranker: OfferRanker,
        max_results: usize,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            ranker,
            max_results,
            fetch_timeout,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, ScraperError> {
        Ok(Self::new(
            SourceRegistry::from_config(&cfg.sources)?,
            OfferRanker::from_config(&cfg.matching),
            cfg.sources.max_results,
            Duration::from_secs(cfg.sources.timeout_seconds),
        ))
    }

    pub fn ranker(&self) -> &OfferRanker {
        &self.ranker
    }

    /// Splits requested names into known kinds (deduplicated, in request
    /// order) and warnings for the unknown ones.
    pub fn resolve_sources(names: &[String]) -> (Vec<SourceKind>, Vec<String>) {
        let mut kinds = Vec::new();
        let mut warnings = Vec::new();
        for name in names {
            match name.parse::<SourceKind>() {
                Ok(kind) if !kinds.contains(&kind) => kinds.push(kind),
                Ok(_) => {}
                Err(e) => warnings.push(e.to_string()),
            }
        }
        (kinds, warnings)
    }

    async fn fetch_one(&self, kind: SourceKind, query: &str, brand: &str) -> SourceOutcome {
        let Some(source) = self.registry.get(kind) else {
            return SourceOutcome::Failed("source is not registered".into());
        };

        match timeout(self.fetch_timeout, source.fetch(query, brand, self.max_results)).await {
            Ok(Ok(listings)) => {
                debug!("{} returned {} listings for '{}'", kind, listings.len(), query);
                SourceOutcome::Fetched(listings)
            }
            Ok(Err(e)) => {
                warn!("{} fetch failed for '{}': {}", kind, query, e);
                SourceOutcome::Failed(e.to_string())
            }
            Err(_) => {
                warn!("{} fetch timed out for '{}'", kind, query);
                SourceOutcome::Failed(format!(
                    "timed out after {}s",
                    self.fetch_timeout.as_secs_f64()
                ))
            }
        }
    }

    /// Fetches from every requested source concurrently and builds the
    /// summary. Source problems only ever show up as warnings.
    pub async fn aggregate(
        &self,
        query: &str,
        brand: &str,
        sources: &[String],
    ) -> (ProductSummary, Vec<String>) {
        let (kinds, mut warnings) = Self::resolve_sources(sources);
        info!("Aggregating '{}' '{}' from {} sources", brand, query, kinds.len());

        let outcomes = join_all(kinds.iter().map(|&kind| async move {
            (kind, self.fetch_one(kind, query, brand).await)
        }))
        .await;

        let (summary, rest) = self.assemble(query, brand, outcomes);
        warnings.extend(rest);
        (summary, warnings)
    }

    /// Merges per-source outcomes in the given order and ranks the result.
    pub fn assemble(
        &self,
        query: &str,
        brand: &str,
        outcomes: Vec<(SourceKind, SourceOutcome)>,
    ) -> (ProductSummary, Vec<String>) {
        let mut warnings = Vec::new();
        let mut listings = Vec::new();

        for (kind, outcome) in outcomes {
            match outcome {
                SourceOutcome::Fetched(found) if found.is_empty() => {
                    warnings.push(format!("No results from {}", kind));
                }
                SourceOutcome::Fetched(found) => listings.extend(found),
                SourceOutcome::Failed(reason) => {
                    warnings.push(format!("{} fetch failed: {}", kind, reason));
                }
            }
        }

        let (best, ranked, match_warnings) = self.ranker.match_and_rank(&listings, query, brand);
        warnings.extend(match_warnings);

        (ProductSummary::new(brand, query, best, ranked), warnings)
    }
}

/// Per-field differences (A - B) between the two best offers. All fields stay
/// empty unless both sides have a best offer.
pub fn compute_comparison(a: &ProductSummary, b: &ProductSummary) -> Comparison {
    let (Some(a), Some(b)) = (a.best_offer.as_ref(), b.best_offer.as_ref()) else {
        return Comparison::default();
    };

    Comparison {
        rating_diff: a
            .rating
            .zip(b.rating)
            .map(|(ra, rb)| ((ra - rb) * 100.0).round() / 100.0),
        price_diff: a.price.zip(b.price).map(|(pa, pb)| pa - pb),
        review_count_diff: a
            .review_count
            .zip(b.review_count)
            .map(|(ca, cb)| ca as i64 - cb as i64),
    }
}
