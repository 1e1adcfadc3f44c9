use crate::model::{Listing, ProductSummary};
use tracing::debug;

pub const NOT_FOUND_FEATURE: &str = "Product information not found";

const MAX_FEATURES: usize = 5;
const MAX_PROS: usize = 4;
const MAX_CONS: usize = 3;
const MAX_EVIDENCE: usize = 3;

// Per-serving price bands in KRW.
const CHEAP_PRICE: i64 = 700;
const PRICEY_PRICE: i64 = 1500;
const WELL_REVIEWED: u64 = 1000;

/// Text attached to a summary by an enrichment collaborator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub key_features: Vec<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub evidence: Vec<String>,
}

/// Produces features, pros, cons and evidence for a best offer.
#[async_trait::async_trait]
pub trait Enricher: Send + Sync {
    async fn summarize(&self, listing: &Listing, reviews: &[String]) -> Enrichment;
}

/// Rule-based enricher working only from the listing's own fields and any
/// supplied review snippets.
#[derive(Debug, Default)]
pub struct ListingFactsEnricher;

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 { format!("-{}", out) } else { out }
}

impl ListingFactsEnricher {
    fn build(listing: &Listing, reviews: &[String]) -> Enrichment {
        let mut e = Enrichment::default();
        let title = listing.title.to_lowercase();

        if let Some(price) = listing.price {
            e.key_features.push(format!("Lowest price {} KRW", group_thousands(price)));
            if price < CHEAP_PRICE {
                e.pros.push("Low price".into());
            } else if price > PRICEY_PRICE {
                e.cons.push("Relatively expensive".into());
            }
        }

        if let Some(rating) = listing.rating {
            e.key_features.push(format!("Rated {:.1}/5.0", rating));
            if rating >= 4.5 {
                e.pros.push("High customer satisfaction".into());
            } else if rating < 3.5 {
                e.cons.push("Below-average rating".into());
            }
        }

        if let Some(count) = listing.review_count.filter(|c| *c > 0) {
            e.key_features.push(format!("{} reviews", group_thousands(count as i64)));
            if count >= WELL_REVIEWED {
                e.pros.push("Backed by many reviews".into());
            }
        }

        if title.contains('컵') || title.contains("사발") {
            e.key_features.push("Cup noodle".into());
            e.pros.push("Quick to prepare".into());
        } else {
            e.key_features.push("Bag noodle".into());
            e.pros.push("Good value".into());
        }

        e.evidence.extend(
            reviews
                .iter()
                .map(|r| r.trim())
                .filter(|r| !r.is_empty())
                .map(|r| format!("\"{}\"", r)),
        );
        if e.evidence.is_empty() && !listing.url.is_empty() {
            e.evidence.push(format!("Listed on {}: {}", listing.source, listing.url));
        }

        e.key_features.truncate(MAX_FEATURES);
        e.pros.truncate(MAX_PROS);
        e.cons.truncate(MAX_CONS);
        e.evidence.truncate(MAX_EVIDENCE);
        e
    }
}

#[async_trait::async_trait]
impl Enricher for ListingFactsEnricher {
    async fn summarize(&self, listing: &Listing, reviews: &[String]) -> Enrichment {
        Self::build(listing, reviews)
    }
}

/// Fills the summary's enrichment fields. Without a best offer the summary
/// only gets a "not found" feature.
pub async fn enrich_summary(
    enricher: &dyn Enricher,
    mut summary: ProductSummary,
    reviews: &[String],
) -> ProductSummary {
    let Some(best) = summary.best_offer.as_ref() else {
        summary.key_features = vec![NOT_FOUND_FEATURE.to_string()];
        return summary;
    };

    debug!("Enriching summary for '{}'", best.title);
    let enrichment = enricher.summarize(best, reviews).await;
    summary.key_features = enrichment.key_features;
    summary.pros = enrichment.pros;
    summary.cons = enrichment.cons;
    summary.evidence = enrichment.evidence;
    summary
}
