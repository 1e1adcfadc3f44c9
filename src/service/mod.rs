// Request-level flow: fan-out aggregation, enrichment and the cached compare call.

pub mod aggregate;
pub mod compare;
pub mod enrich;

pub use aggregate::{Aggregator, SourceOutcome, compute_comparison};
pub use compare::CompareService;
pub use enrich::{Enricher, Enrichment, ListingFactsEnricher, enrich_summary};
