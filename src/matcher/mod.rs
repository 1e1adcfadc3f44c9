// Matcher module: similarity strategies, per-listing scoring and ranking.

pub mod similarity;
pub mod scorer;
pub mod ranker;

pub use ranker::OfferRanker;
pub use scorer::MatchScorer;
pub use similarity::{FuzzyRatio, Similarity, WordOverlap};
