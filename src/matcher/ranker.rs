use crate::config::MatchConfig;
use crate::matcher::scorer::MatchScorer;
use crate::model::{Listing, MatchScore};
use std::cmp::Ordering;

pub const NO_OFFERS_FOUND: &str = "No offers found";
pub const NO_OFFERS_AVAILABLE: &str = "No offers available";

/// Ranks scored listings and picks the best offer, flagging weak or
/// ambiguous outcomes as warnings.
pub struct OfferRanker {
    scorer: MatchScorer,
    threshold: f64,
    runner_up_ratio: f64,
}

impl OfferRanker {
    pub fn new(scorer: MatchScorer, threshold: f64, runner_up_ratio: f64) -> Self {
        Self {
            scorer,
            threshold,
            runner_up_ratio,
        }
    }

    pub fn from_config(cfg: &MatchConfig) -> Self {
        Self::new(
            MatchScorer::from_config(cfg),
            cfg.low_confidence_threshold,
            cfg.runner_up_ratio,
        )
    }

    pub fn with_threshold(self, threshold: f64) -> Self {
        Self { threshold, ..self }
    }

    pub fn scorer(&self) -> &MatchScorer {
        &self.scorer
    }

    /// Scores every listing and sorts descending. Equal scores keep their
    /// input order.
    pub fn rank(&self, listings: &[Listing], query: &str, brand: &str) -> Vec<MatchScore> {
        let mut scored: Vec<(usize, MatchScore)> = listings
            .iter()
            .enumerate()
            .map(|(i, l)| (i, self.scorer.score(query, brand, l)))
            .collect();
        scored.sort_by(|(ia, a), (ib, b)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(ia.cmp(ib))
        });
        scored.into_iter().map(|(_, s)| s).collect()
    }

    fn warnings_for(&self, ranked: &[MatchScore]) -> Vec<String> {
        let mut warnings = Vec::new();
        let Some(best) = ranked.first() else {
            return warnings;
        };

        if best.score < self.threshold {
            warnings.push(format!(
                "Best match score ({:.1}) is below threshold ({:.1}). Result may not be accurate.",
                best.score, self.threshold
            ));
        }

        if let Some(runner_up) = ranked.get(1) {
            if runner_up.score > best.score * self.runner_up_ratio {
                warnings.push(format!(
                    "Alternative candidate: '{}' (score: {:.1})",
                    runner_up.listing.title, runner_up.score
                ));
            }
        }

        warnings
    }

    /// Picks the top listing. Empty input yields no best offer and a single
    /// "No offers found" warning.
    pub fn select_best(
        &self,
        listings: &[Listing],
        query: &str,
        brand: &str,
    ) -> (Option<Listing>, Vec<String>) {
        if listings.is_empty() {
            return (None, vec![NO_OFFERS_FOUND.to_string()]);
        }
        let ranked = self.rank(listings, query, brand);
        let warnings = self.warnings_for(&ranked);
        (ranked.into_iter().next().map(|s| s.listing), warnings)
    }

    /// Like [`select_best`](Self::select_best) but also returns every listing
    /// in ranked order.
    pub fn match_and_rank(
        &self,
        listings: &[Listing],
        query: &str,
        brand: &str,
    ) -> (Option<Listing>, Vec<Listing>, Vec<String>) {
        if listings.is_empty() {
            return (None, Vec::new(), vec![NO_OFFERS_AVAILABLE.to_string()]);
        }
        let ranked = self.rank(listings, query, brand);
        let warnings = self.warnings_for(&ranked);
        let sorted: Vec<Listing> = ranked.into_iter().map(|s| s.listing).collect();
        (sorted.first().cloned(), sorted, warnings)
    }
}
