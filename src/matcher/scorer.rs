use crate::config::MatchConfig;
use crate::matcher::similarity::Similarity;
use crate::model::{Listing, MatchScore};
use crate::normalizer::TitleNormalizer;

pub const SIMILARITY_WEIGHT: f64 = 0.5;
pub const BRAND_POINTS: f64 = 20.0;
pub const PRICE_POINTS: f64 = 5.0;
pub const RATING_POINTS: f64 = 5.0;
pub const REVIEW_POINTS: f64 = 10.0;
pub const IMAGE_POINTS: f64 = 5.0;
pub const BULK_PENALTY: f64 = 15.0;

/// Scores how likely a listing is the queried product.
///
/// The score is a sum of independent signals (title similarity, brand in
/// title, presence of price/rating/reviews/image) minus a penalty for bulk
/// packages the query did not ask for, floored at zero. Every signal that
/// fires adds one reason line, in evaluation order.
pub struct MatchScorer {
    normalizer: TitleNormalizer,
    similarity: Box<dyn Similarity>,
    bulk_keywords: Vec<String>,
}

impl MatchScorer {
    pub fn new(
        normalizer: TitleNormalizer,
        similarity: Box<dyn Similarity>,
        bulk_keywords: &[String],
    ) -> Self {
        Self {
            normalizer,
            similarity,
            bulk_keywords: bulk_keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn from_config(cfg: &MatchConfig) -> Self {
        Self::new(
            TitleNormalizer::new(&cfg.brand_tokens),
            cfg.similarity.build(),
            &cfg.bulk_keywords,
        )
    }

    pub fn normalizer(&self) -> &TitleNormalizer {
        &self.normalizer
    }

    fn has_bulk_keyword(&self, lowered: &str) -> bool {
        self.bulk_keywords.iter().any(|k| lowered.contains(k.as_str()))
    }

    pub fn score(&self, query: &str, brand: &str, listing: &Listing) -> MatchScore {
        let mut score = 0.0;
        let mut reasons = Vec::new();

        let title_lower = listing.title.to_lowercase();

        let similarity = self.similarity.similarity(
            &self.normalizer.normalize(query),
            &self.normalizer.normalize(&listing.title),
        );
        if similarity > 0.0 {
            score += similarity * SIMILARITY_WEIGHT;
            reasons.push(self.similarity.describe(similarity));
        }

        // An empty brand is contained in every title.
        if title_lower.contains(&brand.to_lowercase()) {
            score += BRAND_POINTS;
            reasons.push(format!("Brand '{}' found in title", brand));
        }

        if listing.price.is_some() {
            score += PRICE_POINTS;
            reasons.push("Has price".to_string());
        }

        if listing.rating.is_some() {
            score += RATING_POINTS;
            reasons.push("Has rating".to_string());
        }

        if let Some(count) = listing.review_count.filter(|c| *c > 0) {
            score += REVIEW_POINTS;
            reasons.push(format!("Has {} reviews", count));
        }

        if listing.image_url.as_deref().is_some_and(|u| !u.is_empty()) {
            score += IMAGE_POINTS;
            reasons.push("Has image".to_string());
        }

        if self.has_bulk_keyword(&title_lower) && !self.has_bulk_keyword(&query.to_lowercase()) {
            score -= BULK_PENALTY;
            reasons.push("Penalty: might be bulk/set product".to_string());
        }

        MatchScore {
            listing: listing.clone(),
            score: score.max(0.0),
            reasons,
        }
    }
}
