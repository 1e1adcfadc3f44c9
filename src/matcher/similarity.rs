use crate::config::SimilarityKind;
use std::collections::HashSet;

/// Title similarity on a 0-100 scale between a normalized query and a
/// normalized listing title.
pub trait Similarity: Send + Sync {
    fn similarity(&self, query: &str, title: &str) -> f64;

    /// Reason line for the score breakdown.
    fn describe(&self, similarity: f64) -> String;
}

impl SimilarityKind {
    pub fn build(self) -> Box<dyn Similarity> {
        match self {
            SimilarityKind::Fuzzy => Box::new(FuzzyRatio),
            SimilarityKind::WordOverlap => Box::new(WordOverlap),
        }
    }
}

/// Best of the full-string ratio and the best-window partial ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyRatio;

// Longest common subsequence length, single-row DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if ca == cb { diag + 1 } else { up.max(row[j]) };
            diag = up;
        }
    }
    row[b.len()]
}

/// Indel similarity: `2 * lcs / (len_a + len_b)` on a 0-100 scale.
fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    (2 * lcs_len(a, b)) as f64 / total as f64 * 100.0
}

impl FuzzyRatio {
    pub fn ratio(a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        indel_ratio(&a, &b)
    }

    /// Compares the shorter string against every same-length window of the longer one.
    pub fn partial_ratio(a: &str, b: &str) -> f64 {
        let (short, long): (Vec<char>, Vec<char>) = {
            let a: Vec<char> = a.chars().collect();
            let b: Vec<char> = b.chars().collect();
            if a.len() <= b.len() { (a, b) } else { (b, a) }
        };
        if short.is_empty() {
            return 0.0;
        }
        long.windows(short.len())
            .map(|w| indel_ratio(&short, w))
            .fold(0.0, f64::max)
    }
}

impl Similarity for FuzzyRatio {
    fn similarity(&self, query: &str, title: &str) -> f64 {
        if query.is_empty() {
            return 0.0;
        }
        Self::ratio(query, title).max(Self::partial_ratio(query, title))
    }

    fn describe(&self, similarity: f64) -> String {
        format!("String similarity: {:.1}%", similarity)
    }
}

/// Share of query words present in the title.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordOverlap;

impl Similarity for WordOverlap {
    fn similarity(&self, query: &str, title: &str) -> f64 {
        let query_words: HashSet<&str> = query.split_whitespace().collect();
        if query_words.is_empty() {
            return 0.0;
        }
        let title_words: HashSet<&str> = title.split_whitespace().collect();
        let shared = query_words.intersection(&title_words).count();
        shared as f64 / query_words.len() as f64 * 100.0
    }

    fn describe(&self, similarity: f64) -> String {
        format!("Word overlap: {:.1}%", similarity)
    }
}
