// Response cache backends and the force-refresh rate limiter.

pub mod memory;
pub mod rate_limit;
pub mod sqlite;

use crate::config::CacheConfig;
use crate::model::{CompareRequest, StorageError};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::info;

pub use memory::InMemoryCache;
pub use rate_limit::{RateLimiter, Throttle};
pub use sqlite::SqliteCache;

/// Stores serialized compare responses with a time-to-live.
pub trait ResponseCache: Send + Sync {
    /// Returns the value when present and not expired.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError>;
}

/// SQLite when `sqlite_path` is set, otherwise a bounded in-memory cache.
pub fn build_cache(cfg: &CacheConfig) -> Result<Box<dyn ResponseCache>, StorageError> {
    match cfg.sqlite_path.as_deref() {
        Some(path) => {
            let cache = SqliteCache::new(path)?;
            let removed = cache.cleanup_expired()?;
            info!("Opened SQLite cache at {} ({} expired entries removed)", path, removed);
            Ok(Box::new(cache))
        }
        None => Ok(Box::new(InMemoryCache::new(cfg.max_entries))),
    }
}

/// Deterministic key for a comparison: case-folded names plus the sorted source list.
pub fn make_cache_key(req: &CompareRequest) -> String {
    let fold = |s: &str| s.trim().to_lowercase();
    let mut sources: Vec<String> = req.sources.iter().map(|s| fold(s)).collect();
    sources.sort();
    sources.dedup();

    let key_data = serde_json::json!({
        "brand_a": fold(&req.brand_a),
        "product_a": fold(&req.product_a),
        "brand_b": fold(&req.brand_b),
        "product_b": fold(&req.product_b),
        "sources": sources,
    });

    format!("{:x}", Sha256::digest(key_data.to_string().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompareRequest {
        CompareRequest {
            sources: vec!["danawa".into(), "11st".into()],
            ..CompareRequest::default()
        }
    }

    #[test]
    fn key_ignores_case_and_source_order() {
        let a = request();
        let mut b = request();
        b.product_a = "신라면".into();
        b.brand_b = " 오뚜기 ".into();
        b.sources = vec!["11ST".into(), "danawa".into()];
        assert_eq!(make_cache_key(&a), make_cache_key(&b));
    }

    #[test]
    fn key_ignores_force_refresh() {
        let mut b = request();
        b.force_refresh = true;
        assert_eq!(make_cache_key(&request()), make_cache_key(&b));
    }

    #[test]
    fn build_cache_defaults_to_memory() {
        let cache = build_cache(&CacheConfig::default()).unwrap();
        cache.set("k", "v", Duration::from_secs(1)).unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn key_changes_with_products() {
        let mut b = request();
        b.product_b = "진라면 순한맛".into();
        assert_ne!(make_cache_key(&request()), make_cache_key(&b));
        assert_eq!(make_cache_key(&b).len(), 64);
    }
}
