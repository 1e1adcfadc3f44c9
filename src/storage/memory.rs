use crate::model::StorageError;
use crate::storage::ResponseCache;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Bounded in-process TTL cache. When full, the entry closest to expiry is evicted.
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl InMemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .clear();
        Ok(())
    }
}

impl ResponseCache for InMemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        match entries.get(key) {
            Some(entry) if Instant::now() > entry.expires_at => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or(StorageError::TtlOutOfRange)?;
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        if entries.len() >= self.max_entries && !entries.contains_key(key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.expires_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_fresh_values() {
        let cache = InMemoryCache::new(10);
        cache.set("k", "v", Duration::from_secs(60)).unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(cache.get("missing").unwrap(), None);
    }

    #[test]
    fn expired_values_are_dropped() {
        let cache = InMemoryCache::new(10);
        cache.set("k", "v", Duration::from_millis(10)).unwrap();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get("k").unwrap(), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn evicts_entry_closest_to_expiry_when_full() {
        let cache = InMemoryCache::new(2);
        cache.set("short", "1", Duration::from_secs(5)).unwrap();
        cache.set("long", "2", Duration::from_secs(500)).unwrap();
        cache.set("new", "3", Duration::from_secs(50)).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("short").unwrap(), None);
        assert!(cache.get("long").unwrap().is_some());
        assert!(cache.get("new").unwrap().is_some());
    }

    #[test]
    fn unrepresentable_ttl_is_an_error() {
        let cache = InMemoryCache::new(10);
        assert!(matches!(
            cache.set("k", "v", Duration::MAX),
            Err(StorageError::TtlOutOfRange)
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn overwriting_does_not_evict() {
        let cache = InMemoryCache::new(1);
        cache.set("k", "1", Duration::from_secs(5)).unwrap();
        cache.set("k", "2", Duration::from_secs(5)).unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("2"));
        cache.clear().unwrap();
        assert!(cache.is_empty());
    }
}
