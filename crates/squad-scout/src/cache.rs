//! In-memory player cache with lazy TTL expiry.
//!
//! Expired entries are never swept in the background. A read simply treats
//! them as missing, and the next `put` for the same key overwrites them.

use crate::clock::Clock;
use crate::types::{CacheStats, PlayerRecord};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// Cache entry with metadata.
#[derive(Debug, Clone)]
struct CacheEntry {
    record: PlayerRecord,
    stored_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.stored_at >= ttl
    }
}

/// Player records keyed by external identifier.
pub struct PlayerCache {
    entries: DashMap<u64, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl PlayerCache {
    pub fn new(ttl: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(36_500)),
            clock,
        }
    }

    /// Get a cached record if it exists and is fresh.
    pub fn get(&self, key: u64) -> Option<PlayerRecord> {
        let entry = self.entries.get(&key)?;
        if entry.is_expired(self.clock.now(), self.ttl) {
            return None;
        }
        Some(entry.record.clone())
    }

    /// Store a record, replacing whatever was there.
    pub fn put(&self, key: u64, record: PlayerRecord) {
        self.entries.insert(
            key,
            CacheEntry {
                record,
                stored_at: self.clock.now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Entry count and keys, including expired entries not yet overwritten.
    pub fn stats(&self) -> CacheStats {
        let mut keys: Vec<u64> = self.entries.iter().map(|e| *e.key()).collect();
        keys.sort_unstable();
        CacheStats {
            size: keys.len(),
            keys,
        }
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !entry.is_expired(now, self.ttl));
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!("purged {removed} expired cache entries");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::types::RecordOrigin;

    fn record(id: u64, name: &str) -> PlayerRecord {
        PlayerRecord {
            source_id: id,
            name: Some(name.to_string()),
            overall_rating: Some(80),
            potential_rating: None,
            positions: None,
            age: None,
            club: None,
            nationality: None,
            version_id: None,
            origin: RecordOrigin::LiveParse,
            observed_at: Utc::now(),
        }
    }

    fn cache_with_clock() -> (PlayerCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let cache = PlayerCache::new(std::time::Duration::from_secs(3600), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_get_put_roundtrip() {
        let (cache, _) = cache_with_clock();
        assert!(cache.get(1).is_none());

        cache.put(1, record(1, "Rodri"));
        assert_eq!(cache.get(1).unwrap().name.as_deref(), Some("Rodri"));
    }

    #[test]
    fn test_entry_expires_at_ttl_boundary() {
        let (cache, clock) = cache_with_clock();
        cache.put(7, record(7, "Foden"));

        clock.advance(Duration::milliseconds(3_599_999));
        assert!(cache.get(7).is_some());

        clock.advance(Duration::milliseconds(1));
        assert!(cache.get(7).is_none());

        // Shadowed, not removed
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_replaces_and_refreshes() {
        let (cache, clock) = cache_with_clock();
        cache.put(3, record(3, "Old"));
        clock.advance(Duration::minutes(59));
        cache.put(3, record(3, "New"));
        clock.advance(Duration::minutes(59));

        let got = cache.get(3).unwrap();
        assert_eq!(got.name.as_deref(), Some("New"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stats_sorted_and_clear() {
        let (cache, _) = cache_with_clock();
        cache.put(30, record(30, "c"));
        cache.put(10, record(10, "a"));
        cache.put(20, record(20, "b"));

        let stats = cache.stats();
        assert_eq!(stats.size, 3);
        assert_eq!(stats.keys, vec![10, 20, 30]);

        cache.clear();
        assert_eq!(cache.stats().size, 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let (cache, clock) = cache_with_clock();
        cache.put(1, record(1, "a"));
        clock.advance(Duration::minutes(30));
        cache.put(2, record(2, "b"));
        clock.advance(Duration::minutes(31));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.stats().keys, vec![2]);
    }
}
