//! Content-addressed memoization of the whole decision pipeline.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use parking_lot::RwLock;
use rand::seq::IteratorRandom;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use crate::data::ResultSet;

/// Hex SHA-256 of the raw uploaded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        CacheKey(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored output of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Encoded (JPEG) annotated image.
    pub annotated_image: Arc<[u8]>,
    pub result_set: ResultSet,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvictionPolicy {
    #[default] OldestFirst,
    RandomSample,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
    /// When full, `len / cull_frequency` entries (at least one) are evicted.
    pub cull_frequency: usize,
    pub eviction: EvictionPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_entries: 100,
            cull_frequency: 2,
            eviction: EvictionPolicy::OldestFirst,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    pub fn with_cull_frequency(mut self, n: usize) -> Self {
        self.cull_frequency = n;
        self
    }

    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }
}

/// Thread-safe key-value store for pipeline results.
///
/// Concurrent `set` calls on one key may race; the pipeline is deterministic so
/// every writer stores the same value.
pub trait ResultCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<CacheEntry>;
    fn set(&self, key: CacheKey, entry: CacheEntry);
    /// Removes one key, returning whether it was present.
    fn evict(&self, key: &CacheKey) -> bool;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct StoredEntry {
    entry: CacheEntry,
    inserted_at: Instant,
}

/// In-process cache with time-based expiry and a bounded entry count.
#[derive(Debug, Default)]
pub struct InMemoryResultCache {
    config: CacheConfig,
    entries: RwLock<HashMap<CacheKey, StoredEntry>>,
}

impl InMemoryResultCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn is_expired(&self, stored: &StoredEntry, now: Instant) -> bool {
        now.duration_since(stored.inserted_at) >= self.config.ttl
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, stored| !self.is_expired(stored, now));
        before - entries.len()
    }

    fn cull(&self, entries: &mut HashMap<CacheKey, StoredEntry>) {
        let n = (entries.len() / self.config.cull_frequency.max(1)).max(1);
        let victims: Vec<CacheKey> = match self.config.eviction {
            EvictionPolicy::OldestFirst => {
                let mut by_age: Vec<(&CacheKey, Instant)> =
                    entries.iter().map(|(key, stored)| (key, stored.inserted_at)).collect();
                by_age.sort_by_key(|(_, inserted_at)| *inserted_at);
                by_age.into_iter().take(n).map(|(key, _)| key.clone()).collect()
            }
            EvictionPolicy::RandomSample => {
                let mut rng = rand::thread_rng();
                entries.keys().cloned().choose_multiple(&mut rng, n)
            }
        };
        for key in &victims {
            entries.remove(key);
        }
        log::debug!("Result cache full, culled {} entries", victims.len());
    }
}

impl ResultCache for InMemoryResultCache {
    fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(stored) if !self.is_expired(stored, now) => return Some(stored.entry.clone()),
                Some(_) => {}
            }
        }
        // Expired: drop it under the write lock, unless a writer refreshed it meanwhile.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|stored| self.is_expired(stored, now)) {
            entries.remove(key);
        }
        None
    }

    fn set(&self, key: CacheKey, entry: CacheEntry) {
        if self.config.max_entries == 0 {
            return;
        }
        let now = Instant::now();
        let mut entries = self.entries.write();
        entries.retain(|_, stored| !self.is_expired(stored, now));
        if !entries.contains_key(&key) && entries.len() >= self.config.max_entries {
            self.cull(&mut entries);
        }
        entries.insert(key, StoredEntry { entry, inserted_at: now });
    }

    fn evict(&self, key: &CacheKey) -> bool {
        self.entries.write().remove(key).is_some()
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// A cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResultCache;

impl ResultCache for NoResultCache {
    fn get(&self, _key: &CacheKey) -> Option<CacheEntry> {
        None
    }

    fn set(&self, _key: CacheKey, _entry: CacheEntry) {}

    fn evict(&self, _key: &CacheKey) -> bool {
        false
    }

    fn len(&self) -> usize {
        0
    }
}

impl<C: ResultCache + ?Sized> ResultCache for Arc<C> {
    fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        (**self).get(key)
    }

    fn set(&self, key: CacheKey, entry: CacheEntry) {
        (**self).set(key, entry)
    }

    fn evict(&self, key: &CacheKey) -> bool {
        (**self).evict(key)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}
