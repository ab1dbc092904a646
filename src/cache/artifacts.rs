//! Result cache with FIFO eviction.
//!
//! Maps a (sanitized prompt, model) pair to the artifact produced for it.
//! Entries are evicted in insertion order; reads never reorder them.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use sha2::{Digest, Sha256};

use crate::models::ModelId;
use crate::types::{CleanPrompt, OutputArtifact};

/// Maximum number of artifacts to keep in cache.
pub const DEFAULT_CAPACITY: usize = 100;

/// Identity of a generation request after sanitization and routing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub prompt: CleanPrompt,
    pub model: ModelId,
}

impl CacheKey {
    /// Creates a key from the sanitized prompt and selected model.
    pub fn new(prompt: CleanPrompt, model: ModelId) -> Self {
        Self { prompt, model }
    }

    /// Returns a stable file stem for artifacts produced under this key.
    ///
    /// Uses the first 8 bytes of SHA256("<prompt>:<model>") as 16 hex characters.
    pub fn artifact_name(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.prompt.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(self.model.as_str().as_bytes());
        let digest = hasher.finalize();
        format!("clip_{}", hex::encode(&digest[..8]))
    }
}

/// Bounded FIFO cache of generation results.
#[derive(Debug)]
pub struct ResultCache {
    entries: HashMap<CacheKey, OutputArtifact>,
    /// Keys in insertion order, oldest first.
    order: VecDeque<CacheKey>,
    capacity: usize,
}

impl ResultCache {
    /// Creates a new cache with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a new cache with specified capacity.
    ///
    /// A capacity of zero disables caching.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    /// Returns a copy of the artifact stored for `key`.
    pub fn get(&self, key: &CacheKey) -> Option<OutputArtifact> {
        self.entries.get(key).cloned()
    }

    /// Stores an artifact.
    ///
    /// Re-inserting an existing key replaces it and moves it to the back of
    /// the eviction queue without evicting anything else. A new key evicts
    /// the oldest entry once the cache is full.
    pub fn put(&mut self, key: CacheKey, artifact: OutputArtifact) {
        if self.capacity == 0 {
            return;
        }

        if self.entries.contains_key(&key) {
            self.order.retain(|k| k != &key);
        } else {
            while self.entries.len() >= self.capacity {
                if self.evict_oldest().is_none() {
                    break;
                }
            }
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, artifact);
    }

    /// Checks if a key exists in the cache.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of cached artifacts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Evicts the oldest entry.
    ///
    /// Returns the evicted key and artifact if any.
    pub fn evict_oldest(&mut self) -> Option<(CacheKey, OutputArtifact)> {
        let key = self.order.pop_front()?;
        let artifact = self.entries.remove(&key)?;
        Some((key, artifact))
    }

    /// Clears all entries from the cache.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Result cache shared between concurrent requests.
///
/// The lock is held only for individual lookups and inserts, never across
/// generation.
#[derive(Debug, Clone, Default)]
pub struct SharedCache {
    inner: Arc<Mutex<ResultCache>>,
}

impl SharedCache {
    /// Creates a shared cache with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ResultCache::with_capacity(capacity))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ResultCache> {
        // Every mutation leaves the cache consistent, so a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns a copy of the artifact stored for `key`.
    pub fn get(&self, key: &CacheKey) -> Option<OutputArtifact> {
        self.lock().get(key)
    }

    /// Stores an artifact.
    pub fn put(&self, key: CacheKey, artifact: OutputArtifact) {
        self.lock().put(key, artifact)
    }

    /// Checks if a key exists in the cache.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().contains(key)
    }

    /// Returns the number of cached artifacts.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Clears all entries from the cache.
    pub fn clear(&self) {
        self.lock().clear()
    }
}
