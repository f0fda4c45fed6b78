//! Response cache for completion and summarization calls
//!
//! Strict memoization keyed by the exact request inputs. Entries never
//! expire; the owner wipes the whole cache when the selected model changes.
//! The cache is owned by a single session and is not shared across tasks.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use tracing::debug;

use crate::utils::{single_line, truncate};

/// Exact input tuple of a cached request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    /// A completion request
    Completion { prompt: String, model: String },
    /// A summarization request over already-rendered content
    Summary { content: String },
}

impl Fingerprint {
    pub fn completion(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Fingerprint::Completion {
            prompt: prompt.into(),
            model: model.into(),
        }
    }

    pub fn summary(content: impl Into<String>) -> Self {
        Fingerprint::Summary {
            content: content.into(),
        }
    }

    fn preview(&self) -> String {
        match self {
            Fingerprint::Completion { prompt, model } => {
                format!("completion[{}] {}", model, truncate(&single_line(prompt), 48))
            }
            Fingerprint::Summary { content } => {
                format!("summary {}", truncate(&single_line(content), 48))
            }
        }
    }
}

/// Hit/miss counters, kept across invalidations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Memoizing cache of response values
#[derive(Debug)]
pub struct ResponseCache<K = Fingerprint, V = String> {
    entries: HashMap<K, V>,
    hits: u64,
    misses: u64,
}

impl<K, V> ResponseCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a cached value without computing
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Return the cached value for `key`, computing and storing it on a miss
    pub fn get_or_compute<F>(&mut self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            return value.clone();
        }
        self.misses += 1;
        let value = compute();
        self.entries.insert(key, value.clone());
        value
    }

    /// Async, fallible variant of [`ResponseCache::get_or_compute`].
    /// Errors are returned to the caller and nothing is stored.
    pub async fn get_or_try_compute<F, Fut, E>(&mut self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(value.clone());
        }
        self.misses += 1;
        let value = compute().await?;
        self.entries.insert(key, value.clone());
        Ok(value)
    }

    /// Drop every entry and return how many were removed
    pub fn invalidate_all(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

impl<V: Clone> ResponseCache<Fingerprint, V> {
    /// [`ResponseCache::get_or_try_compute`] with a debug line per lookup
    pub async fn fetch<F, Fut, E>(&mut self, key: Fingerprint, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cached = self.entries.contains_key(&key);
        debug!(
            hit = cached,
            entries = self.entries.len(),
            "cache lookup: {}",
            key.preview()
        );
        self.get_or_try_compute(key, compute).await
    }
}

impl<K, V> Default for ResponseCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
