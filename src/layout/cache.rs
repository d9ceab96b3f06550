// Mon Oct 19 2026 - Alex

use crate::abi::ProfileKey;
use crate::layout::result::LayoutResult;
use crate::types::TypeId;
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Named type, profile content and base policy name.
pub type LayoutKey = (TypeId, ProfileKey, &'static str);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Shared results for named aggregates of one registry snapshot.
///
/// Type ids are snapshot-scoped, so the cache is only ever cleared wholesale.
pub struct LayoutCache {
    entries: RwLock<AHashMap<LayoutKey, Arc<LayoutResult>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(AHashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &LayoutKey) -> Option<Arc<LayoutResult>> {
        let found = self.entries.read().get(key).cloned();
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store `layout`; if a concurrent query got there first its value wins,
    /// so every caller observes the same `Arc`.
    pub fn insert(&self, key: LayoutKey, layout: Arc<LayoutResult>) -> Arc<LayoutResult> {
        self.entries.write().entry(key).or_insert(layout).clone()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LayoutCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutCache").field("stats", &self.stats()).finish()
    }
}
