//! Hash-keyed memoization.
//!
//! Values are stored under the [`HashKey`] of the content that produced
//! them, never under a location. Two locations whose hashes agree share one
//! entry, and an entry is never invalidated: a change upstream produces a
//! different key.
//!
//! Lookups take a shared lock. On a miss the value is computed with no lock
//! held, so two threads may compute the same entry concurrently; the first
//! insert wins and both callers observe that value.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Mat4;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::data::{BoundingBox, CompoundData, Object};
use crate::errors::Result;
use crate::hash::HashKey;
use crate::scene::{SceneSource, ScenePath};
use crate::utils::Symbol;

/// Hit/miss counters of a [`HierarchyCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

pub struct HierarchyCache<V> {
    entries: RwLock<FxHashMap<HashKey, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> Default for HierarchyCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for HierarchyCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyCache")
            .field("stats", &self.stats())
            .finish()
    }
}

impl<V> HierarchyCache<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl<V: Clone> HierarchyCache<V> {
    #[must_use]
    pub fn get(&self, key: HashKey) -> Option<V> {
        self.entries.read().get(&key).cloned()
    }

    /// Stores `value` unless the key is already present. Returns the value
    /// now associated with `key`.
    pub fn insert(&self, key: HashKey, value: V) -> V {
        self.entries.write().entry(key).or_insert(value).clone()
    }

    /// Returns the cached value for `key`, computing and storing it on a
    /// miss. Errors are returned as is and nothing is stored.
    pub fn get_or_try_insert_with<F>(&self, key: HashKey, compute: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        log::trace!("Cache miss for {key}");
        let value = compute()?;
        Ok(self.insert(key, value))
    }
}

/// A [`SceneSource`] wrapper that memoizes every property by its hash.
///
/// Each query first asks the inner scene for the property's hash, then
/// serves the value from the cache when that hash has been seen before.
pub struct MemoizedScene<S> {
    inner: S,
    bounds: HierarchyCache<BoundingBox>,
    transforms: HierarchyCache<Mat4>,
    attributes: HierarchyCache<Arc<CompoundData>>,
    objects: HierarchyCache<Arc<Object>>,
    child_names: HierarchyCache<Arc<[Symbol]>>,
}

impl<S: SceneSource> MemoizedScene<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            bounds: HierarchyCache::new(),
            transforms: HierarchyCache::new(),
            attributes: HierarchyCache::new(),
            objects: HierarchyCache::new(),
            child_names: HierarchyCache::new(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Counters of the object cache, where skinning results live.
    #[must_use]
    pub fn object_stats(&self) -> CacheStats {
        self.objects.stats()
    }

    pub fn clear(&self) {
        self.bounds.clear();
        self.transforms.clear();
        self.attributes.clear();
        self.objects.clear();
        self.child_names.clear();
    }
}

impl<S: SceneSource> SceneSource for MemoizedScene<S> {
    fn bound(&self, path: &ScenePath) -> Result<BoundingBox> {
        let key = self.inner.bound_hash(path)?;
        self.bounds
            .get_or_try_insert_with(key, || self.inner.bound(path))
    }

    fn bound_hash(&self, path: &ScenePath) -> Result<HashKey> {
        self.inner.bound_hash(path)
    }

    fn transform(&self, path: &ScenePath) -> Result<Mat4> {
        let key = self.inner.transform_hash(path)?;
        self.transforms
            .get_or_try_insert_with(key, || self.inner.transform(path))
    }

    fn transform_hash(&self, path: &ScenePath) -> Result<HashKey> {
        self.inner.transform_hash(path)
    }

    fn attributes(&self, path: &ScenePath) -> Result<Arc<CompoundData>> {
        let key = self.inner.attributes_hash(path)?;
        self.attributes
            .get_or_try_insert_with(key, || self.inner.attributes(path))
    }

    fn attributes_hash(&self, path: &ScenePath) -> Result<HashKey> {
        self.inner.attributes_hash(path)
    }

    fn object(&self, path: &ScenePath) -> Result<Arc<Object>> {
        let key = self.inner.object_hash(path)?;
        self.objects
            .get_or_try_insert_with(key, || self.inner.object(path))
    }

    fn object_hash(&self, path: &ScenePath) -> Result<HashKey> {
        self.inner.object_hash(path)
    }

    fn child_names(&self, path: &ScenePath) -> Result<Arc<[Symbol]>> {
        let key = self.inner.child_names_hash(path)?;
        self.child_names
            .get_or_try_insert_with(key, || self.inner.child_names(path))
    }

    fn child_names_hash(&self, path: &ScenePath) -> Result<HashKey> {
        self.inner.child_names_hash(path)
    }
}
