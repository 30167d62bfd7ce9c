//! Load cache keyed by resolved URL and container element.

use crate::error::LoadError;
use dom::{DocumentId, ElementRef, NodeId};
use futures::future::{BoxFuture, Shared};
use js::JSValue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use url::Url;

/// Outcome of one load.
pub type LoadResult = Result<JSValue, LoadError>;

/// A load outcome every caller can await; all clones settle identically.
pub type LoadFuture = Shared<BoxFuture<'static, LoadResult>>;

/// Identity of a load: the same resolved URL into the same container
/// element (of the same document) is loaded once.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub url: Url,
    pub document: DocumentId,
    pub container: NodeId,
}

impl CacheKey {
    pub fn new(url: Url, container: &ElementRef) -> Self {
        Self {
            url,
            document: container.document().id(),
            container: container.node(),
        }
    }
}

/// The stored outcome and the element created for it.
#[derive(Clone)]
pub struct CacheEntry {
    pub outcome: LoadFuture,
    pub element: NodeId,
}

/// Shared map from `CacheKey` to the first load started for it.
///
/// Entries are never evicted, including rejected ones. Cloning shares the
/// map, so loaders built over one cache dedupe against each other.
#[derive(Clone, Default)]
pub struct LoadCache {
    entries: Arc<Mutex<HashMap<CacheKey, CacheEntry>>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the map. The map holds no invariant a panicking holder could
    /// break halfway, so a poisoned lock is recovered.
    pub(crate) fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().contains_key(key)
    }

    /// The element inserted for `key`, if a load was started for it.
    pub fn element(&self, key: &CacheKey) -> Option<NodeId> {
        self.lock().get(key).map(|entry| entry.element)
    }

    /// The stored outcome for `key`.
    pub fn get(&self, key: &CacheKey) -> Option<LoadFuture> {
        self.lock().get(key).map(|entry| entry.outcome.clone())
    }
}
