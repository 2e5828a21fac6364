use crate::domain::CacheKey;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::trace;

/// Mutual exclusion handle guarding the load/save critical sections of one key
pub type LockHandle = Arc<Mutex<()>>;

/// Lazily created per-key lock handles.
///
/// A handle lives while its key is in use. It is dropped from the registry once
/// the key's cache entry is evicted, but only if nobody currently holds a clone of
/// it, so two different handles are never in use for the same key at once.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    handles: DashMap<CacheKey, LockHandle>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle registered for `key`, creating it on first demand.
    /// Concurrent first demands for the same key converge on one handle.
    pub fn acquire_handle(&self, key: &CacheKey) -> LockHandle {
        if let Some(handle) = self.handles.get(key) {
            return Arc::clone(handle.value());
        }

        Arc::clone(self.handles.entry(key.clone()).or_default().value())
    }

    /// Drops the handle for `key` unless a caller still holds it.
    /// Returns whether a handle was removed.
    pub fn release_on_eviction(&self, key: &CacheKey) -> bool {
        // Strong count is read under the shard write lock, which `acquire_handle`
        // also needs, so no clone can be handed out between the check and the removal.
        let removed = self
            .handles
            .remove_if(key, |_, handle| Arc::strong_count(handle) == 1)
            .is_some();

        if removed {
            trace!(key = %key, "Released lock handle");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
