use std::sync::Arc;

use dashmap::DashMap;

/// Cache of built options instances, keyed by scheme name.
///
/// Entries live until removed; there is no expiry. Removing an entry forces
/// the next [`get_or_add`](Self::get_or_add) to rebuild it.
pub struct OptionsCache<T> {
    inner: Arc<DashMap<String, Arc<T>>>,
}

impl<T> Clone for OptionsCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> OptionsCache<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Return the cached instance for `name`, building it with `create` if absent.
    ///
    /// `create` runs while the entry is locked, so a concurrent
    /// [`try_remove`](Self::try_remove) for the same name waits for the insert
    /// and then evicts it. `create` must not call back into this cache.
    pub fn get_or_add(&self, name: &str, create: impl FnOnce() -> T) -> Arc<T> {
        if let Some(entry) = self.inner.get(name) {
            return entry.value().clone();
        }
        self.inner
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(create()))
            .value()
            .clone()
    }

    /// Return the cached instance for `name` without building one.
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.inner.get(name).map(|entry| entry.value().clone())
    }

    /// Insert `value` unless `name` is already cached. Returns `true` on insert.
    pub fn try_add(&self, name: &str, value: T) -> bool {
        match self.inner.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::new(value));
                true
            }
        }
    }

    /// Evict `name`. Returns `true` if an entry was removed.
    pub fn try_remove(&self, name: &str) -> bool {
        self.inner.remove(name).is_some()
    }

    /// Evict every entry.
    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T> Default for OptionsCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
