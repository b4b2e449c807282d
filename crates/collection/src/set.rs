use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Insertion-ordered set of values keyed by a string identity.
///
/// Every operation takes the same lock, so the check-then-insert sequence of
/// [`Set::set`] and [`Set::set_lazy`] is atomic with respect to other callers.
pub struct Set<T> {
    inner: Mutex<Inner<T>>,
}

struct Inner<T> {
    items: Vec<T>,
    indexes: HashMap<String, usize>,
}

impl<T> Set<T> {
    /// Build an empty set
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: Vec::new(),
                indexes: HashMap::new(),
            }),
        }
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether a value exists for the given key
    pub fn contains(&self, key: &str) -> bool {
        self.lock().indexes.contains_key(key)
    }

    // A panic inside a supplier leaves the map untouched (insertion happens
    // after the supplier returns), so a poisoned guard is still consistent.
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            log::warn!("set lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl<T: Clone> Set<T> {
    /// Store `item` under `key` unless a value already exists.
    ///
    /// Returns the stored value, which is `item` only on first insertion.
    pub fn set(&self, key: &str, item: T) -> T {
        let mut inner = self.lock();

        if let Some(&idx) = inner.indexes.get(key) {
            return inner.items[idx].clone();
        }

        inner.insert(key.to_string(), item)
    }

    /// Same as [`Set::set`] but only builds the value when `key` is absent.
    ///
    /// The supplier runs while the set is locked: it is invoked at most once per
    /// key, even when several threads race on the same key. It must not call
    /// back into this set.
    pub fn set_lazy<F>(&self, key: &str, supplier: F) -> T
    where
        F: FnOnce() -> T,
    {
        let mut inner = self.lock();

        if let Some(&idx) = inner.indexes.get(key) {
            return inner.items[idx].clone();
        }

        let created = supplier();
        inner.insert(key.to_string(), created)
    }

    /// Value stored for `key`, if any
    pub fn get(&self, key: &str) -> Option<T> {
        let inner = self.lock();
        inner.indexes.get(key).map(|&idx| inner.items[idx].clone())
    }

    /// Snapshot of every stored value, in insertion order
    pub fn items(&self) -> Vec<T> {
        self.lock().items.clone()
    }
}

impl<T: Clone> Inner<T> {
    fn insert(&mut self, key: String, item: T) -> T {
        self.indexes.insert(key, self.items.len());
        self.items.push(item.clone());
        item
    }
}

impl<T> Default for Set<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Set<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.lock().items.iter()).finish()
    }
}
