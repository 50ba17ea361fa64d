use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A growth-only, lock-protected set of URLs
///
/// The lock is held only for the membership test and the mark; callers never
/// keep it across network or disk I/O. A poisoned lock is recovered rather
/// than propagated since a set of strings cannot be left half-updated.
#[derive(Debug, Default)]
pub struct DedupRegistry {
    urls: Mutex<HashSet<String>>,
}

impl DedupRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as present
    ///
    /// Returns `true` if this call added it and `false` if it was already
    /// there. Exactly one of any number of racing callers sees `true`.
    pub fn insert(&self, url: &str) -> bool {
        let mut urls = self.lock();
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    /// Checks membership without marking
    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    /// Number of URLs recorded so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
