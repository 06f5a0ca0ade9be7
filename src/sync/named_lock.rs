//! Registry of mutual-exclusion locks looked up by name

use parking_lot::{Mutex, MutexGuard, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// One named lock
pub struct LockItem<K> {
    name: K,
    lock: Mutex<()>,
}

impl<K> LockItem<K> {
    fn new(name: K) -> Self {
        Self {
            name,
            lock: Mutex::new(()),
        }
    }

    /// The key this lock was created for
    pub fn name(&self) -> &K {
        &self.name
    }

    /// Acquire the lock, blocking until it is free
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock()
    }

    /// Acquire the lock if it is free
    pub fn try_lock(&self) -> Option<MutexGuard<'_, ()>> {
        self.lock.try_lock()
    }

    /// Whether someone holds the lock right now
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }
}

impl<K: fmt::Debug> fmt::Debug for LockItem<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockItem")
            .field("name", &self.name)
            .field("locked", &self.lock.is_locked())
            .finish()
    }
}

/// Lazily created locks, one per key
///
/// The first [`lookup`](NamedLock::lookup) of a key creates its lock; every
/// later lookup returns the same `Arc`. Entries are never removed.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use task_pool_engine::sync::NamedLock;
///
/// let locks: NamedLock<String> = NamedLock::new();
/// let a = locks.lookup(&"config".to_string());
/// let b = locks.lookup(&"config".to_string());
/// assert!(Arc::ptr_eq(&a, &b));
///
/// let _guard = a.lock();
/// assert!(b.try_lock().is_none());
/// ```
pub struct NamedLock<K> {
    locks: RwLock<HashMap<K, Arc<LockItem<K>>>>,
    // serializes creation of new entries
    inter: Mutex<()>,
}

impl<K> NamedLock<K>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
            inter: Mutex::new(()),
        }
    }

    /// The lock for `name`, created on first use
    pub fn lookup(&self, name: &K) -> Arc<LockItem<K>> {
        if let Some(item) = self.locks.read().get(name) {
            return Arc::clone(item);
        }

        let _creating = self.inter.lock();
        if let Some(item) = self.locks.read().get(name) {
            return Arc::clone(item);
        }
        let item = Arc::new(LockItem::new(name.clone()));
        self.locks
            .write()
            .insert(name.clone(), Arc::clone(&item));
        item
    }

    /// Whether a lock for `name` exists
    pub fn contains(&self, name: &K) -> bool {
        self.locks.read().contains_key(name)
    }

    /// Number of locks created so far
    pub fn len(&self) -> usize {
        self.locks.read().len()
    }

    /// Whether no lock was created yet
    pub fn is_empty(&self) -> bool {
        self.locks.read().is_empty()
    }

    /// Snapshot of every lock created so far
    pub fn items(&self) -> Vec<Arc<LockItem<K>>> {
        self.locks.read().values().cloned().collect()
    }

    /// Snapshot of every key with a lock
    pub fn names(&self) -> Vec<K> {
        self.locks.read().keys().cloned().collect()
    }
}

impl<K> Default for NamedLock<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for NamedLock<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedLock")
            .field("locks", &self.locks.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_creates_once() {
        let locks: NamedLock<&str> = NamedLock::new();
        assert_eq!(locks.len(), 0);
        assert!(locks.is_empty());
        assert!(!locks.contains(&"test"));

        let item = locks.lookup(&"test");
        assert_eq!(*item.name(), "test");
        assert_eq!(locks.len(), 1);
        assert!(locks.contains(&"test"));

        let again = locks.lookup(&"test");
        assert!(Arc::ptr_eq(&item, &again));
        assert_eq!(locks.len(), 1);
    }

    #[test]
    fn test_items_iterate_created_locks() {
        let locks: NamedLock<u32> = NamedLock::new();
        for key in [3, 1, 2] {
            locks.lookup(&key);
        }

        let mut names = locks.names();
        names.sort_unstable();
        assert_eq!(names, vec![1, 2, 3]);

        for item in locks.items() {
            let _guard = item.lock();
            assert!(Arc::ptr_eq(&locks.lookup(item.name()), &item));
            assert!(item.is_locked());
        }
    }

    #[test]
    fn test_lock_excludes_other_holders() {
        let locks: NamedLock<String> = NamedLock::new();
        let item = locks.lookup(&"db".to_string());
        let guard = item.lock();
        assert!(locks.lookup(&"db".to_string()).try_lock().is_none());
        drop(guard);
        assert!(item.try_lock().is_some());
    }

    #[test]
    fn test_distinct_keys_get_distinct_locks() {
        let locks: NamedLock<&str> = NamedLock::new();
        let a = locks.lookup(&"a");
        let b = locks.lookup(&"b");
        assert!(!Arc::ptr_eq(&a, &b));
        let _held = a.lock();
        assert!(b.try_lock().is_some());
    }
}
