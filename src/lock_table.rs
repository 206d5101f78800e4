//! Per-identifier lock registry
//!
//! Entries are created on first use and live as long as the table. The
//! table is owned explicitly and shared through `Arc`; gates that should
//! serialize against each other must be handed the same table.

use crate::ident::UnitIdentifier;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Lock handed out for one identifier
pub type UnitLock = Arc<Mutex<()>>;

/// Concurrent map from identifier to its lock
#[derive(Debug, Default)]
pub struct LockTable {
    locks: RwLock<HashMap<UnitIdentifier, UnitLock>>,
}

impl LockTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with room for `capacity` identifiers
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            locks: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    /// Get the lock for `identifier`, creating it if absent.
    ///
    /// Every caller racing on a fresh identifier receives the same lock
    /// instance: the loser of the insert reads back the winner's entry.
    pub fn lock_for(&self, identifier: &UnitIdentifier) -> UnitLock {
        if let Some(lock) = self.read_entry(identifier) {
            return lock;
        }

        let mut locks = self.locks.write().unwrap_or_else(PoisonError::into_inner);
        let lock = locks
            .entry(identifier.clone())
            .or_insert_with(|| {
                tracing::trace!(target: "unitgate::lock", unit = %identifier, "lock created");
                Arc::new(Mutex::new(()))
            });
        Arc::clone(lock)
    }

    /// Block until the lock for `identifier` is held
    pub fn acquire<'a>(lock: &'a UnitLock) -> MutexGuard<'a, ()> {
        // The mutex guards `()`, so a poisoned lock carries no broken state.
        lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check whether a lock was ever created for `identifier`
    pub fn contains(&self, identifier: &str) -> bool {
        self.locks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(identifier)
    }

    /// Number of identifiers seen so far
    pub fn len(&self) -> usize {
        self.locks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_entry(&self, identifier: &UnitIdentifier) -> Option<UnitLock> {
        self.locks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_lock_is_created_once() {
        let table = LockTable::new();
        let id = UnitIdentifier::new("a", "Foo");

        assert!(table.is_empty());
        let first = table.lock_for(&id);
        let second = table.lock_for(&id);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(table.len(), 1);
        assert!(table.contains("a.Foo"));
    }

    #[test]
    fn test_distinct_identifiers_get_distinct_locks() {
        let table = LockTable::with_capacity(4);
        let foo = table.lock_for(&UnitIdentifier::new("", "Foo"));
        let bar = table.lock_for(&UnitIdentifier::new("", "Bar"));

        assert!(!Arc::ptr_eq(&foo, &bar));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_racing_first_access_agrees_on_one_lock() {
        const THREADS: usize = 16;
        let table = LockTable::new();
        let barrier = Barrier::new(THREADS);
        let id = UnitIdentifier::new("race", "Unit");

        let (table, barrier, id) = (&table, &barrier, &id);
        let locks: Vec<UnitLock> = thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(move || {
                        barrier.wait();
                        table.lock_for(id)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(locks.iter().all(|l| Arc::ptr_eq(l, &locks[0])));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_poisoned_lock_can_be_reacquired() {
        let table = LockTable::new();
        let lock = table.lock_for(&UnitIdentifier::new("", "Boom"));

        let poisoner = Arc::clone(&lock);
        let result = thread::spawn(move || {
            let held = poisoner.lock().unwrap();
            panic!("backend blew up while holding {:?}", held);
        })
        .join();
        assert!(result.is_err());
        assert!(lock.is_poisoned());

        let guard = LockTable::acquire(&lock);
        drop(guard);
    }
}
