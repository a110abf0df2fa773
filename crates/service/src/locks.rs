//! Per-id write serialization
//!
//! Write and Delete each run a detach-then-recreate batch. Two such batches
//! for the same id can interleave statement by statement and leave a mixed
//! identifier set behind. When enabled, this table makes them take turns
//! within the process. Entries are dropped as soon as nobody holds or waits
//! on them, so the table only ever holds ids with work in flight.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
pub(crate) struct WriteLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl WriteLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `id`
    pub(crate) fn with_lock<T>(&self, id: &str, f: impl FnOnce() -> T) -> T {
        let lock = Arc::clone(&self.locks.entry(id.to_string()).or_default());
        let result = {
            let _held = lock.lock();
            f()
        };
        // Two references means only the table and this call remain.
        self.locks.remove_if(id, |_, l| Arc::strong_count(l) == 2);
        result
    }

    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> usize {
        self.locks.len()
    }
}
