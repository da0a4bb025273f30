//! A binary exclusive latch whose guard owns its own reference count,
//! unlike `std::sync::MutexGuard` which borrows from the mutex. This lets
//! a guard outlive the call that acquired it and be released from a
//! different call — exactly what the request lock needs across
//! `suspend`/`resume` (see `client.rs`).

use std::sync::{Arc, Condvar, Mutex};

use crate::error::XsResult;

struct Inner {
    locked: Mutex<bool>,
    cond: Condvar,
}

/// A mutual-exclusion latch with an owned, droppable guard.
#[derive(Clone)]
pub(crate) struct ExclusiveLatch(Arc<Inner>);

/// Holds `ExclusiveLatch` locked until dropped.
pub(crate) struct ExclusiveLatchGuard(Arc<Inner>);

impl ExclusiveLatch {
    pub(crate) fn new() -> Self {
        Self(Arc::new(Inner {
            locked: Mutex::new(false),
            cond: Condvar::new(),
        }))
    }

    pub(crate) fn acquire(&self) -> XsResult<ExclusiveLatchGuard> {
        let mut locked = self.0.locked.lock()?;
        while *locked {
            locked = self.0.cond.wait(locked)?;
        }
        *locked = true;
        Ok(ExclusiveLatchGuard(Arc::clone(&self.0)))
    }
}

impl Default for ExclusiveLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ExclusiveLatchGuard {
    fn drop(&mut self) {
        let mut locked = match self.0.locked.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *locked = false;
        self.0.cond.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn second_acquire_blocks_until_first_drops() {
        let latch = ExclusiveLatch::new();
        let first = latch.acquire().unwrap();

        let latch2 = latch.clone();
        let handle = thread::spawn(move || {
            let _second = latch2.acquire().unwrap();
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished());
        drop(first);
        handle.join().unwrap();
    }

    #[test]
    fn guard_outlives_the_call_that_acquired_it() {
        fn acquire_and_return(latch: &ExclusiveLatch) -> ExclusiveLatchGuard {
            latch.acquire().unwrap()
        }

        let latch = ExclusiveLatch::new();
        let guard = acquire_and_return(&latch);
        drop(guard);
        let second = latch.acquire().unwrap();
        drop(second);
    }
}
