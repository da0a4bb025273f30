//! The suspend barrier: a shared/exclusive lock that lets many requests
//! proceed concurrently with each other, but excludes them all while a
//! suspend/resume cycle holds it exclusively.
//!
//! Unlike `std::sync::RwLock`, guards here own their own reference count
//! rather than borrowing from the lock, so a shared hold taken in
//! `transaction_start` can be released later from `transaction_end`, and
//! the exclusive hold taken in `Client::suspend` can be released from
//! `Client::resume` — both across separate public calls.

use std::sync::{Arc, Condvar, Mutex};

use crate::error::XsResult;

struct State {
    shared: u64,
    exclusive: bool,
}

struct Inner {
    state: Mutex<State>,
    cond: Condvar,
}

/// Guards transactional and watch-mutating requests against an in-flight
/// `suspend`/`resume` cycle.
#[derive(Clone)]
pub(crate) struct SuspendBarrier(Arc<Inner>);

/// An active shared hold on the suspend barrier, released on drop.
pub(crate) struct SuspendShared(Arc<Inner>);

/// An active exclusive hold on the suspend barrier, released on drop.
pub(crate) struct SuspendExclusive(Arc<Inner>);

impl SuspendBarrier {
    pub(crate) fn new() -> Self {
        Self(Arc::new(Inner {
            state: Mutex::new(State {
                shared: 0,
                exclusive: false,
            }),
            cond: Condvar::new(),
        }))
    }

    /// Acquires the barrier in shared mode, blocking if a suspend is
    /// currently exclusive.
    pub(crate) fn acquire_shared(&self) -> XsResult<SuspendShared> {
        let mut state = self.0.state.lock()?;
        while state.exclusive {
            state = self.0.cond.wait(state)?;
        }
        state.shared += 1;
        drop(state);
        Ok(SuspendShared(Arc::clone(&self.0)))
    }

    /// Acquires the barrier exclusively, blocking until every outstanding
    /// shared hold is released. Used only by `Client::suspend`.
    pub(crate) fn acquire_exclusive(&self) -> XsResult<SuspendExclusive> {
        let mut state = self.0.state.lock()?;
        while state.exclusive || state.shared > 0 {
            state = self.0.cond.wait(state)?;
        }
        state.exclusive = true;
        drop(state);
        Ok(SuspendExclusive(Arc::clone(&self.0)))
    }
}

impl Default for SuspendBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SuspendShared {
    fn drop(&mut self) {
        let mut state = match self.0.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.shared -= 1;
        self.0.cond.notify_all();
    }
}

impl Drop for SuspendExclusive {
    fn drop(&mut self) {
        let mut state = match self.0.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.exclusive = false;
        self.0.cond.notify_all();
    }
}
