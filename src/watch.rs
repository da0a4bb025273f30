//! The watch registry: registered subscriptions keyed by a stable, opaque
//! token.
//!
//! The source library formats the registration record's memory address as
//! the token. That leaks addresses to an untrusted server and collides on
//! record reuse; this module instead hands out a monotonically increasing
//! counter, formatted as a decimal string (see the crate's design notes).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// A user callback invoked once per delivered `WATCH_EVENT` for a watch.
///
/// Receives the watch's opaque handle and the event's string vector
/// (`[path, token, ..]`).
pub type WatchCallback = Box<dyn Fn(WatchHandle, &[String]) + Send + Sync>;

/// An opaque, stable handle identifying a registered watch to its own
/// callback. Equality is by the registration's token, which is unique for
/// the registration's lifetime.
#[derive(Clone)]
pub struct WatchHandle(pub(crate) Arc<str>);

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("WatchHandle").field(&self.0).finish()
    }
}

impl PartialEq for WatchHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

/// A single watch registration: the node being watched and the callback to
/// invoke on each event.
pub struct WatchRegistration {
    pub node: String,
    pub token: Arc<str>,
    pub callback: WatchCallback,
}

impl std::fmt::Debug for WatchRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchRegistration")
            .field("node", &self.node)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl WatchRegistration {
    pub fn handle(&self) -> WatchHandle {
        WatchHandle(Arc::clone(&self.token))
    }
}

/// A pending event, queued between the Reader and the Dispatcher.
///
/// Carries a weak back-reference to the registration (the registry holds
/// the single strong reference for the active lifetime) plus the raw
/// string vector from the wire, so the Dispatcher can still report "watch
/// gone" rather than silently dropping if the weak reference no longer
/// upgrades.
#[derive(Clone)]
pub struct PendingEvent {
    pub registration: Weak<WatchRegistration>,
    pub token: Arc<str>,
    pub strings: Vec<String>,
}

/// Generates stable, unique, opaque tokens for new registrations.
#[derive(Default)]
pub struct TokenGenerator {
    next: AtomicU64,
}

impl TokenGenerator {
    pub fn next_token(&self) -> Arc<str> {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        Arc::from(format!("tok{id}"))
    }
}

/// The set of active watch registrations, keyed by token.
#[derive(Default)]
pub struct WatchRegistry {
    by_token: HashMap<Arc<str>, Arc<WatchRegistration>>,
}

impl WatchRegistry {
    pub fn insert(&mut self, registration: Arc<WatchRegistration>) {
        self.by_token
            .insert(Arc::clone(&registration.token), registration);
    }

    pub fn remove(&mut self, token: &str) -> Option<Arc<WatchRegistration>> {
        self.by_token.remove(token)
    }

    pub fn lookup(&self, token: &str) -> Option<Arc<WatchRegistration>> {
        self.by_token.get(token).cloned()
    }

    /// Iterates registrations in insertion order for resume-time
    /// re-registration. `HashMap` does not preserve insertion order, so
    /// resume instead sorts by token, which is itself monotonically
    /// increasing for this registry's `TokenGenerator` and therefore a
    /// faithful proxy for registration order.
    pub fn iter_by_token(&self) -> Vec<Arc<WatchRegistration>> {
        let mut all: Vec<_> = self.by_token.values().cloned().collect();
        all.sort_by(|a, b| a.token.cmp(&b.token));
        all
    }

    pub fn len(&self) -> usize {
        self.by_token.len()
    }
}
