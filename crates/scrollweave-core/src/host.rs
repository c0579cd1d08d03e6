#![forbid(unsafe_code)]

//! Host listener registration.
//!
//! Scopes subscribe to the host's scroll and resize notifications at creation
//! and must remove every subscription at teardown. [`ListenerHost`] is the
//! seam; [`ListenerLedger`] is an in-memory implementation that counts what is
//! live, used by the web adapter and by tests checking for leaks.

use std::fmt;

use ahash::AHashMap;

/// Host notification a listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Scroll,
    Resize,
}

/// Subscription options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerOptions {
    /// A passive listener never blocks the host's own scroll handling.
    pub passive: bool,
}

impl ListenerOptions {
    pub const PASSIVE: Self = Self { passive: true };
}

impl Default for ListenerOptions {
    fn default() -> Self {
        Self::PASSIVE
    }
}

/// Host-issued subscription id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Where scopes register their input listeners.
pub trait ListenerHost {
    fn add_listener(&mut self, kind: ListenerKind, options: ListenerOptions) -> ListenerId;

    /// Remove a subscription. Returns `false` if it was not live.
    fn remove_listener(&mut self, id: ListenerId) -> bool;
}

/// In-memory listener registry with live counts.
#[derive(Debug, Default)]
pub struct ListenerLedger {
    next_id: u64,
    live: AHashMap<ListenerId, (ListenerKind, ListenerOptions)>,
}

impl ListenerLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Live subscriptions of `kind`.
    #[must_use]
    pub fn count(&self, kind: ListenerKind) -> usize {
        self.live.values().filter(|(k, _)| *k == kind).count()
    }

    /// All live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Whether every live subscription is passive.
    #[must_use]
    pub fn all_passive(&self) -> bool {
        self.live.values().all(|(_, o)| o.passive)
    }
}

impl ListenerHost for ListenerLedger {
    fn add_listener(&mut self, kind: ListenerKind, options: ListenerOptions) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.live.insert(id, (kind, options));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.live.remove(&id).is_some()
    }
}
