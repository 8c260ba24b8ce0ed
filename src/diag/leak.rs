//! # Registry of objects that must be resolved before scope exit.
//!
//! Joiners and suspension callbacks are single-use: each must either fire
//! or be dropped before the scope that issued it finishes. A
//! [`LeakRegistry`] tracks the ones still alive; when a scope exits with
//! leak checking enabled, a deferred [`LeakRegistry::check`] reports one
//! [`Fault::DeallocLeak`] per entry that is still present.
//!
//! ## Rules
//! - Tracking is RAII: [`LeakRegistry::track`] returns a [`LeakTicket`]
//!   whose drop removes the entry, whether the object resolved or not.
//!   "Still tracked" therefore means "still alive somewhere".
//! - One registry per closure (tracks its issued suspension callbacks)
//!   and one per join group (tracks its joiners).
//! - `check` is scheduled through the deferred-call primitive so objects
//!   legitimately released during the same unwind do not false-positive.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::diag::Diagnostics;
use crate::error::Fault;
use crate::origin::Origin;
use crate::sync::lock;

#[derive(Debug, Clone, Copy)]
struct Entry {
    origin: Origin,
    kind: &'static str,
}

/// Tracks unresolved single-use objects for leak diagnostics.
#[derive(Default)]
pub struct LeakRegistry {
    entries: Mutex<HashMap<u64, Entry>>,
    next_id: AtomicU64,
}

impl LeakRegistry {
    /// Creates an empty registry behind the `Arc` tickets need.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers an object; the entry lives until the ticket drops.
    ///
    /// `kind` is a short noun used in the diagnostic ("joiner",
    /// "suspension callback", ...).
    pub fn track(self: &Arc<Self>, origin: Origin, kind: &'static str) -> LeakTicket {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.entries).insert(id, Entry { origin, kind });
        LeakTicket {
            registry: Arc::downgrade(self),
            id,
        }
    }

    /// Returns the number of tracked entries.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Returns true when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reports a [`Fault::DeallocLeak`] for every entry still present.
    ///
    /// Does not clear the registry: a leaked object stays leaked and will
    /// be reported again by a later check.
    pub fn check(&self, diag: &Diagnostics) {
        let entries: Vec<Entry> = lock(&self.entries).values().copied().collect();
        for entry in entries {
            diag.report(entry.origin, Fault::DeallocLeak { kind: entry.kind });
        }
    }

    fn untrack(&self, id: u64) {
        lock(&self.entries).remove(&id);
    }
}

/// RAII registration handle returned by [`LeakRegistry::track`].
///
/// Dropping the ticket removes the entry. The ticket holds the registry
/// weakly, so an abandoned registry does not keep tickets from dropping
/// cleanly.
pub struct LeakTicket {
    registry: Weak<LeakRegistry>,
    id: u64,
}

impl Drop for LeakTicket {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.untrack(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::diag::capture::CaptureSink;

    fn diag() -> (Diagnostics, Arc<CaptureSink>) {
        let sink = Arc::new(CaptureSink::default());
        let config = RuntimeConfig::default();
        (Diagnostics::with_sink(&config, sink.clone()), sink)
    }

    #[test]
    fn test_ticket_drop_untracks() {
        let registry = LeakRegistry::new();
        let ticket = registry.track(Origin::here("call"), "joiner");
        assert_eq!(registry.len(), 1);

        drop(ticket);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_check_reports_each_live_entry() {
        let registry = LeakRegistry::new();
        let (diag, sink) = diag();

        let _a = registry.track(Origin::here("a"), "joiner");
        let _b = registry.track(Origin::here("b"), "suspension callback");

        registry.check(&diag);
        let mut labels = sink.labels();
        labels.sort_unstable();
        assert_eq!(labels, vec!["dealloc_leak", "dealloc_leak"]);
    }

    #[test]
    fn test_check_after_resolution_is_quiet() {
        let registry = LeakRegistry::new();
        let (diag, sink) = diag();

        let ticket = registry.track(Origin::here("a"), "joiner");
        drop(ticket);

        registry.check(&diag);
        assert_eq!(sink.len(), 0);
    }

    #[test]
    fn test_ticket_outliving_registry_is_harmless() {
        let registry = LeakRegistry::new();
        let ticket = registry.track(Origin::here("a"), "joiner");
        drop(registry);
        drop(ticket); // no upgrade target; must not panic
    }
}
