//! # Joiner: single-use completion handle for one launched call.
//!
//! A [`Joiner`] is handed to the code performing one launched call; it is
//! how that call's result re-enters the join group. The joiner holds only
//! a [`WeakRef`] to the group; a completion that outlives its group must
//! be able to discover that, cheaply and safely, instead of keeping the
//! group alive or crashing into freed state.
//!
//! ## Rules
//! - Exactly one of {`join` called, dropped unresolved} happens per
//!   joiner; double resolution is impossible (`join` consumes `self`).
//! - `join` delivers through a deferred hop; at fire time a destroyed
//!   group yields one [`Fault::OrphanJoin`] and nothing else.
//! - Dropping unresolved undoes the launch (`remove_join`) if the group
//!   is still alive (an implicit cancellation).
//! - The leak-registry entry is released either way.

use std::sync::Arc;
use std::time::Duration;

use crate::defer::Defer;
use crate::diag::{Diagnostics, LeakTicket};
use crate::error::Fault;
use crate::life::WeakRef;
use crate::origin::Origin;

use super::group::GroupCore;

/// Completion handle for one call launched into a [`JoinGroup`](crate::JoinGroup).
pub struct Joiner<T: Send + 'static> {
    group: WeakRef<GroupCore<T>>,
    origin: Origin,
    diag: Arc<Diagnostics>,
    defer: Arc<dyn Defer>,
    // Held for its Drop: releases the group's leak-registry entry.
    _ticket: LeakTicket,
    resolved: bool,
}

impl<T: Send + 'static> Joiner<T> {
    pub(crate) fn new(
        group: WeakRef<GroupCore<T>>,
        origin: Origin,
        diag: Arc<Diagnostics>,
        defer: Arc<dyn Defer>,
        ticket: LeakTicket,
    ) -> Self {
        Self {
            group,
            origin,
            diag,
            defer,
            _ticket: ticket,
            resolved: false,
        }
    }

    /// Returns the joiner's creation site.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Resolves this joiner with the call's record.
    ///
    /// Delivery is deferred: the group's `complete` runs on the next hop
    /// of the deferred-call primitive. If the group is destroyed by then,
    /// one [`Fault::OrphanJoin`] is reported and the record is dropped.
    pub fn join(mut self, record: T) {
        self.resolved = true;

        let group = self.group.clone();
        let origin = self.origin;
        let diag = self.diag.clone();
        self.defer.schedule(
            Duration::ZERO,
            Box::new(move || match group.get() {
                Some(core) => core.complete(record),
                None => diag.report(origin, Fault::OrphanJoin),
            }),
        );
    }
}

impl<T: Send + 'static> Drop for Joiner<T> {
    fn drop(&mut self) {
        if self.resolved {
            return;
        }
        // Unresolved destruction: the launch is withdrawn, not completed.
        if let Some(core) = self.group.get() {
            core.remove_join();
        }
    }
}
