//! # Join group: N-way coordination with completion-ordered delivery.
//!
//! [`JoinGroup`] tracks how many launched calls are still out
//! (`outstanding`) and queues completed-but-unconsumed records in arrival
//! order (`pending`). The owner either polls [`JoinGroup::consume`] or
//! parks a one-shot waiter; completions move units from `outstanding` to
//! `pending` one at a time.
//!
//! ## Rules
//! - `launch` once per call spawned into the group; a cancelled launch is
//!   undone with `remove_join`, never with a fabricated completion.
//! - The waiter is cleared before it is scheduled, so it fires at most
//!   once; later completions enqueue silently.
//! - Scope exit (`mark_dead`, or dropping the last handle) with
//!   `need_join() == true` reports exactly one [`Fault::StaleLeak`]
//!   citing the group's origin.
//! - Underflowing `outstanding` is a logic defect and panics.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::defer::Defer;
use crate::diag::{Diagnostics, LeakRegistry};
use crate::error::Fault;
use crate::life::{Mortal, MortalRef, Mortality, WeakRef};
use crate::origin::Origin;
use crate::sync::lock;

use super::joiner::Joiner;

type Waiter = Box<dyn FnOnce() + Send + 'static>;

struct GroupState<T> {
    /// Launched calls that have not completed yet.
    outstanding: usize,
    /// Completed records awaiting consumption, in completion order.
    pending: VecDeque<T>,
    /// At most one parked resumption continuation.
    waiter: Option<Waiter>,
}

/// Shared state behind every [`JoinGroup`] handle and [`Joiner`].
pub(crate) struct GroupCore<T: Send + 'static> {
    origin: Origin,
    mortality: Mortality,
    registry: Arc<LeakRegistry>,
    diag: Arc<Diagnostics>,
    defer: Arc<dyn Defer>,
    state: Mutex<GroupState<T>>,
}

impl<T: Send + 'static> GroupCore<T> {
    fn new(origin: Origin, diag: Arc<Diagnostics>, defer: Arc<dyn Defer>) -> Arc<Self> {
        Arc::new(Self {
            origin,
            mortality: Mortality::new(),
            registry: LeakRegistry::new(),
            diag,
            defer,
            state: Mutex::new(GroupState {
                outstanding: 0,
                pending: VecDeque::new(),
                waiter: None,
            }),
        })
    }

    pub(crate) fn origin(&self) -> Origin {
        self.origin
    }

    fn launch(&self) {
        lock(&self.state).outstanding += 1;
    }

    pub(crate) fn remove_join(&self) {
        let mut state = lock(&self.state);
        assert!(
            state.outstanding > 0,
            "{}: remove_join with no outstanding call",
            self.origin
        );
        state.outstanding -= 1;
    }

    /// Delivers one completed record: moves a unit from outstanding to
    /// the pending FIFO and schedules the parked waiter, if any.
    pub(crate) fn complete(&self, record: T) {
        let waiter = {
            let mut state = lock(&self.state);
            assert!(
                state.outstanding > 0,
                "{}: completion with no outstanding call",
                self.origin
            );
            state.outstanding -= 1;
            state.pending.push_back(record);
            state.waiter.take()
        };
        if let Some(waiter) = waiter {
            self.defer.schedule(Duration::ZERO, waiter);
        }
    }

    fn consume(&self) -> Option<T> {
        lock(&self.state).pending.pop_front()
    }

    fn counts(&self) -> (usize, usize) {
        let state = lock(&self.state);
        (state.outstanding, state.pending.len())
    }

    fn register_waiter(&self, waiter: Waiter) {
        let mut state = lock(&self.state);
        assert!(
            state.waiter.is_none(),
            "{}: join group already has a registered waiter",
            self.origin
        );
        state.waiter = Some(waiter);
    }

    pub(crate) fn registry(&self) -> &Arc<LeakRegistry> {
        &self.registry
    }
}

impl<T: Send + 'static> Mortal for GroupCore<T> {
    fn mortality(&self) -> &Mortality {
        &self.mortality
    }

    fn on_mark_dead(&self) {
        let (outstanding, pending) = self.counts();
        let remaining = outstanding + pending;
        if remaining > 0 {
            self.diag
                .report(self.origin, Fault::StaleLeak { remaining });
        }
        if self.diag.leak_check() {
            let registry = self.registry.clone();
            let diag = self.diag.clone();
            self.defer.schedule(
                Duration::ZERO,
                Box::new(move || registry.check(&diag)),
            );
        }
    }
}

impl<T: Send + 'static> Drop for GroupCore<T> {
    fn drop(&mut self) {
        self.mark_dead();
        self.mortality.mark_destroyed();
    }
}

/// Owner-side handle to a join group.
///
/// `T` is the per-call-site record type; one generic record replaces a
/// family of fixed-arity tuples. Handles are cheap to clone; the last one
/// to drop destroys the group (reporting a stale leak if signals were
/// still expected).
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use rejoin::{Origin, Runtime, RuntimeConfig, StepDefer};
///
/// let defer = Arc::new(StepDefer::new());
/// let rt = Runtime::new(RuntimeConfig::default(), defer.clone());
///
/// let group = rt.join_group::<&str>(Origin::here("demo"));
/// group.launch();
/// let joiner = group.make_joiner(Origin::here("call"));
///
/// joiner.join("done");
/// defer.run_until_idle();
///
/// assert_eq!(group.consume(), Some("done"));
/// assert!(!group.need_join());
/// ```
pub struct JoinGroup<T: Send + 'static> {
    core: Arc<GroupCore<T>>,
}

impl<T: Send + 'static> Clone for JoinGroup<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T: Send + 'static> JoinGroup<T> {
    pub(crate) fn new(origin: Origin, diag: Arc<Diagnostics>, defer: Arc<dyn Defer>) -> Self {
        Self {
            core: GroupCore::new(origin, diag, defer),
        }
    }

    /// Returns the group's creation site.
    pub fn origin(&self) -> Origin {
        self.core.origin
    }

    /// Registers one more outstanding call. Call once per spawned call,
    /// paired with a [`JoinGroup::make_joiner`] handle for its completion.
    pub fn launch(&self) {
        self.core.launch();
    }

    /// Unregisters a launched call that was cancelled before firing.
    ///
    /// # Panics
    /// If no call is outstanding: the count underflowing means launches
    /// and removals are mismatched.
    pub fn remove_join(&self) {
        self.core.remove_join();
    }

    /// Pops the oldest completed record (completion order), if any.
    pub fn consume(&self) -> Option<T> {
        self.core.consume()
    }

    /// Number of completed records awaiting consumption.
    pub fn n_pending(&self) -> usize {
        self.core.counts().1
    }

    /// Number of launched calls that have not completed.
    pub fn n_outstanding(&self) -> usize {
        self.core.counts().0
    }

    /// Total signals left: outstanding calls plus unconsumed records.
    pub fn n_joins_left(&self) -> usize {
        let (outstanding, pending) = self.core.counts();
        outstanding + pending
    }

    /// Whether the group still expects consumption or completions.
    pub fn need_join(&self) -> bool {
        self.n_joins_left() > 0
    }

    /// Parks a one-shot continuation, fired (via the deferred-call
    /// primitive) by the next completion.
    ///
    /// Drain [`JoinGroup::consume`] before parking: records already
    /// pending do not fire the waiter.
    ///
    /// # Panics
    /// If a waiter is already registered.
    pub fn register_waiter(&self, waiter: impl FnOnce() + Send + 'static) {
        self.core.register_waiter(Box::new(waiter));
    }

    /// Awaits the next completion.
    ///
    /// Resolves immediately when a record is already pending or when
    /// nothing is outstanding (nothing will ever arrive); otherwise parks
    /// an internal waiter and awaits the deferred hop.
    ///
    /// # Panics
    /// If a waiter is already registered.
    pub async fn wait_next(&self) {
        let rx = {
            let mut state = lock(&self.core.state);
            if !state.pending.is_empty() || state.outstanding == 0 {
                return;
            }
            assert!(
                state.waiter.is_none(),
                "{}: join group already has a registered waiter",
                self.core.origin
            );
            let (tx, rx) = oneshot::channel::<()>();
            state.waiter = Some(Box::new(move || {
                let _ = tx.send(());
            }));
            rx
        };
        // A dropped sender (group torn down) resolves the wait too.
        let _ = rx.await;
    }

    /// Creates the completion handle for one launched call.
    ///
    /// The joiner is tracked in the group's leak registry until it
    /// resolves or drops.
    pub fn make_joiner(&self, origin: Origin) -> Joiner<T> {
        Joiner::new(
            WeakRef::of(&self.core),
            origin,
            self.core.diag.clone(),
            self.core.defer.clone(),
            self.core.registry.track(origin, "joiner"),
        )
    }

    /// Marks the group logically dead (scope exit).
    ///
    /// Idempotent. If the group still needs joins, reports one
    /// [`Fault::StaleLeak`]; with leak checking enabled, also schedules a
    /// sweep of the group's leak registry for unresolved joiners.
    pub fn mark_dead(&self) {
        self.core.mark_dead();
    }

    /// Non-owning lifetime observer, for closure scope accounting.
    pub(crate) fn mortal_ref(&self) -> MortalRef {
        MortalRef::of(&self.core)
    }
}
