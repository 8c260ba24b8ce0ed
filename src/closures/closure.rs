//! # Closure: the reentry state machine.
//!
//! One [`Closure`] per activation. The suspension state is a single
//! `(epoch, pending)` pair: at most one suspension point is active at a
//! time, and each suspension advances the epoch so that completions from
//! an earlier point identify themselves as stale instead of corrupting
//! the current count.
//!
//! ## Rules
//! - `begin_suspension` is fatal while the previous point still has
//!   pending completions: two live suspension points cannot coexist.
//! - `on_sub_completion` with the current epoch and a zero counter is
//!   fatal: the block already resumed, so a duplicate completion is a
//!   logic defect (stale epochs, by contrast, are reported and dropped).
//! - Scope-exit accounting (`end_of_scope_check`) marks adopted join
//!   groups dead; each group then self-reports if it still needs joins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::defer::Defer;
use crate::diag::{Diagnostics, LeakRegistry};
use crate::error::Fault;
use crate::groups::JoinGroup;
use crate::life::{Mortal, MortalRef, Mortality};
use crate::origin::Origin;
use crate::sync::lock;

/// Global closure id counter; ids stay unique so accounting across
/// activations never confuses two closures.
static CLOSURE_SEQ: AtomicU64 = AtomicU64::new(1);

/// Identifier of one suspension point within a closure.
///
/// Epochs increase monotonically per closure; epoch 0 means "never
/// suspended". Completions carry the epoch they were issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(pub(crate) u64);

impl Epoch {
    /// The pre-suspension epoch.
    pub const NONE: Self = Self(0);

    /// Raw value, for encoding into record payloads.
    pub fn value(self) -> u64 {
        self.0
    }
}

struct Block {
    epoch: u64,
    pending: usize,
    resume_point: u32,
}

enum EntrySlot {
    /// No entry point registered yet.
    Unset,
    /// Ready to be re-entered.
    Ready(Box<dyn FnMut() + Send + 'static>),
    /// Currently executing; reentry now would be synchronous.
    Running,
}

pub(crate) struct ClosureCore {
    id: u64,
    origin: Origin,
    mortality: Mortality,
    registry: Arc<LeakRegistry>,
    diag: Arc<Diagnostics>,
    defer: Arc<dyn Defer>,
    block: Mutex<Block>,
    groups: Mutex<Vec<MortalRef>>,
    entry: Mutex<EntrySlot>,
}

impl ClosureCore {
    pub(crate) fn origin(&self) -> Origin {
        self.origin
    }

    pub(crate) fn registry(&self) -> &Arc<LeakRegistry> {
        &self.registry
    }

    fn begin_suspension(&self, n: usize) -> Epoch {
        assert!(n > 0, "{}: suspension requires at least one sub-operation", self.origin);
        let mut block = lock(&self.block);
        assert_eq!(
            block.pending, 0,
            "{}: previous suspension point still has pending completions",
            self.origin
        );
        block.epoch += 1;
        block.pending = n;
        Epoch(block.epoch)
    }

    fn on_sub_completion(&self, epoch: Epoch) -> bool {
        let mut block = lock(&self.block);
        if epoch.0 != block.epoch {
            let expected = block.epoch;
            drop(block);
            self.diag.report(
                self.origin,
                Fault::StaleEpoch {
                    expected,
                    got: epoch.0,
                },
            );
            return false;
        }
        assert!(
            block.pending > 0,
            "{}: duplicate completion for an already-resumed suspension point",
            self.origin
        );
        block.pending -= 1;
        block.pending == 0
    }

    pub(crate) fn maybe_reenter(&self, epoch: Epoch) {
        if self.on_sub_completion(epoch) {
            self.reenter();
        }
    }

    fn reenter(&self) {
        let mut entry = {
            let mut slot = lock(&self.entry);
            match std::mem::replace(&mut *slot, EntrySlot::Running) {
                EntrySlot::Ready(entry) => entry,
                EntrySlot::Running => {
                    panic!("{}: synchronous reentry into a running closure", self.origin)
                }
                EntrySlot::Unset => {
                    panic!("{}: closure reentered without an entry point", self.origin)
                }
            }
        };
        entry();
        let mut slot = lock(&self.entry);
        if matches!(*slot, EntrySlot::Running) {
            *slot = EntrySlot::Ready(entry);
        }
    }
}

impl Mortal for ClosureCore {
    fn mortality(&self) -> &Mortality {
        &self.mortality
    }

    fn on_mark_dead(&self) {
        // Groups opened inside this activation should be gone too; a
        // group that still needs joins self-reports a stale leak.
        let groups = std::mem::take(&mut *lock(&self.groups));
        for group in groups {
            group.mark_dead();
        }
        // The activation is done; releasing the entry point here also
        // breaks the handle cycle a captured `Closure` clone would form.
        *lock(&self.entry) = EntrySlot::Unset;
        if self.diag.leak_check() {
            let registry = self.registry.clone();
            let diag = self.diag.clone();
            self.defer
                .schedule(Duration::ZERO, Box::new(move || registry.check(&diag)));
        }
    }
}

impl Drop for ClosureCore {
    fn drop(&mut self) {
        self.mark_dead();
        self.mortality.mark_destroyed();
    }
}

/// Per-activation record driving suspension and resumption.
///
/// Cheap-clone handle; issued callbacks hold clones, so a closure stays
/// alive while any of its suspension callbacks can still fire.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use rejoin::{Origin, Runtime, RuntimeConfig, Slot, StepDefer};
///
/// let defer = Arc::new(StepDefer::new());
/// let rt = Runtime::new(RuntimeConfig::default(), defer.clone());
///
/// let closure = rt.closure(Origin::here("activation"));
/// let result: Slot<u32> = Slot::new();
///
/// let entry_result = result.clone();
/// closure.set_entry(move || {
///     // Runs once all completions for the suspension point arrived.
///     assert_eq!(entry_result.take(), Some(11));
/// });
///
/// let epoch = closure.begin_suspension(1);
/// let callback = closure.callback1(epoch, &result);
///
/// // The event loop fires the callback with the sub-operation's output.
/// callback(11);
/// ```
#[derive(Clone)]
pub struct Closure {
    core: Arc<ClosureCore>,
}

impl Closure {
    pub(crate) fn new(origin: Origin, diag: Arc<Diagnostics>, defer: Arc<dyn Defer>) -> Self {
        Self {
            core: Arc::new(ClosureCore {
                id: CLOSURE_SEQ.fetch_add(1, Ordering::Relaxed),
                origin,
                mortality: Mortality::new(),
                registry: LeakRegistry::new(),
                diag,
                defer,
                block: Mutex::new(Block {
                    epoch: 0,
                    pending: 0,
                    resume_point: 0,
                }),
                groups: Mutex::new(Vec::new()),
                entry: Mutex::new(EntrySlot::Unset),
            }),
        }
    }

    pub(crate) fn core(&self) -> &Arc<ClosureCore> {
        &self.core
    }

    /// Crate-wide unique activation id.
    pub fn id(&self) -> u64 {
        self.core.id
    }

    /// Returns the activation's creation site.
    pub fn origin(&self) -> Origin {
        self.core.origin
    }

    /// Registers (or replaces) the resumption entry point.
    ///
    /// The entry point runs every time a suspension point's last
    /// completion arrives. It typically dispatches on
    /// [`Closure::resume_point`] to continue where the activation paused.
    pub fn set_entry(&self, entry: impl FnMut() + Send + 'static) {
        *lock(&self.core.entry) = EntrySlot::Ready(Box::new(entry));
    }

    /// Records where the next reentry should continue.
    pub fn set_resume_point(&self, label: u32) {
        lock(&self.core.block).resume_point = label;
    }

    /// Reads the label stored by [`Closure::set_resume_point`].
    pub fn resume_point(&self) -> u32 {
        lock(&self.core.block).resume_point
    }

    /// Opens a new suspension point expecting `n` completions.
    ///
    /// Returns the epoch every callback for this point must carry.
    ///
    /// # Panics
    /// If the previous suspension point still has pending completions,
    /// or if `n` is zero.
    pub fn begin_suspension(&self, n: usize) -> Epoch {
        self.core.begin_suspension(n)
    }

    /// Accounts one sub-operation completion for `epoch`.
    ///
    /// Returns true exactly when the counter reaches zero. A stale epoch
    /// is reported ([`Fault::StaleEpoch`]) and dropped.
    pub fn on_sub_completion(&self, epoch: Epoch) -> bool {
        self.core.on_sub_completion(epoch)
    }

    /// Re-enters the activation iff `epoch`'s last completion arrived.
    pub fn maybe_reenter(&self, epoch: Epoch) {
        self.core.maybe_reenter(epoch);
    }

    /// Associates a join group opened inside this activation, so
    /// end-of-scope accounting can sweep it.
    pub fn adopt_group<T: Send + 'static>(&self, group: &JoinGroup<T>) {
        lock(&self.core.groups).push(group.mortal_ref());
    }

    /// Final-return accounting.
    ///
    /// Marks the closure dead: every adopted join group is marked dead in
    /// turn (reporting a [`Fault::StaleLeak`] if it still needs joins),
    /// and, with leak checking enabled, a sweep of the closure's registry
    /// of issued callbacks is scheduled. Idempotent.
    pub fn end_of_scope_check(&self) {
        self.core.mark_dead();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::test_runtime;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_ids_are_unique() {
        let (rt, _defer, _sink) = test_runtime();
        let a = rt.closure(Origin::here("a"));
        let b = rt.closure(Origin::here("b"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_reenters_exactly_when_counter_reaches_zero() {
        let (rt, _defer, _sink) = test_runtime();
        let closure = rt.closure(Origin::here("act"));
        let entries = Arc::new(AtomicUsize::new(0));

        let hits = entries.clone();
        closure.set_entry(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });

        let epoch = closure.begin_suspension(3);
        closure.maybe_reenter(epoch);
        closure.maybe_reenter(epoch);
        assert_eq!(entries.load(Ordering::SeqCst), 0, "two of three arrived");

        closure.maybe_reenter(epoch);
        assert_eq!(entries.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stale_epoch_is_reported_and_dropped() {
        let (rt, _defer, sink) = test_runtime();
        let closure = rt.closure(Origin::here("act"));
        let entries = Arc::new(AtomicUsize::new(0));

        let hits = entries.clone();
        closure.set_entry(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });

        let first = closure.begin_suspension(1);
        closure.maybe_reenter(first);
        assert_eq!(entries.load(Ordering::SeqCst), 1);

        let second = closure.begin_suspension(2);

        // A completion from the first point arrives late.
        closure.maybe_reenter(first);
        assert_eq!(
            sink.labels(),
            vec!["stale_epoch"],
            "stale completion must be diagnosed"
        );
        assert_eq!(
            entries.load(Ordering::SeqCst),
            1,
            "stale completion must not reenter"
        );

        // And it must not have decremented the live counter.
        closure.maybe_reenter(second);
        assert_eq!(entries.load(Ordering::SeqCst), 1);
        closure.maybe_reenter(second);
        assert_eq!(entries.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_resume_point_round_trip() {
        let (rt, _defer, _sink) = test_runtime();
        let closure = rt.closure(Origin::here("act"));
        assert_eq!(closure.resume_point(), 0);
        closure.set_resume_point(3);
        assert_eq!(closure.resume_point(), 3);
    }

    #[test]
    fn test_multi_step_activation() {
        let (rt, _defer, _sink) = test_runtime();
        let closure = rt.closure(Origin::here("steps"));
        let trail = Arc::new(Mutex::new(Vec::new()));

        let inner = closure.clone();
        let steps = trail.clone();
        closure.set_entry(move || {
            let step = inner.resume_point();
            lock(&steps).push(step);
            if step == 1 {
                inner.set_resume_point(2);
            }
        });

        closure.set_resume_point(1);
        let first = closure.begin_suspension(1);
        closure.maybe_reenter(first);

        let second = closure.begin_suspension(1);
        closure.maybe_reenter(second);

        assert_eq!(*lock(&trail), vec![1, 2]);
    }

    #[test]
    fn test_end_of_scope_marks_adopted_groups() {
        let (rt, _defer, sink) = test_runtime();
        let closure = rt.closure(Origin::here("act"));
        let group = rt.join_group::<u32>(Origin::here("inner group"));

        closure.adopt_group(&group);
        group.launch();

        closure.end_of_scope_check();
        let reports = sink.recorded();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0.scope(), "inner group");
        assert_eq!(reports[0].1, Fault::StaleLeak { remaining: 1 });

        // The group was already marked dead; dropping it stays quiet.
        drop(group);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_end_of_scope_quiet_for_drained_groups() {
        let (rt, defer, sink) = test_runtime();
        let closure = rt.closure(Origin::here("act"));
        let group = rt.join_group::<u32>(Origin::here("inner group"));

        closure.adopt_group(&group);
        group.launch();
        group.make_joiner(Origin::here("call")).join(1);
        defer.run_until_idle();
        assert_eq!(group.consume(), Some(1));

        closure.end_of_scope_check();
        assert_eq!(sink.len(), 0);
    }

    #[test]
    #[should_panic(expected = "previous suspension point still has pending completions")]
    fn test_overlapping_suspensions_are_fatal() {
        let (rt, _defer, _sink) = test_runtime();
        let closure = rt.closure(Origin::here("act"));
        closure.set_entry(|| {});
        let _first = closure.begin_suspension(2);
        let _second = closure.begin_suspension(1);
    }

    #[test]
    #[should_panic(expected = "duplicate completion for an already-resumed suspension point")]
    fn test_duplicate_completion_on_current_epoch_is_fatal() {
        let (rt, _defer, _sink) = test_runtime();
        let closure = rt.closure(Origin::here("act"));
        closure.set_entry(|| {});
        let epoch = closure.begin_suspension(1);
        closure.maybe_reenter(epoch);
        closure.maybe_reenter(epoch); // same epoch, counter already zero
    }
}
