//! # Coordination group: per-call signal extraction.
//!
//! [`CoordGroup`] is a thin variant of [`JoinGroup`] for code that pulls
//! completed signals into destination slots itself instead of dispatching
//! opaque continuations. Same counting, same completion-order FIFO, same
//! lifetime rules; only the vocabulary changes: launches are *signals*,
//! consumption writes into a caller-provided slot.

use crate::origin::Origin;

use super::group::JoinGroup;
use super::joiner::Joiner;

/// Signal-extraction facade over a join group.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use rejoin::{Origin, Runtime, RuntimeConfig, StepDefer};
///
/// let defer = Arc::new(StepDefer::new());
/// let rt = Runtime::new(RuntimeConfig::default(), defer.clone());
///
/// let group = rt.coord_group::<u32>(Origin::here("signals"));
/// group.add_signal();
/// group.signaller(Origin::here("producer")).join(5);
/// defer.run_until_idle();
///
/// let mut value = 0;
/// assert!(group.next_signal(&mut value));
/// assert_eq!(value, 5);
/// assert!(!group.need_wait());
/// ```
pub struct CoordGroup<T: Send + 'static> {
    inner: JoinGroup<T>,
}

impl<T: Send + 'static> Clone for CoordGroup<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Send + 'static> CoordGroup<T> {
    pub(crate) fn new(inner: JoinGroup<T>) -> Self {
        Self { inner }
    }

    /// Returns the group's creation site.
    pub fn origin(&self) -> Origin {
        self.inner.origin()
    }

    /// Registers one more expected signal.
    pub fn add_signal(&self) {
        self.inner.launch();
    }

    /// Unregisters an expected signal that will never fire.
    pub fn remove_signal(&self) {
        self.inner.remove_join();
    }

    /// Signals left: not-yet-fired plus fired-but-unread.
    pub fn n_signals_left(&self) -> usize {
        self.inner.n_joins_left()
    }

    /// Whether the group should still be waited on.
    pub fn need_wait(&self) -> bool {
        self.inner.need_join()
    }

    /// Writes the next fired signal into `dst`, in completion order.
    ///
    /// Returns false (leaving `dst` untouched) when no signal is pending.
    pub fn next_signal(&self, dst: &mut T) -> bool {
        match self.inner.consume() {
            Some(value) => {
                *dst = value;
                true
            }
            None => false,
        }
    }

    /// Creates the producer-side handle for one expected signal.
    pub fn signaller(&self, origin: Origin) -> Joiner<T> {
        self.inner.make_joiner(origin)
    }

    /// Parks a one-shot continuation for the next signal.
    pub fn register_waiter(&self, waiter: impl FnOnce() + Send + 'static) {
        self.inner.register_waiter(waiter);
    }

    /// Awaits the next signal (see [`JoinGroup::wait_next`]).
    pub async fn wait_next(&self) {
        self.inner.wait_next().await;
    }

    /// Marks the group logically dead (scope exit).
    pub fn mark_dead(&self) {
        self.inner.mark_dead();
    }

    /// The underlying join group (e.g. for closure scope adoption).
    pub fn as_join_group(&self) -> &JoinGroup<T> {
        &self.inner
    }
}
