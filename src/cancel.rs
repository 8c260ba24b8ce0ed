//! # Single-waiter cooperative cancellation token.
//!
//! A [`Canceller`] connects one cancellable activation to the code that
//! may want to stop it. The activation parks a continuation with
//! [`Canceller::wait`]; the other side calls [`Canceller::cancel`].
//! Cancellation is advisory: nothing is forcibly aborted; the awaiting
//! logic observes [`Canceller::cancelled`] and unwinds cooperatively.
//!
//! ## Phases
//! ```text
//! Waiting ──── cancel() before wait ────► CancelRequested
//!    │                                          │
//!    │ wait(cb) stores cb                       │ next wait(cb) fires cb
//!    ▼                                          ▼  synchronously, once
//! (armed) ──── cancel() fires cb ─────► Cancelled
//!    │
//!    └──── too_late() ────► TooLate (continuation dropped, requests
//!                            no longer queue; irreversible)
//! ```
//!
//! ## Rules
//! - At most one stored continuation; a second `wait` while one is armed
//!   is a programming error and panics.
//! - The continuation fires exactly once, *synchronously* inside the call
//!   that releases it (`cancel`, or `wait` after a queued cancel). This is
//!   the one resumption in the crate that does not hop through the
//!   deferred-call primitive; waiters that re-enter a closure must defer
//!   themselves.
//! - Repeated `cancel` calls have no further effect.

use std::sync::{Arc, Mutex};

use crate::sync::lock;

/// Lifecycle phase of a [`Canceller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelPhase {
    /// No cancellation requested, no request queued.
    Waiting,
    /// Cancellation requested before any waiter; the next `wait` fires.
    CancelRequested,
    /// Cancellation happened.
    Cancelled,
    /// The activation declared itself past the point of no return.
    TooLate,
}

type Waiter = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct CancelState {
    waiter: Option<Waiter>,
    queued: bool,
    cancelled: bool,
    too_late: bool,
}

/// Cooperative cancellation token, single waiter, no counting.
///
/// Cheap to clone; all clones share one state.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use rejoin::Canceller;
///
/// let canceller = Canceller::new();
/// let fired = Arc::new(AtomicBool::new(false));
///
/// let flag = fired.clone();
/// canceller.wait(move || flag.store(true, Ordering::SeqCst));
///
/// canceller.cancel();
/// assert!(fired.load(Ordering::SeqCst));
/// assert!(canceller.cancelled());
/// ```
#[derive(Clone, Default)]
pub struct Canceller {
    state: Arc<Mutex<CancelState>>,
}

impl Canceller {
    /// Creates a token in the waiting phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks `continuation` until a cancel request arrives.
    ///
    /// If a request was already queued, `continuation` runs synchronously
    /// within this call (and the queued request is consumed). Otherwise it
    /// is stored.
    ///
    /// # Panics
    /// If a continuation is already stored: overwriting a live waiter is
    /// a logic defect.
    pub fn wait(&self, continuation: impl FnOnce() + Send + 'static) {
        let run_now = {
            let mut state = lock(&self.state);
            if state.queued {
                state.queued = false;
                true
            } else {
                assert!(
                    state.waiter.is_none(),
                    "canceller already has a stored continuation"
                );
                state.waiter = Some(Box::new(continuation));
                return;
            }
        };
        if run_now {
            continuation();
        }
    }

    /// Requests cancellation.
    ///
    /// A stored continuation is released and invoked immediately, exactly
    /// once. With no waiter armed, the request is queued for the next
    /// [`Canceller::wait`], unless the activation already declared
    /// [`Canceller::too_late`]. Repeated calls have no further effect.
    pub fn cancel(&self) {
        let waiter = {
            let mut state = lock(&self.state);
            state.cancelled = true;
            match state.waiter.take() {
                Some(waiter) => Some(waiter),
                None => {
                    if !state.too_late {
                        state.queued = true;
                    }
                    None
                }
            }
        };
        if let Some(waiter) = waiter {
            waiter();
        }
    }

    /// Returns whether cancellation has been requested.
    pub fn cancelled(&self) -> bool {
        lock(&self.state).cancelled
    }

    /// Declares the activation past the point where cancelling helps.
    ///
    /// Irreversible: drops any stored continuation, discards a queued
    /// request, and stops future requests from queuing.
    pub fn too_late(&self) {
        let mut state = lock(&self.state);
        state.too_late = true;
        state.queued = false;
        state.waiter = None;
    }

    /// Drops the stored continuation, if any, without the too-late latch.
    pub fn clear(&self) {
        lock(&self.state).waiter = None;
    }

    /// Returns the current phase (diagnostic/introspection aid).
    pub fn phase(&self) -> CancelPhase {
        let state = lock(&self.state);
        if state.cancelled {
            CancelPhase::Cancelled
        } else if state.queued {
            CancelPhase::CancelRequested
        } else if state.too_late {
            CancelPhase::TooLate
        } else {
            CancelPhase::Waiting
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> usize) {
        let hits = Arc::new(AtomicUsize::new(0));
        let reader = {
            let hits = hits.clone();
            move || hits.load(Ordering::SeqCst)
        };
        (hits, reader)
    }

    #[test]
    fn test_cancel_before_wait_fires_next_wait_synchronously() {
        let canceller = Canceller::new();
        canceller.cancel();
        assert_eq!(canceller.phase(), CancelPhase::Cancelled);

        let (hits, fired) = counter();
        canceller.wait(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(fired(), 1, "queued cancel must fire inside wait()");
    }

    #[test]
    fn test_cancel_after_wait_fires_immediately_and_once() {
        let canceller = Canceller::new();
        let (hits, fired) = counter();

        canceller.wait(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(fired(), 0);

        canceller.cancel();
        assert_eq!(fired(), 1);

        canceller.cancel();
        assert_eq!(fired(), 1, "second cancel must have no further effect");
        assert!(canceller.cancelled());
    }

    #[test]
    fn test_queued_cancel_consumed_exactly_once() {
        let canceller = Canceller::new();
        canceller.cancel();

        let (hits, fired) = counter();
        let h = hits.clone();
        canceller.wait(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(fired(), 1);

        // The request was consumed; a fresh waiter parks normally.
        canceller.wait(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(fired(), 1);
    }

    #[test]
    fn test_too_late_blocks_queuing_and_drops_waiter() {
        let canceller = Canceller::new();
        let (hits, fired) = counter();

        canceller.wait(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        canceller.too_late();
        canceller.cancel();

        assert_eq!(fired(), 0, "too_late must drop the stored continuation");
        assert!(canceller.cancelled(), "cancelled flag still records intent");

        // And nothing was queued for a later wait.
        let (hits2, fired2) = counter();
        canceller.wait(move || {
            hits2.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(fired2(), 0);
    }

    #[test]
    fn test_clear_drops_waiter_without_latching() {
        let canceller = Canceller::new();
        let (hits, fired) = counter();

        canceller.wait(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        canceller.clear();
        canceller.cancel();
        assert_eq!(fired(), 0, "cleared continuation must not fire");
        assert_eq!(canceller.phase(), CancelPhase::Cancelled);
    }

    #[test]
    #[should_panic(expected = "already has a stored continuation")]
    fn test_double_wait_is_fatal() {
        let canceller = Canceller::new();
        canceller.wait(|| {});
        canceller.wait(|| {});
    }

    #[test]
    fn test_phase_transitions() {
        let canceller = Canceller::new();
        assert_eq!(canceller.phase(), CancelPhase::Waiting);

        canceller.too_late();
        assert_eq!(canceller.phase(), CancelPhase::TooLate);

        let fresh = Canceller::new();
        fresh.cancel();
        assert_eq!(fresh.phase(), CancelPhase::Cancelled);
    }
}
