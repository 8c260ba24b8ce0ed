//! # Shared boolean observation cell.
//!
//! [`Flag`] is a cloneable handle to one atomic boolean. Owners and
//! non-owning observers hold clones of the same cell; an observer sees a
//! state change without holding the object that made it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable shared boolean cell.
///
/// Clones observe the same underlying value. Reads use acquire ordering
/// and writes release ordering, so a flag set before handing work to the
/// deferred-call primitive is visible when that work runs.
#[derive(Clone, Debug, Default)]
pub struct Flag(Arc<AtomicBool>);

impl Flag {
    /// Creates a new cell holding `value`.
    pub fn new(value: bool) -> Self {
        Self(Arc::new(AtomicBool::new(value)))
    }

    /// Reads the current value.
    #[inline]
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Sets the value.
    #[inline]
    pub fn set(&self, value: bool) {
        self.0.store(value, Ordering::Release);
    }

    /// Sets the value and returns the previous one.
    #[inline]
    pub fn replace(&self, value: bool) -> bool {
        self.0.swap(value, Ordering::AcqRel)
    }
}
