//! # Destination slots and suspension-point callback factories.
//!
//! Generated/calling code creates one [`Slot`] per output of an
//! asynchronous sub-operation, then asks the closure for a callback bound
//! to those slots and the current suspension epoch. When the event loop
//! fires the callback, the outputs land in the slots and the completion
//! routes through `maybe_reenter`; after resumption the activation reads
//! the slots back.
//!
//! Factories exist for 0 to 4 output slots: the shapes continuation
//! rewriters actually emit. Each returned callback:
//! - is single-use (`FnOnce`; a second fire is unrepresentable),
//! - holds a strong closure handle (an issued callback keeps its
//!   activation alive until it fires or is dropped),
//! - is tracked in the closure's leak registry until it fires or drops.

use std::sync::{Arc, Mutex};

use crate::closures::closure::{Closure, Epoch};
use crate::sync::lock;

/// Cloneable destination cell for one sub-operation output.
///
/// The callback side writes with `set`; the resumed activation reads with
/// `take` (or `get` for `Clone` payloads).
pub struct Slot<T>(Arc<Mutex<Option<T>>>);

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slot<T> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(None)))
    }

    /// Stores a value, replacing any previous one.
    pub fn set(&self, value: T) {
        *lock(&self.0) = Some(value);
    }

    /// Removes and returns the stored value.
    pub fn take(&self) -> Option<T> {
        lock(&self.0).take()
    }

    /// Returns true while a value is stored.
    pub fn is_set(&self) -> bool {
        lock(&self.0).is_some()
    }
}

impl<T: Clone> Slot<T> {
    /// Returns a copy of the stored value, leaving it in place.
    pub fn get(&self) -> Option<T> {
        lock(&self.0).clone()
    }
}

impl Closure {
    /// Callback with no outputs: fire = one completion for `epoch`.
    pub fn callback0(&self, epoch: Epoch) -> Box<dyn FnOnce() + Send + 'static> {
        let core = self.core().clone();
        let ticket = core.registry().track(core.origin(), "suspension callback");
        Box::new(move || {
            drop(ticket);
            core.maybe_reenter(epoch);
        })
    }

    /// Callback delivering one output into `s1`.
    pub fn callback1<T1>(&self, epoch: Epoch, s1: &Slot<T1>) -> Box<dyn FnOnce(T1) + Send + 'static>
    where
        T1: Send + 'static,
    {
        let core = self.core().clone();
        let ticket = core.registry().track(core.origin(), "suspension callback");
        let s1 = s1.clone();
        Box::new(move |v1| {
            s1.set(v1);
            drop(ticket);
            core.maybe_reenter(epoch);
        })
    }

    /// Callback delivering two outputs.
    pub fn callback2<T1, T2>(
        &self,
        epoch: Epoch,
        s1: &Slot<T1>,
        s2: &Slot<T2>,
    ) -> Box<dyn FnOnce(T1, T2) + Send + 'static>
    where
        T1: Send + 'static,
        T2: Send + 'static,
    {
        let core = self.core().clone();
        let ticket = core.registry().track(core.origin(), "suspension callback");
        let (s1, s2) = (s1.clone(), s2.clone());
        Box::new(move |v1, v2| {
            s1.set(v1);
            s2.set(v2);
            drop(ticket);
            core.maybe_reenter(epoch);
        })
    }

    /// Callback delivering three outputs.
    pub fn callback3<T1, T2, T3>(
        &self,
        epoch: Epoch,
        s1: &Slot<T1>,
        s2: &Slot<T2>,
        s3: &Slot<T3>,
    ) -> Box<dyn FnOnce(T1, T2, T3) + Send + 'static>
    where
        T1: Send + 'static,
        T2: Send + 'static,
        T3: Send + 'static,
    {
        let core = self.core().clone();
        let ticket = core.registry().track(core.origin(), "suspension callback");
        let (s1, s2, s3) = (s1.clone(), s2.clone(), s3.clone());
        Box::new(move |v1, v2, v3| {
            s1.set(v1);
            s2.set(v2);
            s3.set(v3);
            drop(ticket);
            core.maybe_reenter(epoch);
        })
    }

    /// Callback delivering four outputs.
    pub fn callback4<T1, T2, T3, T4>(
        &self,
        epoch: Epoch,
        s1: &Slot<T1>,
        s2: &Slot<T2>,
        s3: &Slot<T3>,
        s4: &Slot<T4>,
    ) -> Box<dyn FnOnce(T1, T2, T3, T4) + Send + 'static>
    where
        T1: Send + 'static,
        T2: Send + 'static,
        T3: Send + 'static,
        T4: Send + 'static,
    {
        let core = self.core().clone();
        let ticket = core.registry().track(core.origin(), "suspension callback");
        let (s1, s2, s3, s4) = (s1.clone(), s2.clone(), s3.clone(), s4.clone());
        Box::new(move |v1, v2, v3, v4| {
            s1.set(v1);
            s2.set(v2);
            s3.set(v3);
            s4.set(v4);
            drop(ticket);
            core.maybe_reenter(epoch);
        })
    }
}
