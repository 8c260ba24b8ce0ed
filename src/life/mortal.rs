//! # Dead/destroyed two-flag lifetime signal.
//!
//! A [`Mortal`] object can be *dead* (logically complete, e.g. its scope
//! exited) before it is *destroyed* (actually reclaimed). Non-owners hold
//! a [`MortalRef`] and can mark the target dead, or observe either flag,
//! without keeping it alive.
//!
//! ## Rules
//! - `mark_dead` is idempotent; the [`Mortal::on_mark_dead`] hook runs on
//!   the first call only.
//! - Early-dead marking is opt-in per type: types that never mark early
//!   have both flags set together on drop.
//! - A [`MortalRef`] becomes a no-op once the target's `destroyed` flag is
//!   set; it never dereferences a reclaimed target.

use std::sync::{Arc, Weak};

use crate::life::flag::Flag;

/// The `dead` / `destroyed` flag pair.
///
/// Embed one per lifetime-tracked object. The owner's `Drop` impl is
/// expected to call [`Mortal::mark_dead`] (idempotent) and then
/// [`Mortality::mark_destroyed`], in that order, so observers see the
/// logical end of life before reclamation.
#[derive(Debug, Default)]
pub struct Mortality {
    dead: Flag,
    destroyed: Flag,
}

impl Mortality {
    /// Creates a fresh pair with both flags unset.
    pub fn new() -> Self {
        Self {
            dead: Flag::new(false),
            destroyed: Flag::new(false),
        }
    }

    /// Returns a handle to the shared `dead` cell.
    pub fn dead_flag(&self) -> Flag {
        self.dead.clone()
    }

    /// Returns a handle to the shared `destroyed` cell.
    pub fn destroyed_flag(&self) -> Flag {
        self.destroyed.clone()
    }

    /// Reads the `dead` flag.
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.dead.get()
    }

    /// Reads the `destroyed` flag.
    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// Sets `destroyed`. Irreversible by contract; callers never unset it.
    pub fn mark_destroyed(&self) {
        self.destroyed.set(true);
    }

    /// Sets `dead`, returning the prior value.
    pub(crate) fn set_dead(&self) -> bool {
        self.dead.replace(true)
    }
}

/// An object with observable end-of-life flags and a one-shot dead hook.
pub trait Mortal: Send + Sync {
    /// The object's flag pair.
    fn mortality(&self) -> &Mortality;

    /// Cleanup hook, run on the first [`Mortal::mark_dead`] call.
    ///
    /// This is where a type reports scope-exit diagnostics or releases
    /// logical resources ahead of reclamation.
    fn on_mark_dead(&self) {}

    /// Marks the object dead. Idempotent; the hook runs exactly once.
    fn mark_dead(&self) {
        if !self.mortality().set_dead() {
            self.on_mark_dead();
        }
    }
}

/// Non-owning observer of a [`Mortal`] object.
///
/// Holds a weak pointer plus clones of both flags. [`MortalRef::mark_dead`]
/// forwards to the target only while it is neither destroyed nor already
/// reclaimed; afterwards the call is a silent no-op. This lets scope-exit
/// accounting sweep objects that may or may not still exist.
#[derive(Clone)]
pub struct MortalRef {
    target: Weak<dyn Mortal>,
    dead: Flag,
    destroyed: Flag,
}

impl MortalRef {
    /// Creates an observer for `target`.
    pub fn of<T: Mortal + 'static>(target: &Arc<T>) -> Self {
        let target_dyn: Arc<dyn Mortal> = target.clone();
        let weak: Weak<dyn Mortal> = Arc::downgrade(&target_dyn);
        let mortality = target.mortality();
        Self {
            target: weak,
            dead: mortality.dead_flag(),
            destroyed: mortality.destroyed_flag(),
        }
    }

    /// Marks the target dead if it still exists; no-op once destroyed.
    pub fn mark_dead(&self) {
        if self.destroyed.get() {
            return;
        }
        if let Some(target) = self.target.upgrade() {
            target.mark_dead();
        }
    }

    /// Reads the target's `dead` flag.
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.dead.get()
    }

    /// Reads the target's `destroyed` flag.
    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Probe {
        mortality: Mortality,
        hook_runs: AtomicUsize,
    }

    impl Probe {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                mortality: Mortality::new(),
                hook_runs: AtomicUsize::new(0),
            })
        }
    }

    impl Mortal for Probe {
        fn mortality(&self) -> &Mortality {
            &self.mortality
        }

        fn on_mark_dead(&self) {
            self.hook_runs.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_mark_dead_is_idempotent() {
        let probe = Probe::new();
        probe.mark_dead();
        probe.mark_dead();
        probe.mark_dead();

        assert!(probe.mortality.is_dead());
        assert_eq!(
            probe.hook_runs.load(Ordering::SeqCst),
            1,
            "hook must run exactly once"
        );
    }

    #[test]
    fn test_dead_independent_of_destroyed() {
        let probe = Probe::new();
        probe.mark_dead();
        assert!(probe.mortality.is_dead());
        assert!(
            !probe.mortality.is_destroyed(),
            "early dead must not imply destroyed"
        );

        probe.mortality.mark_destroyed();
        assert!(probe.mortality.is_destroyed());
    }

    #[test]
    fn test_mortal_ref_marks_live_target() {
        let probe = Probe::new();
        let observer = MortalRef::of(&probe);

        observer.mark_dead();
        assert!(observer.is_dead());
        assert_eq!(probe.hook_runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_mortal_ref_noop_after_destroyed_flag() {
        let probe = Probe::new();
        let observer = MortalRef::of(&probe);

        probe.mortality.mark_destroyed();
        observer.mark_dead();

        assert_eq!(
            probe.hook_runs.load(Ordering::SeqCst),
            0,
            "destroyed target must not be touched"
        );
    }

    #[test]
    fn test_mortal_ref_survives_target_drop() {
        let probe = Probe::new();
        let observer = MortalRef::of(&probe);
        let destroyed = probe.mortality.destroyed_flag();

        probe.mortality.mark_destroyed();
        drop(probe);

        assert!(destroyed.get());
        observer.mark_dead(); // must not crash or upgrade
        assert!(observer.is_destroyed());
    }
}
