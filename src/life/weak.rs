//! # Destruction-aware weak handle.
//!
//! [`WeakRef`] pairs a weak pointer with the target's shared `destroyed`
//! flag. Unlike a bare [`std::sync::Weak`], it reports the target as gone
//! as soon as the owner flips the flag, which can happen *before* the
//! last strong count drops, giving observers the early "logically dead"
//! phase the two-flag scheme exists for.
//!
//! ## Rules
//! - [`WeakRef::get`] checks the flag before any upgrade; it is the only
//!   sanctioned way to reach the target.
//! - Once invalid, every operation on the handle is a cheap no-op; clones
//!   of an invalid handle are equally invalid.

use std::sync::{Arc, Weak};

use crate::life::flag::Flag;
use crate::life::mortal::Mortal;

/// Non-owning handle that detects target invalidation.
pub struct WeakRef<T: ?Sized> {
    target: Weak<T>,
    destroyed: Flag,
}

impl<T: ?Sized> Clone for WeakRef<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            destroyed: self.destroyed.clone(),
        }
    }
}

impl<T: ?Sized> WeakRef<T> {
    /// Creates a handle from a strong pointer and the destroyed cell that
    /// guards it.
    pub fn new(strong: &Arc<T>, destroyed: Flag) -> Self {
        Self {
            target: Arc::downgrade(strong),
            destroyed,
        }
    }

    /// Returns the target while it is still valid, `None` afterwards.
    ///
    /// The `destroyed` flag is consulted first; a target whose owner has
    /// flagged destruction is unreachable even if strong counts linger.
    pub fn get(&self) -> Option<Arc<T>> {
        if self.destroyed.get() {
            return None;
        }
        self.target.upgrade()
    }

    /// Returns true while [`WeakRef::get`] would produce the target.
    pub fn is_valid(&self) -> bool {
        !self.destroyed.get() && self.target.strong_count() > 0
    }
}

impl<T: Mortal + 'static> WeakRef<T> {
    /// Creates a handle guarded by the target's own `destroyed` flag.
    pub fn of(strong: &Arc<T>) -> Self {
        Self::new(strong, strong.mortality().destroyed_flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::life::mortal::Mortality;

    struct Cell {
        mortality: Mortality,
        value: u32,
    }

    impl Mortal for Cell {
        fn mortality(&self) -> &Mortality {
            &self.mortality
        }
    }

    fn cell(value: u32) -> Arc<Cell> {
        Arc::new(Cell {
            mortality: Mortality::new(),
            value,
        })
    }

    #[test]
    fn test_get_while_valid() {
        let strong = cell(7);
        let weak = WeakRef::of(&strong);

        let got = weak.get().expect("target still alive");
        assert_eq!(got.value, 7);
        assert!(weak.is_valid());
    }

    #[test]
    fn test_destroyed_flag_invalidates_before_reclamation() {
        let strong = cell(7);
        let weak = WeakRef::of(&strong);

        strong.mortality.mark_destroyed();

        // The Arc is still alive, but the contract says hands off.
        assert!(weak.get().is_none());
        assert!(!weak.is_valid());
    }

    #[test]
    fn test_drop_invalidates() {
        let strong = cell(7);
        let weak = WeakRef::of(&strong);

        strong.mortality.mark_destroyed();
        drop(strong);

        assert!(weak.get().is_none());
        assert!(!weak.is_valid());
    }

    #[test]
    fn test_clone_shares_validity() {
        let strong = cell(1);
        let weak = WeakRef::of(&strong);
        let copy = weak.clone();

        strong.mortality.mark_destroyed();
        assert!(copy.get().is_none(), "clone must observe invalidation");
    }
}
