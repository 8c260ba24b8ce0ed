//! Poison-transparent locking for internal state mutexes.
//!
//! Core operations hold a lock only for short, await-free critical
//! sections. A poisoned mutex here means a panic already escaped a
//! critical section (e.g. a fatal-policy report); the state itself is
//! still consistent, so later accessors take the guard anyway instead of
//! compounding the failure.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks `m`, ignoring poisoning.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
