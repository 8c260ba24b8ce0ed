//! # Join-group coordination.
//!
//! A join group coordinates a batch of concurrently launched asynchronous
//! calls: the owner launches N calls, suspends, and is resumed as results
//! arrive: in completion order, never launch order.
//!
//! ## Architecture
//! ```text
//! owner ──► JoinGroup<T> ──► GroupCore<T> { outstanding, pending FIFO, waiter }
//!               │                  ▲ complete(record)   │ waiter fires via
//!               │ make_joiner()    │ (deferred hop)     ▼ deferred hop
//!               └──► Joiner<T> ────┘            Defer::schedule
//!                     (WeakRef; detects a destroyed group)
//! ```
//!
//! ## Types
//! - [`JoinGroup`] - owner-side handle: launch accounting, FIFO
//!   consumption, one-shot waiter registration
//! - [`Joiner`] - per-launched-call handle; resolves exactly once or is
//!   dropped unresolved
//! - [`CoordGroup`] - thin wrapper exposing per-call signal vocabulary
//!
//! ## Rules
//! - `outstanding + pending == n_joins_left()` after every operation.
//! - Delivery order is strictly completion order; encode per-launch
//!   identity inside the record type if you need it.
//! - A registered waiter is cleared and *scheduled*, never invoked
//!   synchronously from `complete`.
//! - A joiner never touches its group once the group's `destroyed` flag
//!   is set; it reports an orphan join instead.

mod coord;
mod group;
mod joiner;

pub use coord::CoordGroup;
pub use group::JoinGroup;
pub use joiner::Joiner;
