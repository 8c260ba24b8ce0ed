//! # Per-activation suspend/resume machinery.
//!
//! A [`Closure`] is the record for one in-flight activation of a function
//! written in continuation style. It tracks the activation's current
//! suspension point (an [`Epoch`]) and how many sub-operation completions
//! that point still expects; when the count reaches zero, the activation's
//! entry point is re-entered.
//!
//! ## Architecture
//! ```text
//! entry() runs ──► begin_suspension(n) ──► callbacks issued (epoch E)
//!      ▲                                        │ handed to async ops
//!      │ reenter                                ▼ fired by event loop
//!      └── pending hits 0 ◄── maybe_reenter(E) ◄─ slot assignment
//!                │
//!                └─ stale epoch E' != E → StaleEpoch report, dropped
//! ```
//!
//! ## Lifecycle
//! CREATED → SUSPENDED (pending > 0) → RESUMING (entry running) →
//! CREATED → … → COMPLETED (`end_of_scope_check` ran). The closure is
//! destroyed when the last handle (including issued callbacks) drops.
//!
//! ## Rules
//! - Every callback closes over the epoch it was issued under; firing it
//!   always routes through `maybe_reenter`.
//! - A stale-epoch completion is reported and dropped: it never
//!   decrements the live counter, never causes reentry.
//! - Synchronous reentry (a completion firing inside the entry point) is
//!   a contract violation of the deferred-call discipline and panics.

mod closure;
mod slots;

pub use closure::{Closure, Epoch};
pub use slots::Slot;
