//! # rejoin
//!
//! **Rejoin** is a cooperative continuation/join runtime for Rust.
//!
//! It is the coordination layer for code where asynchronous work is
//! expressed as callback continuations: an activation launches several
//! sub-operations, suspends, and is resumed exactly once all completions
//! for that suspension point have arrived, while completions that arrive
//! after their target scope has torn down are detected and diagnosed
//! instead of crashing into freed state.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!          ┌─────────────────────────────────────────────────────────┐
//!          │ Runtime (RuntimeConfig + Diagnostics + Defer scheduler) │
//!          └────┬──────────────────┬───────────────────────┬─────────┘
//!               ▼                  ▼                       ▼
//!        ┌────────────┐    ┌──────────────┐         ┌────────────┐
//!        │  Closure   │    │ JoinGroup<T> │         │ Canceller  │
//!        │ (epoch +   │    │ (outstanding │         │ (1 waiter, │
//!        │  pending)  │    │  + FIFO)     │         │  advisory) │
//!        └─────┬──────┘    └──────┬───────┘         └────────────┘
//!              │ callbacks        │ make_joiner()
//!              ▼ (0-4 slots)      ▼
//!        event loop fires    Joiner<T> ── join(record) ── deferred hop
//!              │                  │                            │
//!              ▼                  │ WeakRef: destroyed group?  ▼
//!        maybe_reenter(epoch)     └──► OrphanJoin report   complete()
//! ```
//!
//! ### Resumption discipline
//! ```text
//! complete(record):
//!   ├─► outstanding -= 1, pending.push_back(record)   (completion order)
//!   └─► waiter registered?
//!         ├─ yes → clear it, Defer::schedule(waiter)  (never inline)
//!         └─ no  → enqueue silently
//!
//! scope exit:
//!   ├─► mark_dead (idempotent)
//!   ├─► need_join()? → report StaleLeak(origin, remaining)
//!   └─► leak_check?  → Defer::schedule(registry sweep → DeallocLeak each)
//! ```
//!
//! ## Features
//! | Area            | Description                                             | Key types / traits                  |
//! |-----------------|---------------------------------------------------------|-------------------------------------|
//! | **Suspension**  | Per-activation epoch-tagged suspend/resume machine.     | [`Closure`], [`Epoch`], [`Slot`]    |
//! | **Joining**     | N-way coordination, completion-ordered delivery.        | [`JoinGroup`], [`Joiner`], [`CoordGroup`] |
//! | **Lifetime**    | Dead/destroyed flags observable without ownership.      | [`Mortal`], [`MortalRef`], [`WeakRef`], [`Flag`] |
//! | **Cancellation**| Single-waiter advisory token.                           | [`Canceller`]                       |
//! | **Diagnostics** | Policy-controlled fault reporting and leak tracking.    | [`Fault`], [`ReportSink`], [`LeakRegistry`] |
//! | **Scheduling**  | Deferred-call seam to the embedding event loop.         | [`Defer`], [`TokioDefer`], [`StepDefer`] |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use rejoin::{Origin, Runtime, RuntimeConfig, StepDefer};
//!
//! let defer = Arc::new(StepDefer::new());
//! let rt = Runtime::new(RuntimeConfig::default(), defer.clone());
//!
//! // Launch three calls into one group.
//! let group = rt.join_group::<&str>(Origin::here("fan-out"));
//! for _ in 0..3 {
//!     group.launch();
//! }
//! let a = group.make_joiner(Origin::here("a"));
//! let b = group.make_joiner(Origin::here("b"));
//! let c = group.make_joiner(Origin::here("c"));
//!
//! // Completions arrive in their own order...
//! c.join("c");
//! a.join("a");
//! b.join("b");
//! defer.run_until_idle();
//!
//! // ...and are delivered in exactly that order.
//! assert_eq!(group.consume(), Some("c"));
//! assert_eq!(group.consume(), Some("a"));
//! assert_eq!(group.consume(), Some("b"));
//! assert_eq!(group.consume(), None);
//! assert!(!group.need_join());
//! ```
//!
//! ## Concurrency model
//! One cooperative logical thread: operations are short, synchronous, and
//! serialized in practice by the embedding event loop. Every
//! post-completion resumption takes at least one hop through the
//! [`Defer`] scheduler, which bounds stack growth and keeps completions
//! from re-entering a frame that has not unwound. The [`Canceller`] is
//! the one deliberate exception: its continuation fires synchronously inside
//! `cancel`/`wait`.

mod cancel;
mod closures;
mod config;
mod defer;
mod diag;
mod error;
mod groups;
mod life;
mod origin;
mod runtime;
mod sync;

// ---- Public re-exports ----

pub use cancel::{CancelPhase, Canceller};
pub use closures::{Closure, Epoch, Slot};
pub use config::{ReportPolicy, RuntimeConfig};
pub use defer::{Defer, Deferred, StepDefer, TokioDefer};
pub use diag::{Diagnostics, LeakRegistry, LeakTicket, LogSink, ReportSink};
pub use error::Fault;
pub use groups::{CoordGroup, JoinGroup, Joiner};
pub use life::{Flag, Mortal, MortalRef, Mortality, WeakRef};
pub use origin::Origin;
pub use runtime::Runtime;
