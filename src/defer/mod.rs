//! # Deferred-call primitive.
//!
//! Every post-completion resumption in the runtime (a join group's
//! waiter, a joiner delivering its record, a scheduled leak sweep) takes
//! at least one hop through a [`Defer`]. The contract is a single line:
//! **`schedule` must not invoke the job before returning to its caller.**
//! That one hop bounds stack growth and keeps a completion from
//! re-entering a closure whose current frame has not unwound.
//!
//! ## Implementations
//! - [`TokioDefer`] - production: `tokio::spawn`, with `tokio::time::sleep`
//!   for nonzero delays.
//! - [`StepDefer`] - embedder/test queue drained explicitly with
//!   [`StepDefer::run_until_idle`]; fully deterministic.
//!
//! ## Rules
//! - Jobs are `FnOnce`; a scheduled job runs at most once.
//! - Zero-delay jobs from one producer run in schedule order (both
//!   implementations preserve FIFO for the common `delay == 0` case).
//! - No job ever runs inside the `schedule` call itself.

mod spawn;
mod step;

pub use spawn::TokioDefer;
pub use step::StepDefer;

use std::time::Duration;

/// A unit of deferred work.
pub type Deferred = Box<dyn FnOnce() + Send + 'static>;

/// Scheduler seam between the runtime and its event loop.
pub trait Defer: Send + Sync + 'static {
    /// Enqueues `job` to run after `delay`.
    ///
    /// Must return before `job` runs, even for `Duration::ZERO`.
    fn schedule(&self, delay: Duration, job: Deferred);
}
