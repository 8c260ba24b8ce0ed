//! # Manually driven deferred-call queue.
//!
//! [`StepDefer`] buffers scheduled jobs in a FIFO and runs them only when
//! the embedder calls [`StepDefer::run_until_idle`] (or
//! [`StepDefer::run_one`]). It exists for two consumers:
//! - embedders with their own event loop, which drain the queue once per
//!   tick;
//! - tests, which get fully deterministic resumption ordering.
//!
//! Delays are recorded but not simulated: jobs run in schedule order
//! regardless of the requested delay. An embedder that needs real timers
//! should wrap this queue or use [`TokioDefer`](crate::TokioDefer).

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::defer::{Defer, Deferred};
use crate::sync::lock;

/// FIFO deferred-call queue drained by explicit calls.
#[derive(Default)]
pub struct StepDefer {
    queue: Mutex<VecDeque<Deferred>>,
}

impl StepDefer {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when no jobs are queued.
    pub fn is_idle(&self) -> bool {
        lock(&self.queue).is_empty()
    }

    /// Returns the number of queued jobs.
    pub fn len(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Returns true when no jobs are queued.
    pub fn is_empty(&self) -> bool {
        self.is_idle()
    }

    /// Runs the oldest queued job, if any. Returns whether one ran.
    ///
    /// The queue lock is released before the job runs, so jobs may
    /// schedule further jobs.
    pub fn run_one(&self) -> bool {
        let job = lock(&self.queue).pop_front();
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Runs queued jobs (including ones scheduled by running jobs) until
    /// the queue is empty. Returns the number of jobs run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_one() {
            ran += 1;
        }
        ran
    }
}

impl Defer for StepDefer {
    fn schedule(&self, _delay: Duration, job: Deferred) {
        lock(&self.queue).push_back(job);
    }
}
