//! # Tokio-backed deferred-call scheduler.
//!
//! [`TokioDefer`] maps [`Defer::schedule`] onto `tokio::spawn`: the job
//! runs on the ambient tokio runtime after an optional sleep. Spawning
//! never runs the task inline, which is exactly the contract the runtime
//! needs.

use std::time::Duration;

use crate::defer::{Defer, Deferred};

/// Schedules deferred jobs on the ambient tokio runtime.
///
/// ### Requirements
/// - Every call must happen inside a tokio runtime context; `schedule`
///   panics otherwise (same as any bare `tokio::spawn`).
/// - Jobs are plain closures, not futures: a job runs to completion on
///   whichever worker picks it up. Keep jobs short; they are resumption
///   steps, not workloads.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioDefer;

impl TokioDefer {
    /// Creates the scheduler. Stateless; `Default` works too.
    pub fn new() -> Self {
        Self
    }
}

impl Defer for TokioDefer {
    fn schedule(&self, delay: Duration, job: Deferred) {
        tokio::spawn(async move {
            if delay > Duration::ZERO {
                tokio::time::sleep(delay).await;
            }
            job();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_job_runs_after_schedule_returns() {
        let defer = TokioDefer::new();
        let ran = Arc::new(AtomicBool::new(false));
        let (tx, rx) = oneshot::channel();

        let flag = ran.clone();
        defer.schedule(
            Duration::ZERO,
            Box::new(move || {
                flag.store(true, Ordering::SeqCst);
                let _ = tx.send(());
            }),
        );

        // Not invoked synchronously inside schedule().
        assert!(!ran.load(Ordering::SeqCst), "job must not run inline");

        rx.await.expect("job must eventually run");
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_delay_is_honored() {
        let defer = TokioDefer::new();
        let (tx, rx) = oneshot::channel();

        let before = tokio::time::Instant::now();
        defer.schedule(
            Duration::from_millis(20),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );

        rx.await.expect("job must run");
        assert!(before.elapsed() >= Duration::from_millis(20));
    }
}
