//! # Diagnostic reporting.
//!
//! Faults ([`Fault`]) are discovered from inside deferred callbacks and
//! destructors where no caller exists to receive an error, so they are
//! *reported*, not returned. [`Diagnostics`] owns the policy decision and
//! the [`ReportSink`] the reports flow into.
//!
//! ## Architecture
//! ```text
//! complete / drop / leak sweep ──► Diagnostics::report(origin, fault)
//!                                        │
//!                          ReportPolicy: ├─ Silent → dropped
//!                                        ├─ Log    → sink.report(..)
//!                                        └─ Fatal  → sink.report(..) then panic
//! ```
//!
//! ## Rules
//! - `report` is called with no runtime locks held; a `Fatal` panic
//!   unwinds through user frames, never through poisoned internal state.
//! - Sinks must be cheap and non-blocking; they run on resumption paths.
//! - The sink sees every fault before a `Fatal` panic fires, so the
//!   report is never lost to the unwind.

mod leak;

pub use leak::{LeakRegistry, LeakTicket};

use std::sync::Arc;

use crate::config::{ReportPolicy, RuntimeConfig};
use crate::error::Fault;
use crate::origin::Origin;

/// Receives fault reports.
///
/// Implement to route diagnostics into your own logging or metrics
/// pipeline; the default [`LogSink`] uses the `log` facade.
pub trait ReportSink: Send + Sync + 'static {
    /// Handles a single fault report.
    ///
    /// # Parameters
    /// - `origin`: creation site of the object the fault concerns
    /// - `fault`: what went wrong
    fn report(&self, origin: &Origin, fault: &Fault);

    /// Human-readable sink name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Default sink: routes faults through the `log` facade.
///
/// Leak-class faults log at `warn`, orphan joins and stale epochs at
/// `error`; the latter indicate completions acting on memory the program
/// already considers gone.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&self, origin: &Origin, fault: &Fault) {
        match fault {
            Fault::StaleLeak { .. } | Fault::DeallocLeak { .. } => {
                log::warn!(target: "rejoin", "{origin}: {fault}");
            }
            Fault::OrphanJoin | Fault::StaleEpoch { .. } => {
                log::error!(target: "rejoin", "{origin}: {fault}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Policy-aware fault reporting endpoint.
///
/// One instance per [`Runtime`](crate::Runtime), shared by every object
/// the runtime creates. Injected, never global.
pub struct Diagnostics {
    policy: ReportPolicy,
    leak_check: bool,
    sink: Arc<dyn ReportSink>,
}

impl Diagnostics {
    /// Creates diagnostics with the default [`LogSink`].
    pub fn new(config: &RuntimeConfig) -> Self {
        Self::with_sink(config, Arc::new(LogSink))
    }

    /// Creates diagnostics with a custom sink.
    pub fn with_sink(config: &RuntimeConfig, sink: Arc<dyn ReportSink>) -> Self {
        Self {
            policy: config.report,
            leak_check: config.leak_check,
            sink,
        }
    }

    /// Reports a fault according to policy.
    ///
    /// `Silent` drops the report, `Log` forwards it to the sink, `Fatal`
    /// forwards it and then panics with the same text.
    pub fn report(&self, origin: Origin, fault: Fault) {
        match self.policy {
            ReportPolicy::Silent => {}
            ReportPolicy::Log => self.sink.report(&origin, &fault),
            ReportPolicy::Fatal => {
                self.sink.report(&origin, &fault);
                panic!("{origin}: {fault}");
            }
        }
    }

    /// Returns whether leak checking is enabled.
    #[inline]
    pub fn leak_check(&self) -> bool {
        self.leak_check
    }

    /// Returns the active policy.
    #[inline]
    pub fn policy(&self) -> ReportPolicy {
        self.policy
    }
}

#[cfg(test)]
pub(crate) mod capture {
    //! Test sink that records every report.

    use std::sync::Mutex;

    use super::*;
    use crate::sync::lock;

    #[derive(Default)]
    pub(crate) struct CaptureSink {
        reports: Mutex<Vec<(Origin, Fault)>>,
    }

    impl CaptureSink {
        pub(crate) fn recorded(&self) -> Vec<(Origin, Fault)> {
            lock(&self.reports).clone()
        }

        pub(crate) fn labels(&self) -> Vec<&'static str> {
            lock(&self.reports)
                .iter()
                .map(|(_, fault)| fault.as_label())
                .collect()
        }

        pub(crate) fn len(&self) -> usize {
            lock(&self.reports).len()
        }
    }

    impl ReportSink for CaptureSink {
        fn report(&self, origin: &Origin, fault: &Fault) {
            lock(&self.reports).push((*origin, fault.clone()));
        }

        fn name(&self) -> &'static str {
            "capture"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::capture::CaptureSink;
    use super::*;

    fn diag(policy: ReportPolicy) -> (Diagnostics, Arc<CaptureSink>) {
        let sink = Arc::new(CaptureSink::default());
        let config = RuntimeConfig {
            report: policy,
            leak_check: false,
        };
        (Diagnostics::with_sink(&config, sink.clone()), sink)
    }

    #[test]
    fn test_log_policy_forwards_to_sink() {
        let (diag, sink) = diag(ReportPolicy::Log);
        diag.report(Origin::here("t"), Fault::OrphanJoin);

        assert_eq!(sink.labels(), vec!["orphan_join"]);
    }

    #[test]
    fn test_silent_policy_drops() {
        let (diag, sink) = diag(ReportPolicy::Silent);
        diag.report(Origin::here("t"), Fault::OrphanJoin);

        assert_eq!(sink.len(), 0);
    }

    #[test]
    #[should_panic(expected = "join arrived after its group was destroyed")]
    fn test_fatal_policy_panics_after_reporting() {
        let (diag, _sink) = diag(ReportPolicy::Fatal);
        diag.report(Origin::new("t", "x.rs", 1), Fault::OrphanJoin);
    }
}
