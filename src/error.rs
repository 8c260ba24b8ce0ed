//! # Fault kinds reported through the diagnostic sink.
//!
//! This module defines [`Fault`], the classification of every diagnostic the
//! runtime can report:
//!
//! - [`Fault::StaleLeak`]: a join group (or the closure owning it) left
//!   scope while signals were still outstanding.
//! - [`Fault::OrphanJoin`]: a joiner resolved after its group was already
//!   destroyed.
//! - [`Fault::DeallocLeak`]: a registry-tracked object was still unresolved
//!   when its owning scope's leak check ran.
//! - [`Fault::StaleEpoch`]: a completion arrived tagged with a suspension
//!   epoch that is no longer current; it was dropped without resuming.
//!
//! Faults are *reported, never returned*: they surface from deferred
//! callbacks where no caller exists to receive a `Result`. How a report is
//! handled (ignored, logged, or fatal) is decided by
//! [`ReportPolicy`](crate::ReportPolicy).
//!
//! Distinct from faults are internal invariant violations (double resume,
//! negative outstanding count, duplicate waiter registration): those are
//! logic defects and panic unconditionally, regardless of policy.

use thiserror::Error;

/// # Diagnostics raised by the coordination runtime.
///
/// Each variant carries the data needed for a useful report; the origin of
/// the offending object is supplied separately by the reporting site.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// A scope exited while its join group still expected signals.
    #[error("scope exited while still expecting {remaining} signal(s)")]
    StaleLeak {
        /// Signals that never arrived (outstanding + pending-unconsumed).
        remaining: usize,
    },

    /// A join fired after its group had already been destroyed.
    #[error("join arrived after its group was destroyed")]
    OrphanJoin,

    /// A tracked object was never resolved before the leak check ran.
    #[error("unresolved {kind} at leak check")]
    DeallocLeak {
        /// Short description of the leaked object's kind.
        kind: &'static str,
    },

    /// A completion carried an epoch that is no longer the current one.
    #[error("completion for stale suspension point (expected epoch {expected}, got {got})")]
    StaleEpoch {
        /// The closure's current suspension epoch.
        expected: u64,
        /// The epoch the completion was issued under.
        got: u64,
    },
}

impl Fault {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use rejoin::Fault;
    ///
    /// let fault = Fault::StaleLeak { remaining: 2 };
    /// assert_eq!(fault.as_label(), "stale_leak");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Fault::StaleLeak { .. } => "stale_leak",
            Fault::OrphanJoin => "orphan_join",
            Fault::DeallocLeak { .. } => "dealloc_leak",
            Fault::StaleEpoch { .. } => "stale_epoch",
        }
    }

    /// Returns a human-readable message with details about the fault.
    pub fn as_message(&self) -> String {
        match self {
            Fault::StaleLeak { remaining } => {
                format!("scope exited expecting {remaining} more signal(s)")
            }
            Fault::OrphanJoin => "join after group destruction".to_string(),
            Fault::DeallocLeak { kind } => format!("leaked {kind}"),
            Fault::StaleEpoch { expected, got } => {
                format!("stale epoch {got} (current {expected})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(Fault::StaleLeak { remaining: 1 }.as_label(), "stale_leak");
        assert_eq!(Fault::OrphanJoin.as_label(), "orphan_join");
        assert_eq!(
            Fault::DeallocLeak { kind: "joiner" }.as_label(),
            "dealloc_leak"
        );
        assert_eq!(
            Fault::StaleEpoch {
                expected: 3,
                got: 2
            }
            .as_label(),
            "stale_epoch"
        );
    }

    #[test]
    fn test_display_names_the_counts() {
        let fault = Fault::StaleLeak { remaining: 4 };
        assert!(fault.to_string().contains("4 signal(s)"));

        let fault = Fault::StaleEpoch {
            expected: 7,
            got: 5,
        };
        let text = fault.to_string();
        assert!(text.contains('7') && text.contains('5'));
    }
}
