//! # Runtime configuration.
//!
//! Provides [`RuntimeConfig`], the explicit settings bundle injected at
//! [`Runtime`](crate::Runtime) construction. There is no process-wide
//! mutable policy state: every component reads the configuration it was
//! built with.
//!
//! Recognized diagnostic behaviors:
//! - [`ReportPolicy::Silent`]: faults are dropped.
//! - [`ReportPolicy::Log`]: faults go to the report sink (default).
//! - [`ReportPolicy::Fatal`]: faults go to the sink, then panic.
//!
//! Leak checking is a separate switch: when enabled, scope exits also
//! schedule a deferred sweep of the owning scope's leak registry.

/// How reported faults are handled.
///
/// Applies to every [`Fault`](crate::Fault) delivered through
/// [`Diagnostics`](crate::Diagnostics). Internal invariant violations panic
/// regardless of this policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportPolicy {
    /// Drop faults without reporting them.
    Silent,
    /// Deliver faults to the report sink and continue.
    #[default]
    Log,
    /// Deliver faults to the report sink, then panic.
    Fatal,
}

/// Global configuration for a coordination runtime.
///
/// ## Field semantics
/// - `report`: what happens when a fault is reported (see [`ReportPolicy`])
/// - `leak_check`: whether scope exits schedule a deferred leak-registry
///   sweep for unresolved joiners and suspension callbacks
#[derive(Clone, Copy, Debug)]
pub struct RuntimeConfig {
    /// Fault handling policy.
    pub report: ReportPolicy,

    /// Enables deferred leak-registry sweeps on scope exit.
    ///
    /// Leak checking adds one deferred job per exiting scope; it is cheap
    /// but noisy in code that intentionally abandons callbacks, so it is
    /// off by default.
    pub leak_check: bool,
}

impl RuntimeConfig {
    /// Returns true when faults escalate to a panic.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.report == ReportPolicy::Fatal
    }

    /// Returns true when faults are dropped without reporting.
    #[inline]
    pub fn is_silent(&self) -> bool {
        self.report == ReportPolicy::Silent
    }
}

impl Default for RuntimeConfig {
    /// Default configuration:
    ///
    /// - `report = ReportPolicy::Log` (report and continue)
    /// - `leak_check = false`
    fn default() -> Self {
        Self {
            report: ReportPolicy::Log,
            leak_check: false,
        }
    }
}
