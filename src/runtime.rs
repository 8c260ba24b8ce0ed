//! # Runtime: the injected configuration bundle.
//!
//! A [`Runtime`] ties together the three cross-cutting pieces every
//! coordination object needs ([`RuntimeConfig`], [`Diagnostics`], and
//! the [`Defer`] scheduler) and hands them to the closures, join groups,
//! and coordination groups it creates. Nothing here is global: two
//! runtimes with different policies coexist fine in one process.

use std::sync::Arc;

use crate::cancel::Canceller;
use crate::closures::Closure;
use crate::config::RuntimeConfig;
use crate::defer::{Defer, TokioDefer};
use crate::diag::{Diagnostics, ReportSink};
use crate::groups::{CoordGroup, JoinGroup};
use crate::origin::Origin;

struct Shared {
    config: RuntimeConfig,
    diag: Arc<Diagnostics>,
    defer: Arc<dyn Defer>,
}

/// Factory and shared context for coordination objects.
///
/// Cheap to clone; clones share configuration, diagnostics, and the
/// deferred-call scheduler.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use rejoin::{Origin, Runtime, RuntimeConfig, StepDefer};
///
/// let defer = Arc::new(StepDefer::new());
/// let rt = Runtime::new(RuntimeConfig::default(), defer.clone());
///
/// let group = rt.join_group::<u32>(Origin::here("demo"));
/// group.launch();
/// group.make_joiner(Origin::here("call")).join(1);
/// defer.run_until_idle();
/// assert_eq!(group.consume(), Some(1));
/// ```
#[derive(Clone)]
pub struct Runtime {
    shared: Arc<Shared>,
}

impl Runtime {
    /// Creates a runtime over the given deferred-call scheduler, with the
    /// default log-backed report sink.
    pub fn new(config: RuntimeConfig, defer: Arc<dyn Defer>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                diag: Arc::new(Diagnostics::new(&config)),
                defer,
            }),
        }
    }

    /// Creates a runtime with a custom report sink.
    pub fn with_sink(
        config: RuntimeConfig,
        defer: Arc<dyn Defer>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                diag: Arc::new(Diagnostics::with_sink(&config, sink)),
                defer,
            }),
        }
    }

    /// Creates a runtime scheduling on the ambient tokio runtime.
    pub fn tokio(config: RuntimeConfig) -> Self {
        Self::new(config, Arc::new(TokioDefer::new()))
    }

    /// Returns the configuration this runtime was built with.
    pub fn config(&self) -> RuntimeConfig {
        self.shared.config
    }

    /// Returns the shared diagnostics endpoint.
    pub fn diagnostics(&self) -> Arc<Diagnostics> {
        self.shared.diag.clone()
    }

    /// Returns the shared deferred-call scheduler.
    pub fn defer(&self) -> Arc<dyn Defer> {
        self.shared.defer.clone()
    }

    /// Creates a per-activation closure record.
    pub fn closure(&self, origin: Origin) -> Closure {
        Closure::new(origin, self.shared.diag.clone(), self.shared.defer.clone())
    }

    /// Creates a join group for records of type `T`.
    pub fn join_group<T: Send + 'static>(&self, origin: Origin) -> JoinGroup<T> {
        JoinGroup::new(origin, self.shared.diag.clone(), self.shared.defer.clone())
    }

    /// Creates a coordination group (signal-extraction facade).
    pub fn coord_group<T: Send + 'static>(&self, origin: Origin) -> CoordGroup<T> {
        CoordGroup::new(self.join_group(origin))
    }

    /// Creates an independent cancellation token.
    ///
    /// Cancellers carry no runtime state; this is a convenience for call
    /// sites already holding a runtime.
    pub fn canceller(&self) -> Canceller {
        Canceller::new()
    }
}
