//! The liveness evaluator.
//!
//! On every call the checker takes a fresh snapshot of the runtime's
//! services, keeps those whose adapter matches the configured target, and
//! asks each matching adapter whether its session is connected. The probe
//! passes only if every matching adapter is connected. No matching adapter
//! at all is a pass: an absent dependency cannot be down.
//!
//! ```rust
//! use std::sync::Arc;
//! use dbprobe::{ServiceDescriptor, ServiceRegistry, create_liveness_checker};
//!
//! let registry = Arc::new(ServiceRegistry::new());
//! registry.register(ServiceDescriptor::new("greeter"));
//!
//! let checker = create_liveness_checker(registry);
//! assert!(checker.check().is_ok());
//!
//! checker.check_with(|err| assert!(err.is_none()));
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapter::{Adapter, AdapterMatch};
use crate::config::LivenessConfig;
use crate::error::{InspectError, LivenessError};
use crate::runtime::Runtime;

/// Builds a checker over `runtime` that inspects Mongo adapters.
///
/// Pass the result to whatever polls `/live`. Construction does no I/O.
pub fn create_liveness_checker<R: Runtime + ?Sized>(runtime: Arc<R>) -> LivenessChecker<R> {
    LivenessChecker::new(runtime, LivenessConfig::default())
}

/// Stateless liveness check bound to one runtime.
///
/// Cloning is cheap and shares the runtime handle.
pub struct LivenessChecker<R: ?Sized> {
    runtime: Arc<R>,
    target: AdapterMatch,
    logger: Arc<str>,
}

impl<R: ?Sized> Clone for LivenessChecker<R> {
    fn clone(&self) -> Self {
        Self {
            runtime: Arc::clone(&self.runtime),
            target: self.target.clone(),
            logger: Arc::clone(&self.logger),
        }
    }
}

impl<R: Runtime + ?Sized> LivenessChecker<R> {
    pub fn new(runtime: Arc<R>, config: LivenessConfig) -> Self {
        Self {
            runtime,
            target: config.target(),
            logger: config.logger.into(),
        }
    }

    pub fn target(&self) -> &AdapterMatch { &self.target }

    /// Runs one evaluation.
    ///
    /// Every matching adapter is inspected, and each failure is logged at
    /// `warn`. The error names the first failing service.
    pub fn check(&self) -> Result<(), LivenessError> {
        let services = self.runtime.services();
        let mut inspected = 0usize;
        let mut first: Option<(String, InspectError)> = None;
        let mut failing = 0usize;

        for service in &services {
            let Some(adapter) = service.adapter() else {
                continue;
            };
            let failure = match inspect(&self.target, adapter) {
                Verdict::Skipped => continue,
                Verdict::Connected => None,
                Verdict::Failed(cause) => Some(cause),
            };
            inspected += 1;
            let Some(cause) = failure else {
                continue;
            };

            warn!(
                logger = %self.logger,
                service = service.name(),
                matcher = %self.target,
                error = %cause,
                "liveness check failed"
            );
            failing += 1;
            if first.is_none() {
                first = Some((service.name().to_owned(), cause));
            }
        }

        match first {
            Some((service, cause)) => Err(LivenessError { service, cause, failing }),
            None => {
                debug!(logger = %self.logger, matcher = %self.target, inspected, "liveness check passed");
                Ok(())
            }
        }
    }

    /// Callback form of [`check`](Self::check).
    ///
    /// `complete` receives `None` when healthy and the failure otherwise. It
    /// runs exactly once, before this method returns.
    pub fn check_with<F>(&self, complete: F)
    where
        F: FnOnce(Option<LivenessError>),
    {
        complete(self.check().err())
    }
}

enum Verdict {
    Skipped,
    Connected,
    Failed(InspectError),
}

/// Matches one adapter against `target` and, if it matches, reads its
/// connectivity.
///
/// Everything the adapter is asked (kind, service name, session, status)
/// runs under `catch_unwind`, so a panicking driver is reported as a
/// failure. The process panic hook still sees the panic; hosts that want
/// driver panics only in their `tracing` output install their own hook.
fn inspect(target: &AdapterMatch, adapter: &dyn Adapter) -> Verdict {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        if !target.matches(adapter) {
            return Ok(None);
        }
        adapter.session().map(|session| Some(session.is_connected()))
    }));

    match outcome {
        Ok(Ok(None)) => Verdict::Skipped,
        Ok(Ok(Some(true))) => Verdict::Connected,
        Ok(Ok(Some(false))) => Verdict::Failed(InspectError::Disconnected),
        Ok(Err(e)) => Verdict::Failed(e.into()),
        Err(payload) => Verdict::Failed(InspectError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
