//! Turning a liveness outcome into an HTTP answer.
//!
//! Kubernetes restarts a pod whose liveness probe fails. The mapping is the
//! one every health-check layer uses:
//!
//! | Outcome | Status | Body |
//! |---|---|---|
//! | healthy | `200 OK` | `ok` |
//! | unhealthy | `503 Service Unavailable` | the diagnostic |
//!
//! Hosts that own their own HTTP stack call [`outcome`] or [`liveness`] from
//! their handler. [`ProbeServer`](crate::ProbeServer) does it for hosts that
//! don't.

use http::StatusCode;

use crate::checker::LivenessChecker;
use crate::error::LivenessError;
use crate::response::Response;
use crate::runtime::Runtime;

/// Runs `checker` once and answers with the result.
pub fn liveness<R: Runtime + ?Sized>(checker: &LivenessChecker<R>) -> Response {
    outcome(checker.check())
}

pub fn outcome(result: Result<(), LivenessError>) -> Response {
    match result {
        Ok(()) => Response::text("ok"),
        Err(err) => Response::with_status(StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
    }
}
