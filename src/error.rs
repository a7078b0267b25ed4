//! Error types.
//!
//! An unhealthy probe is not an [`Error`]: it is a [`LivenessError`] value
//! handed back to the caller. [`Error`] surfaces infrastructure failures:
//! binding the probe endpoint, accepting a connection, loading config.

use crate::adapter::AdapterError;

/// Why one adapter failed inspection.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum InspectError {
    #[error("database adapter not connected")]
    Disconnected,
    #[error("database adapter unreachable: {0}")]
    Session(#[from] AdapterError),
    #[error("database adapter inspection panicked: {0}")]
    Panicked(String),
}

/// An unhealthy probe outcome.
///
/// Carries the first failing service and how many matching services failed
/// in total.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("service `{service}`: {cause}{}", others(.failing))]
pub struct LivenessError {
    pub service: String,
    pub cause: InspectError,
    pub failing: usize,
}

fn others(failing: &usize) -> String {
    match *failing {
        0 | 1 => String::new(),
        2 => " (and 1 other adapter)".to_owned(),
        n => format!(" (and {} other adapters)", n - 1),
    }
}

/// The error type returned by dbprobe's fallible operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid socket address: {0}")]
    Addr(#[from] std::net::AddrParseError),
    #[error("config: {0}")]
    Config(#[from] serde_yaml::Error),
}
