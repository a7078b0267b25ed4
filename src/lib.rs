//! # dbprobe
//!
//! A liveness probe for service runtimes. It answers one question: does every
//! database adapter of the kind you care about still hold a live connection?
//!
//! ## The contract
//!
//! The runtime owns the services. The driver owns the connection. The
//! health-check layer owns HTTP. dbprobe owns none of them. It reads:
//!
//! - the runtime's current service list ([`Runtime::services`])
//! - each matching adapter's session status ([`Adapter::session`],
//!   [`Session::is_connected`])
//!
//! and reports healthy or unhealthy. No connections are opened, retried or
//! closed here.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dbprobe::{ProbeServer, ServiceRegistry, create_liveness_checker};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Arc::new(ServiceRegistry::new());
//!     // registry.register(ServiceDescriptor::new("posts").with_adapter(mongo));
//!
//!     let checker = create_liveness_checker(registry);
//!     ProbeServer::new(checker).addr("0.0.0.0:3001").listen().await.unwrap();
//! }
//! ```
//!
//! Already running an HTTP stack? Call [`LivenessChecker::check`] from your
//! own `/live` handler, or [`health::outcome`] to get the status mapping.

mod adapter;
mod checker;
mod config;
mod error;
mod response;
mod runtime;
mod server;

pub mod health;

pub use adapter::{Adapter, AdapterError, AdapterKind, AdapterMatch, Session};
pub use checker::{LivenessChecker, create_liveness_checker};
pub use config::{Config, LivenessConfig, ServerConfig};
pub use error::{Error, InspectError, LivenessError};
pub use response::Response;
pub use runtime::{Runtime, ServiceDescriptor, ServiceRegistry};
pub use server::ProbeServer;
