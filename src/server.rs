//! Standalone liveness endpoint and graceful shutdown.
//!
//! For hosts that do not already run an HTTP server, [`ProbeServer`] answers
//! `GET /live` (path configurable) with the checker's verdict. Every other
//! path is `404`, other methods on the probe path are `405`.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` before sending SIGKILL. The server stops
//! accepting on the first signal, lets in-flight probes finish, then returns.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::Full;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::checker::LivenessChecker;
use crate::config::{DEFAULT_ADDR, DEFAULT_LIVE_PATH, ServerConfig};
use crate::error::Error;
use crate::health;
use crate::response::Response;
use crate::runtime::Runtime;

/// HTTP endpoint serving one liveness checker.
pub struct ProbeServer<R: ?Sized> {
    checker: LivenessChecker<R>,
    addr: String,
    live_path: String,
}

impl<R: Runtime + ?Sized + 'static> ProbeServer<R> {
    pub fn new(checker: LivenessChecker<R>) -> Self {
        Self {
            checker,
            addr: DEFAULT_ADDR.to_owned(),
            live_path: DEFAULT_LIVE_PATH.to_owned(),
        }
    }

    /// Takes both the bind address and the probe path from `config`.
    pub fn from_config(checker: LivenessChecker<R>, config: &ServerConfig) -> Self {
        Self::new(checker).addr(&config.addr).live_path(&config.live_path)
    }

    /// Overrides the bind address (default `0.0.0.0:3001`).
    pub fn addr(mut self, addr: &str) -> Self {
        self.addr = addr.to_owned();
        self
    }

    /// Overrides the probe path (default `/live`).
    pub fn live_path(mut self, path: &str) -> Self {
        self.live_path = path.to_owned();
        self
    }

    /// Binds the configured address.
    pub async fn bind(&self) -> Result<TcpListener, Error> {
        let addr: SocketAddr = self.addr.parse()?;
        Ok(TcpListener::bind(addr).await?)
    }

    /// Binds the configured address and serves until SIGTERM or Ctrl-C.
    pub async fn listen(self) -> Result<(), Error> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serves on an already-bound listener until `shutdown` resolves.
    ///
    /// Returns only after every in-flight connection has finished.
    pub async fn serve<S>(self, listener: TcpListener, shutdown: S) -> Result<(), Error>
    where
        S: Future<Output = ()>,
    {
        let local_addr = listener.local_addr()?;
        let probe = Arc::new(self);

        info!(addr = %local_addr, path = %probe.live_path, "probe listening");

        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting at once,
                // even with connections still queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let probe = Arc::clone(&probe);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let probe = Arc::clone(&probe);
                            async move { dispatch(&probe, req) }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the set does not grow
                // without bound on a long-lived probe.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Drain: wait for every in-flight connection before returning.
        while tasks.join_next().await.is_some() {}

        info!("probe stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

fn dispatch<R, B>(
    probe: &ProbeServer<R>,
    req: hyper::Request<B>,
) -> Result<http::Response<Full<Bytes>>, Infallible>
where
    R: Runtime + ?Sized,
{
    let response = if req.uri().path() != probe.live_path {
        Response::status(StatusCode::NOT_FOUND)
    } else if req.method() != Method::GET && req.method() != Method::HEAD {
        Response::status(StatusCode::METHOD_NOT_ALLOWED)
    } else {
        health::liveness(&probe.checker)
    };

    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on SIGTERM or SIGINT (Ctrl-C). On Windows only Ctrl-C.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
