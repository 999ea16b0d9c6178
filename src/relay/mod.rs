//! Webhook relay: an HTTP API to manage webhook subscriptions, and a
//! listener forwarding token factory events to the subscribers.

use crate::prometheus_handler::{PrometheusError, Registry};
use config::RelayConfig;
use hyper::{
    body::Incoming,
    header::{HeaderValue, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
    Request,
};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::{conn::auto, graceful::GracefulShutdown},
    service::TowerToHyperService,
};
use metrics::RelayMetrics;
use rate_limit::ClientRateLimiter;
use std::{
    fmt,
    io::ErrorKind,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use thiserror::Error;
use tokio::{net::TcpListener, sync::watch};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use webhooks::SubscriptionStore;

pub mod config;
pub mod listener;
pub mod metrics;
pub mod rate_limit;
pub mod routes;
pub mod webhooks;

/// Time given to open connections to finish once shutdown is requested.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

const RATE_LIMIT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum RelayError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Http(#[from] hyper::http::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Prometheus(#[from] PrometheusError),
    #[error("relay port {0} already in use")]
    PortInUse(SocketAddr),
}

/// State shared by every connection.
pub struct RelayState {
    pub store: Arc<SubscriptionStore>,
    pub rate_limiter: ClientRateLimiter,
    pub metrics: RelayMetrics,
    pub registry: Registry,
    started_at: Instant,
}

impl fmt::Debug for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayState")
            .field("store", &self.store)
            .field("rate_limiter", &self.rate_limiter)
            .field("registry", &"...")
            .finish_non_exhaustive()
    }
}

impl RelayState {
    /// Creates empty state with a fresh metrics registry.
    pub fn new(config: &RelayConfig) -> Result<Self, PrometheusError> {
        let registry = Registry::new();
        let metrics = RelayMetrics::new(&registry)?;
        Ok(Self {
            store: Arc::new(SubscriptionStore::new()),
            rate_limiter: ClientRateLimiter::new(config.rate_limit_max, config.rate_limit_window),
            metrics,
            registry,
            started_at: Instant::now(),
        })
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Binds the relay socket.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, RelayError> {
    TcpListener::bind(addr).await.map_err(|err| match err.kind() {
        ErrorKind::AddrInUse => RelayError::PortInUse(addr),
        _ => RelayError::Io(err),
    })
}

/// Serves the relay API on `listener` until `shutdown` flips to true.
///
/// Open connections then get [`DRAIN_TIMEOUT`] to complete before they are
/// dropped.
pub async fn run_server(
    listener: TcpListener,
    state: Arc<RelayState>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), RelayError> {
    tracing::info!("relay listening on http://{}", listener.local_addr()?);

    let builder = auto::Builder::new(TokioExecutor::new());
    let graceful = GracefulShutdown::new();
    let mut prune = tokio::time::interval(RATE_LIMIT_PRUNE_INTERVAL);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, remote) = match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        tracing::warn!("failed to accept connection: {err}");
                        continue;
                    }
                };

                let state = Arc::clone(&state);
                let client = remote.ip();
                let service = ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(SetResponseHeaderLayer::overriding(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")))
                    .layer(SetResponseHeaderLayer::overriding(X_FRAME_OPTIONS, HeaderValue::from_static("DENY")))
                    .layer(CorsLayer::new().allow_methods(Any).allow_origin(Any).allow_headers(Any))
                    .service_fn(move |request: Request<Incoming>| routes::handle(Arc::clone(&state), client, request));

                let connection = builder.serve_connection_with_upgrades(TokioIo::new(stream), TowerToHyperService::new(service));
                let connection = graceful.watch(connection.into_owned());
                tokio::spawn(async move {
                    if let Err(err) = connection.await {
                        tracing::debug!(%client, "connection closed with error: {err}");
                    }
                });
            }
            _ = prune.tick() => state.rate_limiter.prune(),
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    drop(listener);
    tracing::info!("relay shutting down");
    tokio::select! {
        () = graceful.shutdown() => tracing::info!("relay connections drained"),
        () = tokio::time::sleep(DRAIN_TIMEOUT) => tracing::warn!("forced relay shutdown after {DRAIN_TIMEOUT:?}"),
    }

    Ok(())
}
