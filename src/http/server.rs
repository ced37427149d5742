//! HTTP server setup.
//!
//! # Responsibilities
//! - Wrap the rendered router in service layers (trace, timeout, body limit)
//! - Bind a listener and serve until the shutdown signal resolves

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Settings for the layers wrapped around every route.
#[derive(Debug, Clone, Default)]
pub struct ServiceSettings {
    /// Total time allowed per request.
    pub request_timeout: Option<Duration>,

    /// Largest accepted request body.
    pub max_body_bytes: Option<usize>,
}

/// Apply the service layers to `router`.
#[allow(deprecated)]
pub fn with_service_layers(router: Router, settings: &ServiceSettings) -> Router {
    let router = match settings.max_body_bytes {
        Some(limit) => router.layer(RequestBodyLimitLayer::new(limit)),
        None => router,
    };
    let router = match settings.request_timeout {
        Some(timeout) => router.layer(TimeoutLayer::new(timeout)),
        None => router,
    };
    router.layer(TraceLayer::new_for_http())
}

/// Bind a listener on all interfaces at `port`.
pub async fn bind(port: u16) -> Result<TcpListener, std::io::Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr).await
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn run<F>(router: Router, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
