//! Network module with deferred startup lifecycle.
//!
//! `new()` creates shared state, `start()` binds the TCP listener, and
//! `serve()` accepts connections until the shutdown future resolves. The
//! split lets callers learn the bound port (or seed the store) before
//! traffic arrives.

use std::future::{Future, IntoFuture};
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};

use super::config::NetworkConfig;
use super::handlers::{
    create_concert, delete_concert, health_handler, list_concerts, liveness_handler,
    openapi_handler, readiness_handler, show_concert, update_concert, AppState,
};
use super::middleware::{build_http_layers, track_in_flight};
use super::shutdown::ShutdownController;
use crate::storage::ConcertStore;

/// One mounted endpoint, for startup logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mount {
    pub operation: &'static str,
    pub verb: &'static str,
    pub pattern: &'static str,
}

/// Every concert endpoint served by [`routes`].
pub const CONCERT_MOUNTS: [Mount; 5] = [
    Mount { operation: "list", verb: "GET", pattern: "/concerts" },
    Mount { operation: "create", verb: "POST", pattern: "/concerts" },
    Mount { operation: "show", verb: "GET", pattern: "/concerts/{concert_id}" },
    Mount { operation: "update", verb: "PUT", pattern: "/concerts/{concert_id}" },
    Mount { operation: "delete", verb: "DELETE", pattern: "/concerts/{concert_id}" },
];

/// Assembles every route with in-flight tracking but without the HTTP
/// middleware stack.
///
/// Routes:
/// - `GET|POST /concerts`
/// - `GET|PUT|DELETE /concerts/{concert_id}`
/// - `GET /health`, `/health/live`, `/health/ready`
/// - `GET /openapi.json`
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/concerts", get(list_concerts).post(create_concert))
        .route(
            "/concerts/{concert_id}",
            get(show_concert).put(update_concert).delete(delete_concert),
        )
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/openapi.json", get(openapi_handler))
        .route_layer(from_fn_with_state(
            Arc::clone(&state.shutdown),
            track_in_flight,
        ))
        .with_state(state)
}

/// Manages the HTTP server lifecycle.
///
/// 1. `new()` -- allocates the store, codec registry and shutdown controller
/// 2. `start()` -- binds the TCP listener to the configured address
/// 3. `serve()` -- accepts connections until shutdown is signalled
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    state: AppState,
}

impl NetworkModule {
    /// Creates a module with an empty store, without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            listener: None,
            state: AppState::new(),
        }
    }

    /// Returns a shared handle to the concert store.
    #[must_use]
    pub fn store(&self) -> Arc<ConcertStore> {
        Arc::clone(&self.state.store)
    }

    /// Returns a shared reference to the shutdown controller.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.state.shutdown)
    }

    /// Full router: routes, body size limit and the HTTP middleware stack.
    pub fn build_router(&self) -> Router {
        routes(self.state.clone())
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
            .layer(build_http_layers(&self.config))
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which differs from the configured one
    /// when port 0 asks the OS for an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until `shutdown` resolves, then drains.
    ///
    /// After the shutdown signal the health state moves to `Draining`, the
    /// server stops accepting connections, and in-flight requests get up to
    /// `drain_timeout` to finish before the state moves to `Stopped`. When
    /// the timeout expires first, `serve` returns with the state left at
    /// `Draining` and the remaining connections are abandoned.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first or if the server
    /// hits a fatal I/O error.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .take()
            .ok_or_else(|| anyhow::anyhow!("start() must be called before serve()"))?;
        let router = self.build_router();
        let controller = Arc::clone(&self.state.shutdown);
        let drain_timeout = self.config.drain_timeout;

        for mount in &CONCERT_MOUNTS {
            info!(
                "{:?} mounted on {} {}",
                mount.operation, mount.verb, mount.pattern
            );
        }

        controller.set_ready();
        info!("Serving HTTP connections");

        let (draining_tx, draining_rx) = oneshot::channel::<()>();
        let signal_controller = Arc::clone(&controller);
        let server = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                signal_controller.trigger_shutdown();
                info!("Shutdown signal received, draining in-flight requests");
                let _ = draining_tx.send(());
            })
            .into_future();

        // Axum waits for open connections without a limit; the drain
        // deadline starts once the shutdown signal has fired.
        let drain_deadline = async move {
            if draining_rx.await.is_ok() {
                tokio::time::sleep(drain_timeout).await;
            } else {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            result = server => result?,
            () = drain_deadline => {
                warn!(
                    in_flight = controller.in_flight_count(),
                    "Drain timeout expired with in-flight requests remaining"
                );
                return Ok(());
            }
        }

        if controller.wait_for_drain(drain_timeout).await {
            info!("All in-flight requests drained");
        } else {
            warn!("Drain timeout expired with in-flight requests remaining");
        }
        Ok(())
    }
}
