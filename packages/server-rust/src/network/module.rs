//! Network module with deferred startup.
//!
//! `new()` allocates shared state, `start()` binds the listener and
//! `serve()` accepts requests until the shutdown future resolves. The store
//! and shutdown controller can be handed to other code (seeding, signal
//! handling) between the steps.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::{NetworkConfig, TlsConfig};
use super::handlers::{api_routes, health_routes, AppState};
use super::middleware::{build_http_layers, track_in_flight};
use super::shutdown::ShutdownController;
use crate::service::ServiceConfig;
use crate::storage::MemoryStore;

/// Owns the HTTP server lifecycle.
pub struct NetworkModule {
    config: NetworkConfig,
    services: ServiceConfig,
    listener: Option<TcpListener>,
    store: Arc<MemoryStore>,
    shutdown: Arc<ShutdownController>,
}

impl NetworkModule {
    /// Creates the module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, services: ServiceConfig, store: Arc<MemoryStore>) -> Self {
        Self {
            config,
            services,
            listener: None,
            store,
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    #[must_use]
    pub fn store(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Assembles the router: API routes behind the in-flight tracker, health
    /// probes outside it, and the transport middleware around both.
    pub fn build_router(&self) -> Router {
        let state = AppState {
            store: Arc::clone(&self.store),
            services: Arc::new(self.services.clone()),
            shutdown: Arc::clone(&self.shutdown),
            config: Arc::new(self.config.clone()),
            start_time: Instant::now(),
        };

        let api = api_routes().layer(axum::middleware::from_fn_with_state(
            Arc::clone(&self.shutdown),
            track_in_flight,
        ));

        Router::new()
            .merge(api)
            .merge(health_routes())
            .layer(build_http_layers(&self.config))
            .with_state(state)
    }

    /// Binds the listener and returns the bound port, which differs from the
    /// configured one when that is 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("binding {addr}"))?;
        let port = listener.local_addr()?.port();

        info!(host = %self.config.host, port, "listener bound");

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests for
    /// up to `drain_timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first, if TLS material
    /// cannot be loaded, or on a fatal I/O error.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .take()
            .context("start() must be called before serve()")?;
        let router = self.build_router();
        let controller = Arc::clone(&self.shutdown);

        controller.set_ready();

        match &self.config.tls {
            Some(tls) => serve_tls(listener, router, tls, shutdown).await?,
            None => serve_plain(listener, router, shutdown).await?,
        }

        drain(&controller, &self.config).await;
        Ok(())
    }
}

async fn serve_plain(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!("serving plain HTTP");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Serves TLS through `axum-server`, reusing the pre-bound listener.
async fn serve_tls(
    listener: TcpListener,
    router: Router,
    tls: &TlsConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
        .await
        .context("loading TLS certificates")?;

    let addr = listener.local_addr()?;
    let std_listener = listener.into_std()?;
    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();

    tokio::spawn(async move {
        shutdown.await;
        shutdown_handle.graceful_shutdown(None);
    });

    info!(%addr, "serving TLS");

    axum_server::from_tcp_rustls(std_listener, rustls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;
    Ok(())
}

async fn drain(controller: &ShutdownController, config: &NetworkConfig) {
    controller.trigger_shutdown();
    if controller.wait_for_drain(config.drain_timeout).await {
        info!("all requests drained");
    } else {
        warn!(
            in_flight = controller.in_flight_count(),
            "drain timeout expired with requests in flight"
        );
    }
}
