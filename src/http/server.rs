//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing)
//! - Hold both listeners until the readiness gate opens
//! - Serve plain HTTP and TLS concurrently until shutdown

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::TimeoutConfig;
use crate::error::IngressError;
use crate::http::proxy::{proxy_handler, AppState, Forwarder};
use crate::http::request::MakeRequestUuid;
use crate::ingress::Ingress;
use crate::lifecycle::Shutdown;
use crate::net::{tls, Listeners};

/// The ingress data plane: both listeners sharing one routing state.
#[derive(Debug)]
pub struct IngressServer {
    ingress: Arc<Ingress>,
    forwarder: Forwarder,
    shutdown_grace: Duration,
}

impl IngressServer {
    pub fn new(ingress: Arc<Ingress>, timeouts: &TimeoutConfig) -> Self {
        Self {
            ingress,
            forwarder: Forwarder::new(timeouts),
            shutdown_grace: timeouts.shutdown_grace(),
        }
    }

    /// Build the Axum router for one listener.
    pub fn build_router(&self, scheme: &'static str) -> Router {
        let state = AppState {
            ingress: self.ingress.clone(),
            forwarder: self.forwarder.clone(),
            scheme,
        };

        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Wait for the first snapshot, then serve until `shutdown`.
    ///
    /// Returns `Ok(())` if shutdown arrives before the gate opens. A failing
    /// listener is fatal and stops the other one too.
    pub async fn serve(self, listeners: Listeners, shutdown: Shutdown) -> Result<(), IngressError> {
        tracing::info!(
            plain = %listeners.plain_addr(),
            tls = %listeners.tls_addr(),
            "Waiting for the first routing snapshot"
        );
        match self.ingress.readiness().wait(shutdown.wait()).await {
            Ok(()) => {}
            Err(IngressError::Cancelled) => {
                tracing::info!("Shutdown before first snapshot");
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let plain_addr = listeners.plain_addr();
        let tls_addr = listeners.tls_addr();
        let (plain, tls) = listeners.into_inner();

        let result = tokio::try_join!(
            self.serve_plain(plain, plain_addr, shutdown.clone()),
            self.serve_tls(tls, tls_addr, shutdown.clone()),
        );
        if result.is_err() {
            shutdown.trigger();
        }
        result.map(|_| ())
    }

    async fn serve_plain(
        &self,
        listener: TcpListener,
        addr: SocketAddr,
        shutdown: Shutdown,
    ) -> Result<(), IngressError> {
        tracing::info!(address = %addr, "HTTP listener serving");
        let app = self
            .build_router("http")
            .into_make_service_with_connect_info::<SocketAddr>();

        let graceful_signal = shutdown.clone();
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(async move { graceful_signal.wait().await })
            .into_future();

        let grace = self.shutdown_grace;
        let deadline = async move {
            shutdown.wait().await;
            tokio::time::sleep(grace).await;
        };

        let result = tokio::select! {
            result = server => result,
            _ = deadline => {
                tracing::warn!(address = %addr, "Grace period elapsed, dropping HTTP connections");
                Ok(())
            }
        };
        result.map_err(|source| IngressError::Serve { addr, source })?;

        tracing::info!(address = %addr, "HTTP listener stopped");
        Ok(())
    }

    async fn serve_tls(
        &self,
        listener: std::net::TcpListener,
        addr: SocketAddr,
        shutdown: Shutdown,
    ) -> Result<(), IngressError> {
        let config = tls::rustls_config(self.ingress.clone())?;
        let app = self
            .build_router("https")
            .into_make_service_with_connect_info::<SocketAddr>();

        let handle = Handle::new();
        let grace = self.shutdown_grace;
        let stopper = {
            let handle = handle.clone();
            tokio::spawn(async move {
                shutdown.wait().await;
                handle.graceful_shutdown(Some(grace));
            })
        };

        tracing::info!(address = %addr, "HTTPS listener serving");
        let result = axum_server::from_tcp_rustls(listener, config)
            .handle(handle)
            .serve(app)
            .await;
        stopper.abort();

        result.map_err(|source| IngressError::Serve { addr, source })?;
        tracing::info!(address = %addr, "HTTPS listener stopped");
        Ok(())
    }
}
