//! Listener binding.
//!
//! # Responsibilities
//! - Bind the plain HTTP and TLS sockets up front
//! - Turn bind failures into the fatal `ListenerBind` error
//!
//! # Design Decisions
//! - Binding happens before the readiness wait, so port conflicts surface
//!   at startup rather than after the first snapshot
//! - Nothing is accepted here; the HTTP layer starts accepting once ready

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::{ConfigError, ListenerConfig, ValidationError};
use crate::error::IngressError;

/// The two bound, not-yet-accepting sockets.
#[derive(Debug)]
pub struct Listeners {
    plain: TcpListener,
    tls: std::net::TcpListener,
    plain_addr: SocketAddr,
    tls_addr: SocketAddr,
}

impl Listeners {
    /// Bind both listeners from configuration.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, IngressError> {
        let invalid_host = || {
            IngressError::Config(ConfigError::Validation(vec![ValidationError::InvalidHost(
                config.host.clone(),
            )]))
        };
        let plain_addr = config.plain_addr().ok_or_else(invalid_host)?;
        let tls_addr = config.tls_addr().ok_or_else(invalid_host)?;

        let plain = bind_plain(plain_addr).await?;
        let tls = bind_tls(tls_addr)?;
        let plain_addr = plain
            .local_addr()
            .map_err(|source| IngressError::ListenerBind { addr: plain_addr, source })?;
        let tls_addr = tls
            .local_addr()
            .map_err(|source| IngressError::ListenerBind { addr: tls_addr, source })?;

        Ok(Self {
            plain,
            tls,
            plain_addr,
            tls_addr,
        })
    }

    /// Actual plain HTTP address, with any ephemeral port resolved.
    pub fn plain_addr(&self) -> SocketAddr {
        self.plain_addr
    }

    /// Actual TLS address, with any ephemeral port resolved.
    pub fn tls_addr(&self) -> SocketAddr {
        self.tls_addr
    }

    pub fn into_inner(self) -> (TcpListener, std::net::TcpListener) {
        (self.plain, self.tls)
    }
}

/// Bind the plain HTTP listener.
pub async fn bind_plain(addr: SocketAddr) -> Result<TcpListener, IngressError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| IngressError::ListenerBind { addr, source })?;

    if let Ok(local) = listener.local_addr() {
        tracing::info!(address = %local, "Plain HTTP listener bound");
    }
    Ok(listener)
}

/// Bind the TLS listener. axum-server takes a std socket, set non-blocking.
pub fn bind_tls(addr: SocketAddr) -> Result<std::net::TcpListener, IngressError> {
    let bind_err = |source| IngressError::ListenerBind { addr, source };
    let listener = std::net::TcpListener::bind(addr).map_err(bind_err)?;
    listener.set_nonblocking(true).map_err(bind_err)?;

    if let Ok(local) = listener.local_addr() {
        tracing::info!(address = %local, "TLS listener bound");
    }
    Ok(listener)
}
