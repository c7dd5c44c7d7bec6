//! TLS termination with per-handshake SNI certificate selection.

use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use rustls::server::{ClientHello, ResolvesServerCert};
use rustls::sign::CertifiedKey;
use rustls::ServerConfig;

use crate::error::IngressError;
use crate::ingress::Ingress;
use crate::observability::metrics;

/// Picks the certificate for each handshake from the current routing table.
///
/// Returning `None` fails that handshake only; the listener keeps going.
#[derive(Debug)]
pub struct SniResolver {
    ingress: Arc<Ingress>,
}

impl SniResolver {
    pub fn new(ingress: Arc<Ingress>) -> Self {
        Self { ingress }
    }

    /// Certificate for an optional server name.
    pub fn certificate_for(&self, server_name: Option<&str>) -> Result<Arc<CertifiedKey>, IngressError> {
        let server_name = server_name.unwrap_or_default();
        self.ingress.current().resolve_certificate(server_name)
    }
}

impl ResolvesServerCert for SniResolver {
    fn resolve(&self, client_hello: ClientHello<'_>) -> Option<Arc<CertifiedKey>> {
        match self.certificate_for(client_hello.server_name()) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::debug!(error = %e, "Rejecting TLS handshake");
                metrics::record_tls_handshake_rejected();
                None
            }
        }
    }
}

/// rustls server configuration resolving certificates through `ingress`.
pub fn server_config(ingress: Arc<Ingress>) -> Result<Arc<ServerConfig>, IngressError> {
    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let mut config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_cert_resolver(Arc::new(SniResolver::new(ingress)));
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
    Ok(Arc::new(config))
}

/// axum-server wrapper around [`server_config`].
pub fn rustls_config(ingress: Arc<Ingress>) -> Result<RustlsConfig, IngressError> {
    Ok(RustlsConfig::from_config(server_config(ingress)?))
}
