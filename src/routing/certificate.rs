//! Certificate material for SNI resolution.

use std::io::BufReader;

use rustls::crypto::aws_lc_rs::sign::any_supported_type;
use rustls::sign::CertifiedKey;

/// Why a TLS entry could not be turned into a usable key pair.
#[derive(Debug, thiserror::Error)]
pub enum CertificateError {
    #[error("invalid PEM: {0}")]
    Pem(#[from] std::io::Error),

    #[error("no certificate found in PEM")]
    NoCertificate,

    #[error("no private key found in PEM")]
    NoPrivateKey,

    #[error("unsupported private key: {0}")]
    UnsupportedKey(#[from] rustls::Error),
}

/// Parse a PEM certificate chain and private key into a rustls key pair.
pub fn certified_key_from_pem(
    certificate_pem: &str,
    private_key_pem: &str,
) -> Result<CertifiedKey, CertificateError> {
    let mut cert_reader = BufReader::new(certificate_pem.as_bytes());
    let chain = rustls_pemfile::certs(&mut cert_reader).collect::<Result<Vec<_>, _>>()?;
    if chain.is_empty() {
        return Err(CertificateError::NoCertificate);
    }

    let mut key_reader = BufReader::new(private_key_pem.as_bytes());
    let key = rustls_pemfile::private_key(&mut key_reader)?.ok_or(CertificateError::NoPrivateKey)?;
    let signing_key = any_supported_type(&key)?;

    Ok(CertifiedKey::new(chain, signing_key))
}
