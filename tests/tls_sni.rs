//! End-to-end tests for TLS termination and SNI certificate selection.

use axum::http::StatusCode;
use ingress_router::{RuleEntry, Snapshot, TlsEntry};
use rcgen::CertifiedKey;

mod common;

fn self_signed(name: &str) -> CertifiedKey {
    rcgen::generate_simple_self_signed(vec![name.to_string()]).unwrap()
}

fn tls_entry(host: &str, generated: &CertifiedKey) -> TlsEntry {
    TlsEntry::new(host, generated.cert.pem(), generated.key_pair.serialize_pem())
}

async fn peer_certificate(client: &reqwest::Client, url: String) -> Vec<u8> {
    let res = client.get(url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.extensions()
        .get::<reqwest::tls::TlsInfo>()
        .and_then(|info| info.peer_certificate())
        .map(|der| der.to_vec())
        .unwrap()
}

#[tokio::test]
async fn test_sni_selects_exact_and_wildcard_certificates() {
    let harness = common::start_ingress().await;
    let backend = common::start_mock_backend("a").await;
    let exact = self_signed("foo.com");
    let wildcard = self_signed("*.bar.com");

    harness.ingress.on_snapshot(&Snapshot::new(
        vec![
            RuleEntry::new("foo.com", "/", format!("http://{}", backend)),
            RuleEntry::new("*.bar.com", "/", format!("http://{}", backend)),
        ],
        vec![tls_entry("foo.com", &exact), tls_entry("*.bar.com", &wildcard)],
    ));

    let client = harness.client(&["foo.com", "x.bar.com"]);
    let served = peer_certificate(&client, harness.https_url("foo.com", "/")).await;
    assert_eq!(served, exact.cert.der().to_vec());

    let served = peer_certificate(&client, harness.https_url("x.bar.com", "/")).await;
    assert_eq!(served, wildcard.cert.der().to_vec());

    harness.stop().await;
}

#[tokio::test]
async fn test_https_request_is_forwarded() {
    let harness = common::start_ingress().await;
    let backend = common::start_mock_backend("secure").await;
    let cert = self_signed("foo.com");

    harness.ingress.on_snapshot(&Snapshot::new(
        vec![RuleEntry::new("foo.com", "/", format!("http://{}", backend))],
        vec![tls_entry("foo.com", &cert)],
    ));

    let client = harness.client(&["foo.com"]);
    let body = client
        .get(harness.https_url("foo.com", "/hello"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.starts_with("secure /hello"), "got {}", body);

    harness.stop().await;
}

#[tokio::test]
async fn test_unknown_sni_fails_handshake_only() {
    let harness = common::start_ingress().await;
    let backend = common::start_mock_backend("a").await;
    let cert = self_signed("foo.com");

    harness.ingress.on_snapshot(&Snapshot::new(
        vec![RuleEntry::new("foo.com", "/", format!("http://{}", backend))],
        vec![tls_entry("foo.com", &cert)],
    ));

    let client = harness.client(&["foo.com", "unknown.com"]);
    let rejected = client.get(harness.https_url("unknown.com", "/")).send().await;
    assert!(rejected.is_err(), "handshake for unknown name succeeded");

    let served = peer_certificate(&client, harness.https_url("foo.com", "/")).await;
    assert_eq!(served, cert.cert.der().to_vec());

    harness.stop().await;
}

#[tokio::test]
async fn test_certificate_hot_swap() {
    let harness = common::start_ingress().await;
    let backend = common::start_mock_backend("a").await;
    let old = self_signed("foo.com");
    let new = self_signed("foo.com");
    let rule = || vec![RuleEntry::new("foo.com", "/", format!("http://{}", backend))];

    harness
        .ingress
        .on_snapshot(&Snapshot::new(rule(), vec![tls_entry("foo.com", &old)]));
    let first = harness.client(&["foo.com"]);
    assert_eq!(
        peer_certificate(&first, harness.https_url("foo.com", "/")).await,
        old.cert.der().to_vec()
    );

    harness
        .ingress
        .on_snapshot(&Snapshot::new(rule(), vec![tls_entry("foo.com", &new)]));
    // Fresh client, so no pooled connection carries the old handshake.
    let second = harness.client(&["foo.com"]);
    assert_eq!(
        peer_certificate(&second, harness.https_url("foo.com", "/")).await,
        new.cert.der().to_vec()
    );

    harness.stop().await;
}
