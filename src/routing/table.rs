//! Routing table built from one snapshot.
//!
//! # Responsibilities
//! - Compile snapshot rules into a host → (path → backend) index
//! - Compile snapshot TLS entries into a host → certificate index
//! - Resolve backends by host + path and certificates by server name
//!
//! # Design Decisions
//! - Construction is total: unusable entries are skipped, never fatal
//! - Immutable after construction (shared via Arc, no locks)
//! - Longest path prefix wins; ties go to the earliest rule
//! - A host that matches but has no fitting path is a miss, no fallback

use std::collections::hash_map::Entry;
use std::sync::Arc;

use rustls::sign::CertifiedKey;

use crate::error::IngressError;
use crate::routing::backend::Backend;
use crate::routing::certificate::certified_key_from_pem;
use crate::routing::host::{normalize_host, HostIndex, HostPattern};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone)]
struct PathRule {
    prefix: String,
    backend: Backend,
}

/// Queryable, immutable view of one snapshot.
#[derive(Debug, Default)]
pub struct RoutingTable {
    routes: HostIndex<Vec<PathRule>>,
    certificates: HostIndex<Arc<CertifiedKey>>,
    rule_count: usize,
}

impl RoutingTable {
    /// The table in effect before any snapshot arrives. Resolves nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from a snapshot.
    pub fn build(snapshot: &Snapshot) -> Self {
        let mut routes: HostIndex<Vec<PathRule>> = HostIndex::default();
        let mut rule_count = 0;

        for (index, rule) in snapshot.rules.iter().enumerate() {
            let Some(pattern) = HostPattern::parse(&rule.host) else {
                tracing::warn!(index, host = %rule.host, "Skipping rule with unusable host");
                continue;
            };
            let Some(prefix) = normalize_path(&rule.path) else {
                tracing::warn!(index, path = %rule.path, "Skipping rule with unusable path");
                continue;
            };
            let backend = match Backend::parse(&rule.backend) {
                Ok(backend) => backend,
                Err(e) => {
                    tracing::warn!(index, backend = %rule.backend, error = %e, "Skipping rule with unusable backend");
                    continue;
                }
            };

            routes.entry(pattern).or_default().push(PathRule { prefix, backend });
            rule_count += 1;
        }

        // Stable sort: equal-length prefixes keep declaration order.
        for rules in routes.values_mut() {
            rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        }

        let mut certificates: HostIndex<Arc<CertifiedKey>> = HostIndex::default();
        for (index, tls) in snapshot.tls.iter().enumerate() {
            let Some(pattern) = HostPattern::parse(&tls.host) else {
                tracing::warn!(index, host = %tls.host, "Skipping TLS entry with unusable host");
                continue;
            };

            match certificates.entry(pattern) {
                Entry::Occupied(slot) => {
                    tracing::warn!(index, host = %slot.key(), "Duplicate TLS host, keeping first entry");
                }
                Entry::Vacant(slot) => match certified_key_from_pem(&tls.certificate, &tls.private_key) {
                    Ok(key) => {
                        slot.insert(Arc::new(key));
                    }
                    Err(e) => {
                        tracing::warn!(index, host = %tls.host, error = %e, "Skipping TLS entry with unusable key pair");
                    }
                },
            }
        }

        Self {
            routes,
            certificates,
            rule_count,
        }
    }

    /// Resolve the backend for a request host and path.
    pub fn resolve_backend(&self, host: &str, path: &str) -> Result<&Backend, IngressError> {
        let not_found = || IngressError::RouteNotFound {
            host: host.to_string(),
            path: path.to_string(),
        };

        let rules = self.routes.lookup(&normalize_host(host)).ok_or_else(not_found)?;
        rules
            .iter()
            .find(|rule| path.starts_with(&rule.prefix))
            .map(|rule| &rule.backend)
            .ok_or_else(not_found)
    }

    /// Resolve the certificate for a TLS server name.
    pub fn resolve_certificate(&self, server_name: &str) -> Result<Arc<CertifiedKey>, IngressError> {
        self.certificates
            .lookup(&normalize_host(server_name))
            .cloned()
            .ok_or_else(|| IngressError::CertificateNotFound {
                server_name: server_name.to_string(),
            })
    }

    /// Number of usable rules.
    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    /// Number of usable certificates.
    pub fn certificate_count(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count == 0 && self.certificates.is_empty()
    }
}

fn normalize_path(path: &str) -> Option<String> {
    let path = path.trim();
    if path.is_empty() {
        return Some("/".to_string());
    }
    path.starts_with('/').then(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{RuleEntry, TlsEntry};

    fn table(rules: &[(&str, &str, &str)]) -> RoutingTable {
        let rules = rules
            .iter()
            .map(|(host, path, backend)| RuleEntry::new(*host, *path, *backend))
            .collect();
        RoutingTable::build(&Snapshot::new(rules, Vec::new()))
    }

    fn backend_of(table: &RoutingTable, host: &str, path: &str) -> Option<String> {
        table
            .resolve_backend(host, path)
            .ok()
            .map(|b| b.as_str().to_string())
    }

    fn tls_entry(host: &str, san: &str) -> (TlsEntry, Vec<u8>) {
        let generated = rcgen::generate_simple_self_signed(vec![san.to_string()]).unwrap();
        let der = generated.cert.der().to_vec();
        (
            TlsEntry::new(host, generated.cert.pem(), generated.key_pair.serialize_pem()),
            der,
        )
    }

    #[test]
    fn test_concrete_scenario() {
        let table = table(&[("foo.com", "/", "http://10.0.0.1:8080")]);

        assert_eq!(
            backend_of(&table, "foo.com", "/anything").as_deref(),
            Some("http://10.0.0.1:8080")
        );
        assert!(matches!(
            table.resolve_backend("bar.com", "/"),
            Err(IngressError::RouteNotFound { .. })
        ));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let table = table(&[
            ("x.com", "/v1", "http://10.0.0.1:80"),
            ("*.x.com", "/", "http://10.0.0.2:80"),
        ]);

        for (host, path) in [("x.com", "/v1/a"), ("a.x.com", "/"), ("y.com", "/")] {
            assert_eq!(backend_of(&table, host, path), backend_of(&table, host, path));
        }
    }

    #[test]
    fn test_exact_host_beats_wildcard() {
        let table = table(&[
            ("*.example.com", "/", "http://10.0.0.2:80"),
            ("api.example.com", "/", "http://10.0.0.1:80"),
        ]);

        assert_eq!(
            backend_of(&table, "api.example.com", "/").as_deref(),
            Some("http://10.0.0.1:80")
        );
        assert_eq!(
            backend_of(&table, "web.example.com", "/").as_deref(),
            Some("http://10.0.0.2:80")
        );
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = table(&[
            ("x.com", "/v1", "http://a:80"),
            ("x.com", "/v1/users", "http://b:80"),
        ]);

        assert_eq!(backend_of(&table, "x.com", "/v1/users/42").as_deref(), Some("http://b:80"));
        assert_eq!(backend_of(&table, "x.com", "/v1/orders").as_deref(), Some("http://a:80"));
        assert_eq!(backend_of(&table, "x.com", "/v2"), None);
    }

    #[test]
    fn test_tie_goes_to_earliest_rule() {
        let table = table(&[
            ("x.com", "/api", "http://first:80"),
            ("x.com", "/api", "http://second:80"),
        ]);

        assert_eq!(backend_of(&table, "x.com", "/api/a").as_deref(), Some("http://first:80"));
    }

    #[test]
    fn test_no_fallback_to_other_host() {
        let table = table(&[
            ("api.example.com", "/admin", "http://exact:80"),
            ("*.example.com", "/", "http://wild:80"),
        ]);

        assert_eq!(backend_of(&table, "api.example.com", "/public"), None);
    }

    #[test]
    fn test_host_is_case_insensitive() {
        let table = table(&[("Foo.COM", "/", "http://10.0.0.1:80")]);
        assert!(backend_of(&table, "foo.com.", "/").is_some());
        assert!(backend_of(&table, "FOO.com", "/").is_some());
    }

    #[test]
    fn test_empty_table_resolves_nothing() {
        let table = RoutingTable::empty();
        assert!(table.is_empty());
        assert!(matches!(
            table.resolve_backend("anything", "/"),
            Err(IngressError::RouteNotFound { .. })
        ));
        assert!(matches!(
            table.resolve_certificate("anything"),
            Err(IngressError::CertificateNotFound { .. })
        ));
    }

    #[test]
    fn test_unusable_rules_are_skipped() {
        let table = table(&[
            ("", "/", "http://10.0.0.1:80"),
            ("foo.com", "no-slash", "http://10.0.0.1:80"),
            ("foo.com", "/bad", "not a url"),
            ("foo.com", "/tls", "https://10.0.0.1"),
            ("foo.com", "", "http://10.0.0.9:80"),
        ]);

        assert_eq!(table.rule_count(), 1);
        assert_eq!(
            backend_of(&table, "foo.com", "/bad").as_deref(),
            Some("http://10.0.0.9:80")
        );
    }

    #[test]
    fn test_certificate_wildcard_fallback() {
        let (entry, der) = tls_entry("*.example.com", "*.example.com");
        let table = RoutingTable::build(&Snapshot::new(Vec::new(), vec![entry]));

        let key = table.resolve_certificate("sub.example.com").unwrap();
        assert_eq!(key.cert[0].as_ref(), der.as_slice());
        assert!(matches!(
            table.resolve_certificate("sub.other.com"),
            Err(IngressError::CertificateNotFound { .. })
        ));
    }

    #[test]
    fn test_certificate_exact_beats_wildcard() {
        let (wild, _) = tls_entry("*.example.com", "*.example.com");
        let (exact, exact_der) = tls_entry("api.example.com", "api.example.com");
        let table = RoutingTable::build(&Snapshot::new(Vec::new(), vec![wild, exact]));

        let key = table.resolve_certificate("API.example.com").unwrap();
        assert_eq!(key.cert[0].as_ref(), exact_der.as_slice());
    }

    #[test]
    fn test_unusable_certificates_are_skipped() {
        let (good, der) = tls_entry("foo.com", "foo.com");
        let bad = TlsEntry::new("bar.com", "garbage", "garbage");
        let duplicate = {
            let (mut entry, _) = tls_entry("foo.com", "foo.com");
            entry.host = "FOO.com".to_string();
            entry
        };
        let table = RoutingTable::build(&Snapshot::new(Vec::new(), vec![good, bad, duplicate]));

        assert_eq!(table.certificate_count(), 1);
        assert!(table.resolve_certificate("bar.com").is_err());
        assert_eq!(
            table.resolve_certificate("foo.com").unwrap().cert[0].as_ref(),
            der.as_slice()
        );
    }
}
