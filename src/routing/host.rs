//! Host pattern matching.
//!
//! # Responsibilities
//! - Normalize host names (lowercase, trailing dot trimmed)
//! - Parse host patterns: exact (`api.example.com`) or wildcard (`*.example.com`)
//! - Look up a value by host with exact-before-wildcard precedence
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 9110)
//! - A wildcard needs at least one extra label: `*.example.com` never matches `example.com`
//! - Among wildcards the longest suffix wins
//! - Lookup is O(labels) hash probes, no scanning

use std::collections::hash_map::{Entry, HashMap};

/// Normalize a host name for matching.
///
/// - Convert to lowercase
/// - Trim trailing dot
pub fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// A parsed host pattern from a snapshot entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostPattern {
    /// Matches exactly this host.
    Exact(String),
    /// Matches any host ending in `.{suffix}`.
    Wildcard(String),
}

impl HostPattern {
    /// Parse a pattern. Returns `None` for empty or malformed patterns.
    pub fn parse(pattern: &str) -> Option<Self> {
        let normalized = normalize_host(pattern);
        if normalized.is_empty() {
            return None;
        }

        if let Some(suffix) = normalized.strip_prefix("*.") {
            if suffix.is_empty() || suffix.contains('*') {
                return None;
            }
            return Some(Self::Wildcard(suffix.to_string()));
        }

        if normalized.contains('*') {
            return None;
        }
        Some(Self::Exact(normalized))
    }
}

/// Values keyed by host pattern.
#[derive(Debug)]
pub struct HostIndex<T> {
    exact: HashMap<String, T>,
    /// Keyed by suffix without the leading `*.`.
    wildcard: HashMap<String, T>,
}

impl<T> Default for HostIndex<T> {
    fn default() -> Self {
        Self {
            exact: HashMap::new(),
            wildcard: HashMap::new(),
        }
    }
}

impl<T> HostIndex<T> {
    /// Entry for a pattern, for building the index.
    pub fn entry(&mut self, pattern: HostPattern) -> Entry<'_, String, T> {
        match pattern {
            HostPattern::Exact(host) => self.exact.entry(host),
            HostPattern::Wildcard(suffix) => self.wildcard.entry(suffix),
        }
    }

    /// Find the value for an already-normalized host.
    pub fn lookup(&self, host: &str) -> Option<&T> {
        if let Some(value) = self.exact.get(host) {
            return Some(value);
        }

        // "a.b.example.com" probes "b.example.com", "example.com", "com"
        let mut rest = host;
        while let Some((_, suffix)) = rest.split_once('.') {
            if let Some(value) = self.wildcard.get(suffix) {
                return Some(value);
            }
            rest = suffix;
        }
        None
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.exact.values_mut().chain(self.wildcard.values_mut())
    }

    /// Number of distinct host patterns.
    pub fn len(&self) -> usize {
        self.exact.len() + self.wildcard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
