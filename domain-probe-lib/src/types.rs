//! Core data types for domain probing.
//!
//! This module defines the probe configuration, per-domain results and the
//! collected report.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Result of probing a single domain.
///
/// Exactly one of these is produced per input domain, whatever happened
/// on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeResult {
    /// The domain name that was probed (e.g., "example.com")
    pub domain: String,

    /// Whether the domain answered with a qualifying response
    pub reachable: bool,

    /// Status code of the response that decided the outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Scheme of the response that decided the outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<Scheme>,

    /// Why the domain is unreachable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,

    /// Human readable detail for `failure`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// How long the whole probe took, all schemes included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_duration: Option<Duration>,

    /// Time from request start to the first body byte
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_first_byte: Option<Duration>,
}

impl ProbeResult {
    /// An unreachable result with a classified reason.
    pub fn unreachable<D: Into<String>, M: Into<String>>(
        domain: D,
        failure: FailureKind,
        message: M,
    ) -> Self {
        Self {
            domain: domain.into(),
            reachable: false,
            status_code: None,
            scheme: None,
            failure: Some(failure),
            error_message: Some(message.into()),
            check_duration: None,
            time_to_first_byte: None,
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.reachable {
            "reachable"
        } else {
            "unreachable"
        }
    }
}

/// Classification of an unreachable domain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Input line is not a valid host name
    InvalidDomain,
    /// Name resolution failed
    Dns,
    /// Connection refused, reset, or TLS handshake failure
    Connect,
    /// Connect, first byte, or total timeout expired
    Timeout,
    /// A response arrived but its status did not qualify
    HttpStatus,
    /// Headers arrived but no body bytes followed
    EmptyBody,
    /// Too many redirects
    Redirect,
    /// Any other request failure
    Request,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidDomain => "invalid_domain",
            FailureKind::Dns => "dns",
            FailureKind::Connect => "connect",
            FailureKind::Timeout => "timeout",
            FailureKind::HttpStatus => "http_status",
            FailureKind::EmptyBody => "empty_body",
            FailureKind::Redirect => "redirect",
            FailureKind::Request => "request",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// URL scheme used for a probe attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Https,
    Http,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Https => "https",
            Scheme::Http => "http",
        }
    }

    /// Build the probe URL for a host.
    pub fn url_for(&self, host: &str) -> String {
        format!("{}://{}/", self.as_str(), host)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "https" => Ok(Scheme::Https),
            "http" => Ok(Scheme::Http),
            other => Err(format!("Unknown scheme '{}', use https or http", other)),
        }
    }
}

/// Configuration options for probing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Maximum number of probes in flight
    /// Default: 50, Range: 1-500
    pub concurrency: usize,

    /// Hard limit for one request attempt, redirects included
    /// Default: 8 seconds
    #[serde(skip)]
    pub timeout: Duration,

    /// Limit for the TCP connect and for each wait on body bytes
    /// Default: 3 seconds
    #[serde(skip)]
    pub connect_timeout: Duration,

    /// Body bytes that must arrive before a response counts
    /// Default: 64
    pub read_min_bytes: usize,

    /// Force IPv4 sockets
    /// Default: false
    pub ipv4_only: bool,

    /// Count any completed response as reachable, not only 2xx
    /// Default: false
    pub accept_any_status: bool,

    /// Schemes to try, in order
    /// Default: https, http
    pub schemes: Vec<Scheme>,

    /// Redirects followed per request
    /// Default: 5
    pub max_redirects: usize,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency: 50,
            timeout: Duration::from_secs(8),
            connect_timeout: Duration::from_secs(3),
            read_min_bytes: 64,
            ipv4_only: false,
            accept_any_status: false,
            schemes: vec![Scheme::Https, Scheme::Http],
            max_redirects: 5,
            user_agent: format!(
                "Mozilla/5.0 (compatible; domain-probe/{})",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

impl ProbeConfig {
    /// Set concurrency, clamped to 1-500.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 500);
        self
    }

    /// Set the total per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect / first-byte timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_min_bytes(mut self, bytes: usize) -> Self {
        self.read_min_bytes = bytes;
        self
    }

    pub fn with_ipv4_only(mut self, enabled: bool) -> Self {
        self.ipv4_only = enabled;
        self
    }

    pub fn with_accept_any_status(mut self, enabled: bool) -> Self {
        self.accept_any_status = enabled;
        self
    }

    /// Set the schemes to try. An empty list is ignored.
    pub fn with_schemes(mut self, schemes: Vec<Scheme>) -> Self {
        if !schemes.is_empty() {
            self.schemes = schemes;
        }
        self
    }
}

/// All results of one probe pass, in input order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProbeReport {
    pub results: Vec<ProbeResult>,

    /// Wall-clock time for the whole pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

impl ProbeReport {
    pub fn new(results: Vec<ProbeResult>, duration: Duration) -> Self {
        Self {
            results,
            duration: Some(duration),
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn reachable(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| r.reachable)
    }

    pub fn unreachable(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| !r.reachable)
    }

    pub fn reachable_count(&self) -> usize {
        self.reachable().count()
    }

    pub fn unreachable_count(&self) -> usize {
        self.unreachable().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_parse_and_url() {
        assert_eq!("HTTPS".parse::<Scheme>(), Ok(Scheme::Https));
        assert_eq!(" http ".parse::<Scheme>(), Ok(Scheme::Http));
        assert!("ftp".parse::<Scheme>().is_err());
        assert_eq!(Scheme::Https.url_for("example.com"), "https://example.com/");
    }

    #[test]
    fn test_config_builders() {
        let config = ProbeConfig::default()
            .with_concurrency(0)
            .with_ipv4_only(true)
            .with_schemes(vec![]);
        assert_eq!(config.concurrency, 1);
        assert!(config.ipv4_only);
        assert_eq!(config.schemes, vec![Scheme::Https, Scheme::Http]);

        let config = ProbeConfig::default().with_concurrency(10_000);
        assert_eq!(config.concurrency, 500);
    }

    #[test]
    fn test_report_counts() {
        let mut ok = ProbeResult::unreachable("a.com", FailureKind::Dns, "x");
        ok.reachable = true;
        ok.failure = None;
        let report = ProbeReport::new(
            vec![
                ok,
                ProbeResult::unreachable("b.com", FailureKind::Timeout, "slow"),
            ],
            Duration::from_millis(10),
        );
        assert_eq!(report.len(), 2);
        assert_eq!(report.reachable_count(), 1);
        assert_eq!(report.unreachable_count(), 1);
        assert_eq!(report.reachable().next().map(|r| r.domain.as_str()), Some("a.com"));
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::InvalidDomain).unwrap();
        assert_eq!(json, "\"invalid_domain\"");
        let result = ProbeResult::unreachable("x.com", FailureKind::HttpStatus, "404");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["failure"], "http_status");
        assert_eq!(value["reachable"], false);
        assert!(value.get("status_code").is_none());
    }
}
