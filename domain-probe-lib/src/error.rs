//! Error handling for domain probing operations.
//!
//! Two kinds of failure flow through this type. Fatal ones (bad config,
//! unreadable input file, HTTP client construction) are returned to the
//! caller. Per-attempt network failures are produced inside the prober and
//! folded into an unreachable [`ProbeResult`](crate::ProbeResult), so they
//! never abort a batch.

use crate::types::FailureKind;
use std::fmt;
use std::time::Duration;

/// Main error type for domain probing operations.
#[derive(Debug, Clone)]
pub enum DomainProbeError {
    /// Input line is not a usable host name
    InvalidDomain { domain: String, reason: String },

    /// Host name could not be resolved
    DnsError { host: String, message: String },

    /// TCP connect or TLS handshake failed
    ConnectionError { url: String, message: String },

    /// Operation did not finish within its time budget
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Server answered but sent no body bytes
    EmptyBody { url: String },

    /// Redirect loop or too many redirects
    RedirectError { url: String, message: String },

    /// Any other request-level failure
    RequestError { url: String, message: String },

    /// Configuration errors (invalid settings, etc.)
    ConfigError { message: String },

    /// File I/O errors when reading domain lists or configs
    FileError { path: String, message: String },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl DomainProbeError {
    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new DNS resolution error.
    pub fn dns<H: Into<String>, M: Into<String>>(host: H, message: M) -> Self {
        Self::DnsError {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Create a new connection error.
    pub fn connection<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::ConnectionError {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    pub fn empty_body<U: Into<String>>(url: U) -> Self {
        Self::EmptyBody { url: url.into() }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Classify this error for reporting on an unreachable result.
    ///
    /// Errors that cannot come out of a probe attempt map to `Request`.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::InvalidDomain { .. } => FailureKind::InvalidDomain,
            Self::DnsError { .. } => FailureKind::Dns,
            Self::ConnectionError { .. } => FailureKind::Connect,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::EmptyBody { .. } => FailureKind::EmptyBody,
            Self::RedirectError { .. } => FailureKind::Redirect,
            _ => FailureKind::Request,
        }
    }

    /// Whether another scheme may still get an answer out of the same host.
    ///
    /// Name resolution does not depend on the scheme, so a DNS failure ends
    /// the probe early.
    pub fn is_scheme_specific(&self) -> bool {
        !matches!(self, Self::InvalidDomain { .. } | Self::DnsError { .. })
    }

    /// Build from a reqwest error, tagging it with the URL that was requested.
    pub(crate) fn from_request(err: reqwest::Error, url: &str, timeout: Duration) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| url.to_string());
        let detail = error_chain(&err);

        if err.is_timeout() {
            Self::timeout(format!("request to {}", url), timeout)
        } else if err.is_redirect() {
            Self::RedirectError {
                url,
                message: detail,
            }
        } else if err.is_connect() {
            if looks_like_dns_failure(&detail) {
                let host = reqwest::Url::parse(&url)
                    .ok()
                    .and_then(|u| u.host_str().map(str::to_string))
                    .unwrap_or_else(|| url.clone());
                Self::dns(host, detail)
            } else {
                Self::connection(url, detail)
            }
        } else {
            Self::RequestError {
                url,
                message: detail,
            }
        }
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}

fn looks_like_dns_failure(message: &str) -> bool {
    let msg = message.to_lowercase();
    msg.contains("dns error")
        || msg.contains("failed to lookup address")
        || msg.contains("name or service not known")
        || msg.contains("no such host")
        || msg.contains("nodename nor servname")
}

impl fmt::Display for DomainProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomain { domain, reason } => {
                write!(f, "Invalid domain '{}': {}", domain, reason)
            }
            Self::DnsError { host, message } => {
                write!(f, "DNS lookup failed for '{}': {}", host, message)
            }
            Self::ConnectionError { url, message } => {
                write!(f, "Connection to {} failed: {}", url, message)
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::EmptyBody { url } => {
                write!(f, "No body bytes received from {}", url)
            }
            Self::RedirectError { url, message } => {
                write!(f, "Redirect error for {}: {}", url, message)
            }
            Self::RequestError { url, message } => {
                write!(f, "Request to {} failed: {}", url, message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for DomainProbeError {}

/// Conversion without request context. The URL comes from the error when
/// reqwest kept it, and timeouts carry no duration.
impl From<reqwest::Error> for DomainProbeError {
    fn from(err: reqwest::Error) -> Self {
        Self::from_request(err, "<unknown>", Duration::ZERO)
    }
}

impl From<std::io::Error> for DomainProbeError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<serde_json::Error> for DomainProbeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal {
            message: format!("JSON serialization failed: {}", err),
        }
    }
}

impl From<toml::de::Error> for DomainProbeError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}
