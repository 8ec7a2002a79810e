//! Utility functions for host name normalization and validation.

use crate::error::DomainProbeError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// One DNS label: alphanumerics and inner hyphens, at most 63 chars.
    static ref LABEL: Regex =
        Regex::new(r"^[A-Za-z0-9_](?:[A-Za-z0-9_-]{0,61}[A-Za-z0-9_])?$").unwrap();
}

/// Validate a host name, optionally followed by `:port`.
///
/// Single-label names ("localhost") and IPv4 literals are accepted since
/// they are routable probe targets.
///
/// # Returns
///
/// `Ok(())` if valid, `Err(DomainProbeError::InvalidDomain)` if not.
pub fn validate_domain(domain: &str) -> Result<(), DomainProbeError> {
    if domain.is_empty() {
        return Err(DomainProbeError::invalid_domain(
            domain,
            "Domain name cannot be empty",
        ));
    }

    if domain.chars().any(char::is_whitespace) {
        return Err(DomainProbeError::invalid_domain(
            domain,
            "Domain name cannot contain whitespace",
        ));
    }

    let (host, port) = split_port(domain);

    if let Some(port) = port {
        match port.parse::<u16>() {
            Ok(p) if p > 0 => {}
            _ => {
                return Err(DomainProbeError::invalid_domain(
                    domain,
                    format!("Invalid port '{}'", port),
                ))
            }
        }
    }

    let host = host.strip_suffix('.').unwrap_or(host);

    if host.is_empty() || host.len() > 253 {
        return Err(DomainProbeError::invalid_domain(
            domain,
            "Host name must be 1-253 characters",
        ));
    }

    if let Some(label) = host.split('.').find(|label| !LABEL.is_match(label)) {
        return Err(DomainProbeError::invalid_domain(
            domain,
            format!("Invalid label '{}'", label),
        ));
    }

    Ok(())
}

/// Split `host:port`. A host with no colon has no port.
fn split_port(domain: &str) -> (&str, Option<&str>) {
    match domain.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (domain, None),
    }
}

/// Normalize one line of a domain list.
///
/// Drops inline `#` comments, a leading `http://` or `https://`, and any
/// path or query after the host. Returns `None` for blank and comment lines.
pub fn normalize_domain_line(line: &str) -> Option<String> {
    let content = line.split('#').next().unwrap_or("").trim();
    if content.is_empty() {
        return None;
    }

    let lower = content.to_ascii_lowercase();
    let without_scheme = if lower.starts_with("https://") {
        &content["https://".len()..]
    } else if lower.starts_with("http://") {
        &content["http://".len()..]
    } else {
        content
    };

    let host = without_scheme
        .split(['/', '?'])
        .next()
        .unwrap_or("")
        .trim();

    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}
