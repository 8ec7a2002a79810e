//! HTTP(S) liveness probe.
//!
//! One probe tries each configured scheme in turn. The first scheme that
//! produces a complete response decides the outcome; transport failures
//! move on to the next scheme.

use crate::error::DomainProbeError;
use crate::types::{FailureKind, ProbeConfig, ProbeResult, Scheme};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};
use tracing::debug;

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HttpResponse {
    pub(crate) status: u16,
    /// Time until response headers arrived
    pub(crate) headers_elapsed: Duration,
    /// Time until the first body byte, if one was read
    pub(crate) first_byte_elapsed: Option<Duration>,
}

/// HTTP client for liveness probes.
///
/// Wraps one pooled `reqwest::Client`, shared by all concurrent probes.
#[derive(Clone)]
pub(crate) struct HttpProbeClient {
    http_client: reqwest::Client,
    /// Bounds each wait on the socket (connect plus headers, each body chunk)
    connect_timeout: Duration,
    /// Bounds a whole attempt
    timeout: Duration,
    read_min_bytes: usize,
    accept_any_status: bool,
    schemes: Vec<Scheme>,
}

impl HttpProbeClient {
    /// Create a probe client from configuration.
    pub(crate) fn with_config(config: &ProbeConfig) -> Result<Self, DomainProbeError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(config.concurrency.clamp(5, 10));

        if config.ipv4_only {
            builder = builder.local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        }

        let http_client = builder.build().map_err(|e| {
            DomainProbeError::internal(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            http_client,
            connect_timeout: config.connect_timeout,
            timeout: config.timeout,
            read_min_bytes: config.read_min_bytes,
            accept_any_status: config.accept_any_status,
            schemes: config.schemes.clone(),
        })
    }

    /// Probe a host on every configured scheme until one answers.
    ///
    /// The host must already be validated. Never fails: every outcome is
    /// encoded in the returned `ProbeResult`.
    pub(crate) async fn probe(&self, host: &str) -> ProbeResult {
        let start_time = Instant::now();
        let mut last_error: Option<DomainProbeError> = None;

        for scheme in &self.schemes {
            let url = scheme.url_for(host);
            match self.fetch(&url).await {
                Ok(response) => {
                    debug!(
                        url = %url,
                        status = response.status,
                        headers_ms = response.headers_elapsed.as_millis() as u64,
                        "Probe answered"
                    );
                    let mut result = self.classify(host, *scheme, &response);
                    result.check_duration = Some(start_time.elapsed());
                    return result;
                }
                Err(e) => {
                    debug!(url = %url, error = %e, "Probe attempt failed");
                    let scheme_specific = e.is_scheme_specific();
                    last_error = Some(e);
                    if !scheme_specific {
                        break;
                    }
                }
            }
        }

        let mut result = match last_error {
            Some(e) => ProbeResult::unreachable(host, e.failure_kind(), e.to_string()),
            None => ProbeResult::unreachable(host, FailureKind::Request, "No schemes configured"),
        };
        result.check_duration = Some(start_time.elapsed());
        result
    }

    fn classify(&self, host: &str, scheme: Scheme, response: &HttpResponse) -> ProbeResult {
        let status_ok = StatusCode::from_u16(response.status)
            .map(|s| s.is_success())
            .unwrap_or(false);
        let reachable = status_ok || self.accept_any_status;

        ProbeResult {
            domain: host.to_string(),
            reachable,
            status_code: Some(response.status),
            scheme: Some(scheme),
            failure: if reachable {
                None
            } else {
                Some(FailureKind::HttpStatus)
            },
            error_message: if reachable {
                None
            } else {
                Some(format!("HTTP {} from {}", response.status, scheme.url_for(host)))
            },
            check_duration: None,
            time_to_first_byte: response.first_byte_elapsed,
        }
    }

    /// One attempt against one URL, bounded by the total timeout.
    pub(crate) async fn fetch(&self, url: &str) -> Result<HttpResponse, DomainProbeError> {
        match tokio::time::timeout(self.timeout, self.fetch_inner(url)).await {
            Ok(result) => result,
            Err(_) => Err(DomainProbeError::timeout(
                format!("request to {}", url),
                self.timeout,
            )),
        }
    }

    async fn fetch_inner(&self, url: &str) -> Result<HttpResponse, DomainProbeError> {
        let start = Instant::now();

        let request = self.http_client.get(url).send();
        let mut response = tokio::time::timeout(self.connect_timeout, request)
            .await
            .map_err(|_| {
                DomainProbeError::timeout(
                    format!("waiting for response headers from {}", url),
                    self.connect_timeout,
                )
            })?
            .map_err(|e| DomainProbeError::from_request(e, url, self.timeout))?;

        let status = response.status();
        let headers_elapsed = start.elapsed();

        if status == StatusCode::NO_CONTENT {
            return Ok(HttpResponse {
                status: status.as_u16(),
                headers_elapsed,
                first_byte_elapsed: None,
            });
        }

        let mut received = 0usize;
        let mut first_byte_elapsed = None;

        while received < self.read_min_bytes {
            let chunk = tokio::time::timeout(self.connect_timeout, response.chunk())
                .await
                .map_err(|_| {
                    DomainProbeError::timeout(
                        format!("reading body from {}", url),
                        self.connect_timeout,
                    )
                })?
                .map_err(|e| DomainProbeError::from_request(e, url, self.timeout))?;

            match chunk {
                Some(bytes) if bytes.is_empty() => continue,
                Some(bytes) => {
                    first_byte_elapsed.get_or_insert_with(|| start.elapsed());
                    received += bytes.len();
                }
                None => break,
            }
        }

        if first_byte_elapsed.is_none() && self.read_min_bytes > 0 {
            return Err(DomainProbeError::empty_body(url));
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            headers_elapsed,
            first_byte_elapsed,
        })
    }
}
