//! Main domain prober implementation.
//!
//! This module provides the `DomainProber` struct that validates input,
//! fans probes out over a bounded pool and collects the results in input
//! order.

use crate::concurrent::ConcurrentProcessor;
use crate::error::DomainProbeError;
use crate::list::DomainList;
use crate::protocols::HttpProbeClient;
use crate::types::{FailureKind, ProbeConfig, ProbeReport, ProbeResult};
use crate::utils::validate_domain;
use futures::stream::{Stream, StreamExt};
use std::path::Path;
use std::pin::Pin;
use std::time::Instant;
use tracing::debug;

/// Coordinates liveness probes over a list of domains.
///
/// # Example
///
/// ```rust,no_run
/// use domain_probe_lib::DomainProber;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let prober = DomainProber::new()?;
///     let result = prober.probe_domain("example.com").await;
///     println!("{}: {}", result.domain, result.status_label());
///     Ok(())
/// }
/// ```
pub struct DomainProber {
    config: ProbeConfig,
    http_client: HttpProbeClient,
    processor: ConcurrentProcessor,
}

impl DomainProber {
    /// Create a prober with default configuration.
    ///
    /// Default settings:
    /// - Concurrency: 50
    /// - Timeout: 8 seconds total, 3 seconds connect / first byte
    /// - Schemes: https, then http
    pub fn new() -> Result<Self, DomainProbeError> {
        Self::with_config(ProbeConfig::default())
    }

    /// Create a prober with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use domain_probe_lib::{DomainProber, ProbeConfig};
    /// use std::time::Duration;
    ///
    /// let config = ProbeConfig::default()
    ///     .with_concurrency(20)
    ///     .with_timeout(Duration::from_secs(10));
    ///
    /// let prober = DomainProber::with_config(config).unwrap();
    /// assert_eq!(prober.config().concurrency, 20);
    /// ```
    pub fn with_config(config: ProbeConfig) -> Result<Self, DomainProbeError> {
        let http_client = HttpProbeClient::with_config(&config)?;
        let processor = ConcurrentProcessor::new(config.concurrency);

        Ok(Self {
            config,
            http_client,
            processor,
        })
    }

    /// Probe a single domain.
    ///
    /// Invalid host names are reported as unreachable `invalid_domain`
    /// without touching the network. Network failures are reported as
    /// unreachable too; this never returns an error.
    pub async fn probe_domain(&self, domain: &str) -> ProbeResult {
        let domain = domain.trim();
        if let Err(e) = validate_domain(domain) {
            return ProbeResult::unreachable(domain, FailureKind::InvalidDomain, e.to_string());
        }
        self.http_client.probe(domain).await
    }

    /// Probe many domains concurrently.
    ///
    /// Returns exactly one result per input domain, in input order, no
    /// matter in which order the probes complete.
    pub async fn probe_domains(&self, domains: &[String]) -> Vec<ProbeResult> {
        debug!(
            total = domains.len(),
            concurrency = self.processor.max_concurrency(),
            "Starting probe pass"
        );
        self.processor
            .run_ordered(domains.to_vec(), move |domain| async move {
                self.probe_domain(&domain).await
            })
            .await
    }

    /// Probe domains and yield results as they complete.
    ///
    /// Completion order is arbitrary; use [`probe_domains`](Self::probe_domains)
    /// for input order.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use domain_probe_lib::DomainProber;
    /// use futures::StreamExt;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let prober = DomainProber::new()?;
    ///     let domains = vec!["example.com".to_string(), "example.org".to_string()];
    ///
    ///     let mut stream = prober.probe_domains_stream(&domains);
    ///     while let Some(result) = stream.next().await {
    ///         println!("{}: {}", result.domain, result.status_label());
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn probe_domains_stream(
        &self,
        domains: &[String],
    ) -> Pin<Box<dyn Stream<Item = ProbeResult> + Send + '_>> {
        let stream = self
            .processor
            .run_unordered(domains.to_vec(), move |domain| async move {
                self.probe_domain(&domain).await
            })
            .map(|(_, result)| result);

        Box::pin(stream)
    }

    /// Probe a loaded list, reporting progress as each probe completes.
    ///
    /// `progress` receives `(completed, total, result)`. The returned report
    /// is in list order.
    pub async fn probe_list_with_progress<F>(
        &self,
        list: &DomainList,
        mut progress: F,
    ) -> ProbeReport
    where
        F: FnMut(usize, usize, &ProbeResult),
    {
        let start_time = Instant::now();
        let total = list.len();
        let mut slots: Vec<Option<ProbeResult>> = vec![None; total];
        let mut completed = 0usize;

        debug!(
            total,
            concurrency = self.processor.max_concurrency(),
            "Starting probe pass"
        );

        let mut stream = Box::pin(
            self.processor
                .run_unordered(list.domains().to_vec(), move |domain| async move {
                    self.probe_domain(&domain).await
                }),
        );

        while let Some((idx, result)) = stream.next().await {
            completed += 1;
            progress(completed, total, &result);
            slots[idx] = Some(result);
        }

        let results: Vec<ProbeResult> = slots.into_iter().flatten().collect();
        let duration = start_time.elapsed();
        debug!(
            total = results.len(),
            reachable = results.iter().filter(|r| r.reachable).count(),
            elapsed_ms = duration.as_millis() as u64,
            "Probe pass finished"
        );

        ProbeReport::new(results, duration)
    }

    /// Probe a loaded list and return the report in list order.
    pub async fn probe_list(&self, list: &DomainList) -> ProbeReport {
        self.probe_list_with_progress(list, |_, _, _| {}).await
    }

    /// Read a domain list file and probe every entry.
    ///
    /// # Errors
    ///
    /// Returns `DomainProbeError::FileError` if the file cannot be read.
    /// An empty file yields an empty report.
    pub async fn probe_file<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<ProbeReport, DomainProbeError> {
        let list = DomainList::from_file(path)?;
        Ok(self.probe_list(&list).await)
    }

    /// Get the current configuration for this prober.
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }
}
