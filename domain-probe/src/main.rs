//! Domain Probe CLI Application
//!
//! A command-line interface that reads a list of domains and reports which
//! of them answer HTTP(S) probes. This CLI application provides a
//! user-friendly interface to the domain-probe-lib library.

mod output;
mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use domain_probe_lib::{
    load_env_config, parse_duration, ConfigManager, DomainList, DomainProber, EnvConfig,
    FailureKind, FileConfig, ProbeConfig, ProbeReport, ProbeResult, Scheme,
};
use output::OutputFormat;
use std::process;
use std::time::{Duration, Instant};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for domain-probe
#[derive(Parser, Debug)]
#[command(name = "domain-probe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Report which domains in a list answer HTTP(S) probes")]
#[command(
    long_about = "Report which domains in a list answer HTTP(S) probes.\n\nEach domain is requested over https, then http, with connect and total timeouts. Probes run concurrently and the report keeps the input order."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// File with one domain per line ('-' reads stdin)
    #[arg(value_name = "FILE", help_heading = "Input")]
    pub file: Option<String>,

    /// Max probes in flight (default: 50, max: 500)
    #[arg(short = 'c', long = "concurrency", help_heading = "Performance")]
    pub concurrency: Option<usize>,

    /// Total time allowed per request attempt (e.g. 8s, 1500ms)
    #[arg(
        short = 't',
        long = "timeout",
        value_name = "DURATION",
        value_parser = parse_duration_arg,
        help_heading = "Probe"
    )]
    pub timeout: Option<Duration>,

    /// Connect and first-byte timeout (e.g. 3s)
    #[arg(
        long = "connect-timeout",
        value_name = "DURATION",
        value_parser = parse_duration_arg,
        help_heading = "Probe"
    )]
    pub connect_timeout: Option<Duration>,

    /// Body bytes that must arrive before a response counts (default: 64)
    #[arg(long = "read-min-bytes", value_name = "BYTES", help_heading = "Probe")]
    pub read_min_bytes: Option<usize>,

    /// Schemes to try, in order (comma-separated)
    #[arg(
        long = "scheme",
        value_name = "SCHEME",
        value_delimiter = ',',
        help_heading = "Probe"
    )]
    pub schemes: Option<Vec<Scheme>>,

    /// Only connect over IPv4
    #[arg(long = "ipv4-only", help_heading = "Probe")]
    pub ipv4_only: bool,

    /// Count any HTTP status as reachable, not only 2xx
    #[arg(long = "any-status", help_heading = "Probe")]
    pub any_status: bool,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Output results in CSV format
    #[arg(long = "csv", help_heading = "Output Format")]
    pub csv: bool,

    /// Print only reachable domain names, one per line
    #[arg(long = "alive-only", help_heading = "Output Format")]
    pub alive_only: bool,

    /// Enable grouped, structured output with section headers
    #[arg(short = 'p', long = "pretty", help_heading = "Output Format")]
    pub pretty: bool,

    /// Show results as they complete instead of in input order
    #[arg(long = "stream", help_heading = "Output Format")]
    pub stream: bool,

    /// Also write the report to this file
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output Format"
    )]
    pub output: Option<String>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show timings and error details for each domain
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Output settings resolved from flags, environment and config file.
#[derive(Debug, Clone, PartialEq)]
struct OutputSettings {
    format: OutputFormat,
    json_pretty: bool,
    csv_headers: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            json_pretty: true,
            csv_headers: true,
        }
    }
}

/// Unreachable domains grouped by failure cause
#[derive(Debug, Default)]
pub(crate) struct FailureStats {
    pub(crate) invalid: Vec<String>,
    pub(crate) dns_errors: Vec<String>,
    pub(crate) connection_errors: Vec<String>,
    pub(crate) timeouts: Vec<String>,
    pub(crate) bad_status: Vec<String>,
    pub(crate) empty_bodies: Vec<String>,
    pub(crate) other_errors: Vec<String>,
}

impl FailureStats {
    fn from_results(results: &[ProbeResult]) -> Self {
        let mut stats = Self::default();
        for result in results.iter().filter(|r| !r.reachable) {
            stats.add_failure(&result.domain, result.failure);
        }
        stats
    }

    fn add_failure(&mut self, domain: &str, failure: Option<FailureKind>) {
        let bucket = match failure {
            Some(FailureKind::InvalidDomain) => &mut self.invalid,
            Some(FailureKind::Dns) => &mut self.dns_errors,
            Some(FailureKind::Connect) => &mut self.connection_errors,
            Some(FailureKind::Timeout) => &mut self.timeouts,
            Some(FailureKind::HttpStatus) => &mut self.bad_status,
            Some(FailureKind::EmptyBody) => &mut self.empty_bodies,
            Some(FailureKind::Redirect) | Some(FailureKind::Request) | None => {
                &mut self.other_errors
            }
        };
        bucket.push(domain.to_string());
    }

    pub(crate) fn has_failures(&self) -> bool {
        self.categories().next().is_some()
    }

    /// Non-empty categories with their display labels.
    pub(crate) fn categories(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        [
            ("invalid names", self.invalid.as_slice()),
            ("DNS errors", self.dns_errors.as_slice()),
            ("connection errors", self.connection_errors.as_slice()),
            ("timeouts", self.timeouts.as_slice()),
            ("bad status codes", self.bad_status.as_slice()),
            ("empty bodies", self.empty_bodies.as_slice()),
            ("other errors", self.other_errors.as_slice()),
        ]
        .into_iter()
        .filter(|(_, domains)| !domains.is_empty())
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Validate arguments
    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_logging(args.verbose);

    if let Err(e) = run_probe(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,domain_probe_lib=debug,domain_probe=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_duration_arg(value: &str) -> Result<Duration, String> {
    parse_duration(value).ok_or_else(|| {
        format!(
            "invalid duration '{}'. Use format like '500ms', '5s', '2m'",
            value
        )
    })
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    // Can't have multiple output formats
    let output_formats = [args.json, args.csv, args.alive_only]
        .iter()
        .filter(|&&x| x)
        .count();
    if output_formats > 1 {
        return Err(
            "Cannot specify multiple output formats (--json, --csv, --alive-only)".to_string(),
        );
    }

    // Streaming mode doesn't support structured output formats
    if args.stream && (args.json || args.csv || args.alive_only) {
        return Err("Cannot use --stream with --json, --csv or --alive-only".to_string());
    }

    if args.stream && args.output.is_some() {
        return Err("Cannot use --stream with --output".to_string());
    }

    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > 500 {
            return Err("Concurrency must be between 1 and 500".to_string());
        }
    }

    Ok(())
}

/// Main probing logic
async fn run_probe(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let file_config = load_file_config(&args, &env_config)?;

    let config = build_config(&args, &file_config, &env_config);
    let settings = resolve_output(&args, &file_config, &env_config);
    debug!(?config, ?settings, "Resolved configuration");

    let list = load_domains(&args, &env_config)?;
    let prober = DomainProber::with_config(config)?;

    if args.stream {
        run_streaming_probe(&prober, &list, &args).await;
        return Ok(());
    }

    run_batch_probe(&prober, &list, &args, &settings).await
}

/// Load the config file named by `--config` or `DP_CONFIG`, or discover one.
///
/// An explicit file that fails to load is fatal; discovered files are not.
fn load_file_config(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new();

    let explicit = args.config.as_ref().or(env_config.config.as_ref());
    match explicit {
        Some(path) => {
            debug!(path = %path, "Using explicit config file");
            let file_config = config_manager
                .load_file(path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?;
            Ok(file_config)
        }
        None => Ok(config_manager.discover_and_load()?),
    }
}

/// Build ProbeConfig with config file integration.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments (explicit user input)
/// 2. Environment variables (DP_*)
/// 3. Config files (explicit, or local > global > XDG)
/// 4. Built-in defaults
fn build_config(args: &Args, file_config: &FileConfig, env_config: &EnvConfig) -> ProbeConfig {
    let config = file_config.apply_to(ProbeConfig::default());
    let config = env_config.apply_to(config);
    apply_cli_args_to_config(config, args)
}

/// Apply CLI arguments to config (highest precedence).
///
/// Boolean flags only ever switch a setting on, so a config or env value is
/// kept when the flag is absent.
fn apply_cli_args_to_config(mut config: ProbeConfig, args: &Args) -> ProbeConfig {
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(timeout) = args.timeout {
        config = config.with_timeout(timeout);
    }
    if let Some(timeout) = args.connect_timeout {
        config = config.with_connect_timeout(timeout);
    }
    if let Some(bytes) = args.read_min_bytes {
        config = config.with_read_min_bytes(bytes);
    }
    if let Some(schemes) = &args.schemes {
        config = config.with_schemes(schemes.clone());
    }
    if args.ipv4_only {
        config = config.with_ipv4_only(true);
    }
    if args.any_status {
        config = config.with_accept_any_status(true);
    }
    config
}

/// Pick the output format and its options.
///
/// Flags win over `DP_JSON` / `DP_CSV`, which win over the config file.
fn resolve_output(args: &Args, file_config: &FileConfig, env_config: &EnvConfig) -> OutputSettings {
    let mut settings = OutputSettings::default();

    if let Some(output) = &file_config.output {
        if let Some(format) = output.default_format.as_deref().and_then(OutputFormat::from_name) {
            settings.format = format;
        }
        if let Some(pretty) = output.json_pretty {
            settings.json_pretty = pretty;
        }
        if let Some(headers) = output.csv_headers {
            settings.csv_headers = headers;
        }
    }

    if env_config.has_output_format_conflict() {
        tracing::warn!("Both DP_JSON and DP_CSV are set, using JSON");
    }
    if env_config.json == Some(true) {
        settings.format = OutputFormat::Json;
    } else if env_config.csv == Some(true) {
        settings.format = OutputFormat::Csv;
    }

    if args.json {
        settings.format = OutputFormat::Json;
    } else if args.csv {
        settings.format = OutputFormat::Csv;
    } else if args.alive_only {
        settings.format = OutputFormat::Alive;
    } else if args.stream {
        settings.format = OutputFormat::Text;
    }

    settings
}

/// Read the domain list from the FILE argument, `DP_FILE`, or stdin for `-`.
fn load_domains(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<DomainList, Box<dyn std::error::Error>> {
    let source = args
        .file
        .as_ref()
        .or(env_config.file.as_ref())
        .ok_or("You must specify a domains file (or '-' for stdin)")?;

    let list = if source == "-" {
        debug!("Reading domains from stdin");
        DomainList::from_reader(std::io::stdin().lock())?
    } else {
        debug!(path = %source, "Reading domains from file");
        DomainList::from_file(source)?
    };

    Ok(list)
}

/// Run probes and print each result as it completes
async fn run_streaming_probe(prober: &DomainProber, list: &DomainList, args: &Args) {
    use futures::StreamExt;

    if args.pretty {
        ui::print_header(
            list.len(),
            prober.config().concurrency,
            prober.config().timeout,
        );
    }

    let total = list.len();
    let mut results = Vec::with_capacity(total);
    let start_time = Instant::now();

    let mut stream = prober.probe_domains_stream(list.domains());
    while let Some(result) = stream.next().await {
        let counter = if total > 1 {
            Some((results.len() + 1, total))
        } else {
            None
        };
        ui::print_result(&result, args.debug, counter);
        results.push(result);
    }

    let report = ProbeReport::new(results, start_time.elapsed());
    print_text_footer(&report);
}

/// Run probes, collect the report in input order and render it
async fn run_batch_probe(
    prober: &DomainProber,
    list: &DomainList,
    args: &Args,
    settings: &OutputSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let is_text = !settings.format.is_structured();

    if args.pretty && is_text && list.len() > 1 {
        ui::print_header(
            list.len(),
            prober.config().concurrency,
            prober.config().timeout,
        );
    }

    // Progress::start stays silent if stderr isn't a TTY.
    let progress = ui::Progress::start(list.len() > 1);
    let mut reachable = 0usize;
    let report = prober
        .probe_list_with_progress(list, |completed, total, result| {
            if result.reachable {
                reachable += 1;
            }
            progress.update(completed, total, reachable);
        })
        .await;
    progress.finish();

    if is_text {
        display_text_results(&report, args);
    } else {
        let rendered = output::render(
            &report,
            settings.format,
            settings.json_pretty,
            settings.csv_headers,
        )?;
        print!("{}", rendered);
    }

    if let Some(path) = &args.output {
        let rendered = output::render(
            &report,
            settings.format,
            settings.json_pretty,
            settings.csv_headers,
        )?;
        output::write_report(path, &rendered)
            .map_err(|e| format!("Failed to write report to '{}': {}", path, e))?;
        debug!(path = %path, "Report written");
    }

    Ok(())
}

/// Display results in human-readable text format
fn display_text_results(report: &ProbeReport, args: &Args) {
    if args.pretty {
        // Pretty mode: grouped layout with section headers
        ui::print_grouped_results(&report.results, args.debug);
    } else {
        for result in &report.results {
            ui::print_result(result, args.debug, None);
        }
    }

    print_text_footer(report);
}

fn print_text_footer(report: &ProbeReport) {
    if !report.is_empty() {
        println!();
    }
    ui::print_summary(
        report.len(),
        report.reachable_count(),
        report.unreachable_count(),
        report.duration.unwrap_or_default(),
    );

    let stats = FailureStats::from_results(&report.results);
    if stats.has_failures() {
        println!();
        ui::print_failure_summary(&stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_probe_lib::{DefaultsConfig, OutputConfig};

    fn create_test_args() -> Args {
        Args {
            file: Some("domains.txt".to_string()),
            concurrency: None,
            timeout: None,
            connect_timeout: None,
            read_min_bytes: None,
            schemes: None,
            ipv4_only: false,
            any_status: false,
            json: false,
            csv: false,
            alive_only: false,
            pretty: false,
            stream: false,
            output: None,
            config: None,
            debug: false,
            verbose: false,
        }
    }

    #[test]
    fn test_cli_parses_all_flags() {
        let args = Args::try_parse_from([
            "domain-probe",
            "list.txt",
            "-c",
            "10",
            "--timeout",
            "1500ms",
            "--connect-timeout",
            "2s",
            "--scheme",
            "http,https",
            "--any-status",
            "--json",
        ])
        .unwrap();

        assert_eq!(args.file.as_deref(), Some("list.txt"));
        assert_eq!(args.concurrency, Some(10));
        assert_eq!(args.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(args.connect_timeout, Some(Duration::from_secs(2)));
        assert_eq!(args.schemes, Some(vec![Scheme::Http, Scheme::Https]));
        assert!(args.any_status);
        assert!(args.json);
    }

    #[test]
    fn test_cli_rejects_bad_duration_and_scheme() {
        assert!(Args::try_parse_from(["domain-probe", "f", "--timeout", "soon"]).is_err());
        assert!(Args::try_parse_from(["domain-probe", "f", "--scheme", "ftp"]).is_err());
    }

    #[test]
    fn test_validate_args_multiple_formats_rejected() {
        let mut args = create_test_args();
        args.json = true;
        args.csv = true;

        let result = validate_args(&args);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .contains("Cannot specify multiple output formats"));
    }

    #[test]
    fn test_validate_args_stream_with_json_rejected() {
        let mut args = create_test_args();
        args.stream = true;
        args.json = true;

        let result = validate_args(&args);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("--stream"));
    }

    #[test]
    fn test_validate_args_concurrency_range() {
        let mut args = create_test_args();
        args.concurrency = Some(0);
        assert!(validate_args(&args).is_err());

        args.concurrency = Some(501);
        assert!(validate_args(&args).is_err());

        args.concurrency = Some(500);
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_precedence_cli_over_env_over_file() {
        let file_config = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(10),
                timeout: Some("20s".to_string()),
                read_min_bytes: Some(1),
                ..Default::default()
            }),
            ..Default::default()
        };
        let env_config = EnvConfig {
            concurrency: Some(30),
            timeout: Some(Duration::from_secs(5)),
            ..Default::default()
        };
        let mut args = create_test_args();
        args.concurrency = Some(7);

        let config = build_config(&args, &file_config, &env_config);
        assert_eq!(config.concurrency, 7); // CLI
        assert_eq!(config.timeout, Duration::from_secs(5)); // env
        assert_eq!(config.read_min_bytes, 1); // file
        assert_eq!(config.connect_timeout, Duration::from_secs(3)); // default
    }

    #[test]
    fn test_bool_flags_only_enable() {
        let args = create_test_args();
        let config = ProbeConfig {
            accept_any_status: true, // Simulates config setting
            ..ProbeConfig::default()
        };

        let result = apply_cli_args_to_config(config, &args);
        assert!(
            result.accept_any_status,
            "Config accept_any_status=true should be preserved when --any-status is not passed"
        );
        assert!(!result.ipv4_only);
    }

    #[test]
    fn test_resolve_output_precedence() {
        let file_config = FileConfig {
            output: Some(OutputConfig {
                default_format: Some("csv".to_string()),
                csv_headers: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };
        let args = create_test_args();

        let settings = resolve_output(&args, &file_config, &EnvConfig::default());
        assert_eq!(settings.format, OutputFormat::Csv);
        assert!(!settings.csv_headers);

        let env_config = EnvConfig {
            json: Some(true),
            ..Default::default()
        };
        let settings = resolve_output(&args, &file_config, &env_config);
        assert_eq!(settings.format, OutputFormat::Json);

        let mut args = create_test_args();
        args.alive_only = true;
        let settings = resolve_output(&args, &file_config, &env_config);
        assert_eq!(settings.format, OutputFormat::Alive);
    }

    #[test]
    fn test_failure_stats_aggregation() {
        let results = vec![
            ProbeResult::unreachable("a.com", FailureKind::Timeout, "timed out"),
            ProbeResult::unreachable("b.com", FailureKind::Dns, "no such host"),
            ProbeResult::unreachable("c.com", FailureKind::Timeout, "timed out"),
            ProbeResult::unreachable("d.com", FailureKind::Redirect, "too many"),
        ];

        let stats = FailureStats::from_results(&results);
        assert_eq!(stats.timeouts, vec!["a.com", "c.com"]);
        assert_eq!(stats.dns_errors, vec!["b.com"]);
        assert_eq!(stats.other_errors, vec!["d.com"]);
        assert!(stats.has_failures());

        let labels: Vec<&str> = stats.categories().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["DNS errors", "timeouts", "other errors"]);
    }

    #[test]
    fn test_failure_stats_empty() {
        let stats = FailureStats::from_results(&[]);
        assert!(!stats.has_failures());
    }
}
