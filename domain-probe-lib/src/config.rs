//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `DP_*`
//! environment variables, and merging them with proper precedence rules.

use crate::error::DomainProbeError;
use crate::types::{ProbeConfig, Scheme};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Default values for probe options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Output formatting preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Total timeout per attempt (e.g., "8s", "1500ms")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Connect / first-byte timeout (e.g., "3s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_min_bytes: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_any_status: Option<bool>,

    /// Schemes to try in order, e.g. ["https", "http"]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemes: Option<Vec<String>>,
}

/// Output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    /// Default output format: text, json, csv or alive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,

    /// Include CSV headers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_headers: Option<bool>,

    /// Pretty-print JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_pretty: Option<bool>,
}

impl FileConfig {
    /// Apply file defaults on top of a probe config.
    ///
    /// Values are validated when the file is loaded, so unparsable ones are
    /// simply skipped here.
    pub fn apply_to(&self, mut config: ProbeConfig) -> ProbeConfig {
        let Some(defaults) = &self.defaults else {
            return config;
        };

        if let Some(concurrency) = defaults.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_duration) {
            config.timeout = timeout;
        }
        if let Some(timeout) = defaults.connect_timeout.as_deref().and_then(parse_duration) {
            config.connect_timeout = timeout;
        }
        if let Some(bytes) = defaults.read_min_bytes {
            config.read_min_bytes = bytes;
        }
        if let Some(ipv4_only) = defaults.ipv4_only {
            config.ipv4_only = ipv4_only;
        }
        if let Some(any_status) = defaults.accept_any_status {
            config.accept_any_status = any_status;
        }
        if let Some(schemes) = &defaults.schemes {
            if let Ok(parsed) = parse_schemes(schemes) {
                config = config.with_schemes(parsed);
            }
        }

        config
    }
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Default)]
pub struct ConfigManager;

impl ConfigManager {
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a specific file.
    ///
    /// # Returns
    ///
    /// The parsed configuration or an error if reading, parsing or
    /// validation fails.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainProbeError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainProbeError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainProbeError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;

        self.validate_config(&config)?;

        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is lowest, then the home directory file, then the
    /// current directory file. Files that fail to load are skipped with a
    /// warning.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainProbeError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => warn!(path = %path.display(), "Ignoring config file: {}", e),
            }
        }

        if loaded_files.len() > 1 {
            debug!(
                files = ?loaded_files,
                "Multiple config files found, later files take precedence"
            );
        }

        Ok(merged_config)
    }

    /// Looks for configuration files in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./domain-probe.toml", "./.domain-probe.toml"];

        candidates
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Looks for configuration files in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let candidates = [".domain-probe.toml", "domain-probe.toml"];

        candidates
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-probe").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower), Some(higher)) => Some(DefaultsConfig {
                    concurrency: higher.concurrency.or(lower.concurrency),
                    timeout: higher.timeout.or(lower.timeout),
                    connect_timeout: higher.connect_timeout.or(lower.connect_timeout),
                    read_min_bytes: higher.read_min_bytes.or(lower.read_min_bytes),
                    ipv4_only: higher.ipv4_only.or(lower.ipv4_only),
                    accept_any_status: higher.accept_any_status.or(lower.accept_any_status),
                    schemes: higher.schemes.or(lower.schemes),
                }),
                (lower, higher) => higher.or(lower),
            },
            output: match (lower.output, higher.output) {
                (Some(lower), Some(higher)) => Some(OutputConfig {
                    default_format: higher.default_format.or(lower.default_format),
                    csv_headers: higher.csv_headers.or(lower.csv_headers),
                    json_pretty: higher.json_pretty.or(lower.json_pretty),
                }),
                (lower, higher) => higher.or(lower),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DomainProbeError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > 500 {
                    return Err(DomainProbeError::config(
                        "Concurrency must be between 1 and 500",
                    ));
                }
            }

            for (name, value) in [
                ("timeout", &defaults.timeout),
                ("connect_timeout", &defaults.connect_timeout),
            ] {
                if let Some(value) = value {
                    if parse_duration(value).is_none() {
                        return Err(DomainProbeError::config(format!(
                            "Invalid {} '{}'. Use format like '500ms', '5s', '2m'",
                            name, value
                        )));
                    }
                }
            }

            if let Some(schemes) = &defaults.schemes {
                if schemes.is_empty() {
                    return Err(DomainProbeError::config("schemes cannot be empty"));
                }
                parse_schemes(schemes).map_err(DomainProbeError::config)?;
            }
        }

        if let Some(output) = &config.output {
            if let Some(format) = &output.default_format {
                if !matches!(format.as_str(), "text" | "json" | "csv" | "alive") {
                    return Err(DomainProbeError::config(format!(
                        "Unknown output format '{}', use text, json, csv or alive",
                        format
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
///
/// This represents configuration values that can be set via DP_* environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub concurrency: Option<usize>,
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub read_min_bytes: Option<usize>,
    pub ipv4_only: Option<bool>,
    pub accept_any_status: Option<bool>,
    pub json: Option<bool>,
    pub csv: Option<bool>,
    pub file: Option<String>,
    pub config: Option<String>,
}

impl EnvConfig {
    /// Apply environment values on top of a probe config.
    pub fn apply_to(&self, mut config: ProbeConfig) -> ProbeConfig {
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(timeout) = self.connect_timeout {
            config.connect_timeout = timeout;
        }
        if let Some(bytes) = self.read_min_bytes {
            config.read_min_bytes = bytes;
        }
        if let Some(ipv4_only) = self.ipv4_only {
            config.ipv4_only = ipv4_only;
        }
        if let Some(any_status) = self.accept_any_status {
            config.accept_any_status = any_status;
        }
        config
    }

    /// Check if output format conflicts exist (JSON and CSV both set).
    pub fn has_output_format_conflict(&self) -> bool {
        matches!((self.json, self.csv), (Some(true), Some(true)))
    }
}

/// Load configuration from environment variables.
///
/// Parses all DP_* environment variables. Invalid values are logged as
/// warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    load_env_config_from(|key| env::var(key).ok())
}

/// Same as [`load_env_config`] with an injectable variable source.
pub fn load_env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    EnvConfig {
        concurrency: env_value(&lookup, "DP_CONCURRENCY", "a number from 1 to 500", |v| {
            v.parse::<usize>().ok().filter(|c| (1..=500).contains(c))
        }),
        timeout: env_value(&lookup, "DP_TIMEOUT", "a duration like '8s'", parse_duration),
        connect_timeout: env_value(
            &lookup,
            "DP_CONNECT_TIMEOUT",
            "a duration like '3s'",
            parse_duration,
        ),
        read_min_bytes: env_value(&lookup, "DP_READ_MIN_BYTES", "a byte count", |v| {
            v.parse::<usize>().ok()
        }),
        ipv4_only: env_value(&lookup, "DP_IPV4_ONLY", "true/false", parse_bool),
        accept_any_status: env_value(&lookup, "DP_ANY_STATUS", "true/false", parse_bool),
        json: env_value(&lookup, "DP_JSON", "true/false", parse_bool),
        csv: env_value(&lookup, "DP_CSV", "true/false", parse_bool),
        file: env_value(&lookup, "DP_FILE", "a file path", non_empty),
        config: env_value(&lookup, "DP_CONFIG", "a file path", non_empty),
    }
}

fn env_value<F, T, P>(lookup: &F, key: &str, expected: &str, parse: P) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    let raw = lookup(key)?;
    match parse(raw.trim()) {
        Some(value) => {
            debug!("Using {}={}", key, raw);
            Some(value)
        }
        None => {
            warn!("Ignoring invalid {}='{}', expected {}", key, raw, expected);
            None
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse a list of scheme names.
pub fn parse_schemes(names: &[String]) -> Result<Vec<Scheme>, String> {
    names.iter().map(|name| name.parse::<Scheme>()).collect()
}

/// Parse a duration like "500ms", "5s", "1.5s", "2m", or bare seconds.
///
/// Returns `None` for malformed, negative, or zero values.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim().to_lowercase();

    let (number, scale) = if let Some(ms) = value.strip_suffix("ms") {
        (ms, 0.001)
    } else if let Some(s) = value.strip_suffix('s') {
        (s, 1.0)
    } else if let Some(m) = value.strip_suffix('m') {
        (m, 60.0)
    } else {
        (value.as_str(), 1.0)
    };

    let seconds = number.trim().parse::<f64>().ok()? * scale;
    if seconds > 0.0 {
        Duration::try_from_secs_f64(seconds).ok()
    } else {
        None
    }
}
