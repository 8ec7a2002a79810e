//! # Domain Probe Library
//!
//! A fast library for finding out which domains in a list answer HTTP(S)
//! probes.
//!
//! Each domain is requested over `https` and then `http`, with connect and
//! total timeouts, and is classified reachable or unreachable. Probes run
//! concurrently over a bounded pool; batch results come back in input order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_probe_lib::{DomainList, DomainProber};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let prober = DomainProber::new()?;
//!     let list = DomainList::from_file("domains.txt")?;
//!     let report = prober.probe_list(&list).await;
//!
//!     for result in report.reachable() {
//!         println!("{}", result.domain);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Bounded concurrency**: at most `concurrency` probes in flight
//! - **Scheme fallback**: `https` first, `http` when the transport fails
//! - **Never fatal**: every domain yields exactly one result
//! - **Configurable**: TOML config files and `DP_*` environment variables

// Re-export main public API types and functions
pub use config::{
    load_env_config, load_env_config_from, parse_duration, parse_schemes, ConfigManager,
    DefaultsConfig, EnvConfig, FileConfig, OutputConfig,
};
pub use error::DomainProbeError;
pub use list::DomainList;
pub use prober::DomainProber;
pub use types::{FailureKind, ProbeConfig, ProbeReport, ProbeResult, Scheme};
pub use utils::{normalize_domain_line, validate_domain};

// Internal modules - these are not part of the public API
mod concurrent;
mod config;
mod error;
mod list;
mod prober;
mod protocols;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainProbeError>;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
