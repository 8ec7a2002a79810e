//! Report rendering for files and structured output.
//!
//! Everything here returns plain strings without terminal styling so the
//! same text can go to stdout or to an `--output` file.

use domain_probe_lib::{ProbeReport, ProbeResult};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

use crate::ui::brief_failure;

/// Report format selected from flags, environment or config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
    Alive,
}

impl OutputFormat {
    /// Parse a `default_format` value from a config file.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "alive" => Some(Self::Alive),
            _ => None,
        }
    }

    pub fn is_structured(self) -> bool {
        !matches!(self, Self::Text)
    }
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    reachable: usize,
    unreachable: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: JsonSummary,
    results: &'a [ProbeResult],
}

/// Render the report as a JSON document with a summary block.
pub fn render_json(report: &ProbeReport, pretty: bool) -> serde_json::Result<String> {
    let document = JsonReport {
        summary: JsonSummary {
            total: report.len(),
            reachable: report.reachable_count(),
            unreachable: report.unreachable_count(),
            duration_ms: report.duration.map(|d| d.as_millis() as u64),
        },
        results: &report.results,
    };

    if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
}

/// Render results as CSV, one row per domain.
pub fn render_csv(results: &[ProbeResult], headers: bool) -> String {
    let mut out = String::new();
    if headers {
        out.push_str("domain,reachable,status_code,scheme,failure,duration_ms,error\n");
    }

    for result in results {
        let fields = [
            csv_field(&result.domain),
            result.reachable.to_string(),
            result
                .status_code
                .map(|s| s.to_string())
                .unwrap_or_default(),
            result.scheme.map(|s| s.to_string()).unwrap_or_default(),
            result.failure.map(|f| f.to_string()).unwrap_or_default(),
            result
                .check_duration
                .map(|d| d.as_millis().to_string())
                .unwrap_or_default(),
            csv_field(result.error_message.as_deref().unwrap_or("")),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

/// Quote a CSV field when it contains a separator, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Reachable domain names only, one per line.
pub fn render_alive(results: &[ProbeResult]) -> String {
    results
        .iter()
        .filter(|r| r.reachable)
        .map(|r| format!("{}\n", r.domain))
        .collect()
}

/// Unstyled text report: one line per domain plus the summary line.
pub fn render_text(report: &ProbeReport) -> String {
    let mut out = String::new();

    for result in &report.results {
        if result.reachable {
            let status = result
                .status_code
                .map(|s| s.to_string())
                .unwrap_or_default();
            let scheme = result.scheme.map(|s| s.to_string()).unwrap_or_default();
            out.push_str(&format!(
                "{}\tREACHABLE\t{} {}\n",
                result.domain, scheme, status
            ));
        } else {
            out.push_str(&format!(
                "{}\tUNREACHABLE\t{}\n",
                result.domain,
                brief_failure(result)
            ));
        }
    }

    out.push_str(&summary_line(report));
    out.push('\n');
    out
}

/// One-line summary, e.g. `3 domains: 2 reachable, 1 unreachable`.
pub fn summary_line(report: &ProbeReport) -> String {
    format!(
        "{} domain{}: {} reachable, {} unreachable",
        report.len(),
        if report.len() == 1 { "" } else { "s" },
        report.reachable_count(),
        report.unreachable_count(),
    )
}

/// Render the report in the requested format.
pub fn render(
    report: &ProbeReport,
    format: OutputFormat,
    json_pretty: bool,
    csv_headers: bool,
) -> serde_json::Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Json => {
            let mut json = render_json(report, json_pretty)?;
            json.push('\n');
            json
        }
        OutputFormat::Csv => render_csv(&report.results, csv_headers),
        OutputFormat::Alive => render_alive(&report.results),
    })
}

/// Write a rendered report to `path`, replacing any existing file.
pub fn write_report<P: AsRef<Path>>(path: P, contents: &str) -> io::Result<()> {
    fs::write(path, contents)
}
