//! Terminal display logic for domain-probe CLI.
//!
//! This module handles all human-facing output: colored result lines,
//! grouped output, the live progress counter, headers, and summaries.
//! Uses only the `console` crate.

use console::{pad_str, style, Alignment, Term};
use domain_probe_lib::{FailureKind, ProbeResult};
use std::time::Duration;

use crate::FailureStats;

// ── Progress ─────────────────────────────────────────────────────────────────

/// Single-line progress counter on stderr so stdout stays clean.
///
/// Does nothing when stderr is not a terminal.
pub struct Progress {
    term: Option<Term>,
}

impl Progress {
    pub fn start(enabled: bool) -> Self {
        let term = Term::stderr();
        Self {
            term: (enabled && term.is_term()).then_some(term),
        }
    }

    /// Redraw the counter line.
    pub fn update(&self, completed: usize, total: usize, reachable: usize) {
        if let Some(term) = &self.term {
            let _ = term.clear_line();
            let _ = term.write_str(&progress_line(completed, total, reachable));
        }
    }

    /// Clear the counter line.
    pub fn finish(self) {
        if let Some(term) = &self.term {
            let _ = term.clear_line();
        }
    }
}

fn progress_line(completed: usize, total: usize, reachable: usize) -> String {
    format!(
        "{} {}/{} - {} {}",
        style("Completed").dim(),
        completed,
        total,
        style("Reachable:").dim(),
        style(reachable).green(),
    )
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a pretty run.
pub fn print_header(domain_count: usize, concurrency: usize, timeout: Duration) {
    println!(
        "{} {} {}",
        style("domain-probe").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- Probing {} domain{}",
            domain_count,
            if domain_count == 1 { "" } else { "s" }
        ))
        .dim(),
    );

    let meta_parts = [
        format!("Concurrency: {}", concurrency),
        format!("Timeout: {:.1}s", timeout.as_secs_f64()),
    ];
    println!("{}", style(meta_parts.join(" | ")).dim());
    println!();
}

// ── Single result line ───────────────────────────────────────────────────────

/// Format and print a single probe result with colors and alignment.
///
/// If `counter` is Some((current, total)), a progress prefix like `[3/8]` is shown.
pub fn print_result(result: &ProbeResult, debug: bool, counter: Option<(usize, usize)>) {
    let domain_width = 36;
    let padded_domain = pad_str(&result.domain, domain_width, Alignment::Left, Some(".."));

    let prefix = match counter {
        Some((cur, total)) => {
            format!("{} ", style(format!("[{}/{}]", cur, total)).dim())
        }
        None => String::new(),
    };

    if result.reachable {
        println!(
            "  {}{}  {}  {}",
            prefix,
            style(&padded_domain).white(),
            style("REACHABLE").green().bold(),
            style(answer_detail(result)).dim(),
        );
    } else {
        println!(
            "  {}{}  {}  {}",
            prefix,
            style(&padded_domain).white(),
            style("UNREACHABLE").red().bold(),
            style(brief_failure(result)).dim(),
        );
    }

    if debug {
        print_debug_line(result, "    ");
    }
}

// ── Grouped output ───────────────────────────────────────────────────────────

/// Print results grouped by status: Reachable, then Unreachable.
/// Empty sections are omitted entirely.
pub fn print_grouped_results(results: &[ProbeResult], debug: bool) {
    let (reachable, unreachable): (Vec<&ProbeResult>, Vec<&ProbeResult>) =
        results.iter().partition(|r| r.reachable);

    if !reachable.is_empty() {
        println!(
            "  {} {}",
            style(format!("── Reachable ({}) ", reachable.len()))
                .green()
                .bold(),
            style("─".repeat(40)).green().dim(),
        );
        for r in &reachable {
            print_grouped_line(r, debug);
        }
        println!();
    }

    if !unreachable.is_empty() {
        println!(
            "  {} {}",
            style(format!("── Unreachable ({}) ", unreachable.len()))
                .red()
                .bold(),
            style("─".repeat(38)).red().dim(),
        );
        for r in &unreachable {
            print_grouped_line(r, debug);
        }
        println!();
    }
}

/// Print a single line inside a grouped section.
fn print_grouped_line(result: &ProbeResult, debug: bool) {
    let padded = pad_str(&result.domain, 36, Alignment::Left, Some(".."));

    let detail = if result.reachable {
        answer_detail(result)
    } else {
        brief_failure(result).to_string()
    };
    println!("    {}  {}", style(&padded).white(), style(detail).dim());

    if debug {
        print_debug_line(result, "      ");
    }
}

fn print_debug_line(result: &ProbeResult, indent: &str) {
    if let Some(duration) = result.check_duration {
        let mut line = format!("Probed in {}ms", duration.as_millis());
        if let Some(ttfb) = result.time_to_first_byte {
            line.push_str(&format!(", first byte after {}ms", ttfb.as_millis()));
        }
        println!("{}{} {}", indent, style("└─").dim(), line);
    }
    if let Some(message) = &result.error_message {
        println!("{}{} {}", indent, style("└─").dim(), style(message).dim());
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar with colored counts.
pub fn print_summary(total: usize, reachable: usize, unreachable: usize, duration: Duration) {
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} domain{} in {:.1}s  {}  {}  {}  {}",
        style(total).bold(),
        if total == 1 { "" } else { "s" },
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} reachable", reachable)).green(),
        style("|").dim(),
        style(format!("{} unreachable", unreachable)).red(),
    );
}

// ── Failure summary ──────────────────────────────────────────────────────────

/// Print a categorized summary of why domains were unreachable.
pub fn print_failure_summary(stats: &FailureStats) {
    if !stats.has_failures() {
        return;
    }

    println!("  {}", style("Unreachable domains by cause:").yellow());

    for (label, domains) in stats.categories() {
        println!(
            "  {} {} {}: {}",
            style("•").dim(),
            domains.len(),
            label,
            format_domain_list(domains, 5),
        );
    }
}

/// Join a domain list, truncating after `max_show` entries.
pub fn format_domain_list(domains: &[String], max_show: usize) -> String {
    if domains.len() <= max_show {
        domains.join(", ")
    } else {
        let shown = &domains[..max_show];
        let remaining = domains.len() - max_show;
        format!("{}, ... and {} more", shown.join(", "), remaining)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Status code and scheme of the answering response, e.g. "https 200".
fn answer_detail(result: &ProbeResult) -> String {
    match (result.scheme, result.status_code) {
        (Some(scheme), Some(status)) => format!("{} {}", scheme, status),
        (Some(scheme), None) => scheme.to_string(),
        (None, Some(status)) => status.to_string(),
        (None, None) => String::new(),
    }
}

/// Extract a brief failure reason from an unreachable result.
pub(crate) fn brief_failure(result: &ProbeResult) -> &'static str {
    match result.failure {
        Some(FailureKind::InvalidDomain) => "(invalid domain)",
        Some(FailureKind::Dns) => "(dns error)",
        Some(FailureKind::Connect) => "(connection failed)",
        Some(FailureKind::Timeout) => "(timeout)",
        Some(FailureKind::HttpStatus) => "(bad status)",
        Some(FailureKind::EmptyBody) => "(empty body)",
        Some(FailureKind::Redirect) => "(redirect loop)",
        Some(FailureKind::Request) => "(request error)",
        None => "(unknown)",
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use domain_probe_lib::Scheme;

    fn make_result(domain: &str, failure: Option<FailureKind>) -> ProbeResult {
        match failure {
            Some(kind) => ProbeResult::unreachable(domain, kind, "boom"),
            None => ProbeResult {
                domain: domain.to_string(),
                reachable: true,
                status_code: Some(200),
                scheme: Some(Scheme::Https),
                failure: None,
                error_message: None,
                check_duration: Some(Duration::from_millis(120)),
                time_to_first_byte: Some(Duration::from_millis(80)),
            },
        }
    }

    #[test]
    fn test_brief_failure() {
        assert_eq!(
            brief_failure(&make_result("a.com", Some(FailureKind::Timeout))),
            "(timeout)"
        );
        assert_eq!(
            brief_failure(&make_result("a.com", Some(FailureKind::Dns))),
            "(dns error)"
        );
        assert_eq!(brief_failure(&make_result("a.com", None)), "(unknown)");
    }

    #[test]
    fn test_answer_detail() {
        assert_eq!(answer_detail(&make_result("a.com", None)), "https 200");
        assert_eq!(
            answer_detail(&make_result("a.com", Some(FailureKind::Connect))),
            ""
        );
    }

    #[test]
    fn test_format_domain_list_truncates() {
        let domains: Vec<String> = (0..8).map(|i| format!("d{}.com", i)).collect();
        let formatted = format_domain_list(&domains, 5);
        assert!(formatted.starts_with("d0.com, d1.com"));
        assert!(formatted.ends_with("... and 3 more"));
        assert_eq!(format_domain_list(&domains[..2], 5), "d0.com, d1.com");
    }

    #[test]
    fn test_progress_line_contents() {
        console::set_colors_enabled(false);
        assert_eq!(progress_line(3, 10, 2), "Completed 3/10 - Reachable: 2");
    }

    #[test]
    fn test_progress_disabled_is_silent() {
        let progress = Progress::start(false);
        progress.update(1, 2, 1);
        progress.finish();
    }
}
