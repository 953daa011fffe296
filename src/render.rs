//! Human and JSON rendering of run results.

use crossterm::style::Stylize;
use pushgate_classify::{Diagnosis, classify};
use pushgate_engine::{CheckStatus, ProgressSink, RunReport};
use pushgate_utils::text::tail_lines;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Mutex;

/// Prints one line per check start and finish to stderr.
pub struct TerminalProgress {
    total: usize,
    color: bool,
    // Serialises lines from concurrently running checks.
    out: Mutex<()>,
}

impl TerminalProgress {
    #[must_use]
    pub fn new(total: usize, color: bool) -> Self {
        Self {
            total,
            color,
            out: Mutex::new(()),
        }
    }

    fn emit(&self, line: &str) {
        let _guard = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{line}");
    }
}

impl ProgressSink for TerminalProgress {
    fn check_started(&self, index: usize, name: &str) {
        self.emit(&format!("[{}/{}] {name} ...", index + 1, self.total));
    }

    fn check_finished(&self, index: usize, name: &str, status: &CheckStatus) {
        let line = format_status(index, self.total, name, status, self.color);
        self.emit(&line);
    }
}

fn format_status(
    index: usize,
    total: usize,
    name: &str,
    status: &CheckStatus,
    color: bool,
) -> String {
    let position = format!("[{}/{total}]", index + 1);
    let (mark, detail) = match status {
        CheckStatus::Passed => (paint("✓", Tone::Good, color), String::new()),
        CheckStatus::Failed { exit_code } => (
            paint("✗", Tone::Bad, color),
            format!(" (exit {exit_code})"),
        ),
        CheckStatus::Skipped { reason } => {
            (paint("-", Tone::Muted, color), format!(" skipped: {reason}"))
        }
    };
    format!("{position} {mark} {name}{detail}")
}

#[derive(Clone, Copy)]
enum Tone {
    Good,
    Bad,
    Muted,
    Strong,
}

fn paint(text: &str, tone: Tone, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match tone {
        Tone::Good => text.green().to_string(),
        Tone::Bad => text.red().bold().to_string(),
        Tone::Muted => text.dark_grey().to_string(),
        Tone::Strong => text.bold().to_string(),
    }
}

/// Plain-text report: a summary line, then each failure with its diagnosis,
/// output tail and kept log, then the skip reasons.
#[must_use]
pub fn render_report(report: &RunReport, tail: usize, color: bool) -> String {
    let mut out = String::new();

    for name in &report.failures {
        let exit_code = report.exit_codes.get(name).copied().unwrap_or(1);
        out.push_str(&paint(
            &format!("── {name} (exit {exit_code}) ──"),
            Tone::Bad,
            color,
        ));
        out.push('\n');

        let output = report.tails.get(name).map(String::as_str).unwrap_or("");
        if let Some(diagnosis) = classify(output) {
            out.push_str(&paint(&diagnosis.headline, Tone::Strong, color));
            out.push('\n');
            out.push_str(&format!("why: {}\n", diagnosis.why));
        }

        let excerpt = tail_lines(output, tail);
        if !excerpt.is_empty() {
            for line in excerpt.lines() {
                out.push_str(&format!("  {line}\n"));
            }
        }
        if let Some(path) = report.log_files.get(name) {
            out.push_str(&format!("log: {}\n", path.display()));
        }
        out.push('\n');
    }

    for name in &report.skipped {
        let reason = report.skip_reasons.get(name).map(String::as_str).unwrap_or("");
        out.push_str(&paint(&format!("skipped {name}: {reason}"), Tone::Muted, color));
        out.push('\n');
    }

    out.push_str(&summary_line(report, color));
    out.push('\n');
    out
}

fn summary_line(report: &RunReport, color: bool) -> String {
    let counts = format!(
        "{} passed, {} failed, {} skipped",
        report.passed.len(),
        report.failures.len(),
        report.skipped.len()
    );
    if report.is_success() {
        paint(&format!("✓ {counts}"), Tone::Good, color)
    } else {
        paint(&format!("✗ {counts}"), Tone::Bad, color)
    }
}

/// JSON document for `run --json`.
#[derive(Debug, Serialize)]
pub struct JsonRun<'a> {
    pub success: bool,
    #[serde(flatten)]
    pub report: &'a RunReport,
    /// Classified failures, by check name.
    pub diagnoses: BTreeMap<&'a str, Diagnosis>,
}

impl<'a> JsonRun<'a> {
    #[must_use]
    pub fn new(report: &'a RunReport) -> Self {
        let diagnoses = report
            .failures
            .iter()
            .filter_map(|name| {
                let output = report.tails.get(name)?;
                classify(output).map(|d| (name.as_str(), d))
            })
            .collect();
        Self {
            success: report.is_success(),
            report,
            diagnoses,
        }
    }
}
