//! Failure-output classification.
//!
//! [`headline`] and [`why`] turn the captured tail of a failing check into
//! a short statement of what went wrong. Both are pure: they can be called
//! again later on a saved log without re-running anything.
//!
//! ```rust
//! use pushgate_classify::{headline, why};
//!
//! let out = "--- FAIL: TestWidget (0.00s)\nFAIL\n";
//! assert_eq!(headline(out), "Test failed: TestWidget");
//! assert_eq!(why(out), "go test: TestWidget failed");
//! assert_eq!(headline("nothing to see"), "");
//! ```

mod patterns;

use patterns::{Labeled, RULES};
use pushgate_utils::text::normalize_newlines;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Maximum length, in characters, of a headline or why string.
pub const MAX_SUMMARY_CHARS: usize = 140;

/// Appended when a summary was cut short.
pub const TRUNCATION_MARKER: char = '…';

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b(?:\[[0-?]*[ -/]*[@-~]|\][^\x07\x1b]*(?:\x07|\x1b\\)|[@-Z\\-_])").unwrap()
});

/// Both summaries for one output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub headline: String,
    pub why: String,
}

/// Remove terminal colour and cursor control sequences.
#[must_use]
pub fn strip_ansi(text: &str) -> String {
    if !text.contains('\x1b') {
        return text.to_string();
    }
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// Run the rule list over `output`. `None` when nothing is recognised.
#[must_use]
pub fn classify(output: &str) -> Option<Diagnosis> {
    let cleaned = strip_ansi(&normalize_newlines(output));
    let lines: Vec<&str> = cleaned.split('\n').collect();
    let finding = RULES.iter().find_map(|rule| rule(&lines))?;
    Some(Diagnosis {
        headline: render(&finding.headline),
        why: render(&finding.why),
    })
}

/// Short single-fact summary, or `""` when nothing is recognised.
#[must_use]
pub fn headline(output: &str) -> String {
    classify(output).map(|d| d.headline).unwrap_or_default()
}

/// Tool-qualified summary with location when known, or `""`.
#[must_use]
pub fn why(output: &str) -> String {
    classify(output).map(|d| d.why).unwrap_or_default()
}

fn render(labeled: &Labeled) -> String {
    truncate_labeled(&labeled.prefix, &labeled.body, MAX_SUMMARY_CHARS)
}

/// Join `prefix` and `body`, cutting `body` so the result fits in `max`
/// characters including the marker. The prefix is kept whole unless it
/// alone leaves no room for any of the body.
#[must_use]
pub fn truncate_labeled(prefix: &str, body: &str, max: usize) -> String {
    let prefix_len = prefix.chars().count();
    let body_len = body.chars().count();
    if prefix_len + body_len <= max {
        return format!("{prefix}{body}");
    }
    if max == 0 {
        return String::new();
    }

    if prefix_len + 2 > max {
        let mut cut: String = prefix.chars().chain(body.chars()).take(max - 1).collect();
        cut.push(TRUNCATION_MARKER);
        return cut;
    }

    let room = max - 1 - prefix_len;
    let kept: String = body.chars().take(room).collect();
    format!("{prefix}{}{TRUNCATION_MARKER}", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_headline_exact() {
        assert_eq!(
            headline("--- FAIL: TestWidget (0.00s)\nFAIL\n"),
            "Test failed: TestWidget"
        );
    }

    #[test]
    fn test_empty_and_unrecognised_input() {
        assert_eq!(headline(""), "");
        assert_eq!(why(""), "");
        assert_eq!(headline("all good\nnothing here\n"), "");
        assert_eq!(classify("just text"), None);
    }

    #[test]
    fn test_crlf_and_cr_inputs_classify_the_same() {
        let lf = "running\ntest a::b ... FAILED\n";
        let crlf = "running\r\ntest a::b ... FAILED\r\n";
        let cr = "running\rtest a::b ... FAILED\r";
        assert_eq!(headline(crlf), headline(lf));
        assert_eq!(headline(cr), headline(lf));
        assert_eq!(why(cr), "cargo test: a::b failed");
    }

    #[test]
    fn test_ansi_sequences_are_ignored() {
        let out = "\x1b[31m--- FAIL: TestColor\x1b[0m (0.01s)\n";
        assert_eq!(headline(out), "Test failed: TestColor");
        assert_eq!(strip_ansi("\x1b]0;title\x07plain"), "plain");
        assert_eq!(strip_ansi("\x1b[1;32mok\x1b[0m"), "ok");
    }

    #[test]
    fn test_rule_priority_beats_line_order() {
        // The generic error line comes first, but test failures rank higher.
        let out = "error: something earlier\n--- FAIL: TestLater (0.00s)\n";
        assert_eq!(headline(out), "Test failed: TestLater");
    }

    #[test]
    fn test_truncation_keeps_prefix_and_marker() {
        let long = "x".repeat(500);
        let out = format!("error: {long}\n");
        let h = headline(&out);
        let w = why(&out);
        assert_eq!(h.chars().count(), MAX_SUMMARY_CHARS);
        assert!(h.starts_with("Error: x"));
        assert!(h.ends_with(TRUNCATION_MARKER));
        assert!(w.starts_with("error: x"));
        assert_eq!(w.chars().count(), MAX_SUMMARY_CHARS);
    }

    #[test]
    fn test_truncate_labeled_edges() {
        assert_eq!(truncate_labeled("p: ", "short", 140), "p: short");
        assert_eq!(truncate_labeled("p: ", "abcdef", 7), "p: abc…");
        assert_eq!(truncate_labeled("p: ", "abc   def", 8), "p: abc…");
        assert_eq!(truncate_labeled("long prefix: ", "body", 6), "long …");
        assert_eq!(truncate_labeled("a", "b", 0), "");
    }

    #[test]
    fn test_multibyte_truncation_counts_chars() {
        let body = "ü".repeat(200);
        let t = truncate_labeled("jest: ", &body, 20);
        assert_eq!(t.chars().count(), 20);
        assert!(t.starts_with("jest: ü"));
    }
}
