//! Small text helpers shared by the runner, classifier and CLI.

/// Convert CRLF and lone CR line endings to LF.
#[must_use]
pub fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Return the last `n` lines of `text`, joined with `\n`.
///
/// Newlines are normalized first and trailing blank lines are dropped before
/// counting, so `"1\n2\n3\n4\n5\n\n"` with `n = 2` yields `"4\n5"`.
#[must_use]
pub fn tail_lines(text: &str, n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    let normalized = normalize_newlines(text);
    let mut lines: Vec<&str> = normalized.split('\n').collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tail_lines_basic() {
        assert_eq!(tail_lines("1\n2\n3\n4\n5\n", 2), "4\n5");
    }

    #[test]
    fn test_tail_lines_strips_trailing_blank_lines() {
        assert_eq!(tail_lines("a\nb\n\n  \n\n", 1), "b");
    }

    #[test]
    fn test_tail_lines_line_ending_styles_agree() {
        let lf = tail_lines("1\n2\n3\n4\n5\n", 2);
        assert_eq!(tail_lines("1\r\n2\r\n3\r\n4\r\n5\r\n", 2), lf);
        assert_eq!(tail_lines("1\r2\r3\r4\r5\r", 2), lf);
    }

    #[test]
    fn test_tail_lines_short_input() {
        assert_eq!(tail_lines("only", 10), "only");
        assert_eq!(tail_lines("", 3), "");
        assert_eq!(tail_lines("x\n", 0), "");
    }

    proptest! {
        #[test]
        fn prop_tail_lines_never_exceeds_n(text in "[a-z\\n\\r]{0,200}", n in 1usize..20) {
            let tail = tail_lines(&text, n);
            prop_assert!(tail.split('\n').count() <= n);
            prop_assert!(!tail.contains('\r'));
        }
    }
}
