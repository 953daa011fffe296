//! Classification of realistic tool transcripts.

use proptest::prelude::*;
use pushgate_classify::{MAX_SUMMARY_CHARS, classify, headline, why};

#[test]
fn go_test_transcript() {
    let out = "=== RUN   TestWidget\n    widget_test.go:14: got 3, want 4\n--- FAIL: TestWidget (0.00s)\nFAIL\nFAIL\texample.com/widget\t0.004s\n";
    assert_eq!(headline(out), "Test failed: TestWidget");
    assert_eq!(why(out), "go test: TestWidget failed");
}

#[test]
fn cargo_test_transcript() {
    let out = "\
running 3 tests
test config::tests::parses ... ok
test config::tests::rejects_empty ... FAILED
test util::tail ... ok

failures:

---- config::tests::rejects_empty stdout ----
thread 'config::tests::rejects_empty' panicked at src/config.rs:88:9:
assertion failed: result.is_err()

test result: FAILED. 2 passed; 1 failed; 0 ignored
";
    assert_eq!(headline(out), "Test failed: config::tests::rejects_empty");
    assert_eq!(why(out), "cargo test: config::tests::rejects_empty failed");
}

#[test]
fn pytest_short_summary() {
    let out = "\
=========================== short test summary info ============================
FAILED tests/test_cart.py::test_total - assert 10 == 12
========================= 1 failed, 14 passed in 0.52s =========================
";
    assert_eq!(headline(out), "Test failed: tests/test_cart.py::test_total");
    assert_eq!(
        why(out),
        "pytest: tests/test_cart.py::test_total failed - assert 10 == 12"
    );
}

#[test]
fn cargo_build_error() {
    let out = "\
   Compiling app v0.1.0 (/work/app)
error[E0599]: no method named `frob` found for struct `Widget` in the current scope
  --> src/widget.rs:31:14
   |
31 |         self.frob();
   |              ^^^^ method not found in `Widget`

error: could not compile `app` (bin \"app\") due to 1 previous error
";
    assert_eq!(
        headline(out),
        "Compile error: no method named `frob` found for struct `Widget` in the current scope"
    );
    assert_eq!(
        why(out),
        "rustc: no method named `frob` found for struct `Widget` in the current scope (at src/widget.rs:31:14)"
    );
}

#[test]
fn eslint_stylish_output() {
    let out = "\
> web@1.0.0 lint
> eslint src

/work/web/src/App.tsx
  12:10  warning  'useMemo' is defined but never used  @typescript-eslint/no-unused-vars
  40:5   error    Unexpected console statement         no-console

✖ 2 problems (1 error, 1 warning)
";
    let diagnosis = classify(out).unwrap();
    assert_eq!(
        diagnosis.headline,
        "Lint warning: 'useMemo' is defined but never used"
    );
    assert!(diagnosis.why.starts_with("eslint: 'useMemo' is defined but never used"));
    assert!(diagnosis.why.ends_with("(at /work/web/src/App.tsx:12:10)"));
}

#[test]
fn npm_missing_script() {
    let out = "npm error Missing script: \"typecheck\"\nnpm error\nnpm error To see a list of scripts, run:\n";
    assert_eq!(headline(out), "Missing script: typecheck");
    assert_eq!(why(out), "npm: missing script \"typecheck\"");
}

#[test]
fn windows_line_endings_from_tsc() {
    let out = "src/index.ts(3,7): error TS2322: Type 'number' is not assignable to type 'string'.\r\n";
    assert_eq!(
        why(out),
        "tsc: Type 'number' is not assignable to type 'string'. (at src/index.ts:3:7)"
    );
}

proptest! {
    #[test]
    fn summaries_never_exceed_limit(name in "[A-Za-z0-9_]{1,400}", noise in "[ -~\\n]{0,200}") {
        let out = format!("{noise}\n--- FAIL: {name} (0.00s)\n");
        let h = headline(&out);
        let w = why(&out);
        prop_assert!(h.chars().count() <= MAX_SUMMARY_CHARS);
        prop_assert!(w.chars().count() <= MAX_SUMMARY_CHARS);
        prop_assert!(h.starts_with("Test failed: "));
        prop_assert!(w.starts_with("go test: "));
    }

    #[test]
    fn classification_never_panics(out in "\\PC{0,300}") {
        let _ = classify(&out);
    }
}
