//! Recognisers for known tool output formats.
//!
//! Each rule scans every line and reports the first line it understands.
//! [`RULES`] fixes the order rules are tried in; the first rule with a match
//! wins even if a later rule matches an earlier line.

use regex::Regex;
use std::sync::LazyLock;

/// How far below a file line the linter rule looks for its entries.
const LINT_LOOKAHEAD: usize = 6;

/// How far below a diagnostic the location lookups reach.
const LOCATION_LOOKAHEAD: usize = 8;

/// One half of a rendered diagnosis: a label that must survive truncation
/// and the text after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Labeled {
    pub prefix: String,
    pub body: String,
}

impl Labeled {
    fn new(prefix: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            body: body.into(),
        }
    }
}

/// What a rule extracted from the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Finding {
    pub headline: Labeled,
    pub why: Labeled,
}

type Rule = fn(&[&str]) -> Option<Finding>;

/// Rules in priority order.
pub(crate) const RULES: &[Rule] = &[
    go_test_failure,
    cargo_test_failure,
    pytest_failure,
    jest_failure,
    test_timeout,
    compiler_diagnostic,
    lint_block,
    generic_error_line,
    generic_location_line,
    tool_phrase,
];

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

static GO_FAIL: LazyLock<Regex> = LazyLock::new(|| re(r"^\s*--- FAIL: (\S+)"));
static CARGO_FAIL: LazyLock<Regex> = LazyLock::new(|| re(r"^\s*test (\S+) \.\.\. FAILED\s*$"));
static PYTEST_FAIL: LazyLock<Regex> =
    LazyLock::new(|| re(r"^FAILED (\S+)(?: - (.*\S))?\s*$"));
static JEST_BULLET: LazyLock<Regex> = LazyLock::new(|| re(r"^\s*● (.+ › .*\S)\s*$"));
static JEST_CROSS: LazyLock<Regex> =
    LazyLock::new(|| re(r"^\s*[✕×] (.*?\S)(?: \(\d+(?:\.\d+)? ?m?s\))?\s*$"));
static GO_TIMEOUT: LazyLock<Regex> = LazyLock::new(|| re(r"panic: test timed out after (\S+)"));
static JEST_TIMEOUT: LazyLock<Regex> = LazyLock::new(|| re(r"Exceeded timeout of (\d+) ?ms"));
static PYTEST_TIMEOUT: LazyLock<Regex> =
    LazyLock::new(|| re(r"Timeout >?(\d+(?:\.\d+)?)s\b"));
static CC_ERROR: LazyLock<Regex> = LazyLock::new(|| {
    re(
        r"^(?P<file>(?:[A-Za-z]:)?[^\s:][^:]*?):(?P<line>\d+)(?::(?P<col>\d+))?: (?:fatal )?error(?:\[[^\]]+\])?: (?P<msg>.*\S)\s*$",
    )
});
static TSC_PAREN: LazyLock<Regex> = LazyLock::new(|| {
    re(r"^(?P<file>\S.*?)\((?P<line>\d+),(?P<col>\d+)\): error (?:TS\d+): (?P<msg>.*\S)\s*$")
});
static TSC_PRETTY: LazyLock<Regex> = LazyLock::new(|| {
    re(r"^(?P<file>\S.*?):(?P<line>\d+):(?P<col>\d+) - error (?:TS\d+): (?P<msg>.*\S)\s*$")
});
static RUSTC_ERROR: LazyLock<Regex> =
    LazyLock::new(|| re(r"^error\[E\d+\]: (?P<msg>.*\S)\s*$"));
static RUSTC_ARROW: LazyLock<Regex> =
    LazyLock::new(|| re(r"^\s*--> (?P<loc>\S+:\d+:\d+)\s*$"));
static LINT_FILE: LazyLock<Regex> = LazyLock::new(|| re(r"^(?P<file>\S+\.[A-Za-z0-9]+)\s*$"));
static LINT_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    re(
        r"^\s+(?P<line>\d+):(?P<col>\d+)\s+(?P<sev>error|warning)\s+(?P<msg>.*?\S)(?:\s{2,}(?P<rule>[\w@/-]+))?\s*$",
    )
});
static GENERIC_ERROR: LazyLock<Regex> =
    LazyLock::new(|| re(r"^\s*(?P<kw>error|fatal|panic):\s*(?P<msg>.*\S)\s*$"));
static GENERIC_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    re(
        r"^(?P<file>(?:[A-Za-z]:)?[^\s:]+):(?P<line>\d+)(?::(?P<col>\d+))?:\s*(?P<msg>\S.*?)\s*$",
    )
});
static BLACK_REFORMAT: LazyLock<Regex> = LazyLock::new(|| re(r"^would reformat (.*\S)\s*$"));
static TERRAFORM_ERROR: LazyLock<Regex> =
    LazyLock::new(|| re(r"^\s*(?:│\s*)?Error: (?P<msg>.*\S)\s*$"));
static TERRAFORM_ON: LazyLock<Regex> =
    LazyLock::new(|| re(r"^\s*(?:│\s*)?on (?P<file>\S+) line (?P<line>\d+)"));
static NPM_MISSING: LazyLock<Regex> = LazyLock::new(|| re(r#"Missing script: "([^"]+)""#));

fn first_capture<'a>(lines: &[&'a str], regex: &Regex) -> Option<regex::Captures<'a>> {
    lines.iter().find_map(|line| regex.captures(*line))
}

fn location(file: &str, line: &str, col: Option<&str>) -> String {
    match col {
        Some(col) => format!("{file}:{line}:{col}"),
        None => format!("{file}:{line}"),
    }
}

fn test_failed(tool: &str, name: &str) -> Finding {
    Finding {
        headline: Labeled::new("Test failed: ", name),
        why: Labeled::new(format!("{tool}: "), format!("{name} failed")),
    }
}

fn go_test_failure(lines: &[&str]) -> Option<Finding> {
    let caps = first_capture(lines, &GO_FAIL)?;
    Some(test_failed("go test", &caps[1]))
}

fn cargo_test_failure(lines: &[&str]) -> Option<Finding> {
    let caps = first_capture(lines, &CARGO_FAIL)?;
    Some(test_failed("cargo test", &caps[1]))
}

fn pytest_failure(lines: &[&str]) -> Option<Finding> {
    let caps = first_capture(lines, &PYTEST_FAIL)?;
    let node = &caps[1];
    let mut finding = test_failed("pytest", node);
    if let Some(msg) = caps.get(2) {
        finding.why.body = format!("{node} failed - {}", msg.as_str());
    }
    Some(finding)
}

fn jest_failure(lines: &[&str]) -> Option<Finding> {
    let caps = first_capture(lines, &JEST_BULLET).or_else(|| first_capture(lines, &JEST_CROSS))?;
    Some(test_failed("jest", &caps[1]))
}

fn test_timeout(lines: &[&str]) -> Option<Finding> {
    let (tool, after) = if let Some(caps) = first_capture(lines, &GO_TIMEOUT) {
        ("go test", caps[1].to_string())
    } else if let Some(caps) = first_capture(lines, &JEST_TIMEOUT) {
        ("jest", format!("{} ms", &caps[1]))
    } else {
        let caps = first_capture(lines, &PYTEST_TIMEOUT)?;
        ("pytest", format!("{}s", &caps[1]))
    };
    Some(Finding {
        headline: Labeled::new("Test timed out ", format!("after {after}")),
        why: Labeled::new(format!("{tool}: "), format!("test timed out after {after}")),
    })
}

/// Tool name implied by a source file's extension.
fn compiler_for(file: &str) -> &'static str {
    let ext = file
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "rs" => "rustc",
        "go" => "go build",
        "ts" | "tsx" | "mts" | "cts" => "tsc",
        "c" | "h" => "cc",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => "c++",
        "java" => "javac",
        "swift" => "swiftc",
        "kt" => "kotlinc",
        _ => "compiler",
    }
}

fn compile_error(tool: &str, msg: &str, at: Option<String>) -> Finding {
    let body = match at {
        Some(at) => format!("{msg} (at {at})"),
        None => msg.to_string(),
    };
    Finding {
        headline: Labeled::new("Compile error: ", msg),
        why: Labeled::new(format!("{tool}: "), body),
    }
}

fn compiler_diagnostic(lines: &[&str]) -> Option<Finding> {
    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = CC_ERROR.captures(line) {
            let file = &caps["file"];
            let at = location(file, &caps["line"], caps.name("col").map(|m| m.as_str()));
            return Some(compile_error(compiler_for(file), &caps["msg"], Some(at)));
        }
        if let Some(caps) = TSC_PAREN.captures(line).or_else(|| TSC_PRETTY.captures(line)) {
            let at = location(&caps["file"], &caps["line"], Some(&caps["col"]));
            return Some(compile_error("tsc", &caps["msg"], Some(at)));
        }
        if let Some(caps) = RUSTC_ERROR.captures(line) {
            let at = lines
                .iter()
                .skip(i + 1)
                .take(LOCATION_LOOKAHEAD)
                .find_map(|l| RUSTC_ARROW.captures(l))
                .map(|c| c["loc"].to_string());
            return Some(compile_error("rustc", &caps["msg"], at));
        }
    }
    None
}

fn lint_block(lines: &[&str]) -> Option<Finding> {
    for (i, line) in lines.iter().enumerate() {
        let Some(file_caps) = LINT_FILE.captures(line) else {
            continue;
        };
        let entry = lines
            .iter()
            .skip(i + 1)
            .take(LINT_LOOKAHEAD)
            .find_map(|l| LINT_ENTRY.captures(l));
        let Some(caps) = entry else {
            continue;
        };

        let msg = &caps["msg"];
        let at = location(&file_caps["file"], &caps["line"], Some(&caps["col"]));
        let rule = caps
            .name("rule")
            .map(|r| format!(" [{}]", r.as_str()))
            .unwrap_or_default();
        let label = if &caps["sev"] == "error" {
            "Lint error: "
        } else {
            "Lint warning: "
        };
        return Some(Finding {
            headline: Labeled::new(label, msg),
            why: Labeled::new("eslint: ", format!("{msg}{rule} (at {at})")),
        });
    }
    None
}

fn generic_error_line(lines: &[&str]) -> Option<Finding> {
    let caps = first_capture(lines, &GENERIC_ERROR)?;
    let kw = &caps["kw"];
    let msg = &caps["msg"];
    let label = match kw {
        "fatal" => "Fatal: ",
        "panic" => "Panic: ",
        _ => "Error: ",
    };
    Some(Finding {
        headline: Labeled::new(label, msg),
        why: Labeled::new(format!("{kw}: "), msg),
    })
}

fn generic_location_line(lines: &[&str]) -> Option<Finding> {
    let caps = first_capture(lines, &GENERIC_LOCATION)?;
    let msg = &caps["msg"];
    let at = location(&caps["file"], &caps["line"], caps.name("col").map(|m| m.as_str()));
    Some(Finding {
        headline: Labeled::new("", msg),
        why: Labeled::new("", format!("{msg} (at {at})")),
    })
}

fn tool_phrase(lines: &[&str]) -> Option<Finding> {
    if let Some(caps) = first_capture(lines, &BLACK_REFORMAT) {
        let file = &caps[1];
        return Some(Finding {
            headline: Labeled::new("Needs formatting: ", file),
            why: Labeled::new("black: ", format!("would reformat {file}")),
        });
    }

    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = TERRAFORM_ERROR.captures(line) else {
            continue;
        };
        let msg = &caps["msg"];
        let at = lines
            .iter()
            .skip(i + 1)
            .take(LOCATION_LOOKAHEAD)
            .find_map(|l| TERRAFORM_ON.captures(l))
            .map(|c| format!("{}:{}", &c["file"], &c["line"]));
        let body = match at {
            Some(at) => format!("{msg} (at {at})"),
            None => msg.to_string(),
        };
        return Some(Finding {
            headline: Labeled::new("Terraform error: ", msg),
            why: Labeled::new("terraform: ", body),
        });
    }

    let caps = first_capture(lines, &NPM_MISSING)?;
    let script = &caps[1];
    Some(Finding {
        headline: Labeled::new("Missing script: ", script),
        why: Labeled::new("npm: ", format!("missing script \"{script}\"")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(rule: Rule, text: &str) -> Option<(String, String)> {
        let lines: Vec<&str> = text.lines().collect();
        rule(&lines).map(|f| {
            (
                format!("{}{}", f.headline.prefix, f.headline.body),
                format!("{}{}", f.why.prefix, f.why.body),
            )
        })
    }

    fn pair(h: &str, w: &str) -> Option<(String, String)> {
        Some((h.to_string(), w.to_string()))
    }

    #[test]
    fn test_rule_count_and_order_is_fixed() {
        assert_eq!(RULES.len(), 10);
    }

    #[test]
    fn test_go_failure() {
        assert_eq!(
            run(go_test_failure, "=== RUN TestA\n    --- FAIL: TestA/sub (0.01s)\n"),
            pair("Test failed: TestA/sub", "go test: TestA/sub failed")
        );
    }

    #[test]
    fn test_cargo_failure() {
        assert_eq!(
            run(cargo_test_failure, "running 2 tests\ntest parser::tests::empty ... FAILED\ntest ok ... ok\n"),
            pair("Test failed: parser::tests::empty", "cargo test: parser::tests::empty failed")
        );
    }

    #[test]
    fn test_pytest_failure_with_and_without_message() {
        assert_eq!(
            run(pytest_failure, "FAILED tests/test_api.py::test_get - AssertionError: 404 != 200\n"),
            pair(
                "Test failed: tests/test_api.py::test_get",
                "pytest: tests/test_api.py::test_get failed - AssertionError: 404 != 200"
            )
        );
        assert_eq!(
            run(pytest_failure, "FAILED tests/test_api.py::test_get\n"),
            pair(
                "Test failed: tests/test_api.py::test_get",
                "pytest: tests/test_api.py::test_get failed"
            )
        );
    }

    #[test]
    fn test_jest_bullet_and_cross() {
        assert_eq!(
            run(jest_failure, "  ● Cart › adds items\n\n    expect(received)\n"),
            pair("Test failed: Cart › adds items", "jest: Cart › adds items failed")
        );
        assert_eq!(
            run(jest_failure, "    ✕ renders title (12 ms)\n"),
            pair("Test failed: renders title", "jest: renders title failed")
        );
        assert_eq!(run(jest_failure, "  ● Test suite failed to run\n"), None);
    }

    #[test]
    fn test_timeouts() {
        assert_eq!(
            run(test_timeout, "panic: test timed out after 10m0s\n"),
            pair("Test timed out after 10m0s", "go test: test timed out after 10m0s")
        );
        assert_eq!(
            run(test_timeout, "thrown: \"Exceeded timeout of 5000 ms for a test.\n"),
            pair("Test timed out after 5000 ms", "jest: test timed out after 5000 ms")
        );
        assert_eq!(
            run(test_timeout, "E   Failed: Timeout >2.0s\n"),
            pair("Test timed out after 2.0s", "pytest: test timed out after 2.0s")
        );
    }

    #[test]
    fn test_compiler_single_line_forms() {
        assert_eq!(
            run(compiler_diagnostic, "main.c:12:5: error: expected ';' before 'return'\n"),
            pair(
                "Compile error: expected ';' before 'return'",
                "cc: expected ';' before 'return' (at main.c:12:5)"
            )
        );
        assert_eq!(
            run(compiler_diagnostic, "./pkg/x.go:7:2: fatal error: boom\n"),
            pair("Compile error: boom", "go build: boom (at ./pkg/x.go:7:2)")
        );
        assert_eq!(
            run(
                compiler_diagnostic,
                "src/app.ts(4,10): error TS2322: Type 'string' is not assignable to type 'number'.\n"
            ),
            pair(
                "Compile error: Type 'string' is not assignable to type 'number'.",
                "tsc: Type 'string' is not assignable to type 'number'. (at src/app.ts:4:10)"
            )
        );
        assert_eq!(
            run(compiler_diagnostic, "src/app.ts:4:10 - error TS2304: Cannot find name 'x'.\n"),
            pair(
                "Compile error: Cannot find name 'x'.",
                "tsc: Cannot find name 'x'. (at src/app.ts:4:10)"
            )
        );
    }

    #[test]
    fn test_rustc_error_with_arrow() {
        let out = "error[E0308]: mismatched types\n --> src/main.rs:4:18\n  |\n4 |     let x: u8 = \"a\";\n";
        assert_eq!(
            run(compiler_diagnostic, out),
            pair(
                "Compile error: mismatched types",
                "rustc: mismatched types (at src/main.rs:4:18)"
            )
        );
        assert_eq!(
            run(compiler_diagnostic, "error[E0425]: cannot find value `y`\n"),
            pair("Compile error: cannot find value `y`", "rustc: cannot find value `y`")
        );
    }

    #[test]
    fn test_lint_block() {
        let out = "\n/repo/src/index.js\n  3:7   error    'x' is assigned a value but never used  no-unused-vars\n\n✖ 1 problem\n";
        assert_eq!(
            run(lint_block, out),
            pair(
                "Lint error: 'x' is assigned a value but never used",
                "eslint: 'x' is assigned a value but never used [no-unused-vars] (at /repo/src/index.js:3:7)"
            )
        );
    }

    #[test]
    fn test_lint_block_respects_lookahead() {
        let mut out = String::from("src/a.js\n");
        for _ in 0..LINT_LOOKAHEAD {
            out.push_str("noise\n");
        }
        out.push_str("  1:1  error  late  semi\n");
        assert_eq!(run(lint_block, &out), None);
    }

    #[test]
    fn test_generic_error_is_case_sensitive() {
        assert_eq!(
            run(generic_error_line, "npm warn x\nerror: could not compile `app`\n"),
            pair("Error: could not compile `app`", "error: could not compile `app`")
        );
        assert_eq!(
            run(generic_error_line, "fatal: not a git repository\n"),
            pair("Fatal: not a git repository", "fatal: not a git repository")
        );
        assert_eq!(run(generic_error_line, "Error: capitalised\n"), None);
    }

    #[test]
    fn test_generic_location() {
        assert_eq!(
            run(generic_location_line, "lib/util.py:42: E501 line too long\n"),
            pair("E501 line too long", "E501 line too long (at lib/util.py:42)")
        );
        assert_eq!(
            run(generic_location_line, "C:\\src\\a.c:3:1: warning: odd\n"),
            pair("warning: odd", "warning: odd (at C:\\src\\a.c:3:1)")
        );
    }

    #[test]
    fn test_tool_phrases() {
        assert_eq!(
            run(tool_phrase, "would reformat src/app.py\nOh no! 💥\n"),
            pair("Needs formatting: src/app.py", "black: would reformat src/app.py")
        );
        assert_eq!(
            run(
                tool_phrase,
                "╷\n│ Error: Unsupported argument\n│\n│   on main.tf line 12, in resource \"x\" \"y\":\n"
            ),
            pair(
                "Terraform error: Unsupported argument",
                "terraform: Unsupported argument (at main.tf:12)"
            )
        );
        assert_eq!(
            run(tool_phrase, "npm ERR! Missing script: \"lint\"\n"),
            pair("Missing script: lint", "npm: missing script \"lint\"")
        );
    }
}
