//! Recognise commands that already spell out their shell.
//!
//! `bash -lc "make test"` in a config should run bash with `-lc` and the
//! script `make test`, not `sh -c 'bash -lc "make test"'`. Only bash, sh,
//! pwsh and powershell are recognised.

use crate::shell::ShellKind;

/// A shell invocation found at the start of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectInvocation {
    pub kind: ShellKind,
    /// The shell token with quotes removed (`bash`, `/usr/bin/bash`, `pwsh.exe`)
    pub shell_token: String,
    /// Options, command flag, script and trailing arguments in order
    pub args: Vec<String>,
}

/// Characters that only mean something to an outer shell: control
/// operators, redirections, subshells and expansions.
const SHELL_SYNTAX: &[char] = &['&', '|', ';', '<', '>', '(', ')', '$', '`'];

/// One shell word of the command text.
struct Word<'a> {
    /// Unquoted value.
    value: String,
    /// The word as written, quotes included.
    raw: &'a str,
    /// Text after the word.
    rest: &'a str,
}

/// Read the first shell word of `text`. `None` when `text` is blank, a quote
/// is unterminated, or the word starts a comment.
fn next_word(text: &str) -> Option<Word<'_>> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    let ends = text
        .char_indices()
        .filter(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()));

    // The word ends at the first whitespace that leaves its quotes balanced.
    for end in ends {
        let raw = &text[..end];
        let Ok(mut tokens) = shell_words::split(raw) else {
            continue;
        };
        if tokens.len() != 1 {
            return None;
        }
        // Unquoted words keep their backslashes so Windows paths survive.
        let value = if raw.contains(['"', '\'']) {
            tokens.remove(0)
        } else {
            raw.to_string()
        };
        return Some(Word {
            value,
            raw,
            rest: &text[end..],
        });
    }
    None
}

/// Whether `raw` holds an operator or expansion outside of quotes.
///
/// Each syntax character is swapped for two letters around a space. Inside
/// quotes the space stays part of the word, outside it splits the word.
fn has_shell_syntax(raw: &str) -> bool {
    if !raw.contains(SHELL_SYNTAX) {
        return false;
    }
    let mut marked = String::with_capacity(raw.len() * 3);
    for c in raw.chars() {
        if SHELL_SYNTAX.contains(&c) {
            marked.push_str("x x");
        } else {
            marked.push(c);
        }
    }
    !matches!(shell_words::split(&marked), Ok(tokens) if tokens.len() == 1)
}

/// Next word, refusing words the outer shell would interpret.
fn plain_word(text: &str) -> Option<Word<'_>> {
    next_word(text).filter(|word| !has_shell_syntax(word.raw))
}

/// `-c`, `-lc`, `-ec`, `-xlc`: a short-option cluster that contains `c`.
fn is_posix_command_flag(token: &str) -> bool {
    match token.strip_prefix('-') {
        Some(letters) if !letters.is_empty() && !letters.starts_with('-') => {
            letters.chars().all(|c| c.is_ascii_alphabetic()) && letters.contains('c')
        }
        _ => false,
    }
}

fn is_powershell_command_flag(token: &str) -> bool {
    token.eq_ignore_ascii_case("-command") || token.eq_ignore_ascii_case("-c")
}

/// Parse `command` as `<shell> [options] <flag> <script> [extra...]`.
///
/// Returns `None` when the first token is not a recognised shell, no command
/// flag is found, the script is empty, a quote is unterminated, or anything
/// outside a quoted script needs an outer shell (`sh -c 'make' && exit 3`).
/// Such commands then run whole under the fallback or default shell.
#[must_use]
pub fn parse_direct_invocation(command: &str) -> Option<DirectInvocation> {
    let shell = plain_word(command)?;
    let kind = ShellKind::from_executable(&shell.value);
    let is_flag: fn(&str) -> bool = match kind {
        ShellKind::Bash | ShellKind::Sh => is_posix_command_flag,
        ShellKind::Pwsh | ShellKind::PowerShell => is_powershell_command_flag,
        _ => return None,
    };

    let mut args = Vec::new();
    let mut rest = shell.rest;
    loop {
        let option = plain_word(rest)?;
        // `bash script.sh` runs a file, not inline text.
        if !option.value.starts_with('-') {
            return None;
        }
        rest = option.rest;
        let found = is_flag(&option.value);
        args.push(option.value);
        if found {
            break;
        }
    }

    let rest = rest.trim();
    if rest.starts_with(['"', '\'']) {
        let script = plain_word(rest)?;
        if script.value.trim().is_empty() {
            return None;
        }
        args.push(script.value);
        let mut rest = script.rest;
        while !rest.trim().is_empty() {
            let extra = plain_word(rest)?;
            rest = extra.rest;
            args.push(extra.value);
        }
    } else {
        // A bare script is the rest of the line, operators included.
        if rest.is_empty() {
            return None;
        }
        args.push(rest.to_string());
    }

    Some(DirectInvocation {
        kind,
        shell_token: shell.value,
        args,
    })
}
