//! Shell resolution order and argument shapes, through the public API.

use pushgate_runner::{ShellKind, resolve};

fn stem(executable: &str) -> String {
    let name = executable.rsplit(['/', '\\']).next().unwrap_or(executable);
    name.to_ascii_lowercase().trim_end_matches(".exe").to_string()
}

#[test]
fn direct_bash_invocation_is_unwrapped() {
    let inv = resolve(None, "bash -lc \"echo hi\"", None);
    assert_eq!(stem(&inv.executable), "bash");
    assert_eq!(inv.args, vec!["-lc", "echo hi"]);
}

#[test]
fn chained_direct_invocation_runs_whole_line_in_a_shell() {
    let command = "sh -c 'exit 0' && exit 3";
    let inv = resolve(None, command, Some("bash"));
    assert_eq!(stem(&inv.executable), "bash");
    assert_eq!(inv.args, vec!["-lc", command]);

    #[cfg(unix)]
    {
        let inv = resolve(None, command, None);
        assert_eq!(inv.executable, "sh");
        assert_eq!(inv.args, vec!["-c", command]);
    }
}

#[test]
fn preferred_pwsh_gets_noninteractive_flags() {
    let inv = resolve(Some("pwsh"), "Get-ChildItem", None);
    assert_eq!(inv.executable, "pwsh");
    assert_eq!(
        inv.args,
        vec!["-NoProfile", "-NonInteractive", "-Command", "Get-ChildItem"]
    );
}

#[test]
fn cmd_fallback_always_uses_cmd_exe() {
    let inv = resolve(None, "echo hi", Some("cmd"));
    assert_eq!(inv.executable, "cmd.exe");
    assert_eq!(inv.args, vec!["/C", "echo hi"]);

    let inv = resolve(None, "echo hi", Some("C:\\Windows\\System32\\CMD.EXE"));
    assert_eq!(inv.executable, "cmd.exe");
}

#[test]
fn quoted_shell_path_with_prefix_args() {
    let inv = resolve(
        Some("\"C:\\Program Files\\PowerShell\\7\\pwsh.exe\" -NoLogo"),
        "Invoke-Build",
        None,
    );
    assert_eq!(inv.executable, "C:\\Program Files\\PowerShell\\7\\pwsh.exe");
    assert_eq!(
        inv.args,
        vec![
            "-NoLogo",
            "-NoProfile",
            "-NonInteractive",
            "-Command",
            "Invoke-Build"
        ]
    );
    assert_eq!(ShellKind::from_executable(&inv.executable), ShellKind::Pwsh);
}

#[test]
fn unknown_shell_receives_command_verbatim() {
    let inv = resolve(Some("fish -N"), "make && make check", None);
    assert_eq!(inv.executable, "fish");
    assert_eq!(inv.args, vec!["-N", "make && make check"]);
}

#[test]
fn no_preference_no_direct_no_fallback_uses_os_default() {
    let inv = resolve(None, "make test", None);
    if cfg!(windows) {
        assert_eq!(inv.executable, "cmd.exe");
        assert_eq!(inv.args, vec!["/C", "make test"]);
    } else {
        assert_eq!(inv.executable, "sh");
        assert_eq!(inv.args, vec!["-c", "make test"]);
    }
}
