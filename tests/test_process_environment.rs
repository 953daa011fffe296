//! Tests that touch process-wide state (environment variables and the
//! current directory). They run serially.
#![cfg(unix)]

use pushgate::config::{CheckSpec, CliOverrides, Config};
use pushgate::engine::{Dispatcher, NoProgress, RunOptions};
use serial_test::serial;
use std::env;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    dir
}

#[tokio::test]
#[serial]
async fn checks_inherit_and_override_process_environment() {
    let root = repo();
    unsafe {
        env::set_var("PUSHGATE_TEST_INHERITED", "from-parent");
        env::set_var("PUSHGATE_TEST_REPLACED", "parent");
    }

    let spec = CheckSpec::new(
        "env",
        "echo \"$PUSHGATE_TEST_INHERITED $PUSHGATE_TEST_REPLACED\"; exit 1",
    )
    .with_env("PUSHGATE_TEST_REPLACED", "check");
    let options = RunOptions {
        log_dir: Some(root.path().join("logs")),
        ..RunOptions::default()
    };
    let report = Dispatcher::new(root.path(), options)
        .run_all(&[spec], Arc::new(NoProgress))
        .await
        .unwrap();

    unsafe {
        env::remove_var("PUSHGATE_TEST_INHERITED");
        env::remove_var("PUSHGATE_TEST_REPLACED");
    }
    assert_eq!(report.tails["env"], "from-parent check\n");
}

#[test]
#[serial]
fn discover_starts_from_current_directory() {
    let root = repo();
    fs::write(
        root.path().join(".pushgate.toml"),
        "[[checks]]\nname = \"fmt\"\nrun = \"cargo fmt --check\"\n",
    )
    .unwrap();
    let nested = root.path().join("src").join("deep");
    fs::create_dir_all(&nested).unwrap();

    let previous = env::current_dir().unwrap();
    env::set_current_dir(&nested).unwrap();
    let result = Config::discover(&CliOverrides::default());
    env::set_current_dir(previous).unwrap();

    let config = result.unwrap();
    assert_eq!(
        config.repo_root.canonicalize().unwrap(),
        root.path().canonicalize().unwrap()
    );
    assert_eq!(config.checks.len(), 1);
    assert_eq!(config.checks[0].name, "fmt");
}
