//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Initializes tracing
//! - Creates the tokio runtime
//! - Dispatches to command handlers
//! - Handles all error output

use clap::Parser;

use super::args::{Cli, Commands};
use super::commands::{self, RunArgs};

use pushgate_utils::error::PushgateError;
use pushgate_utils::exit_codes::ExitCode;
use pushgate_utils::logging::init_tracing;

/// Main CLI execution function.
///
/// This function handles ALL output including errors. It returns `Result<(), ExitCode>`:
/// - On success: returns `Ok(())` after printing any output
/// - On failed checks or errors: returns `Err(ExitCode)`
///
/// main.rs only calls `std::process::exit(code.as_i32())` on error - it does NOT print.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    // A subscriber may already be installed when embedded; keep going.
    let _ = init_tracing(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let config_path = cli.config;
    let verbose = cli.verbose;
    let result = rt.block_on(async {
        match cli.command {
            Commands::Run {
                fail_fast,
                jobs,
                log_dir,
                tail,
                only,
                json,
                no_banter,
            } => {
                let args = RunArgs {
                    fail_fast,
                    jobs,
                    log_dir,
                    tail,
                    only,
                    json,
                    no_banter,
                };
                commands::execute_run_command(config_path, verbose, args).await
            }
            Commands::List { json } => commands::execute_list_command(config_path, json),
            Commands::Explain { log, tail } => commands::execute_explain_command(&log, tail),
            Commands::Install { force } => commands::execute_install_command(force),
            Commands::Uninstall => commands::execute_uninstall_command(),
        }
    });

    match result {
        Ok(code) if code.is_success() => Ok(()),
        Ok(code) => Err(code),
        Err(error) => {
            if let Some(pushgate_error) = error.downcast_ref::<PushgateError>() {
                eprintln!("{}", pushgate_error.display_for_user());
                Err(pushgate_error.to_exit_code())
            } else {
                eprintln!("✗ Unexpected error: {error:#}");
                Err(ExitCode::INTERNAL)
            }
        }
    }
}
