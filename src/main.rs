//! Binary entry point: argument parsing and dispatch.
//!
//! All daemon logic lives in the library; this file only turns the command
//! line into a `Matrixd` run and maps fatal errors to an exit code.

use matrixd::args::{display_help, display_version, CliAction, ParsedArgs};
use matrixd::constants::EXIT_FAILURE;
use matrixd::log_error_exit;
use matrixd::Matrixd;

fn main() {
    let parsed = ParsedArgs::parse(std::env::args());

    match parsed.action {
        CliAction::Run {
            debug_enabled,
            dry_run,
            config_path,
        } => {
            let mut runner = Matrixd::new(debug_enabled).with_config_path(config_path);
            if dry_run {
                runner = runner.dry_run();
            }
            if let Err(e) = runner.run() {
                log_error_exit!("Fatal error: {:#}", e);
                std::process::exit(EXIT_FAILURE);
            }
        }
        CliAction::ShowHelp => display_help(),
        CliAction::ShowVersion => display_version(),
        CliAction::ShowHelpDueToError => {
            display_help();
            std::process::exit(EXIT_FAILURE);
        }
    }
}
