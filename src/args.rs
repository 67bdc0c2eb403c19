//! Command-line argument parsing and processing.
//!
//! This module handles parsing of command-line arguments and provides a clean
//! interface for the main application logic. It supports the standard help,
//! version, and debug flags while gracefully handling unknown options.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the supervisor with these settings
    Run {
        debug_enabled: bool,
        dry_run: bool,
        config_path: Option<String>,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    ///
    /// # Returns
    /// ParsedArgs containing the determined action
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut dry_run = false;
        let mut config_path: Option<String> = None;
        let mut display_help = false;
        let mut display_version = false;
        let mut unknown_arg_found = false;

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut idx = 0;
        while idx < args_vec.len() {
            match args_vec[idx].as_str() {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--dry-run" | "-n" => dry_run = true,
                "--config" | "-c" => {
                    if idx + 1 < args_vec.len() {
                        config_path = Some(args_vec[idx + 1].clone());
                        idx += 1;
                    } else {
                        log_warning!("--config requires a file path argument");
                        unknown_arg_found = true;
                    }
                }
                other => {
                    log_warning!("Unknown argument: {}", other);
                    unknown_arg_found = true;
                }
            }
            idx += 1;
        }

        let action = if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else if display_help {
            CliAction::ShowHelp
        } else if display_version {
            CliAction::ShowVersion
        } else {
            CliAction::Run {
                debug_enabled,
                dry_run,
                config_path,
            }
        };

        ParsedArgs { action }
    }
}

/// Print usage information through the logger.
pub fn display_help() {
    log_version!();
    log_block_start!("Usage: matrixd [OPTIONS]");
    log_indented!("-c, --config <FILE>  Path to the configuration file");
    log_indented!("-n, --dry-run        Log actuator commands instead of executing them");
    log_indented!("-d, --debug          Enable debug output (overrides logging.level)");
    log_indented!("-h, --help           Print this help and exit");
    log_indented!("-V, --version        Print version and exit");
    log_block_start!("Without --config, matrixd reads /etc/matrixd/matrixd.toml,");
    log_indented!("falling back to $XDG_CONFIG_HOME/matrixd/matrixd.toml.");
    log_end!();
}

/// Print the version header.
pub fn display_version() {
    log_version!();
    log_end!();
}
