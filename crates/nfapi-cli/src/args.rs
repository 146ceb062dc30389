//! Command-line argument parsing

use crate::commands::Command;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// nfapi - process-based traffic redirection
///
/// Installs the netfilter2 kernel driver and drives Redirector.dll to send
/// the traffic of selected processes to a proxy.
#[derive(Parser, Debug)]
#[command(name = "nfapi")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true, env = "NFAPI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format for logs
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Log file path
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Don't print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// Compact format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::driver::DriverCommands;

    #[test]
    fn test_verbose() {
        let args = Args::parse_from(["nfapi", "-v", "driver", "status"]);
        assert_eq!(args.verbose, 1);

        let args = Args::parse_from(["nfapi", "driver", "status", "-vvv"]);
        assert_eq!(args.verbose, 3);
    }

    #[test]
    fn test_driver_install_force() {
        let args = Args::parse_from(["nfapi", "driver", "install", "--force"]);
        match args.command {
            Command::Driver {
                command: DriverCommands::Install { force },
            } => assert!(force),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_start_overrides() {
        let args = Args::parse_from([
            "nfapi",
            "--log-format",
            "json",
            "start",
            "--host",
            "10.0.0.2",
            "--port",
            "7890",
            "--handle",
            "chrome.exe",
            "--handle",
            "firefox.exe",
            "--bypass",
            "svchost.exe",
        ]);
        assert_eq!(args.log_format, LogFormat::Json);
        let Command::Start(start) = args.command else {
            panic!("expected start");
        };
        assert_eq!(start.host.as_deref(), Some("10.0.0.2"));
        assert_eq!(start.port, Some(7890));
        assert_eq!(start.handle, ["chrome.exe", "firefox.exe"]);
        assert_eq!(start.bypass, ["svchost.exe"]);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["nfapi"]).is_err());
    }
}
