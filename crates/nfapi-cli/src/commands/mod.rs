//! CLI commands

pub mod completions;
pub mod config;
pub mod driver;
pub mod start;

use clap::Subcommand;

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start redirecting traffic (runs until Ctrl-C)
    Start(start::StartArgs),

    /// netfilter2 driver management
    Driver {
        #[command(subcommand)]
        command: driver::DriverCommands,
    },

    /// Configuration management
    Config(config::ConfigArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
