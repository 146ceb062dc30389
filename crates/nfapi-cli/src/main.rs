//! nfapi CLI
//!
//! Command-line front end for the netfilter2 driver and Redirector.dll.

mod args;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use tracing::error;

use args::Args;
use commands::Command;

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init(&args)?;

    if !args.quiet && !args.no_banner && !matches!(args.command, Command::Completions(_)) {
        print_banner();
    }

    let result = run(args);

    if let Err(ref e) = result {
        error!("Fatal error: {:#}", e);
    }

    result
}

fn run(args: Args) -> Result<()> {
    let config = args.config.as_deref();

    match args.command {
        Command::Start(start_args) => commands::start::execute(start_args, config),
        Command::Driver { command } => commands::driver::run(command, config),
        Command::Config(config_args) => commands::config::execute(config_args, config),
        Command::Completions(comp_args) => commands::completions::execute(comp_args),
    }
}

fn print_banner() {
    use colored::Colorize;

    println!();
    println!(
        "{} {}",
        "nfapi".green().bold(),
        env!("CARGO_PKG_VERSION").white()
    );
    println!("{}", "process traffic redirection via netfilter2".cyan());
    println!();
}
