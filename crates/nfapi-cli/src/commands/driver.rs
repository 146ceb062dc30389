//! Driver management commands

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use nfapi_core::config::DriverConfig;
use nfapi_core::{DriverAction, DriverStatus, NetFilter};
use std::path::Path;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum DriverCommands {
    /// Install the bundled netfilter2 driver
    Install {
        /// Reinstall even if the installed driver is current
        #[arg(short, long)]
        force: bool,
    },

    /// Stop, unregister and delete the installed driver
    Uninstall,

    /// Show bundled and installed driver versions
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Install, upgrade or downgrade so the installed driver matches the bundled one
    Check,
}

pub fn run(cmd: DriverCommands, config_path: Option<&Path>) -> Result<()> {
    let config = super::config::load(config_path)?;

    match cmd {
        DriverCommands::Status { json } => {
            show_status(&nfapi_platform::driver_manager(&config.driver).status(), json)
        }
        DriverCommands::Install { force } => install_driver(&open(&config.driver)?, force),
        DriverCommands::Uninstall => uninstall_driver(&open(&config.driver)?),
        DriverCommands::Check => check_driver(&open(&config.driver)?),
    }
}

fn open(config: &DriverConfig) -> Result<NetFilter> {
    nfapi_platform::open_netfilter(config).context("Failed to load the redirector library")
}

/// What `driver install` has to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InstallStep {
    Current,
    Install,
    Reinstall,
}

/// Refuses to proceed without a usable bundled driver, so an installed one is
/// never removed without a replacement.
fn install_step(status: &DriverStatus, force: bool) -> Result<InstallStep> {
    if status.bundled_version.is_none() {
        bail!(
            "Bundled driver {} is missing or has no version information",
            status.paths.bundled.display()
        );
    }
    if !status.installed {
        return Ok(InstallStep::Install);
    }
    if status.action == Some(DriverAction::Keep) && !force {
        return Ok(InstallStep::Current);
    }
    Ok(InstallStep::Reinstall)
}

fn install_driver(netfilter: &NetFilter, force: bool) -> Result<()> {
    let status = netfilter.driver_status();

    match install_step(&status, force)? {
        InstallStep::Current => {
            println!("{} netfilter2 is already installed at:", "✓".green());
            println!("  {}", status.paths.system.display());
            println!("\nUse --force to reinstall.");
            return Ok(());
        }
        InstallStep::Install => {
            println!("Installing netfilter2 driver...");
            netfilter.install_driver().context("Driver installation failed")?;
        }
        InstallStep::Reinstall => {
            println!("Replacing installed driver...");
            netfilter
                .reinstall_driver()
                .context("Driver reinstallation failed")?;
        }
    }

    println!("{} netfilter2 installed successfully!", "✓".green());
    Ok(())
}

fn uninstall_driver(netfilter: &NetFilter) -> Result<()> {
    if !netfilter.driver_status().installed {
        println!("netfilter2 is not installed.");
        return Ok(());
    }

    netfilter
        .uninstall_driver()
        .context("Driver uninstallation failed")?;
    println!("{} netfilter2 uninstalled successfully!", "✓".green());
    Ok(())
}

fn check_driver(netfilter: &NetFilter) -> Result<()> {
    let action = netfilter.check_driver().context("Driver check failed")?;
    info!(action = %action, "Driver check complete");

    match action {
        DriverAction::Keep => println!("{} netfilter2 is up to date", "✓".green()),
        action => println!("{} netfilter2 driver: {}", "✓".green(), action),
    }
    Ok(())
}

fn show_status(status: &DriverStatus, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&status_json(status))?);
        return Ok(());
    }

    println!("\nnetfilter2 Driver Status\n");

    println!("Files:");
    print_file(
        "Bundled",
        &status.paths.bundled,
        status.bundled_version.is_some(),
        &status.bundled_version,
    );
    print_file(
        "Installed",
        &status.paths.system,
        status.installed,
        &status.installed_version,
    );

    println!();
    match status.action {
        Some(DriverAction::Keep) => println!("Status: {} Ready", "✓".green()),
        Some(action) => println!("Status: {} {} pending", "⚠".yellow(), action),
        None => {
            println!("Status: {} Cannot compare driver versions", "✗".red());
            if status.bundled_version.is_none() {
                println!("\nBundled driver not found, set driver.bundled_path in the config.");
            }
        }
    }
    println!();
    Ok(())
}

fn print_file(label: &str, path: &Path, present: bool, version: &Option<String>) {
    match (present, version) {
        (true, Some(version)) => {
            println!("  {} {:<9} {} ({})", "✓".green(), label, path.display(), version)
        }
        (true, None) => println!(
            "  {} {:<9} {} (version unreadable)",
            "⚠".yellow(),
            label,
            path.display()
        ),
        (false, _) => println!("  {} {:<9} {} (not found)", "✗".red(), label, path.display()),
    }
}

fn status_json(status: &DriverStatus) -> serde_json::Value {
    serde_json::json!({
        "bundled": {
            "path": status.paths.bundled.display().to_string(),
            "version": status.bundled_version,
        },
        "installed": {
            "path": status.paths.system.display().to_string(),
            "present": status.installed,
            "version": status.installed_version,
        },
        "action": status.action.map(|a| a.to_string()),
    })
}
