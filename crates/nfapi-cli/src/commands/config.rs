//! Config command - configuration management

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use nfapi_core::Config;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File names searched in the working directory, in order
const LOCAL_CANDIDATES: [&str; 2] = ["nfapi.toml", "config.toml"];

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Generate a configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "nfapi.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Config file to validate (default: detect)
        file: Option<PathBuf>,
    },

    /// Show config file locations
    Paths,
}

/// Execute config command
pub fn execute(args: ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    match args.action {
        ConfigAction::Show => show_config(config_path),
        ConfigAction::Generate { output, force } => generate_config(&output, force),
        ConfigAction::Validate { file } => validate_config(file.as_deref().or(config_path)),
        ConfigAction::Paths => show_paths(),
    }
}

/// Load `path`, or the first config file found, or the defaults.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    match path {
        Some(path) => {
            let config = Config::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            info!(path = %path.display(), "Loaded configuration");
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

fn show_config(path: Option<&Path>) -> Result<()> {
    let mut config = load(path)?;
    if config.target.password.is_some() {
        config.target.password = Some("********".to_string());
    }

    let toml_str = config.to_toml().context("Failed to serialize config")?;
    println!("{}", toml_str);
    Ok(())
}

/// Sample configuration written by `config generate`
pub fn sample() -> Result<String> {
    let mut config = Config::default();
    config.rules.handle = vec!["chrome.exe".to_string(), "firefox.exe".to_string()];
    config.rules.bypass = vec!["svchost.exe".to_string()];

    let toml_str = config.to_toml().context("Failed to serialize config")?;
    Ok(format!(
        "# nfapi configuration\n\
         # Rules are process name patterns in C++ regular expression syntax.\n\
         # Set target.username and target.password together to authenticate.\n\n\
         {}",
        toml_str
    ))
}

fn generate_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists, use --force to overwrite",
            output.display()
        );
    }

    std::fs::write(output, sample()?)
        .with_context(|| format!("Failed to write config to {}", output.display()))?;

    info!(path = %output.display(), "Generated config file");
    println!("Configuration file generated: {}", output.display());
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(find_config_file)
        .context("No config file given and none found")?;

    let config = Config::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.validate().context("Configuration validation failed")?;

    println!("{} Configuration is valid", "✓".green());
    println!("  Target: {}:{}", config.target.host, config.target.port);
    println!(
        "  Rules: {} handled, {} bypassed",
        config.rules.handle.len(),
        config.rules.bypass.len()
    );
    println!("  HTTP proxy mode: {}", config.general.http_proxy);
    println!("  Bundled driver: {}", config.driver.bundled_path.display());
    Ok(())
}

fn show_paths() -> Result<()> {
    println!("Configuration file search paths:");
    println!();

    for (i, name) in LOCAL_CANDIDATES.iter().enumerate() {
        println!("  {}. ./{}", i + 1, name);
    }
    if let Some(path) = user_config_file() {
        println!("  {}. {}", LOCAL_CANDIDATES.len() + 1, path.display());
    }

    Ok(())
}

fn user_config_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "nfapi")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn find_config_file() -> Option<PathBuf> {
    LOCAL_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .chain(user_config_file())
        .find(|path| path.exists())
}
