//! Start command - run a redirection session until interrupted

use anyhow::{Context, Result};
use clap::Args;
use nfapi_core::{Config, NetFilter, RuleSet, TrafficStats};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Start command arguments
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Proxy host
    #[arg(long)]
    pub host: Option<String>,

    /// Proxy port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Process pattern to redirect (repeatable)
    #[arg(long = "handle", value_name = "PATTERN")]
    pub handle: Vec<String>,

    /// Process pattern never to redirect (repeatable)
    #[arg(long = "bypass", value_name = "PATTERN")]
    pub bypass: Vec<String>,

    /// Rules file, one pattern per line, `!` marks a bypass pattern
    #[arg(long, value_name = "FILE")]
    pub rules_file: Option<PathBuf>,

    /// Proxy username
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    /// Proxy password
    #[arg(long, requires = "username", env = "NFAPI_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Redirect to the local HTTP proxy process listening on the port
    #[arg(long)]
    pub http_proxy: bool,

    /// Bundled driver file
    #[arg(long, value_name = "PATH")]
    pub driver: Option<PathBuf>,

    /// Directory containing Redirector.dll
    #[arg(long, value_name = "DIR")]
    pub library_dir: Option<PathBuf>,

    /// Enable native redirector logging
    #[arg(long)]
    pub print_log: bool,

    /// Seconds between traffic reports
    #[arg(long, default_value = "10", value_name = "SECS")]
    pub stats_interval: u64,
}

/// Execute the start command
pub fn execute(args: StartArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = super::config::load(config_path)?;
    apply_overrides(&mut config, &args)?;
    config.validate().context("Invalid configuration")?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received interrupt signal, shutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
    runtime.block_on(run_session(config, args.stats_interval, running))
}

async fn run_session(config: Config, stats_interval: u64, running: Arc<AtomicBool>) -> Result<()> {
    let netfilter = nfapi_platform::open_netfilter(&config.driver)
        .context("Failed to load the redirector library")?;

    if config.general.print_log && !netfilter.enable_log(true) {
        warn!("Redirector rejected the print-log option");
    }

    let session = config.session();
    netfilter
        .start(&session)
        .await
        .context("Failed to start redirector")?;
    info!(
        proxy = %format!("{}:{}", session.host, session.port),
        "Redirecting traffic, press Ctrl-C to stop"
    );

    let interval = Duration::from_secs(stats_interval.max(1));
    let result = wait_for_interrupt(&netfilter, interval, &running).await;

    netfilter.stop().await.context("Failed to stop redirector")?;
    report(&netfilter.traffic());
    result
}

async fn wait_for_interrupt(
    netfilter: &NetFilter,
    interval: Duration,
    running: &AtomicBool,
) -> Result<()> {
    let tick = Duration::from_millis(200);
    let mut elapsed = Duration::ZERO;

    while running.load(Ordering::SeqCst) {
        tokio::time::sleep(tick).await;
        elapsed += tick;
        if elapsed >= interval {
            elapsed = Duration::ZERO;
            report(&netfilter.traffic());
        }
    }
    Ok(())
}

fn report(stats: &TrafficStats) {
    info!(
        uploaded = stats.uploaded,
        downloaded = stats.downloaded,
        "Traffic"
    );
}

/// Fold command-line values over the loaded configuration
fn apply_overrides(config: &mut Config, args: &StartArgs) -> Result<()> {
    if let Some(ref host) = args.host {
        config.target.host = host.clone();
    }
    if let Some(port) = args.port {
        config.target.port = port;
    }
    if args.username.is_some() {
        config.target.username = args.username.clone();
        config.target.password = args.password.clone();
    }
    if args.http_proxy {
        config.general.http_proxy = true;
    }
    if args.print_log {
        config.general.print_log = true;
    }
    if let Some(ref driver) = args.driver {
        config.driver.bundled_path = driver.clone();
    }
    if let Some(ref dir) = args.library_dir {
        config.driver.library_dir = Some(dir.clone());
    }

    if let Some(ref path) = args.rules_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;
        let rules = RuleSet::from_lines(&content);
        info!(path = %path.display(), count = rules.len(), "Loaded rules file");
        config.rules.extend(rules);
    }
    config.rules.extend(RuleSet::new(args.handle.clone(), args.bypass.clone()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_target() {
        let mut config = Config::default();
        let args = StartArgs {
            host: Some("proxy.example.com".into()),
            port: Some(8080),
            username: Some("user".into()),
            password: Some("secret".into()),
            http_proxy: true,
            ..Default::default()
        };

        apply_overrides(&mut config, &args).unwrap();

        let session = config.session();
        assert_eq!(session.host, "proxy.example.com");
        assert_eq!(session.port, 8080);
        assert!(session.http_proxy);
        assert!(session.dialable_credentials().is_some());
    }

    #[test]
    fn test_rules_append_after_config_rules() {
        let dir = tempfile::tempdir().unwrap();
        let rules_file = dir.path().join("rules.txt");
        std::fs::write(&rules_file, "# browsers\nfirefox.exe\n!svchost.exe\n").unwrap();

        let mut config = Config::default();
        config.rules.handle.push("chrome.exe".into());
        let args = StartArgs {
            handle: vec!["curl.exe".into()],
            bypass: vec!["steam.exe".into()],
            rules_file: Some(rules_file),
            ..Default::default()
        };

        apply_overrides(&mut config, &args).unwrap();

        assert_eq!(config.rules.handle, ["chrome.exe", "firefox.exe", "curl.exe"]);
        assert_eq!(config.rules.bypass, ["svchost.exe", "steam.exe"]);
    }

    #[test]
    fn test_missing_rules_file() {
        let mut config = Config::default();
        let args = StartArgs {
            rules_file: Some(PathBuf::from("does-not-exist.txt")),
            ..Default::default()
        };
        assert!(apply_overrides(&mut config, &args).is_err());
    }

    #[test]
    fn test_no_flags_leave_config_untouched() {
        let mut config = Config::default();
        apply_overrides(&mut config, &StartArgs::default()).unwrap();
        assert_eq!(config, Config::default());
    }
}
