//! Error types for nfapi-core
//!
//! Centralized error handling using `thiserror` for ergonomic error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Trailer appended to every invalid rules report.
pub const INVALID_RULES_NOTICE: &str = "Above rules does not conform to C++ regular expression syntax";

/// Main error type for nfapi-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Driver version metadata could not be read
    #[error("DRIVER NOT FOUND: {}", .path.display())]
    DriverNotFound {
        /// Driver file whose version was unreadable
        path: PathBuf,
    },

    /// Driver installation failed
    #[error("{0}")]
    InstallFailed(String),

    /// Installed driver file could not be removed
    #[error("Uninstall netfilter2 failed: {0}")]
    UninstallFailed(String),

    /// One or more rules were rejected by the redirector
    #[error("{}", invalid_rules_message(.rules))]
    InvalidRules {
        /// Rejected patterns, in the order they were dialed
        rules: Vec<String>,
    },

    /// Redirector initialization returned failure
    #[error("Redirector start failed.")]
    RedirectorStartFailed,

    /// Start/stop requested in a state that does not allow it
    #[error("Cannot {operation} while redirector is {state}")]
    InvalidState {
        /// Requested operation
        operation: &'static str,
        /// Lifecycle state at the time of the request
        state: crate::netfilter::LifecycleState,
    },

    /// No process is listening on the HTTP proxy port
    #[error("No process is listening on port {port}")]
    ProxyProcessNotFound {
        /// Target port that was searched for
        port: u16,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the missing config file
        path: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    ConfigValue {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// Blocking worker panicked or was cancelled
    #[error("Redirector task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config value error
    pub fn config_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a driver not found error
    pub fn driver_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DriverNotFound { path: path.into() }
    }
}

/// Format rejected rules one per line, followed by [`INVALID_RULES_NOTICE`].
pub fn invalid_rules_message<S: AsRef<str>>(rules: &[S]) -> String {
    let mut message = String::new();
    for rule in rules {
        message.push_str(rule.as_ref());
        message.push('\n');
    }
    message.push_str(INVALID_RULES_NOTICE);
    message
}
