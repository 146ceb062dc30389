//! Configuration management
//!
//! A TOML file describing the proxy target, rules and driver locations.
//! Every section is optional and falls back to its defaults.

use crate::driver::DEFAULT_BUNDLED_DRIVER;
use crate::error::{Error, Result};
use crate::session::{Credentials, RuleSet, SessionConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Driver and library locations
    pub driver: DriverConfig,

    /// Proxy target
    pub target: TargetConfig,

    /// Handle and bypass rules
    pub rules: RuleSet,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| Error::ConfigNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::from)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.target.host.trim().is_empty() {
            return Err(Error::config_value("target.host", "Must not be empty"));
        }

        if self.target.port == 0 {
            return Err(Error::config_value("target.port", "Must be between 1 and 65535"));
        }

        match (&self.target.username, &self.target.password) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(Error::config_value(
                    "target",
                    "username and password must be set together",
                ));
            }
            _ => {}
        }

        let blank = |rules: &[String]| rules.iter().any(|r| r.trim().is_empty());
        if blank(&self.rules.handle) {
            return Err(Error::config_value("rules.handle", "Contains an empty pattern"));
        }
        if blank(&self.rules.bypass) {
            return Err(Error::config_value("rules.bypass", "Contains an empty pattern"));
        }

        Ok(())
    }

    /// Build the session this configuration describes
    pub fn session(&self) -> SessionConfig {
        let credentials = match (&self.target.username, &self.target.password) {
            (Some(user), Some(pass)) => Some(Credentials::new(user.clone(), pass.clone())),
            _ => None,
        };

        SessionConfig {
            host: self.target.host.clone(),
            port: self.target.port,
            credentials,
            rules: self.rules.clone(),
            http_proxy: self.general.http_proxy,
        }
    }
}

/// General settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable native redirector logging
    pub print_log: bool,
    /// Redirect to a local HTTP proxy process
    pub http_proxy: bool,
}

/// Driver and native library locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Bundled driver shipped with the application
    pub bundled_path: PathBuf,
    /// Directory containing Redirector.dll
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_dir: Option<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            bundled_path: PathBuf::from(DEFAULT_BUNDLED_DRIVER),
            library_dir: None,
        }
    }
}

/// Proxy target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Proxy host
    pub host: String,
    /// Proxy port
    pub port: u16,
    /// Proxy username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Proxy password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1080,
            username: None,
            password: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.driver.bundled_path, PathBuf::from("nfdriver.sys"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml("[target]\nport = 7890\n").unwrap();
        assert_eq!(config.target.host, "127.0.0.1");
        assert_eq!(config.target.port, 7890);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = Config::default();
        config.target.port = 0;
        assert!(matches!(
            config.validate(),
            Err(Error::ConfigValue { ref key, .. }) if key == "target.port"
        ));
    }
}
