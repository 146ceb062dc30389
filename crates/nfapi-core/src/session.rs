//! Per-start session configuration

use serde::{Deserialize, Serialize};

/// Proxy credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both parts are present
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Process name patterns to intercept and to exclude
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Patterns whose traffic is redirected
    pub handle: Vec<String>,
    /// Patterns whose traffic is never redirected
    pub bypass: Vec<String>,
}

impl RuleSet {
    /// Create a rule set
    pub fn new(handle: Vec<String>, bypass: Vec<String>) -> Self {
        Self { handle, bypass }
    }

    /// Total number of rules
    pub fn len(&self) -> usize {
        self.handle.len() + self.bypass.len()
    }

    /// No rules at all
    pub fn is_empty(&self) -> bool {
        self.handle.is_empty() && self.bypass.is_empty()
    }

    /// Parse a rules file: one pattern per line.
    ///
    /// Lines starting with `#` are comments. Lines starting with `!` are
    /// bypass patterns; everything else is a handle pattern.
    pub fn from_lines(content: &str) -> Self {
        let mut rules = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.strip_prefix('!') {
                Some(bypass) => {
                    let bypass = bypass.trim();
                    if !bypass.is_empty() {
                        rules.bypass.push(bypass.to_string());
                    }
                }
                None => rules.handle.push(line.to_string()),
            }
        }
        rules
    }

    /// Append another rule set
    pub fn extend(&mut self, other: RuleSet) {
        self.handle.extend(other.handle);
        self.bypass.extend(other.bypass);
    }
}

/// Everything `start` needs for one redirection session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Proxy host
    pub host: String,
    /// Proxy port
    pub port: u16,
    /// Optional proxy credentials
    pub credentials: Option<Credentials>,
    /// Handle and bypass rules
    pub rules: RuleSet,
    /// Redirect to a local HTTP proxy process instead of a SOCKS target
    pub http_proxy: bool,
}

impl SessionConfig {
    /// Session towards `host:port` with no rules
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            credentials: None,
            rules: RuleSet::default(),
            http_proxy: false,
        }
    }

    /// Set the rules
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Set the credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Use the HTTP proxy variant
    pub fn with_http_proxy(mut self, http_proxy: bool) -> Self {
        self.http_proxy = http_proxy;
        self
    }

    /// Credentials to dial, if both parts are present
    pub fn dialable_credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref().filter(|c| c.is_complete())
    }
}
