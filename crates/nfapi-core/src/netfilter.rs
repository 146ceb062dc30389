//! Redirection lifecycle
//!
//! [`NetFilter`] sequences a session: driver reconciliation, the fixed option
//! block, target and credentials, the rule upload and finally the blocking
//! native init. Only one session can be active; the lifecycle state is kept
//! behind a mutex and a second `start` is rejected instead of racing the
//! first.

use crate::dial::Dial;
use crate::driver::{DriverAction, DriverManager, DriverStatus};
use crate::error::{Error, Result};
use crate::proxy::ProcessLocator;
use crate::redirector::{dial_request, Redirector, TrafficStats};
use crate::session::{RuleSet, SessionConfig};
use parking_lot::Mutex;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Upstream DNS server the redirector forwards intercepted queries to
pub const DNS_HOST: &str = "8.8.8.8";

/// Upstream DNS port
pub const DNS_PORT: u16 = 53;

/// Lifecycle of a redirection session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No session
    Stopped,
    /// `start` is in progress
    Starting,
    /// Redirector initialized
    Running,
    /// `stop` is in progress
    Stopping,
}

impl LifecycleState {
    /// Human-readable state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed filter and DNS options dialed on every start
pub fn base_dials() -> Vec<Dial> {
    vec![
        Dial::FilterLoopback(false),
        Dial::FilterIntranet(false),
        Dial::FilterSelf(false),
        Dial::FilterParent(false),
        Dial::FilterIcmp(false),
        Dial::FilterTcp(true),
        Dial::FilterUdp(true),
        Dial::FilterDns(true),
        Dial::DnsOnly(true),
        Dial::DnsProxy(true),
        Dial::DnsHost(DNS_HOST.to_string()),
        Dial::DnsPort(DNS_PORT),
    ]
}

/// Upload handle and bypass rules.
///
/// Always clears previous rules first. Returns the rejected patterns, handle
/// rules before bypass rules.
pub fn dial_rules(backend: &dyn Redirector, rules: &RuleSet) -> Vec<String> {
    dial_request(backend, &Dial::ClearNames);

    let mut rejected = Vec::new();
    for rule in &rules.handle {
        if !dial_request(backend, &Dial::AddName(rule.clone())) {
            rejected.push(rule.clone());
        }
    }
    for rule in &rules.bypass {
        if !dial_request(backend, &Dial::BypassName(rule.clone())) {
            rejected.push(rule.clone());
        }
    }
    rejected
}

/// Resets the lifecycle to `Stopped` unless the transition was committed.
///
/// Owns a handle to the state so it can move into the blocking native call.
/// A dropped `start` future then leaves the state at `Starting` until `init`
/// returns, instead of claiming `Stopped` while the redirector comes up.
struct Transition {
    state: Arc<Mutex<LifecycleState>>,
    committed: bool,
}

impl Transition {
    fn begin(
        state: &Arc<Mutex<LifecycleState>>,
        from: LifecycleState,
        to: LifecycleState,
        operation: &'static str,
    ) -> Result<Self> {
        let mut current = state.lock();
        if *current != from {
            return Err(Error::InvalidState {
                operation,
                state: *current,
            });
        }
        *current = to;
        Ok(Self::adopt(state))
    }

    /// Guard a state the caller already moved under the lock
    fn adopt(state: &Arc<Mutex<LifecycleState>>) -> Self {
        Self {
            state: Arc::clone(state),
            committed: false,
        }
    }

    fn commit(mut self, to: LifecycleState) {
        *self.state.lock() = to;
        self.committed = true;
    }
}

impl Drop for Transition {
    fn drop(&mut self) {
        if !self.committed {
            *self.state.lock() = LifecycleState::Stopped;
        }
    }
}

/// Control plane for the netfilter2 driver and redirector library
pub struct NetFilter {
    backend: Arc<dyn Redirector>,
    driver: DriverManager,
    locator: Option<Arc<dyn ProcessLocator>>,
    state: Arc<Mutex<LifecycleState>>,
}

impl NetFilter {
    /// Create a controller over a redirector backend and driver manager
    pub fn new(backend: Arc<dyn Redirector>, driver: DriverManager) -> Self {
        Self {
            backend,
            driver,
            locator: None,
            state: Arc::new(Mutex::new(LifecycleState::Stopped)),
        }
    }

    /// Process locator used by the HTTP proxy variant
    pub fn with_process_locator(mut self, locator: Arc<dyn ProcessLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    /// Send a single option to the redirector
    pub fn dial(&self, request: &Dial) -> bool {
        dial_request(self.backend.as_ref(), request)
    }

    /// Toggle native redirector logging
    pub fn enable_log(&self, enabled: bool) -> bool {
        dial_request(self.backend.as_ref(), &Dial::PrintLog(enabled))
    }

    /// Use a different bundled driver file
    pub fn set_driver_path(&mut self, path: impl Into<PathBuf>) {
        self.driver.set_bundled_path(path);
    }

    /// Install the bundled driver
    pub fn install_driver(&self) -> Result<()> {
        self.driver.install(self.backend.as_ref())
    }

    /// Replace the installed driver, keeping it when the bundled one is unusable
    pub fn reinstall_driver(&self) -> Result<()> {
        self.driver.reinstall(self.backend.as_ref())
    }

    /// Remove the installed driver
    pub fn uninstall_driver(&self) -> Result<()> {
        self.driver.uninstall(self.backend.as_ref())
    }

    /// Bring the installed driver in line with the bundled one
    pub fn check_driver(&self) -> Result<DriverAction> {
        self.driver.reconcile(self.backend.as_ref())
    }

    /// Driver versions and pending action
    pub fn driver_status(&self) -> DriverStatus {
        self.driver.status()
    }

    /// Redirector traffic counters
    pub fn traffic(&self) -> TrafficStats {
        TrafficStats::read(self.backend.as_ref())
    }

    /// Start redirecting traffic for `session`.
    ///
    /// Options already dialed are not rolled back when a later step fails.
    /// Once the native init is running, dropping the returned future no
    /// longer cancels the start: the state stays `Starting` until init
    /// returns and then becomes `Running` or `Stopped`.
    pub async fn start(&self, session: &SessionConfig) -> Result<()> {
        let transition = Transition::begin(
            &self.state,
            LifecycleState::Stopped,
            LifecycleState::Starting,
            "start",
        )?;

        info!(host = %session.host, port = session.port, rules = session.rules.len(), "Starting redirector");

        let action = self.driver.reconcile(self.backend.as_ref())?;
        debug!(action = %action, "Driver ready");

        self.configure(session)?;

        let pid = if session.http_proxy {
            Some(self.locate_proxy(session.port)?)
        } else {
            None
        };
        if let Some(pid) = pid {
            dial_request(self.backend.as_ref(), &Dial::ProxyPid(pid));
        }

        let backend = Arc::clone(&self.backend);
        let started = tokio::task::spawn_blocking(move || {
            let started = match pid {
                Some(_) => backend.init_http(),
                None => backend.init(),
            };
            if started {
                transition.commit(LifecycleState::Running);
            }
            started
        })
        .await?;

        if !started {
            return Err(Error::RedirectorStartFailed);
        }

        info!("Redirector started");
        Ok(())
    }

    /// Stop redirecting traffic.
    ///
    /// Does nothing when no session is running.
    pub async fn stop(&self) -> Result<()> {
        let transition = {
            let mut current = self.state.lock();
            match *current {
                LifecycleState::Stopped => {
                    debug!("Redirector already stopped");
                    return Ok(());
                }
                LifecycleState::Running => {
                    *current = LifecycleState::Stopping;
                    Transition::adopt(&self.state)
                }
                state => {
                    return Err(Error::InvalidState {
                        operation: "stop",
                        state,
                    })
                }
            }
        };

        info!("Stopping redirector");
        let backend = Arc::clone(&self.backend);
        let freed = tokio::task::spawn_blocking(move || {
            let freed = backend.free();
            transition.commit(LifecycleState::Stopped);
            freed
        })
        .await?;
        if !freed {
            warn!("Redirector reported failure while stopping");
        }

        info!("Redirector stopped");
        Ok(())
    }

    fn configure(&self, session: &SessionConfig) -> Result<()> {
        let backend = self.backend.as_ref();

        for request in base_dials() {
            dial_request(backend, &request);
        }

        dial_request(backend, &Dial::TargetHost(session.host.clone()));
        dial_request(backend, &Dial::TargetPort(session.port));

        if let Some(credentials) = session.dialable_credentials() {
            dial_request(backend, &Dial::TargetUser(credentials.username.clone()));
            dial_request(backend, &Dial::TargetPass(credentials.password.clone()));
        }

        let rejected = dial_rules(backend, &session.rules);
        if !rejected.is_empty() {
            warn!(count = rejected.len(), "Rules rejected by redirector");
            return Err(Error::InvalidRules { rules: rejected });
        }
        Ok(())
    }

    fn locate_proxy(&self, port: u16) -> Result<u32> {
        let locator = self
            .locator
            .as_ref()
            .ok_or_else(|| Error::Config("HTTP proxy mode needs a process locator".into()))?;
        let pid = locator.listening_pid(port)?;
        debug!(pid, port, "Found HTTP proxy process");
        Ok(pid)
    }
}
