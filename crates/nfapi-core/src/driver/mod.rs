//! netfilter2 driver lifecycle
//!
//! Keeps the installed kernel driver in step with the bundled copy shipped
//! next to the application. Reconciliation reads file version metadata on
//! every check and never persists anything itself.

mod version;

pub use version::{plan, DriverAction, DriverVersion};

use crate::error::{Error, Result};
use crate::redirector::Redirector;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name the driver service is registered under
pub const DRIVER_SERVICE_NAME: &str = "netfilter2";

/// File name of the installed driver
pub const DRIVER_FILE_NAME: &str = "netfilter2.sys";

/// Default location of the bundled driver
pub const DEFAULT_BUNDLED_DRIVER: &str = "nfdriver.sys";

/// OS operations needed to manage the driver
#[cfg_attr(test, mockall::automock)]
pub trait DriverHost: Send + Sync {
    /// File version string from the binary's version resource
    fn file_version(&self, path: &Path) -> Option<String>;

    /// Whether a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Copy `from` to `to`
    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Delete a file
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Stop the named service if it is running and wait until it has stopped
    fn stop_service(&self, name: &str) -> io::Result<()>;
}

/// Locations of the bundled and installed driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverPaths {
    /// Driver shipped with the application
    pub bundled: PathBuf,
    /// Driver installed into the system driver directory
    pub system: PathBuf,
}

impl DriverPaths {
    /// Paths for a given system directory (usually `C:\Windows\System32`)
    pub fn for_system_dir(system_dir: impl AsRef<Path>) -> Self {
        Self {
            bundled: PathBuf::from(DEFAULT_BUNDLED_DRIVER),
            system: system_dir.as_ref().join("drivers").join(DRIVER_FILE_NAME),
        }
    }

    /// Replace the bundled driver path
    pub fn with_bundled(mut self, bundled: impl Into<PathBuf>) -> Self {
        self.bundled = bundled.into();
        self
    }
}

/// Snapshot of the driver state, without side effects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverStatus {
    /// Paths that were inspected
    pub paths: DriverPaths,
    /// Version of the bundled driver, if readable
    pub bundled_version: Option<String>,
    /// Version of the installed driver, if installed and readable
    pub installed_version: Option<String>,
    /// Whether the installed driver file exists
    pub installed: bool,
    /// What `reconcile` would do, when it can be decided
    pub action: Option<DriverAction>,
}

/// Installs, upgrades and removes the netfilter2 driver
pub struct DriverManager {
    host: Box<dyn DriverHost>,
    paths: DriverPaths,
}

impl DriverManager {
    /// Create a manager over an OS host
    pub fn new(host: Box<dyn DriverHost>, paths: DriverPaths) -> Self {
        Self { host, paths }
    }

    /// Inspected paths
    pub fn paths(&self) -> &DriverPaths {
        &self.paths
    }

    /// Point at a different bundled driver
    pub fn set_bundled_path(&mut self, path: impl Into<PathBuf>) {
        self.paths.bundled = path.into();
    }

    /// Make sure the installed driver matches the bundled one.
    pub fn reconcile(&self, backend: &dyn Redirector) -> Result<DriverAction> {
        let action = self.decide()?;
        debug!(action = %action, "Driver reconciliation");

        match action {
            DriverAction::Keep => {}
            DriverAction::Install => {
                info!(path = %self.paths.system.display(), "Installing netfilter2 driver");
                self.install(backend)?;
            }
            action => {
                info!(action = %action, "Reinstalling netfilter2 driver");
                self.uninstall(backend)?;
                self.install(backend)?;
            }
        }

        Ok(action)
    }

    /// Report versions and the pending action without touching anything.
    pub fn status(&self) -> DriverStatus {
        let bundled_version = self.host.file_version(&self.paths.bundled);
        let installed = self.host.exists(&self.paths.system);
        let installed_version = if installed {
            self.host.file_version(&self.paths.system)
        } else {
            None
        };
        let action = match (&bundled_version, installed, &installed_version) {
            (Some(_), false, _) => Some(DriverAction::Install),
            (Some(bundled), true, Some(current)) => Some(plan(bundled, current)),
            _ => None,
        };

        DriverStatus {
            paths: self.paths.clone(),
            bundled_version,
            installed_version,
            installed,
            action,
        }
    }

    fn decide(&self) -> Result<DriverAction> {
        let bundled = self
            .host
            .file_version(&self.paths.bundled)
            .ok_or_else(|| Error::driver_not_found(&self.paths.bundled))?;

        if !self.host.exists(&self.paths.system) {
            return Ok(DriverAction::Install);
        }

        let installed = self
            .host
            .file_version(&self.paths.system)
            .ok_or_else(|| Error::driver_not_found(&self.paths.system))?;

        debug!(bundled = %bundled, installed = %installed, "Driver versions");
        Ok(plan(&bundled, &installed))
    }

    /// Copy the bundled driver into place and register it.
    pub fn install(&self, backend: &dyn Redirector) -> Result<()> {
        if !self.host.exists(&self.paths.bundled) {
            return Err(Error::InstallFailed(
                "builtin driver files missing, can't install NF driver".into(),
            ));
        }

        self.host
            .copy_file(&self.paths.bundled, &self.paths.system)
            .map_err(|e| Error::InstallFailed(format!("Copy {DRIVER_FILE_NAME} failed\n{e}")))?;

        if !backend.register(DRIVER_SERVICE_NAME) {
            return Err(Error::InstallFailed(format!(
                "Register {DRIVER_SERVICE_NAME} failed"
            )));
        }

        info!("netfilter2 driver installed");
        Ok(())
    }

    /// Replace the installed driver with the bundled one.
    ///
    /// Fails with `DriverNotFound` before touching the installed driver when
    /// the bundled one is missing or has no readable version.
    pub fn reinstall(&self, backend: &dyn Redirector) -> Result<()> {
        if self.host.file_version(&self.paths.bundled).is_none() {
            return Err(Error::driver_not_found(&self.paths.bundled));
        }
        self.uninstall(backend)?;
        self.install(backend)
    }

    /// Stop, unregister and delete the installed driver.
    ///
    /// Stopping the service is best effort. Returns `Ok` when nothing is
    /// installed.
    pub fn uninstall(&self, backend: &dyn Redirector) -> Result<()> {
        if let Err(e) = self.host.stop_service(DRIVER_SERVICE_NAME) {
            warn!(error = %e, "Failed to stop netfilter2 service");
        }

        if !self.host.exists(&self.paths.system) {
            debug!("netfilter2 driver not installed");
            return Ok(());
        }

        if !backend.unregister(DRIVER_SERVICE_NAME) {
            warn!("Unregister netfilter2 returned failure");
        }

        self.host
            .remove_file(&self.paths.system)
            .map_err(|e| Error::UninstallFailed(e.to_string()))?;

        info!("netfilter2 driver removed");
        Ok(())
    }
}
