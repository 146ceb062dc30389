//! Driver file and service operations on the local machine

use nfapi_core::driver::{DriverHost, DriverPaths};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// How long to wait for the driver service to report stopped
pub const SERVICE_STOP_TIMEOUT: Duration = Duration::from_secs(30);

/// `%SystemRoot%\System32` when the API is unavailable
const FALLBACK_SYSTEM_DIR: &str = "C:\\Windows\\System32";

/// System directory that holds the `drivers` folder
pub fn system_dir() -> PathBuf {
    #[cfg(windows)]
    {
        crate::windows::system_directory().unwrap_or_else(|| PathBuf::from(FALLBACK_SYSTEM_DIR))
    }

    #[cfg(not(windows))]
    {
        PathBuf::from(FALLBACK_SYSTEM_DIR)
    }
}

/// Driver paths for this machine with the given bundled driver
pub fn default_paths(bundled: impl Into<PathBuf>) -> DriverPaths {
    DriverPaths::for_system_dir(system_dir()).with_bundled(bundled)
}

/// [`DriverHost`] backed by the real filesystem and service manager
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDriverHost;

impl SystemDriverHost {
    /// Create a host
    pub fn new() -> Self {
        Self
    }
}

impl DriverHost for SystemDriverHost {
    fn file_version(&self, path: &Path) -> Option<String> {
        #[cfg(windows)]
        {
            crate::windows::file_version(path)
        }

        #[cfg(not(windows))]
        {
            let _ = path;
            None
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        let bytes = fs::copy(from, to)?;
        debug!(from = %from.display(), to = %to.display(), bytes, "Copied driver");
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn stop_service(&self, name: &str) -> io::Result<()> {
        #[cfg(windows)]
        {
            crate::windows::stop_and_wait(name, SERVICE_STOP_TIMEOUT)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
        }

        #[cfg(not(windows))]
        {
            debug!(service = name, "No service manager on this platform");
            Ok(())
        }
    }
}
