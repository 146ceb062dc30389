//! # NetFilter Platform
//!
//! Windows implementations of the seams defined by `nfapi-core`:
//!
//! - [`NativeRedirector`] - `Redirector.dll` loaded at runtime
//! - [`SystemDriverHost`] - driver files, version resources and the
//!   `netfilter2` service
//! - [`NetstatLocator`] - PID lookup for the HTTP proxy variant
//!
//! On other platforms the crate builds, but loading the redirector fails
//! with [`PlatformError::Unsupported`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod host;
pub mod netstat;
pub mod redirector;

#[cfg(windows)]
pub mod windows;

pub use error::{PlatformError, Result};
pub use host::{default_paths, system_dir, SystemDriverHost};
pub use netstat::NetstatLocator;
pub use redirector::{set_library_directory, NativeRedirector, REDIRECTOR_DLL};

use nfapi_core::config::DriverConfig;
use nfapi_core::{DriverManager, NetFilter};
use std::sync::Arc;
use tracing::debug;

/// Driver manager over the local filesystem and service manager.
///
/// Needs no redirector library, so status queries work without it.
pub fn driver_manager(config: &DriverConfig) -> DriverManager {
    let paths = default_paths(&config.bundled_path);
    debug!(
        bundled = %paths.bundled.display(),
        system = %paths.system.display(),
        "Driver paths"
    );
    DriverManager::new(Box::new(SystemDriverHost::new()), paths)
}

/// Build a [`NetFilter`] wired to the real redirector, driver host and
/// process locator.
pub fn open_netfilter(config: &DriverConfig) -> Result<NetFilter> {
    let redirector = NativeRedirector::load(config.library_dir.as_deref())?;
    Ok(NetFilter::new(Arc::new(redirector), driver_manager(config))
        .with_process_locator(Arc::new(NetstatLocator::new())))
}
