//! Kernel driver service control

use crate::error::{PlatformError, Result};
use std::ffi::OsStr;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use windows_service::service::{ServiceAccess, ServiceState};
use windows_service::service_manager::{ServiceManager, ServiceManagerAccess};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Stop a running service and wait until the SCM reports it stopped.
///
/// A service that is not running is left alone.
pub fn stop_and_wait(name: &str, timeout: Duration) -> Result<()> {
    let manager = ServiceManager::local_computer(None::<&str>, ServiceManagerAccess::CONNECT)
        .map_err(|e| PlatformError::Service(format!("open service manager: {e}")))?;
    let service = manager
        .open_service(OsStr::new(name), ServiceAccess::QUERY_STATUS | ServiceAccess::STOP)
        .map_err(|e| PlatformError::Service(format!("open {name}: {e}")))?;

    let status = service
        .query_status()
        .map_err(|e| PlatformError::Service(format!("query {name}: {e}")))?;
    if status.current_state != ServiceState::Running {
        debug!(service = name, state = ?status.current_state, "Service not running");
        return Ok(());
    }

    info!(service = name, "Stopping service");
    service
        .stop()
        .map_err(|e| PlatformError::Service(format!("stop {name}: {e}")))?;

    let deadline = Instant::now() + timeout;
    loop {
        let state = service
            .query_status()
            .map_err(|e| PlatformError::Service(format!("query {name}: {e}")))?
            .current_state;
        if state == ServiceState::Stopped {
            debug!(service = name, "Service stopped");
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(PlatformError::Service(format!(
                "{name} did not stop within {timeout:?}"
            )));
        }
        thread::sleep(POLL_INTERVAL);
    }
}
