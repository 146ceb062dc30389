//! `netstat -ano` process lookup

use nfapi_core::proxy::{parse_listening_pid, ProcessLocator};
use nfapi_core::{Error, Result};
use std::process::Command;
use tracing::{debug, warn};

/// Finds the listening process by running `netstat -ano`
#[derive(Debug, Default, Clone, Copy)]
pub struct NetstatLocator;

impl NetstatLocator {
    /// Create a locator
    pub fn new() -> Self {
        Self
    }

    fn run_netstat() -> std::io::Result<String> {
        let mut command = Command::new("netstat");
        command.arg("-ano");

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let output = command.output()?;
        if !output.status.success() {
            warn!(status = %output.status, "netstat exited with failure");
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ProcessLocator for NetstatLocator {
    fn listening_pid(&self, port: u16) -> Result<u32> {
        let output = Self::run_netstat()?;
        debug!(bytes = output.len(), port, "Read netstat output");
        parse_listening_pid(&output, port).ok_or(Error::ProxyProcessNotFound { port })
    }
}
