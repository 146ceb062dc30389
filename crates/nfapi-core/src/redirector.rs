//! Redirector backend interface
//!
//! The native redirector library is opaque: it exposes registration, a named
//! option dial and an init/free pair. This trait is the seam between the
//! control plane and that library, implemented by the platform crate's
//! runtime-loaded DLL and by recording doubles in tests.

use crate::dial::{Dial, DialOption};
use tracing::{debug, warn};

/// Native redirector entry points
pub trait Redirector: Send + Sync {
    /// Register a kernel driver service by name
    fn register(&self, name: &str) -> bool;

    /// Unregister a kernel driver service by name
    fn unregister(&self, name: &str) -> bool;

    /// Set a named option; returns whether the value was accepted
    fn dial(&self, option: DialOption, value: &str) -> bool;

    /// Start redirection
    ///
    /// Blocks until the redirector is running or has failed.
    fn init(&self) -> bool;

    /// Start redirection towards a local HTTP proxy process
    fn init_http(&self) -> bool;

    /// Stop redirection and release native resources
    fn free(&self) -> bool;

    /// Bytes sent through the redirector since init
    fn uploaded(&self) -> u64;

    /// Bytes received through the redirector since init
    fn downloaded(&self) -> u64;
}

/// Upload/download counters reported by the redirector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficStats {
    /// Bytes sent
    pub uploaded: u64,
    /// Bytes received
    pub downloaded: u64,
}

impl TrafficStats {
    /// Read both counters from a backend
    pub fn read(backend: &dyn Redirector) -> Self {
        Self {
            uploaded: backend.uploaded(),
            downloaded: backend.downloaded(),
        }
    }
}

/// Translate a typed request into a native dial call.
pub fn dial_request(backend: &dyn Redirector, request: &Dial) -> bool {
    let option = request.option();
    let value = request.encode();
    let accepted = backend.dial(option, &value);

    if option.is_secret() {
        debug!(option = %option, accepted, "dial");
    } else {
        debug!(option = %option, value = %value, accepted, "dial");
    }

    if !accepted {
        warn!(option = %option, "Redirector rejected option");
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Echo {
        seen: Mutex<Vec<(DialOption, String)>>,
    }

    impl Redirector for Echo {
        fn register(&self, _name: &str) -> bool {
            true
        }
        fn unregister(&self, _name: &str) -> bool {
            true
        }
        fn dial(&self, option: DialOption, value: &str) -> bool {
            self.seen.lock().push((option, value.to_string()));
            option != DialOption::AddName
        }
        fn init(&self) -> bool {
            true
        }
        fn init_http(&self) -> bool {
            true
        }
        fn free(&self) -> bool {
            true
        }
        fn uploaded(&self) -> u64 {
            10
        }
        fn downloaded(&self) -> u64 {
            20
        }
    }

    #[test]
    fn test_dial_request_forwards_encoded_value() {
        let backend = Echo::default();
        assert!(dial_request(&backend, &Dial::TargetPort(1080)));
        assert!(!dial_request(&backend, &Dial::AddName("x".into())));

        let seen = backend.seen.lock();
        assert_eq!(seen[0], (DialOption::TargetPort, "1080".to_string()));
        assert_eq!(seen[1], (DialOption::AddName, "x".to_string()));
    }

    #[test]
    fn test_traffic_stats_read() {
        let stats = TrafficStats::read(&Echo::default());
        assert_eq!(stats, TrafficStats { uploaded: 10, downloaded: 20 });
    }
}
