//! Locating the local HTTP proxy process
//!
//! The HTTP proxy variant of the redirector needs the PID of the process that
//! listens on the target port. The platform crate finds it with `netstat -ano`;
//! the parsing lives here so it can be tested anywhere.

use crate::error::Result;
use tracing::trace;

/// State marker of listening sockets in `netstat -ano` output
pub const LISTENING_MARKER: &str = "LISTENING";

/// Finds the process listening on a local TCP port
pub trait ProcessLocator: Send + Sync {
    /// PID of the process in LISTENING state on `port`
    fn listening_pid(&self, port: u16) -> Result<u32>;
}

/// Extract the PID of the first LISTENING row bound to `port`.
///
/// Rows look like
/// `  TCP    0.0.0.0:8080    0.0.0.0:0    LISTENING    4312`; the PID is the
/// text following the last `LISTENING` marker.
pub fn parse_listening_pid(output: &str, port: u16) -> Option<u32> {
    let suffix = format!(":{port}");

    output.lines().find_map(|line| {
        let marker = line.rfind(LISTENING_MARKER)?;
        let local = line.split_whitespace().nth(1)?;
        if !local.ends_with(&suffix) {
            return None;
        }
        trace!(row = line.trim(), "netstat match");
        line[marker + LISTENING_MARKER.len()..].trim().parse().ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETSTAT: &str = "\r
Active Connections\r
\r
  Proto  Local Address          Foreign Address        State           PID\r
  TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       1044\r
  TCP    127.0.0.1:18080        0.0.0.0:0              LISTENING       5120\r
  TCP    127.0.0.1:8080         0.0.0.0:0              LISTENING       4312\r
  TCP    127.0.0.1:52311        127.0.0.1:8080         ESTABLISHED     7788\r
  TCP    [::]:8080              [::]:0                 LISTENING       4312\r
  UDP    0.0.0.0:8080           *:*                                    999\r
";

    #[test]
    fn test_finds_listening_pid() {
        assert_eq!(parse_listening_pid(NETSTAT, 8080), Some(4312));
        assert_eq!(parse_listening_pid(NETSTAT, 135), Some(1044));
    }

    #[test]
    fn test_port_must_match_exactly() {
        assert_eq!(parse_listening_pid(NETSTAT, 80), None);
        assert_eq!(parse_listening_pid(NETSTAT, 18080), Some(5120));
    }

    #[test]
    fn test_ignores_established_rows() {
        assert_eq!(parse_listening_pid(NETSTAT, 52311), None);
    }
}
